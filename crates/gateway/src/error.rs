pub type Result<T> = std::result::Result<T, Error>;

/// Failures of a background reply task.
///
/// These never reach an HTTP client; the task boundary logs and drops them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Channel(#[from] relaybot_channels::Error),

    #[error("generation failed: {0:#}")]
    Generation(#[source] anyhow::Error),
}

impl Error {
    /// The platform-supplied reason, when a chat API rejected the call.
    pub fn platform_reason(&self) -> Option<&str> {
        match self {
            Self::Channel(err) => err.api_reason(),
            Self::Generation(_) => None,
        }
    }
}
