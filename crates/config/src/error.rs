#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// One or more required environment variables are unset or blank.
    #[error("missing required environment variables: {}", keys.join(", "))]
    Missing { keys: Vec<String> },

    /// A variable is set but cannot be parsed.
    #[error("invalid value for {key}: {message}")]
    Invalid { key: String, message: String },
}

impl Error {
    #[must_use]
    pub fn invalid(key: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Invalid {
            key: key.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
