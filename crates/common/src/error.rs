/// Error types that can be built from a free-form message.
///
/// Implement this for a crate's error type, then invoke [`impl_context!`]
/// in its error module to get `.context()` and `.with_context()` on foreign
/// `Result`s.
pub trait FromMessage: Sized {
    fn from_message(message: String) -> Self;

    /// Build an error that reads `"{context}: {source}"`.
    fn with_source(context: impl Into<String>, source: impl std::fmt::Display) -> Self {
        Self::from_message(format!("{}: {source}", context.into()))
    }
}

/// Generate a crate-local `Context` extension trait for `Result`.
///
/// Invoke inside a module that defines `Error: FromMessage` and
/// `type Result<T> = std::result::Result<T, Error>`.
///
/// ```ignore
/// // in crates/channels/src/error.rs
/// relaybot_common::impl_context!();
/// ```
#[macro_export]
macro_rules! impl_context {
    () => {
        /// Prefix a foreign error with what was being attempted.
        pub trait Context<T> {
            fn context(self, context: impl Into<String>) -> Result<T>;

            fn with_context<C: Into<String>>(self, f: impl FnOnce() -> C) -> Result<T>;
        }

        impl<T, E: std::fmt::Display> Context<T> for std::result::Result<T, E> {
            fn context(self, context: impl Into<String>) -> Result<T> {
                self.map_err(|source| <Error as $crate::FromMessage>::with_source(context, source))
            }

            fn with_context<C: Into<String>>(self, f: impl FnOnce() -> C) -> Result<T> {
                self.map_err(|source| <Error as $crate::FromMessage>::with_source(f(), source))
            }
        }
    };
}
