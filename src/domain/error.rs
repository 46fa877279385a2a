use thiserror::Error;

/// Core errors raised by the memoization layer itself.
///
/// Failures of a wrapped computation are never represented here: they keep
/// their own error type and pass through `call` untouched.
#[derive(Debug, Error)]
pub enum MemoError {
    #[error("Invalid TTL: {message}")]
    InvalidTtl { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl MemoError {
    pub fn invalid_ttl(message: impl Into<String>) -> Self {
        Self::InvalidTtl {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
