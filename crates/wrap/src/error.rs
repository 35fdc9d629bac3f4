use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WrapError {
    /// the wrapped function failed
    #[error("function raised: {reason}")]
    Raised { reason: String },

    #[error("promise rejected with {0}")]
    Rejected(Value),

    #[error("callback dropped before completion")]
    CallbackDropped,

    #[error("invalid argument for `{wrapper}`: {reason}")]
    InvalidArgument { wrapper: &'static str, reason: String },

    #[error("`{wrapper}` must be called with a receiver")]
    MissingReceiver { wrapper: &'static str },

    #[error("`{wrapper}` must be called within a tokio runtime")]
    NoRuntime { wrapper: &'static str },

    #[error("scheduled call was cancelled")]
    Cancelled,

    #[error("scheduled call panicked: {reason}")]
    Panicked { reason: String },
}

impl WrapError {
    pub fn raised<S: ToString>(str: S) -> Self {
        Self::Raised { reason: str.to_string() }
    }

    pub fn invalid_argument<S: ToString>(wrapper: &'static str, str: S) -> Self {
        Self::InvalidArgument { wrapper, reason: str.to_string() }
    }

    pub fn missing_receiver(wrapper: &'static str) -> Self {
        Self::MissingReceiver { wrapper }
    }

    pub fn no_runtime(wrapper: &'static str) -> Self {
        Self::NoRuntime { wrapper }
    }
}

impl From<tokio::task::JoinError> for WrapError {
    fn from(e: tokio::task::JoinError) -> Self {
        if e.is_cancelled() { Self::Cancelled } else { Self::Panicked { reason: e.to_string() } }
    }
}
