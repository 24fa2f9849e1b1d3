use thiserror::Error;

/// Shown when the service answers `success: false` without a `message`.
pub const MISSING_FAILURE_MESSAGE: &str = "the service reported a failure without a message";

/// Failure of a train or predict exchange.
///
/// Every variant ends up as a single message in a danger banner, the
/// distinction only matters for logging.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    Decode(String),

    /// The service answered with `success: false`.
    #[error("{0}")]
    Rejected(String),
}

impl ClientError {
    pub fn rejected(message: Option<String>) -> Self {
        ClientError::Rejected(message.unwrap_or_else(|| MISSING_FAILURE_MESSAGE.to_string()))
    }
}

/// Client-side gate on the prediction form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{field} must be a number (got {value:?})")]
    NotANumber { field: &'static str, value: String },

    #[error("employment status must be 1 or 0 (got {0:?})")]
    InvalidEmployment(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}
