//! Error taxonomy for item processing.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, NylasError>;

/// Errors raised while turning one item into one Nylas call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NylasError {
    /// Local precondition failure. Never reaches the network.
    #[error("{message}")]
    Operation { message: String },

    /// The call was made and the service (or the transport) reported failure.
    #[error("Nylas API Error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    /// The (resource, operation) pair is not one this node knows.
    ///
    /// Only reachable through a misconfigured node, so it always aborts the batch.
    #[error("unknown operation '{operation}' for resource '{resource}'")]
    UnknownOperation { resource: String, operation: String },

    /// Credentials or node configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

impl NylasError {
    pub fn operation(message: impl Into<String>) -> Self {
        Self::Operation {
            message: message.into(),
        }
    }

    pub fn api(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Api {
            message: message.into(),
            status,
        }
    }

    /// HTTP status attached to an API error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => *status,
            _ => None,
        }
    }

    /// Whether the continue-on-fail policy may capture this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Operation { .. } | Self::Api { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_message_has_prefix_but_no_status() {
        let err = NylasError::api("grant not found", Some(404));
        assert_eq!(err.to_string(), "Nylas API Error: grant not found");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_operation_error_is_raw_message() {
        let err = NylasError::operation("Subject cannot be empty");
        assert_eq!(err.to_string(), "Subject cannot be empty");
        assert_eq!(err.status(), None);
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_unknown_operation_is_fatal() {
        let err = NylasError::UnknownOperation {
            resource: "email".into(),
            operation: "archive".into(),
        };
        assert!(!err.is_recoverable());
    }
}
