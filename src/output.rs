//! Output records and normalization of call outcomes.

use crate::client::CallError;
use crate::error::NylasError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const UNKNOWN_ERROR: &str = "Unknown error occurred";

/// One output item: the API response, or the captured error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub json: Value,
}

impl OutputRecord {
    /// Wrap a response body unchanged. A bodiless response becomes `{}`.
    pub fn success(body: Value) -> Self {
        let json = match body {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };
        Self { json }
    }

    /// Record for an item that failed under continue-on-fail.
    pub fn failure(error: &NylasError) -> Self {
        Self {
            json: json!({ "error": error.to_string() }),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error().is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.json
            .as_object()
            .filter(|m| m.len() == 1)
            .and_then(|m| m.get("error"))
            .and_then(Value::as_str)
    }
}

/// Classify a failed call as an API error, keeping the status as metadata.
pub fn api_error(err: CallError) -> NylasError {
    match err {
        CallError::Status { status, message } => {
            let message = message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| format!("Request failed with status {status}"));
            NylasError::api(message, Some(status))
        }
        CallError::Transport(message) if message.trim().is_empty() => {
            NylasError::api(UNKNOWN_ERROR, None)
        }
        CallError::Transport(message) => NylasError::api(message, None),
    }
}

/// Turn one item's outcome into its record.
///
/// Errors are returned for the dispatcher to apply the fail policy.
pub fn normalize(outcome: Result<Value, NylasError>) -> Result<OutputRecord, NylasError> {
    outcome.map(OutputRecord::success)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_wraps_body_unchanged() {
        let body = json!({"data": [{"id": "1"}], "request_id": "r"});
        assert_eq!(normalize(Ok(body.clone())).unwrap().json, body);
    }

    #[test]
    fn test_null_body_becomes_empty_object() {
        assert_eq!(OutputRecord::success(Value::Null).json, json!({}));
    }

    #[test]
    fn test_api_error_uses_server_message() {
        let err = api_error(CallError::Status {
            status: 404,
            message: Some("event not found".into()),
        });
        assert_eq!(err.to_string(), "Nylas API Error: event not found");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_api_error_fallbacks() {
        let err = api_error(CallError::Status {
            status: 502,
            message: None,
        });
        assert_eq!(err.to_string(), "Nylas API Error: Request failed with status 502");

        let err = api_error(CallError::Transport(String::new()));
        assert_eq!(err.to_string(), "Nylas API Error: Unknown error occurred");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_failure_record() {
        let record = OutputRecord::failure(&NylasError::operation("Body cannot be empty"));
        assert_eq!(record.json, json!({"error": "Body cannot be empty"}));
        assert_eq!(record.error(), Some("Body cannot be empty"));
        assert!(!OutputRecord::success(json!({"error": "x", "id": 1})).is_error());
    }
}
