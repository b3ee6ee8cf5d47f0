use serde::{Deserialize, Serialize};

/// Fallback shown when the backend does not explain a failed request.
pub const GENERIC_FAILURE_MESSAGE: &str = "request failed";

/// Error body returned by the planner backend.
///
/// Security failures carry all four fields; controller-level failures
/// usually carry only `error` or only `message`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Short error label (e.g. `"Unauthorized"` or `"Invalid credentials"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Longer human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// HTTP status echoed by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Servlet path that failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ErrorResponse {
    /// Creates an error response carrying only an `error` label.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Creates an error response with a label and a message.
    pub fn with_message(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// The message a user should see: `error`, then `message`, ignoring blanks.
    #[must_use]
    pub fn best_message(&self) -> Option<&str> {
        [self.error.as_deref(), self.message.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|value| !value.is_empty())
    }

    /// Extracts a user-facing message from a raw response body.
    ///
    /// JSON bodies are searched for `error` then `message`; short plain-text
    /// bodies are used verbatim; anything else yields
    /// [`GENERIC_FAILURE_MESSAGE`].
    #[must_use]
    pub fn message_from_body(body: &str) -> String {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return GENERIC_FAILURE_MESSAGE.to_string();
        }

        if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(trimmed) {
            if let Some(message) = parsed.best_message() {
                return message.to_string();
            }
            return GENERIC_FAILURE_MESSAGE.to_string();
        }

        if trimmed.starts_with('{') || trimmed.starts_with('<') || trimmed.len() > 200 {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            trimmed.to_string()
        }
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.best_message().unwrap_or(GENERIC_FAILURE_MESSAGE))
    }
}

impl std::error::Error for ErrorResponse {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_message_prefers_error_field() {
        let error = ErrorResponse::with_message("Invalid credentials", "Authentication failed");
        assert_eq!(error.best_message(), Some("Invalid credentials"));
    }

    #[test]
    fn test_best_message_skips_blank_error() {
        let error = ErrorResponse {
            error: Some("  ".to_string()),
            message: Some("Trip not found".to_string()),
            ..ErrorResponse::default()
        };
        assert_eq!(error.best_message(), Some("Trip not found"));
    }

    #[test]
    fn test_security_body_deserialization() {
        let json = r#"{"status":401,"error":"Unauthorized","message":"Authentication failed: Bad credentials","path":"/api/trips/user/7"}"#;
        let error: ErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(error.status, Some(401));
        assert_eq!(error.path.as_deref(), Some("/api/trips/user/7"));
        assert_eq!(error.to_string(), "Unauthorized");
    }

    #[test]
    fn test_message_from_json_body() {
        assert_eq!(
            ErrorResponse::message_from_body(r#"{"message":"Destination is required"}"#),
            "Destination is required"
        );
    }

    #[test]
    fn test_message_from_plain_text_body() {
        assert_eq!(
            ErrorResponse::message_from_body("Email already exists"),
            "Email already exists"
        );
    }

    #[test]
    fn test_message_from_unhelpful_bodies() {
        assert_eq!(ErrorResponse::message_from_body(""), GENERIC_FAILURE_MESSAGE);
        assert_eq!(ErrorResponse::message_from_body("{}"), GENERIC_FAILURE_MESSAGE);
        assert_eq!(
            ErrorResponse::message_from_body("<html><body>Whitelabel Error Page</body></html>"),
            GENERIC_FAILURE_MESSAGE
        );
    }

    #[test]
    fn test_serialization_skips_missing_fields() {
        let json = serde_json::to_string(&ErrorResponse::new("Forbidden")).unwrap();
        assert_eq!(json, r#"{"error":"Forbidden"}"#);
    }
}
