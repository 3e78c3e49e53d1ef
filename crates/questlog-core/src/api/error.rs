use thiserror::Error;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("No credentials found - please log in")]
    NoCredential,

    #[error("Login failed. Check your credentials.")]
    InvalidCredentials,

    #[error("Registration failed. Username might be taken.")]
    UsernameTaken,

    /// The session was rejected; the credential has already been cleared.
    #[error("AUTH_ERROR: session expired (status {status})")]
    SessionExpired { status: u16 },

    #[error("Quest already completed")]
    QuestAlreadyCompleted,

    #[error("Failed to {operation} (status {status}): {body}")]
    Request {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to persist session: {0}")]
    Storage(#[source] anyhow::Error),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Phrase the server uses when a quest was finished elsewhere first.
const ALREADY_COMPLETED_MARKER: &str = "already completed";

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..end],
                body.len()
            )
        }
    }

    /// Generic failure of a named operation.
    pub fn from_status(operation: &str, status: reqwest::StatusCode, body: &str) -> Self {
        ApiError::Request {
            operation: operation.to_string(),
            status: status.as_u16(),
            body: Self::truncate_body(body),
        }
    }

    /// Whether an error body reports that the quest was already completed.
    pub fn reports_already_completed(body: &str) -> bool {
        body.to_lowercase().contains(ALREADY_COMPLETED_MARKER)
    }

    /// The distinguished session-expiry kind. Callers seeing this should not
    /// attempt recovery; the application shell handles re-authentication.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, ApiError::SessionExpired { .. } | ApiError::NoCredential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_names_operation() {
        let err = ApiError::from_status("create quest", StatusCode::BAD_REQUEST, "title required");
        assert_eq!(
            err.to_string(),
            "Failed to create quest (status 400): title required"
        );
    }

    #[test]
    fn test_long_bodies_are_truncated() {
        let body = "x".repeat(2000);
        match ApiError::from_status("fetch quests", StatusCode::BAD_GATEWAY, &body) {
            ApiError::Request { body, .. } => {
                assert!(body.starts_with(&"x".repeat(500)));
                assert!(body.ends_with("(truncated, 2000 total bytes)"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let body = "é".repeat(400); // 800 bytes
        let truncated = ApiError::truncate_body(&body);
        assert!(truncated.contains("(truncated, 800 total bytes)"));
    }

    #[test]
    fn test_reports_already_completed() {
        assert!(ApiError::reports_already_completed(
            r#"{"status":500,"message":"Quest already completed"}"#
        ));
        assert!(ApiError::reports_already_completed("QUEST ALREADY COMPLETED"));
        assert!(!ApiError::reports_already_completed("Quest not found"));
    }

    #[test]
    fn test_transport_failures_surface_as_network() {
        let source = reqwest::Client::new().get("not a url").build().unwrap_err();
        let err = ApiError::from(source);
        assert!(matches!(err, ApiError::Network(_)));
        assert!(!err.is_auth_error());
    }

    #[test]
    fn test_auth_error_kinds() {
        assert!(ApiError::SessionExpired { status: 401 }.is_auth_error());
        assert!(ApiError::NoCredential.is_auth_error());
        assert!(!ApiError::QuestAlreadyCompleted.is_auth_error());
        assert!(!ApiError::InvalidCredentials.is_auth_error());
    }
}
