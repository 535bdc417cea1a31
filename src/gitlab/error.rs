use reqwest::StatusCode;
use thiserror::Error;

use super::schema::ValidationError;

#[derive(Debug, Error)]
pub enum GitLabError {
    /// Caller-supplied arguments did not match the expected shape.
    /// Raised before any request is sent.
    #[error("Invalid input: {0}")]
    InvalidInput(ValidationError),

    /// A successful response whose body is not a valid merge request.
    #[error("Invalid response from GitLab: {0}")]
    InvalidResponse(ValidationError),

    /// GitLab answered with a non-2xx status.
    #[error("GitLab API error: {status} {reason} - {detail}")]
    Api {
        status: u16,
        reason: String,
        detail: String,
    },

    /// No response was received (DNS, connection reset, timeout).
    #[error("GitLab API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to build GitLab client: {0}")]
    Client(String),
}

impl GitLabError {
    /// HTTP status of an API error. Every other kind has none.
    pub fn status(&self) -> Option<u16> {
        match self {
            GitLabError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Build the error for a non-2xx response.
///
/// The detail is the body's `message` field when there is one, the whole JSON
/// body serialized when there isn't, and the raw text when the body is not JSON.
/// All status codes map to the same variant.
pub fn api_error(status: StatusCode, body: &str) -> GitLabError {
    let detail = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => match json.get("message") {
            // GitLab sometimes nests validation errors: {"message": {"base": ["..."]}}
            Some(serde_json::Value::String(message)) => message.clone(),
            Some(serde_json::Value::Null) | None => json.to_string(),
            Some(message) => message.to_string(),
        },
        Err(_) => body.trim().to_string(),
    };

    GitLabError::Api {
        status: status.as_u16(),
        reason: status
            .canonical_reason()
            .unwrap_or("Unknown Status")
            .to_string(),
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_field_is_used() {
        let err = api_error(StatusCode::UNAUTHORIZED, r#"{"message":"401 Unauthorized"}"#);
        assert_eq!(
            err.to_string(),
            "GitLab API error: 401 Unauthorized - 401 Unauthorized"
        );
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn test_nested_message_is_serialized() {
        let err = api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"message":{"base":["Cannot approve"]}}"#,
        );
        assert_eq!(
            err.to_string(),
            r#"GitLab API error: 422 Unprocessable Entity - {"base":["Cannot approve"]}"#
        );
    }

    #[test]
    fn test_body_without_message_is_serialized() {
        let err = api_error(StatusCode::FORBIDDEN, r#"{"error":"insufficient_scope"}"#);
        assert_eq!(
            err.to_string(),
            r#"GitLab API error: 403 Forbidden - {"error":"insufficient_scope"}"#
        );
    }

    #[test]
    fn test_null_message_serializes_body() {
        let err = api_error(
            StatusCode::BAD_REQUEST,
            r#"{"message":null,"error":"bad request"}"#,
        );
        assert_eq!(
            err.to_string(),
            r#"GitLab API error: 400 Bad Request - {"error":"bad request","message":null}"#
        );
    }

    #[test]
    fn test_plain_text_body() {
        let err = api_error(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>\n");
        assert_eq!(
            err.to_string(),
            "GitLab API error: 502 Bad Gateway - <html>bad gateway</html>"
        );
    }

    #[test]
    fn test_unknown_status_reason() {
        let status = StatusCode::from_u16(599).unwrap();
        let err = api_error(status, "");
        assert!(err.to_string().starts_with("GitLab API error: 599 Unknown Status"));
        assert_eq!(err.status(), Some(599));
    }

    #[test]
    fn test_status_codes_share_one_variant() {
        for code in [400u16, 401, 404, 409, 422, 500, 503] {
            let status = StatusCode::from_u16(code).unwrap();
            let err = api_error(status, r#"{"message":"x"}"#);
            assert!(matches!(err, GitLabError::Api { .. }));
            let expected = format!("{} {}", code, status.canonical_reason().unwrap());
            assert!(err.to_string().contains(&expected));
        }
    }

    #[test]
    fn test_validation_errors_have_no_status() {
        let err = GitLabError::InvalidInput(ValidationError::single(
            Some("merge_request_iid"),
            "required",
        ));
        assert_eq!(err.status(), None);
    }
}
