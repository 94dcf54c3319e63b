use serde::{Deserialize, Serialize};

/// Outcome of a use case operation
pub type UseCaseResult<T> = Result<T, UseCaseError>;

/// Error surfaced by any client-side operation.
///
/// `code` groups failures the way the UI reacts to them: validation errors are
/// shown before any request leaves the browser, transport and server errors are
/// reported verbatim and re-enable the control that issued the call, stream
/// errors are logged and skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseCaseError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl UseCaseError {
    pub const VALIDATION: &'static str = "VALIDATION_ERROR";
    pub const TRANSPORT: &'static str = "TRANSPORT_ERROR";
    pub const STREAM: &'static str = "STREAM_ERROR";
    pub const SERVER: &'static str = "SERVER_ERROR";
    pub const INVALID_TRANSITION: &'static str = "INVALID_TRANSITION";
    pub const INTERNAL: &'static str = "INTERNAL_ERROR";

    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(Self::VALIDATION, message)
    }

    /// Fetch rejected or answered with a non-2xx status.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(Self::TRANSPORT, message)
    }

    pub fn stream(message: impl Into<String>) -> Self {
        Self::new(Self::STREAM, message)
    }

    /// Application error reported by the backend (`error` event or `detail` body).
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(Self::SERVER, message)
    }

    pub fn invalid_transition(message: impl Into<String>) -> Self {
        Self::new(Self::INVALID_TRANSITION, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Self::INTERNAL, message)
    }

    /// Builds a transport error from an HTTP status and the raw response body,
    /// preferring the backend's `detail`/`message` field when the body is JSON.
    pub fn from_http(status: u16, body: &str) -> Self {
        match error_detail(body) {
            Some(detail) => Self::server(detail).with_details(format!("HTTP {status}")),
            None if body.trim().is_empty() => Self::transport(format!("HTTP {status}")),
            None => Self::transport(format!("HTTP {status}: {}", body.trim())),
        }
    }

    pub fn is_validation(&self) -> bool {
        self.code == Self::VALIDATION
    }

    /// Message shown to the user, without the code prefix.
    pub fn user_message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for UseCaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(details) = &self.details {
            write!(f, ": {}", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for UseCaseError {}

impl From<anyhow::Error> for UseCaseError {
    fn from(err: anyhow::Error) -> Self {
        UseCaseError::internal(err.to_string())
    }
}

impl From<serde_json::Error> for UseCaseError {
    fn from(err: serde_json::Error) -> Self {
        UseCaseError::stream(err.to_string())
    }
}

/// Extracts `detail` or `message` from a JSON error body.
pub fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["detail", "message", "error"].iter().find_map(|key| match value.get(*key) {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(v) if !v.is_null() && !v.is_string() => Some(v.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_http_prefers_detail() {
        let err = UseCaseError::from_http(422, r#"{"detail": "Código inválido"}"#);
        assert_eq!(err.code, UseCaseError::SERVER);
        assert_eq!(err.user_message(), "Código inválido");
        assert_eq!(err.details.as_deref(), Some("HTTP 422"));
    }

    #[test]
    fn test_from_http_plain_body() {
        let err = UseCaseError::from_http(500, "boom");
        assert_eq!(err.code, UseCaseError::TRANSPORT);
        assert_eq!(err.message, "HTTP 500: boom");

        let empty = UseCaseError::from_http(502, "");
        assert_eq!(empty.message, "HTTP 502");
    }

    #[test]
    fn test_display_includes_code() {
        let err = UseCaseError::validation("Digite um código").with_details("campo vazio");
        assert_eq!(err.to_string(), "[VALIDATION_ERROR] Digite um código: campo vazio");
        assert!(err.is_validation());
    }
}
