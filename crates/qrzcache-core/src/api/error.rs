use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized - check QRZ credentials")]
    Unauthorized,

    #[error("Endpoint not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The login exchange answered without a session key. Carries the raw
    /// body so the caller can show what the service said.
    #[error("QRZ did not return a session key. Response was:\n{body}")]
    MissingKey { body: String },

    #[error("QRZ session expired mid-query ({message}). Run the lookup again.")]
    SessionExpired { message: String },

    #[error("QRZ error: {0}")]
    Service(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error texts QRZ uses when a session key is no longer accepted.
const SESSION_MARKERS: [&str; 2] = ["invalid session key", "session timeout"];

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
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// Classify the text of an `<Error>` element from a lookup response.
    pub fn from_service_message(message: &str) -> Self {
        if is_session_message(message) {
            ApiError::SessionExpired {
                message: message.to_string(),
            }
        } else {
            ApiError::Service(message.to_string())
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired { .. })
    }
}

/// True when a service error message says the session key was rejected.
pub fn is_session_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    SESSION_MARKERS.iter().any(|marker| lower.contains(marker))
}
