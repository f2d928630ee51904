//! Error handling for the digital address client

use reqwest::StatusCode;
use std::fmt;
use thiserror::Error;

/// Unified error type for the digital address client
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP errors that are not transport failures (e.g. body decoding)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// 400: the server rejected the payload
    #[error("Validation error: {0}")]
    Validation(String),

    /// 401: wrong credentials, wrong PIN or no active consent
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 404: the resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// 5xx responses
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Any other non-success status
    #[error("Request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    /// The request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    /// Input rejected before any request was sent
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Geolocation could not be acquired
    #[error("Geolocation error: {0}")]
    Geolocation(#[from] crate::geolocation::LocationError),

    /// Persisted token storage failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// A bearer token is required but none is present
    #[error("Not logged in")]
    NotLoggedIn,

    /// The profile lookup was rejected with 401
    #[error("Authentication expired")]
    SessionExpired,

    /// Aadhaar verification is a one-time call
    #[error("Aadhaar already verified")]
    AlreadyVerified,

    /// Address creation is gated on a verified Aadhaar
    #[error("Aadhaar verification required")]
    AadhaarRequired,

    /// The same kind of submission is already running
    #[error("A {0} request is already in progress")]
    Busy(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new input error
    pub fn invalid_input<T: fmt::Display>(msg: T) -> Self {
        Error::InvalidInput(msg.to_string())
    }

    /// Create a new storage error
    pub fn storage<T: fmt::Display>(msg: T) -> Self {
        Error::Storage(msg.to_string())
    }

    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// Classify a non-success response by status code.
    ///
    /// The server's message is kept as-is and may be empty; callers that
    /// know the operation substitute their own text.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = extract_message(body);
        match status {
            StatusCode::BAD_REQUEST => Error::Validation(message),
            StatusCode::UNAUTHORIZED => Error::Unauthorized(message),
            StatusCode::NOT_FOUND => Error::NotFound(message),
            s if s.is_server_error() => Error::Server {
                status: s.as_u16(),
                message,
            },
            s => Error::Api {
                status: s.as_u16(),
                message,
            },
        }
    }

    /// Fills an empty 401/400 message with operation specific text.
    pub(crate) fn or_message(self, unauthorized: &str, validation: &str) -> Self {
        match self {
            Error::Unauthorized(m) if m.is_empty() => Error::Unauthorized(unauthorized.to_string()),
            Error::Validation(m) if m.is_empty() => Error::Validation(validation.to_string()),
            other => other,
        }
    }

    /// Status code of the failed response, if the error came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Validation(_) => Some(400),
            Error::Unauthorized(_) | Error::SessionExpired => Some(401),
            Error::NotFound(_) => Some(404),
            Error::Server { status, .. } | Error::Api { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the error means the caller must log in again.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Error::Unauthorized(_) | Error::SessionExpired | Error::NotLoggedIn
        )
    }

    /// Short text suitable for showing to the end user.
    pub fn user_message(&self) -> String {
        let or = |m: &str, fallback: &str| {
            if m.is_empty() {
                fallback.to_string()
            } else {
                m.to_string()
            }
        };
        match self {
            Error::Validation(m) => or(m, "Invalid request"),
            Error::Unauthorized(m) => or(m, "Unauthorized"),
            Error::NotFound(m) => or(m, "Not found"),
            Error::InvalidInput(m) => m.clone(),
            Error::Api { message, .. } => or(message, "Request failed"),
            Error::Server { .. } => "Server error. Please try again later".to_string(),
            Error::Network(_) => "Network error. Please check your connection".to_string(),
            Error::Geolocation(e) => e.to_string(),
            Error::SessionExpired => "Session expired. Please login again.".to_string(),
            Error::NotLoggedIn => "Please login to continue".to_string(),
            Error::AlreadyVerified => "Already verified".to_string(),
            Error::AadhaarRequired => "Please verify your Aadhaar to continue".to_string(),
            other => other.to_string(),
        }
    }

    /// Maps a transport-level reqwest failure.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            Error::Network(err.to_string())
        } else {
            Error::Http(err)
        }
    }
}

/// Pulls a human readable message out of an error body.
///
/// The backend answers either with a bare string, a JSON string, or an
/// object carrying `message` or `error`.
fn extract_message(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::String(s)) => s,
        Ok(serde_json::Value::Object(map)) => ["message", "error"]
            .iter()
            .find_map(|k| map.get(*k).and_then(|v| v.as_str()))
            .map(str::to_string)
            .unwrap_or_else(|| trimmed.to_string()),
        _ => trimmed.to_string(),
    }
}
