use std::time::Duration;

use thiserror::Error;

/// Fallback used when the server gives no usable message for a failed request.
pub const GENERIC_FAILURE: &str = "Request failed";

/// Top-level error type for the `ridebook-api` crate.
///
/// Covers every failure mode of the REST surface: authentication,
/// transport, structured API errors, malformed bodies, and exports.
/// `ridebook-core` maps these into user-facing messages.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The server answered 401. Stored credentials have already been evicted
    /// by the time the caller sees this.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// The stored token cannot be sent as a header value.
    #[error("Invalid auth token: {0}")]
    InvalidToken(String),

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// Non-2xx response. `message` is taken from the body when the server
    /// provides one.
    #[error("API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        message: String,
        code: Option<String>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// A request body could not be serialized.
    #[error("Invalid request payload: {0}")]
    Payload(String),

    /// The export endpoint reported failure or returned an unusable payload.
    #[error("Export failed: {0}")]
    Export(String),

    // ── Resource configuration ──────────────────────────────────────
    /// Operation not declared for this resource.
    #[error("Unsupported operation: {operation} on {resource}")]
    UnsupportedOperation {
        resource: &'static str,
        operation: String,
    },
}

impl Error {
    /// Returns `true` if the server rejected our credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Returns `true` if this is a transient error a caller might retry.
    ///
    /// Nothing in this crate retries on its own.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }

    /// HTTP status, if the error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Extract the API error code, if available.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}
