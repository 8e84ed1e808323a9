// ── Core error types ──
//
// User-facing errors from ridebook-core. Stores never hand these to
// callers as `Err`; they are flattened into a message via
// [`CoreError::message`] and recorded in state or a `MutationOutcome`.

use std::time::Duration;

use ridebook_api::GENERIC_FAILURE;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the server: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Authentication required: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out{}", timed_out_after(*.timeout))]
    Timeout { timeout: Option<Duration> },

    // ── Server answers ───────────────────────────────────────────────
    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    Api {
        message: String,
        code: Option<String>,
        status: Option<u16>,
    },

    #[error("Export failed: {message}")]
    Export { message: String },

    // ── Local failures ───────────────────────────────────────────────
    #[error("{operation} is not available for {resource}")]
    Unsupported {
        resource: &'static str,
        operation: String,
    },

    #[error("Could not save download: {message}")]
    Download { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Suffix naming the elapsed timeout, empty when it is unknown.
pub fn timed_out_after(timeout: Option<Duration>) -> String {
    timeout.map(|t| format!(" after {t:?}")).unwrap_or_default()
}

impl CoreError {
    /// Non-empty message suitable for showing to a user.
    pub fn message(&self) -> String {
        let text = self.to_string();
        if text.trim().is_empty() {
            GENERIC_FAILURE.to_owned()
        } else {
            text
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<ridebook_api::Error> for CoreError {
    fn from(err: ridebook_api::Error) -> Self {
        use ridebook_api::Error as Api;

        match err {
            Api::Unauthorized { message } => CoreError::AuthenticationFailed { message },
            Api::InvalidToken(reason) => CoreError::AuthenticationFailed {
                message: format!("stored token is unusable ({reason})"),
            },
            Api::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout: None }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        reason: "network error, check your connection".into(),
                    }
                } else {
                    CoreError::ConnectionFailed {
                        reason: e.to_string(),
                    }
                }
            }
            Api::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid URL: {e}"),
            },
            Api::Timeout { timeout } => CoreError::Timeout {
                timeout: Some(timeout),
            },
            Api::Tls(reason) => CoreError::ConnectionFailed {
                reason: format!("TLS error: {reason}"),
            },
            Api::Api {
                status: 404,
                message,
                ..
            } => CoreError::NotFound { message },
            Api::Api {
                status,
                message,
                code,
            } => CoreError::Api {
                message,
                code,
                status: Some(status),
            },
            Api::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("unexpected response from server: {message}"))
            }
            Api::Payload(message) => CoreError::Internal(format!("invalid request: {message}")),
            Api::Export(message) => CoreError::Export { message },
            Api::UnsupportedOperation {
                resource,
                operation,
            } => CoreError::Unsupported {
                resource,
                operation,
            },
        }
    }
}
