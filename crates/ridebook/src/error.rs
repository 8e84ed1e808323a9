//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a stable exit code.

use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;

use ridebook_config::ConfigError;
use ridebook_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const UNSUPPORTED: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the API: {reason}")]
    #[diagnostic(
        code(ridebook::connection_failed),
        help(
            "Check that the API is running and the URL is right.\n\
             Self-signed certificate? Try --insecure (-k) or set ca_cert in your profile."
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Request timed out{}", ridebook_core::error::timed_out_after(*.timeout))]
    #[diagnostic(
        code(ridebook::timeout),
        help("Increase the timeout with --timeout or check server responsiveness.")
    )]
    Timeout { timeout: Option<Duration> },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Login required: {message}")]
    #[diagnostic(
        code(ridebook::login_required),
        help(
            "The stored token was rejected and has been removed.\n\
             Sign in again at {login_path}, then run: ridebook auth set-token"
        )
    )]
    LoginRequired { message: String, login_path: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(ridebook::not_found),
        help("Check the ID with the resource's `list` command.")
    )]
    NotFound { message: String },

    #[error("{operation} is not available for {resource}")]
    #[diagnostic(
        code(ridebook::unsupported),
        help("Run: ridebook {resource} --help to see what this resource supports")
    )]
    Unsupported { resource: String, operation: String },

    #[error("{message}")]
    #[diagnostic(code(ridebook::operation_failed))]
    OperationFailed { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(ridebook::validation))]
    Validation { field: String, reason: String },

    #[error("Operation '{action}' requires confirmation")]
    #[diagnostic(
        code(ridebook::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NotConfirmed { action: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(ridebook::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: ridebook config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No API URL configured")]
    #[diagnostic(
        code(ridebook::no_config),
        help(
            "Create a profile with: ridebook config init\n\
             Or pass --api-url / set RIDEBOOK_API_URL.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(ridebook::config))]
    Config(Box<ConfigError>),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(ridebook::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::LoginRequired { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Unsupported { .. } => exit_code::UNSUPPORTED,
            Self::Validation { .. } | Self::NotConfirmed { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(Box::new(other)),
        }
    }
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(ConfigError::from(err)))
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { reason } => Self::ConnectionFailed { reason },
            CoreError::Timeout { timeout } => Self::Timeout { timeout },
            CoreError::AuthenticationFailed { message } => Self::LoginRequired {
                message,
                login_path: ridebook_api::DEFAULT_LOGIN_PATH.into(),
            },
            CoreError::NotFound { message } => Self::NotFound { message },
            CoreError::Unsupported {
                resource,
                operation,
            } => Self::Unsupported {
                resource: resource.into(),
                operation,
            },
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
            other => Self::OperationFailed {
                message: other.message(),
            },
        }
    }
}
