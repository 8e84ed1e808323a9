//! Shared helpers for command handlers.

use std::io::{self, IsTerminal};
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde::de::DeserializeOwned;

use ridebook_core::Session;
use ridebook_core::api::query::keys;
use ridebook_core::api::{DateRange, FilterSet};

use crate::cli::FilterArgs;
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to ask on, the action is refused rather than
/// silently approved.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::NotConfirmed {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read and parse a JSON file for `--from-file` / `--data` flags.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: path.display().to_string(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Translate filter flags into a `FilterSet`.
pub fn filter_set(args: &FilterArgs) -> Result<FilterSet, CliError> {
    let mut filters = FilterSet::new();
    if let Some(ref search) = args.search {
        filters.set(keys::SEARCH, search.as_str());
    }
    if let Some(ref status) = args.status {
        filters.set(keys::STATUS, status.as_str());
    }
    if let Some(ref kind) = args.kind {
        filters.set(keys::TYPE, kind.as_str());
    }
    if let Some(period) = args.period {
        filters.set(keys::DATE_RANGE, DateRange::from(period));
    }
    for pair in &args.extra {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(CliError::Validation {
                field: "filter".into(),
                reason: format!("expected KEY=VALUE, got '{pair}'"),
            });
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(CliError::Validation {
                field: "filter".into(),
                reason: format!("empty key in '{pair}'"),
            });
        }
        filters.set(key, value);
    }
    Ok(filters)
}

/// Turn a failure message into an error, routing 401s to login.
pub fn failure(session: &Session, message: String) -> CliError {
    match session.login_required() {
        Some(login_path) => CliError::LoginRequired {
            message,
            login_path,
        },
        None => CliError::OperationFailed { message },
    }
}

/// Map a direct API error, carrying the profile's login route on 401.
pub fn api_failure(session: &Session, err: ridebook_core::api::Error) -> CliError {
    match CliError::from(ridebook_core::CoreError::from(err)) {
        CliError::LoginRequired { message, .. } => failure(session, message),
        other => other,
    }
}

/// Spinner on stderr for long-running calls. Hidden in quiet mode or
/// when stderr is not a terminal.
pub fn spinner(message: impl Into<String>, quiet: bool) -> ProgressBar {
    if quiet || !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
