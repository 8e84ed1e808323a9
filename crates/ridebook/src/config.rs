//! CLI configuration: a thin wrapper around `ridebook_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--api-url, --token, --insecure, --timeout).

use std::sync::Arc;

use secrecy::SecretString;

use ridebook_config::{ProfileTokenStore, profile_to_client_config, token_store};
use ridebook_core::Session;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use ridebook_config::{Config, Profile, config_path, load_config_or_default, save_config};

/// A connected session plus the token chain behind it.
pub struct Resolved {
    pub profile_name: String,
    pub session: Session,
    pub tokens: Arc<ProfileTokenStore>,
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Pick the profile to use, synthesizing one from `--api-url` when the
/// config has none.
pub fn resolve_profile(global: &GlobalOpts, config: &Config) -> Result<(String, Profile), CliError> {
    let name = active_profile_name(global, config);

    let mut profile = match (config.profiles.get(&name), &global.api_url) {
        (Some(profile), _) => profile.clone(),
        (None, Some(url)) => Profile::new(url.clone()),
        (None, None) if global.profile.is_some() => {
            let mut available: Vec<_> = config.profiles.keys().cloned().collect();
            available.sort();
            return Err(CliError::ProfileNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        (None, None) => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    // Flags win over the profile.
    if let Some(ref url) = global.api_url {
        profile.api_url.clone_from(url);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    Ok((name, profile))
}

/// Build a session for the active profile.
pub fn resolve_session(global: &GlobalOpts) -> Result<Resolved, CliError> {
    let config = load_config_or_default();
    let (profile_name, profile) = resolve_profile(global, &config)?;
    let client_config = profile_to_client_config(&profile, &config.defaults)?;

    let explicit = global.token.clone().map(SecretString::from);
    let tokens = token_store(&profile, &profile_name, explicit);
    let session = Session::connect(&client_config, tokens.clone())?;

    tracing::debug!(profile = %profile_name, api_url = %profile.api_url, "resolved session");
    Ok(Resolved {
        profile_name,
        session,
        tokens,
    })
}
