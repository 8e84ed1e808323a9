//! Auth subcommand handlers: the bearer token for the active profile.

use secrecy::SecretString;
use serde::Serialize;

use ridebook_core::api::TokenStore;

use crate::cli::{AuthArgs, AuthCommand, GlobalOpts};
use crate::config::Resolved;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthStatus {
    profile: String,
    api_url: String,
    source: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    valid: Option<bool>,
}

fn format_status(s: &AuthStatus) -> String {
    let mut lines = vec![
        format!("Profile: {}", s.profile),
        format!("API URL: {}", s.api_url),
        format!("  Token: {}", s.source),
    ];
    if let Some(valid) = s.valid {
        lines.push(format!("  Valid: {}", if valid { "yes" } else { "no" }));
    }
    lines.join("\n")
}

pub async fn handle(
    args: AuthArgs,
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(global.color);
    let client = resolved.session.client();

    match args.command {
        AuthCommand::SetToken { token } => {
            let token = match token {
                Some(t) => t,
                None => rpassword::prompt_password("Bearer token: ").map_err(CliError::Io)?,
            };
            let token = token.trim();
            if token.is_empty() {
                return Err(CliError::Validation {
                    field: "token".into(),
                    reason: "token cannot be empty".into(),
                });
            }
            client
                .set_token(SecretString::from(token.to_owned()))
                .map_err(|e| util::api_failure(&resolved.session, e))?;
            output::notice(
                &format!("Token stored for profile '{}'", resolved.profile_name),
                color,
                global.quiet,
            );
            Ok(())
        }

        AuthCommand::Logout => {
            client
                .logout()
                .map_err(|e| util::api_failure(&resolved.session, e))?;
            output::notice(
                &format!("Logged out of profile '{}'", resolved.profile_name),
                color,
                global.quiet,
            );
            Ok(())
        }

        AuthCommand::Status { check } => {
            let source = if resolved.tokens.is_env_override() {
                "from --token / environment"
            } else if resolved.tokens.load().is_some() {
                "stored"
            } else {
                "none"
            };

            let valid = if check {
                let store = resolved.session.dashboard().await;
                let state = store.snapshot();
                match (&state.error, resolved.session.login_required()) {
                    (_, Some(_)) => Some(false),
                    (Some(message), None) => {
                        return Err(util::failure(&resolved.session, message.clone()));
                    }
                    (None, None) => Some(true),
                }
            } else {
                None
            };

            let status = AuthStatus {
                profile: resolved.profile_name.clone(),
                api_url: client.base_url().to_string(),
                source,
                valid,
            };
            let out = output::render_single(global.output, &status, format_status, |s| {
                s.source.to_owned()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
