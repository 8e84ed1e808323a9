//! Config subcommand handlers.

use std::fmt::Write as _;

use dialoguer::{Input, Select};
use secrecy::SecretString;

use ridebook_config::{TokenStorage, token_backend};
use ridebook_core::api::TokenStore;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display. Tokens never live in the config file, so
/// there is nothing to mask.
fn format_config(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let Some(p) = cfg.profiles.get(name) else {
            continue;
        };
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "api_url = \"{}\"", p.api_url);
        if let Some(ref login) = p.login_path {
            let _ = writeln!(out, "login_path = \"{login}\"");
        }
        if let Some(ref env) = p.token_env {
            let _ = writeln!(out, "token_env = \"{env}\"");
        }
        let storage = match p.token_storage {
            TokenStorage::Keyring => "keyring",
            TokenStorage::File => "file",
        };
        let _ = writeln!(out, "token_storage = \"{storage}\"");
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(cookies) = p.cookies {
            let _ = writeln!(out, "cookies = {cookies}");
        }
    }

    out
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn parse_flag<T: std::str::FromStr>(field: &str, value: &str, expected: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("must be {expected}"),
    })
}

fn profile_not_found(name: String, cfg: &Config) -> CliError {
    let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
    available.sort();
    CliError::ProfileNotFound {
        name,
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}

/// Apply `config set <key> <value>` to a profile.
fn set_value(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "api_url" | "api-url" => profile.api_url = value,
        "login_path" | "login-path" => profile.login_path = Some(value),
        "token_env" | "token-env" => profile.token_env = Some(value),
        "token_storage" | "token-storage" => {
            profile.token_storage = match value.as_str() {
                "keyring" => TokenStorage::Keyring,
                "file" => TokenStorage::File,
                _ => {
                    return Err(CliError::Validation {
                        field: "token_storage".into(),
                        reason: "must be 'keyring' or 'file'".into(),
                    });
                }
            };
        }
        "insecure" => profile.insecure = Some(parse_flag("insecure", &value, "'true' or 'false'")?),
        "cookies" => profile.cookies = Some(parse_flag("cookies", &value, "'true' or 'false'")?),
        "timeout" => {
            profile.timeout = Some(parse_flag("timeout", &value, "a number (seconds)")?);
        }
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: api_url, login_path, token_env, \
                     token_storage, insecure, timeout, ca_cert, cookies"
                ),
            });
        }
    }
    Ok(())
}

// ── Init wizard ─────────────────────────────────────────────────────

fn init_wizard() -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("ridebook configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let api_url: String = Input::new()
        .with_prompt("API URL")
        .default("https://localhost:3000/api".into())
        .interact_text()
        .map_err(prompt_err)?;

    let login_path: String = Input::new()
        .with_prompt("Login route")
        .default(ridebook_core::api::DEFAULT_LOGIN_PATH.into())
        .interact_text()
        .map_err(prompt_err)?;

    let storage_choices = &[
        "System keyring (recommended)",
        "Credentials file in the config directory",
    ];
    let storage = Select::new()
        .with_prompt("Where should the bearer token be stored?")
        .items(storage_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let mut profile = Profile::new(api_url);
    profile.token_storage = if storage == 0 {
        TokenStorage::Keyring
    } else {
        TokenStorage::File
    };
    if login_path != ridebook_core::api::DEFAULT_LOGIN_PATH {
        profile.login_path = Some(login_path);
    }

    // Validate before anything is written.
    let mut cfg = config::load_config_or_default();
    ridebook_config::profile_to_client_config(&profile, &cfg.defaults)?;

    let token = rpassword::prompt_password("Bearer token (leave empty to skip): ")
        .map_err(prompt_err)?;
    if !token.is_empty() {
        token_backend(&profile, &profile_name)
            .store(SecretString::from(token))
            .map_err(|e| CliError::Validation {
                field: "token".into(),
                reason: e.to_string(),
            })?;
        eprintln!("   Token stored");
    }

    cfg.profiles.insert(profile_name.clone(), profile);
    cfg.default_profile = Some(profile_name.clone());
    config::save_config(&cfg)?;

    eprintln!("\nConfiguration written to {}", config_path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: ridebook dashboard");
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init_wizard(),

        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = output::render_single(global.output, &cfg, format_config, |_| {
                "config".into()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            let profile = cfg
                .profiles
                .entry(profile_name.clone())
                .or_insert_with(|| Profile::new(String::new()));
            set_value(profile, &key, value)?;

            config::save_config(&cfg)?;
            eprintln!("Set {key} on profile '{profile_name}'");
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: ridebook config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                let lines: Vec<String> = names
                    .into_iter()
                    .map(|name| {
                        let marker = if name == default { " *" } else { "" };
                        format!("{name}{marker}")
                    })
                    .collect();
                output::print_output(&lines.join("\n"), global.quiet);
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(profile_not_found(name, &cfg));
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("Default profile set to '{name}'");
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), false);
            Ok(())
        }
    }
}
