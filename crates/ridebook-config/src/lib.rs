//! Shared configuration for the ridebook CLI.
//!
//! TOML profiles, bearer-token storage (env, keyring, credentials file),
//! and translation to `ridebook_core::ClientConfig`.

use std::collections::HashMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use ridebook_api::{TlsMode, TokenStore, TokenStoreError};
use ridebook_core::ClientConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Keyring service name; entries are `<profile>/auth-token`.
pub const KEYRING_SERVICE: &str = "ridebook";
/// Key of the token inside the credentials file.
pub const TOKEN_FILE_KEY: &str = "authToken";
/// Environment variable consulted when a profile names none.
pub const DEFAULT_TOKEN_ENV: &str = "RIDEBOOK_TOKEN";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile, falling back to `default_profile` then `"default"`.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, &Profile), ConfigError> {
        let name = name
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into());
        self.profiles
            .get(&name)
            .map(|p| (name.clone(), p))
            .ok_or(ConfigError::ProfileNotFound { name })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// Where a profile keeps its bearer token between runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStorage {
    #[default]
    Keyring,
    File,
}

/// A named backend profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// API root URL (e.g., "https://api.ridebook.example/api").
    pub api_url: String,

    /// Route announced when a 401 evicts the session.
    pub login_path: Option<String>,

    /// Environment variable holding a token that overrides storage.
    pub token_env: Option<String>,

    #[serde(default)]
    pub token_storage: TokenStorage,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,

    /// Keep a cookie jar for the session (default on).
    pub cookies: Option<bool>,
}

impl Profile {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            login_path: None,
            token_env: None,
            token_storage: TokenStorage::default(),
            ca_cert: None,
            insecure: None,
            timeout: None,
            cookies: None,
        }
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "ridebook", "ridebook")
}

/// Directory holding `config.toml` and `credentials.json`.
pub fn config_dir() -> PathBuf {
    project_dirs().map_or_else(dirs_fallback, |dirs| dirs.config_dir().to_path_buf())
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Default location of the file-backed token store.
pub fn credentials_path() -> PathBuf {
    config_dir().join("credentials.json")
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("ridebook");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Defaults, then the TOML file at `path`, then `RIDEBOOK_*` variables
/// (`__` separates nesting, e.g. `RIDEBOOK_DEFAULTS__TIMEOUT`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("RIDEBOOK_").split("__"));

    Ok(figment.extract()?)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profile → runtime config ────────────────────────────────────────

/// Build a `ClientConfig` from a profile and the global defaults.
pub fn profile_to_client_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<ClientConfig, ConfigError> {
    let url: url::Url = profile
        .api_url
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("invalid URL: {}", profile.api_url),
        })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("expected http or https, got '{}'", url.scheme()),
        });
    }

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    let mut config = ClientConfig::new(url);
    config.tls = tls;
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.cookies = profile.cookies.unwrap_or(true);
    if let Some(ref login_path) = profile.login_path {
        config.login_path.clone_from(login_path);
    }
    Ok(config)
}

// ── Token storage ───────────────────────────────────────────────────

/// Token kept in the OS keyring under `ridebook` / `<profile>/auth-token`.
#[derive(Debug, Clone)]
pub struct KeyringTokenStore {
    entry_name: String,
}

impl KeyringTokenStore {
    pub fn new(profile_name: &str) -> Self {
        Self {
            entry_name: format!("{profile_name}/auth-token"),
        }
    }

    fn entry(&self) -> Result<keyring::Entry, TokenStoreError> {
        keyring::Entry::new(KEYRING_SERVICE, &self.entry_name)
            .map_err(|e| TokenStoreError(e.to_string()))
    }
}

impl TokenStore for KeyringTokenStore {
    fn load(&self) -> Option<SecretString> {
        let secret = self.entry().ok()?.get_password().ok()?;
        Some(SecretString::from(secret))
    }

    fn store(&self, token: SecretString) -> Result<(), TokenStoreError> {
        self.entry()?
            .set_password(token.expose_secret())
            .map_err(|e| TokenStoreError(e.to_string()))
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(TokenStoreError(e.to_string())),
        }
    }
}

/// Token kept in a JSON file shared by all profiles, one object per
/// profile: `{"<profile>": {"authToken": "..."}}`.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
    profile_name: String,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>, profile_name: &str) -> Self {
        Self {
            path: path.into(),
            profile_name: profile_name.to_owned(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> serde_json::Map<String, serde_json::Value> {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    /// Replace the file through an owner-only (0600) staging file.
    fn write(&self, doc: &serde_json::Map<String, serde_json::Value>) -> Result<(), TokenStoreError> {
        let io_err = |e: std::io::Error| TokenStoreError(e.to_string());
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let raw = serde_json::to_vec_pretty(doc).map_err(|e| TokenStoreError(e.to_string()))?;

        let staging = self.path.with_extension("json.tmp");
        let mut file = private_file(&staging).map_err(io_err)?;
        file.write_all(&raw).and_then(|()| file.sync_all()).map_err(io_err)?;
        drop(file);
        std::fs::rename(&staging, &self.path).map_err(io_err)
    }
}

#[cfg(unix)]
fn private_file(path: &Path) -> std::io::Result<std::fs::File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
    let file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation; a leftover staging file keeps its bits.
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn private_file(path: &Path) -> std::io::Result<std::fs::File> {
    std::fs::File::create(path)
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<SecretString> {
        self.read()
            .get(&self.profile_name)
            .and_then(|entry| entry.get(TOKEN_FILE_KEY))
            .and_then(serde_json::Value::as_str)
            .filter(|t| !t.is_empty())
            .map(|t| SecretString::from(t.to_owned()))
    }

    fn store(&self, token: SecretString) -> Result<(), TokenStoreError> {
        let mut doc = self.read();
        let entry = doc
            .entry(self.profile_name.clone())
            .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
        if !entry.is_object() {
            *entry = serde_json::Value::Object(serde_json::Map::new());
        }
        if let serde_json::Value::Object(fields) = entry {
            fields.insert(
                TOKEN_FILE_KEY.into(),
                serde_json::Value::String(token.expose_secret().to_owned()),
            );
        }
        self.write(&doc)
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut doc = self.read();
        if doc.remove(&self.profile_name).is_none() {
            return Ok(());
        }
        self.write(&doc)
    }
}

/// A profile's token chain: an environment override, then persistent storage.
///
/// Clearing drops the override for the rest of the process as well as the
/// stored token.
pub struct ProfileTokenStore {
    env_override: RwLock<Option<SecretString>>,
    backend: Box<dyn TokenStore>,
}

impl ProfileTokenStore {
    pub fn new(env_override: Option<SecretString>, backend: Box<dyn TokenStore>) -> Self {
        Self {
            env_override: RwLock::new(env_override),
            backend,
        }
    }

    /// Whether the current token comes from the environment.
    pub fn is_env_override(&self) -> bool {
        self.env_override
            .read()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for ProfileTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileTokenStore")
            .field("env_override", &self.is_env_override())
            .finish_non_exhaustive()
    }
}

impl TokenStore for ProfileTokenStore {
    fn load(&self) -> Option<SecretString> {
        self.env_override
            .read()
            .ok()
            .and_then(|guard| guard.clone())
            .or_else(|| self.backend.load())
    }

    fn store(&self, token: SecretString) -> Result<(), TokenStoreError> {
        self.backend.store(token)
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        if let Ok(mut guard) = self.env_override.write() {
            *guard = None;
        }
        self.backend.clear()
    }
}

/// Persistent backend selected by the profile's `token_storage`.
pub fn token_backend(profile: &Profile, profile_name: &str) -> Box<dyn TokenStore> {
    match profile.token_storage {
        TokenStorage::Keyring => Box::new(KeyringTokenStore::new(profile_name)),
        TokenStorage::File => Box::new(FileTokenStore::new(credentials_path(), profile_name)),
    }
}

/// Token chain for a profile: an explicit override, then `token_env` (or
/// `RIDEBOOK_TOKEN`), then the configured backend.
pub fn token_store(
    profile: &Profile,
    profile_name: &str,
    explicit: Option<SecretString>,
) -> Arc<ProfileTokenStore> {
    let env_name = profile.token_env.as_deref().unwrap_or(DEFAULT_TOKEN_ENV);
    let env_override = explicit.or_else(|| {
        std::env::var(env_name)
            .ok()
            .filter(|t| !t.is_empty())
            .map(SecretString::from)
    });
    Arc::new(ProfileTokenStore::new(
        env_override,
        token_backend(profile, profile_name),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use ridebook_api::MemoryTokenStore;

    use super::*;

    #[test]
    fn profile_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = Config::default();
        let mut profile = Profile::new("https://api.ridebook.test/api");
        profile.token_storage = TokenStorage::File;
        profile.timeout = Some(5);
        cfg.profiles.insert("default".into(), profile);
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        let (name, profile) = loaded.profile(None).unwrap();
        assert_eq!(name, "default");
        assert_eq!(profile.api_url, "https://api.ridebook.test/api");
        assert_eq!(profile.token_storage, TokenStorage::File);
        assert_eq!(loaded.defaults.timeout, 30);
    }

    #[test]
    fn missing_profile_is_an_error() {
        let err = Config::default().profile(Some("staging")).unwrap_err();
        assert!(matches!(err, ConfigError::ProfileNotFound { ref name } if name == "staging"));
    }

    #[test]
    fn client_config_honours_profile_overrides() {
        let mut profile = Profile::new("https://api.ridebook.test");
        profile.login_path = Some("/admin/login".into());
        profile.insecure = Some(true);
        profile.timeout = Some(12);

        let cfg = profile_to_client_config(&profile, &Defaults::default()).unwrap();
        assert_eq!(cfg.login_path, "/admin/login");
        assert_eq!(cfg.timeout, Duration::from_secs(12));
        assert!(matches!(cfg.tls, TlsMode::DangerAcceptInvalid));
    }

    #[test]
    fn non_http_url_is_rejected() {
        let profile = Profile::new("ftp://files.ridebook.test");
        let err = profile_to_client_config(&profile, &Defaults::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn file_token_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested").join("credentials.json"), "default");
        assert!(store.load().is_none());

        store.store(SecretString::from("abc123")).unwrap();
        assert_eq!(store.load().unwrap().expose_secret(), "abc123");

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"authToken\""));

        store.clear().unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn file_token_store_keeps_profiles_apart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let prod = FileTokenStore::new(&path, "prod");
        let staging = FileTokenStore::new(&path, "staging");

        prod.store(SecretString::from("prod-token")).unwrap();
        staging.store(SecretString::from("staging-token")).unwrap();
        assert_eq!(prod.load().unwrap().expose_secret(), "prod-token");

        staging.clear().unwrap();
        assert!(staging.load().is_none());
        assert_eq!(prod.load().unwrap().expose_secret(), "prod-token");
        assert!(!dir.path().join("credentials.json.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn file_token_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        FileTokenStore::new(&path, "default")
            .store(SecretString::from("abc123"))
            .unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn env_override_wins_until_cleared() {
        let backend = MemoryTokenStore::with_token("stored");
        let store = ProfileTokenStore::new(Some(SecretString::from("from-env")), Box::new(backend));

        assert_eq!(store.load().unwrap().expose_secret(), "from-env");
        store.clear().unwrap();
        assert!(store.load().is_none());
        assert!(!store.is_env_override());
    }
}
