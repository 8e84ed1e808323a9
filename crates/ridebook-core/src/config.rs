// ── Runtime connection configuration ──
//
// Describes how to reach the backend. Never touches disk: the CLI builds
// a `ClientConfig` from its profile and hands it in.

use std::sync::Arc;
use std::time::Duration;

use ridebook_api::{ApiClient, DEFAULT_LOGIN_PATH, TlsMode, TokenStore, TransportConfig};
use url::Url;

use crate::error::CoreError;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, e.g. `https://api.example.com/api`.
    pub base_url: Url,
    pub tls: TlsMode,
    pub timeout: Duration,
    /// Route announced to consumers when a 401 evicts the session.
    pub login_path: String,
    /// Keep a cookie jar alongside the bearer token.
    pub cookies: bool,
}

impl ClientConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
            cookies: true,
        }
    }

    pub fn transport(&self) -> TransportConfig {
        let transport = TransportConfig::default()
            .with_timeout(self.timeout)
            .with_tls(self.tls.clone());
        if self.cookies {
            transport
        } else {
            transport.without_cookies()
        }
    }

    /// Build the single client every store in a session shares.
    pub fn build_client(&self, tokens: Arc<dyn TokenStore>) -> Result<ApiClient, CoreError> {
        let client = ApiClient::new(self.base_url.as_str(), &self.transport(), tokens)?
            .with_login_path(self.login_path.clone());
        Ok(client)
    }
}
