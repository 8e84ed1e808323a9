// REST client for the back-office API.
//
// Single dispatch point for every resource module: URL construction,
// bearer-token injection, status handling, and 401 credential eviction.
// Resource-specific paths live in `resource.rs`.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, trace, warn};
use url::Url;

use crate::auth::{DEFAULT_LOGIN_PATH, SessionState, TokenStore};
use crate::error::{Error, GENERIC_FAILURE};
use crate::query::FilterSet;
use crate::transport::TransportConfig;

/// Error body shapes the backend is known to send.
#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<ErrorDetail>>,
    #[serde(default)]
    code: Option<Value>,
}

#[derive(serde::Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
}

impl ErrorResponse {
    /// First non-empty human-readable message in the body.
    fn message(&self) -> Option<String> {
        let from_error = match &self.error {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Object(obj)) => obj
                .get("message")
                .and_then(Value::as_str)
                .map(String::from),
            _ => None,
        };
        let from_errors = self.errors.as_ref().and_then(|errs| {
            errs.iter()
                .find_map(|e| e.message.clone().or_else(|| e.msg.clone()))
        });

        self.message
            .clone()
            .into_iter()
            .chain(from_error)
            .chain(from_errors)
            .find(|m| !m.trim().is_empty())
    }

    fn code(&self) -> Option<String> {
        match &self.code {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Async client for the back-office REST API.
///
/// Cheap to clone; clones share the connection pool, token store, and
/// session channel. Construct one per backend and hand it to every
/// resource module.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: Arc<dyn TokenStore>,
    session: Arc<watch::Sender<SessionState>>,
    login_path: Arc<str>,
    timeout: Duration,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client from a base URL, transport config, and token store.
    pub fn new(
        base_url: &str,
        transport: &TransportConfig,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let mut client = Self::with_client(http, base_url, tokens)?;
        client.timeout = transport.timeout;
        Ok(client)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        let initial = if tokens.load().is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        };
        let (session, _) = watch::channel(initial);

        Ok(Self {
            http,
            base_url,
            tokens,
            session: Arc::new(session),
            login_path: Arc::from(DEFAULT_LOGIN_PATH),
            timeout: TransportConfig::default().timeout,
        })
    }

    /// Route published in [`SessionState::LoginRequired`] after a 401.
    #[must_use]
    pub fn with_login_path(mut self, login_path: impl Into<String>) -> Self {
        self.login_path = Arc::from(login_path.into());
        self
    }

    /// Ensure the base path ends with `/` so relative joins append.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Subscribe to session changes (login required, authenticated).
    pub fn session(&self) -> watch::Receiver<SessionState> {
        self.session.subscribe()
    }

    pub fn session_state(&self) -> SessionState {
        self.session.borrow().clone()
    }

    // ── Credentials ──────────────────────────────────────────────────

    /// Persist a bearer token obtained elsewhere.
    pub fn set_token(&self, token: SecretString) -> Result<(), Error> {
        self.tokens
            .store(token)
            .map_err(|e| Error::InvalidToken(e.to_string()))?;
        self.session.send_replace(SessionState::Authenticated);
        Ok(())
    }

    /// Forget the stored token without sending anyone to the login route.
    pub fn logout(&self) -> Result<(), Error> {
        self.tokens
            .clear()
            .map_err(|e| Error::InvalidToken(e.to_string()))?;
        self.session.send_replace(SessionState::Anonymous);
        Ok(())
    }

    /// Clear credentials after a 401 and tell subscribers to route to login.
    fn evict_credentials(&self) {
        warn!(login_path = %self.login_path, "unauthorized response, evicting stored credentials");
        if let Err(e) = self.tokens.clear() {
            warn!(error = %e, "failed to clear stored token");
        }
        self.session.send_replace(SessionState::LoginRequired {
            login_path: self.login_path.to_string(),
        });
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a resource path (`"/payouts/42"` or `"payouts/42"`) onto the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    /// Send one request and return the response if it is 2xx.
    ///
    /// Attaches the bearer token when one is stored. A 401 evicts stored
    /// credentials before the error is returned. Nothing is retried.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: Option<&FilterSet>,
        body: Option<&Value>,
    ) -> Result<reqwest::Response, Error> {
        let url = self.url(path)?;
        let pairs = query.map(FilterSet::query_pairs).unwrap_or_default();
        debug!("{method} {url} params={pairs:?}");

        let mut builder = self.http.request(method, url);
        if !pairs.is_empty() {
            builder = builder.query(&pairs);
        }
        if let Some(token) = self.tokens.load() {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| Error::InvalidToken(e.to_string()))?;
            value.set_sensitive(true);
            builder = builder.header(AUTHORIZATION, value);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(|e| self.map_transport(e))?;
        let status = resp.status();
        trace!(%status, "response received");

        if status == reqwest::StatusCode::UNAUTHORIZED {
            let raw = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&raw)
                .ok()
                .and_then(|e| e.message())
                .unwrap_or_else(|| "session expired or invalid credentials".into());
            self.evict_credentials();
            return Err(Error::Unauthorized { message });
        }

        if !status.is_success() {
            return Err(Self::parse_error(status, resp).await);
        }

        Ok(resp)
    }

    fn map_transport(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout: self.timeout,
            }
        } else {
            Error::Transport(err)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();
        let parsed = serde_json::from_str::<ErrorResponse>(&raw).ok();

        let message = parsed
            .as_ref()
            .and_then(ErrorResponse::message)
            .unwrap_or_else(|| format!("{GENERIC_FAILURE} with status {}", status.as_u16()));

        Error::Api {
            status: status.as_u16(),
            message,
            code: parsed.as_ref().and_then(ErrorResponse::code),
        }
    }

    // ── Typed helpers ────────────────────────────────────────────────

    pub(crate) async fn get_text(
        &self,
        path: &str,
        query: Option<&FilterSet>,
    ) -> Result<String, Error> {
        let resp = self.request(Method::GET, path, query, None).await?;
        resp.text().await.map_err(|e| self.map_transport(e))
    }

    pub(crate) async fn send_text<B: Serialize + Sync + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<String, Error> {
        let payload = body.map(to_payload).transpose()?;
        let resp = self.request(method, path, None, payload.as_ref()).await?;
        resp.text().await.map_err(|e| self.map_transport(e))
    }

    pub(crate) async fn send_empty<B: Serialize + Sync + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), Error> {
        let payload = body.map(to_payload).transpose()?;
        self.request(method, path, None, payload.as_ref()).await?;
        Ok(())
    }
}

fn to_payload<B: Serialize + ?Sized>(body: &B) -> Result<Value, Error> {
    serde_json::to_value(body).map_err(|e| Error::Payload(e.to_string()))
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("login_path", &self.login_path)
            .field("session", &*self.session.borrow())
            .finish_non_exhaustive()
    }
}
