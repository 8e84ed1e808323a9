// ── Session facade ──
//
// The dependency-injection root: one `ApiClient` shared by every store it
// vends. Shutting the session down unmounts all of them.

use std::sync::Arc;

use ridebook_api::resources::dashboard_stats;
use ridebook_api::{ApiClient, FilterSet, Resource, ResourceApi, SessionState, TokenStore};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::ClientConfig;
use crate::error::CoreError;
use crate::store::{ResourceStore, StatsStore};

#[derive(Debug, Clone)]
pub struct Session {
    client: ApiClient,
    cancel: CancellationToken,
}

impl Session {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            cancel: CancellationToken::new(),
        }
    }

    pub fn connect(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, CoreError> {
        let client = config.build_client(tokens)?;
        info!(base_url = %client.base_url(), "session ready");
        Ok(Self::new(client))
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Stateless endpoint access for one-shot calls.
    pub fn api<R: Resource>(&self) -> ResourceApi<R> {
        ResourceApi::new(self.client.clone())
    }

    // ── Stores ───────────────────────────────────────────────────────

    /// A store for `R` with `filters`, not yet fetched. Mutations and
    /// exports refresh it on their own.
    pub fn attach<R: Resource>(&self, filters: FilterSet) -> ResourceStore<R> {
        ResourceStore::new(self.api::<R>(), filters, self.cancel.child_token())
    }

    /// A store for `R`, mounted and fetched with `filters`.
    pub async fn mount<R: Resource>(&self, filters: FilterSet) -> ResourceStore<R> {
        let store = self.attach::<R>(filters);
        store.refresh().await;
        store
    }

    /// Statistics store for `R`'s `/stats` endpoint.
    pub async fn mount_stats<R: Resource>(&self) -> StatsStore {
        let store = StatsStore::new(self.api::<R>().stats_endpoint(), self.cancel.child_token());
        store.refresh().await;
        store
    }

    pub async fn dashboard(&self) -> StatsStore {
        let store = StatsStore::new(dashboard_stats(self.client.clone()), self.cancel.child_token());
        store.refresh().await;
        store
    }

    // ── Session state ────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.client.session_state()
    }

    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.client.session()
    }

    /// Login route to send the user to, if a 401 evicted the session.
    pub fn login_required(&self) -> Option<String> {
        match self.state() {
            SessionState::LoginRequired { login_path } => Some(login_path),
            _ => None,
        }
    }

    /// Unmount every store vended by this session.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}
