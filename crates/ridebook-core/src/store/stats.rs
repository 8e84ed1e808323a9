// ── Statistics store ──
//
// Same lifecycle as `ResourceStore`, but the state is one opaque stats
// object fetched without filters.

use std::sync::Arc;

use ridebook_api::StatsEndpoint;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::Slot;
use super::state::StatsState;
use crate::error::CoreError;
use crate::stream::StateStream;

struct Inner {
    endpoint: StatsEndpoint,
    slot: Slot<StatsState>,
}

#[derive(Clone)]
pub struct StatsStore {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for StatsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsStore")
            .field("name", &self.inner.endpoint.name())
            .field("path", &self.inner.endpoint.path())
            .finish_non_exhaustive()
    }
}

impl StatsStore {
    pub fn new(endpoint: StatsEndpoint, cancel: CancellationToken) -> Self {
        Self {
            inner: Arc::new(Inner {
                endpoint,
                slot: Slot::new(StatsState::default(), cancel),
            }),
        }
    }

    /// Create the store and fetch once.
    pub async fn mount(endpoint: StatsEndpoint) -> Self {
        let store = Self::new(endpoint, CancellationToken::new());
        store.refresh().await;
        store
    }

    pub fn snapshot(&self) -> Arc<StatsState> {
        self.inner.slot.snapshot()
    }

    pub fn subscribe(&self) -> StateStream<StatsState> {
        self.inner.slot.subscribe()
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.slot.is_mounted()
    }

    pub fn unmount(&self) {
        self.inner.slot.unmount();
    }

    pub async fn refresh(&self) -> Arc<StatsState> {
        let slot = &self.inner.slot;
        let name = self.inner.endpoint.name();

        let Some(generation) = slot.begin(|state| state.loading = true) else {
            return slot.snapshot();
        };
        let Some(result) = slot.guard(self.inner.endpoint.fetch()).await else {
            return slot.snapshot();
        };

        let applied = match result {
            Ok(stats) => slot.settle(generation, |state| {
                state.data = Some(stats);
                state.error = None;
                state.loading = false;
            }),
            Err(e) => {
                let message = CoreError::from(e).message();
                warn!(stats = name, error = %message, "statistics fetch failed");
                slot.settle(generation, |state| {
                    state.error = Some(message);
                    state.loading = false;
                })
            }
        };
        if !applied {
            debug!(stats = name, generation, "discarding stale response");
        }
        slot.snapshot()
    }
}
