// ── Resource store ──
//
// Owns loading/error/data/filter state for one resource list. Every
// mutation re-fetches the whole list with the current filters on success.
// Errors are caught here and never escape to the caller.

use std::future::Future;
use std::sync::Arc;

use ridebook_api::{FilterSet, LifecycleAction, Resource, ResourceApi};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::Slot;
use super::state::ResourceState;
use crate::download::{Download, DownloadSink, ExportReceipt, resolve_filename};
use crate::error::CoreError;
use crate::outcome::MutationOutcome;
use crate::stream::StateStream;

struct Inner<R: Resource> {
    api: ResourceApi<R>,
    slot: Slot<ResourceState<R::Item>>,
}

/// Stateful, observable view of one resource list.
///
/// Cheap to clone; clones share state. Independent stores of the same
/// resource never share anything.
pub struct ResourceStore<R: Resource> {
    inner: Arc<Inner<R>>,
}

impl<R: Resource> Clone for ResourceStore<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Resource> std::fmt::Debug for ResourceStore<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceStore")
            .field("resource", &R::SPEC.name)
            .field("mounted", &self.is_mounted())
            .finish_non_exhaustive()
    }
}

impl<R: Resource> ResourceStore<R> {
    /// Create a store without fetching. Cancelling `cancel` unmounts it.
    pub fn new(api: ResourceApi<R>, filters: FilterSet, cancel: CancellationToken) -> Self {
        let state = ResourceState {
            filters,
            ..ResourceState::default()
        };
        Self {
            inner: Arc::new(Inner {
                api,
                slot: Slot::new(state, cancel),
            }),
        }
    }

    /// Create a store and perform the initial fetch.
    pub async fn mount(api: ResourceApi<R>, filters: FilterSet) -> Self {
        let store = Self::new(api, filters, CancellationToken::new());
        store.refresh().await;
        store
    }

    // ── Observation ──────────────────────────────────────────────────

    pub fn snapshot(&self) -> Arc<ResourceState<R::Item>> {
        self.inner.slot.snapshot()
    }

    pub fn subscribe(&self) -> StateStream<ResourceState<R::Item>> {
        self.inner.slot.subscribe()
    }

    pub fn filters(&self) -> FilterSet {
        self.snapshot().filters.clone()
    }

    pub fn api(&self) -> &ResourceApi<R> {
        &self.inner.api
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.slot.is_mounted()
    }

    /// Stop publishing state. An in-flight request is abandoned and its
    /// response, if any, is discarded.
    pub fn unmount(&self) {
        debug!(resource = R::SPEC.name, "store unmounted");
        self.inner.slot.unmount();
    }

    // ── Fetching ─────────────────────────────────────────────────────

    /// Fetch the list. Given filters replace the current ones first.
    pub async fn fetch(&self, filters: Option<FilterSet>) -> Arc<ResourceState<R::Item>> {
        self.run_fetch(|current| {
            if let Some(filters) = filters {
                *current = filters;
            }
        })
        .await
    }

    /// Re-fetch with the current filters.
    pub async fn refresh(&self) -> Arc<ResourceState<R::Item>> {
        self.run_fetch(|_| {}).await
    }

    /// Merge `partial` into the current filters, then fetch once.
    pub async fn update_filters(&self, partial: &FilterSet) -> Arc<ResourceState<R::Item>> {
        self.run_fetch(|current| current.merge(partial)).await
    }

    /// Replace the filters wholesale, then fetch once.
    pub async fn set_filters(&self, filters: FilterSet) -> Arc<ResourceState<R::Item>> {
        self.fetch(Some(filters)).await
    }

    /// Jump to a page, keeping every other filter.
    pub async fn goto_page(&self, page: u64) -> Arc<ResourceState<R::Item>> {
        let partial = FilterSet::new().with(ridebook_api::query::keys::PAGE, page);
        self.update_filters(&partial).await
    }

    async fn run_fetch(&self, edit: impl FnOnce(&mut FilterSet)) -> Arc<ResourceState<R::Item>> {
        let slot = &self.inner.slot;
        let mut query = FilterSet::new();

        let Some(generation) = slot.begin(|state| {
            edit(&mut state.filters);
            state.loading = true;
            query = state.filters.clone();
        }) else {
            debug!(resource = R::SPEC.name, "fetch skipped, store unmounted");
            return slot.snapshot();
        };

        debug!(resource = R::SPEC.name, generation, query = %query.to_query_string(), "fetching list");
        let Some(result) = slot.guard(self.inner.api.list(&query)).await else {
            debug!(resource = R::SPEC.name, generation, "fetch abandoned on unmount");
            return slot.snapshot();
        };

        let applied = match result {
            Ok(page) => slot.settle(generation, |state| {
                state.data = Some(page);
                state.error = None;
                state.loading = false;
            }),
            Err(e) => {
                let message = CoreError::from(e).message();
                warn!(resource = R::SPEC.name, error = %message, "list fetch failed");
                slot.settle(generation, |state| {
                    state.error = Some(message);
                    state.loading = false;
                })
            }
        };
        if !applied {
            debug!(resource = R::SPEC.name, generation, "discarding stale response");
        }
        slot.snapshot()
    }

    // ── Mutations ────────────────────────────────────────────────────

    pub async fn create(&self, payload: &R::Create) -> MutationOutcome<R::Item> {
        self.mutate("create", async { self.inner.api.create(payload).await.map(Some) })
            .await
    }

    pub async fn update(&self, id: &str, payload: &R::Update) -> MutationOutcome<R::Item> {
        self.mutate("update", async {
            self.inner.api.update(id, payload).await.map(Some)
        })
        .await
    }

    pub async fn delete(&self, id: &str) -> MutationOutcome<()> {
        self.mutate("delete", async { self.inner.api.delete(id).await.map(|()| None) })
            .await
    }

    /// Run a lifecycle action; `data` carries the updated entity when the
    /// server returns one.
    pub async fn perform(
        &self,
        id: &str,
        action: LifecycleAction,
        body: Option<Value>,
    ) -> MutationOutcome<R::Item> {
        self.mutate(action.into(), async {
            self.inner.api.perform(id, action, body.as_ref()).await
        })
        .await
    }

    pub async fn perform_bulk(&self, ids: &[String], action: LifecycleAction) -> MutationOutcome<()> {
        self.mutate(action.into(), async {
            self.inner
                .api
                .perform_bulk(ids, action)
                .await
                .map(|()| None)
        })
        .await
    }

    async fn mutate<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<Option<T>, ridebook_api::Error>>,
    ) -> MutationOutcome<T> {
        let slot = &self.inner.slot;
        if !slot.is_mounted() {
            return MutationOutcome::failure(format!("{} store is unmounted", R::SPEC.name));
        }

        match slot.guard(call).await {
            None => MutationOutcome::failure(format!("{operation} cancelled")),
            Some(Ok(data)) => {
                debug!(resource = R::SPEC.name, operation, "mutation succeeded, refreshing");
                self.refresh().await;
                MutationOutcome::success(data)
            }
            Some(Err(e)) => {
                let message = self.record_failure(operation, e.into());
                MutationOutcome::failure(message)
            }
        }
    }

    fn record_failure(&self, operation: &str, err: CoreError) -> String {
        let message = err.message();
        warn!(resource = R::SPEC.name, operation, error = %message, "operation failed");
        let error = message.clone();
        self.inner.slot.update(|state| state.error = Some(error));
        message
    }

    // ── Export ───────────────────────────────────────────────────────

    /// Export with the given filters (current filters if `None`) and hand
    /// exactly one file to `sink`.
    pub async fn export_report(
        &self,
        filters: Option<FilterSet>,
        sink: &dyn DownloadSink,
    ) -> MutationOutcome<ExportReceipt> {
        if !self.is_mounted() {
            return MutationOutcome::failure(format!("{} store is unmounted", R::SPEC.name));
        }
        let filters = filters.unwrap_or_else(|| self.filters());

        let payload = match self.inner.slot.guard(self.inner.api.export(&filters)).await {
            None => return MutationOutcome::failure("export cancelled"),
            Some(Ok(payload)) => payload,
            Some(Err(e)) => return MutationOutcome::failure(self.record_failure("export", e.into())),
        };

        let filename = resolve_filename(R::SPEC.name, payload.filename.as_deref());
        let size = payload.bytes.len();
        let download = Download {
            filename: filename.clone(),
            bytes: payload.bytes,
            content_type: payload.content_type,
        };

        match sink.deliver(download) {
            Ok(location) => MutationOutcome::success(Some(ExportReceipt {
                filename,
                size,
                total_records: payload.total_records,
                location,
            })),
            Err(e) => MutationOutcome::failure(self.record_failure("export", e)),
        }
    }
}
