// ── Generic resource module ──
//
// One parametric implementation of list/get/create/update/delete,
// lifecycle actions, export, and statistics. Each entity supplies a
// marker type implementing `Resource` with its payload types and a
// `ResourceSpec` describing paths and capabilities.

use std::marker::PhantomData;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString, IntoStaticStr};
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::export::{ExportKind, ExportPayload, decode_inline, filename_from_disposition};
use crate::page::{Page, deser_error, normalize_list};
use crate::query::{FilterSet, keys};

/// Aggregate counters returned by statistics endpoints, passed through as-is.
pub type Stats = Map<String, Value>;

/// Server-side state transitions beyond plain CRUD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum LifecycleAction {
    Approve,
    Reject,
    Suspend,
    ProcessPayment,
    Retry,
    Cancel,
    ConvertToBooking,
    Publish,
    Unpublish,
}

impl LifecycleAction {
    /// Trailing path segment: `/{resource}/{id}/{segment}`.
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Suspend => "suspend",
            Self::ProcessPayment => "process",
            Self::Retry => "retry",
            Self::Cancel => "cancel",
            Self::ConvertToBooking => "convert",
            Self::Publish => "publish",
            Self::Unpublish => "unpublish",
        }
    }

    /// Status flips are PATCHes; actions that kick off server work are POSTs.
    pub fn method(self) -> Method {
        match self {
            Self::Approve | Self::Reject | Self::Suspend | Self::Publish | Self::Unpublish => {
                Method::PATCH
            }
            Self::ProcessPayment | Self::Retry | Self::Cancel | Self::ConvertToBooking => {
                Method::POST
            }
        }
    }
}

/// Static description of one resource's endpoints and capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSpec {
    /// Short name used in logs, CLI output, and export filenames.
    pub name: &'static str,
    /// Base path relative to the API root, e.g. `"/payouts"`.
    pub path: &'static str,
    /// Query key carrying the page size (`limit` or `pageSize`).
    pub page_size_param: &'static str,
    /// Whether list/get/create/update/delete are served.
    pub crud: bool,
    pub actions: &'static [LifecycleAction],
    pub bulk_actions: &'static [LifecycleAction],
    pub export: Option<ExportKind>,
    pub stats: bool,
}

impl ResourceSpec {
    /// A CRUD-only resource with `limit` paging and nothing else.
    pub const fn crud(name: &'static str, path: &'static str) -> Self {
        Self {
            name,
            path,
            page_size_param: keys::LIMIT,
            crud: true,
            actions: &[],
            bulk_actions: &[],
            export: None,
            stats: false,
        }
    }

    pub fn supports(&self, action: LifecycleAction) -> bool {
        self.actions.contains(&action)
    }

    pub fn supports_bulk(&self, action: LifecycleAction) -> bool {
        self.bulk_actions.contains(&action)
    }

    pub fn stats_path(&self) -> String {
        format!("{}/stats", self.path)
    }

    pub fn export_path(&self) -> String {
        format!("{}/export", self.path)
    }

    fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.path, urlencoding::encode(id))
    }
}

/// Marker trait tying an entity to its endpoints.
pub trait Resource: Send + Sync + 'static {
    type Item: DeserializeOwned + Serialize + Clone + Send + Sync + 'static;
    type Create: Serialize + Send + Sync;
    type Update: Serialize + Send + Sync;

    const SPEC: ResourceSpec;

    /// Primary identifier of an item.
    fn id(item: &Self::Item) -> &str;
}

/// Single-entity responses arrive either bare or wrapped in `{data: ...}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Single<T> {
    Bare(T),
    Wrapped { data: T },
}

impl<T> Single<T> {
    fn into_inner(self) -> T {
        match self {
            Self::Bare(t) | Self::Wrapped { data: t } => t,
        }
    }
}

fn decode_single<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str::<Single<T>>(body)
        .map(Single::into_inner)
        .map_err(|e| deser_error(&e, body))
}

/// `{success, message}` style bodies that carry no entity at all.
fn is_acknowledgement(body: &str) -> bool {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => {
            !map.contains_key("id") && map.get("data").is_none_or(|data| !data.is_object())
        }
        _ => false,
    }
}

#[derive(Serialize)]
struct BulkBody<'a> {
    ids: &'a [String],
}

/// Typed access to one resource's endpoints.
///
/// Stateless: every call goes straight to the server. Errors from the
/// client propagate unchanged.
pub struct ResourceApi<R: Resource> {
    client: ApiClient,
    _marker: PhantomData<fn() -> R>,
}

impl<R: Resource> Clone for ResourceApi<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _marker: PhantomData,
        }
    }
}

impl<R: Resource> std::fmt::Debug for ResourceApi<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceApi")
            .field("resource", &R::SPEC.name)
            .finish_non_exhaustive()
    }
}

impl<R: Resource> ResourceApi<R> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            _marker: PhantomData,
        }
    }

    pub fn spec(&self) -> ResourceSpec {
        R::SPEC
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    fn require_crud(&self, operation: &str) -> Result<(), Error> {
        if R::SPEC.crud {
            Ok(())
        } else {
            Err(self.unsupported(operation))
        }
    }

    fn unsupported(&self, operation: impl Into<String>) -> Error {
        Error::UnsupportedOperation {
            resource: R::SPEC.name,
            operation: operation.into(),
        }
    }

    // ── CRUD ─────────────────────────────────────────────────────────

    /// Fetch one page, normalized into [`Page`].
    pub async fn list(&self, filters: &FilterSet) -> Result<Page<R::Item>, Error> {
        self.require_crud("list")?;
        let body = self.client.get_text(R::SPEC.path, Some(filters)).await?;
        let page = normalize_list::<R::Item>(&body)?;
        debug!(
            resource = R::SPEC.name,
            items = page.items.len(),
            total = page.total,
            "list normalized"
        );
        Ok(page)
    }

    pub async fn get(&self, id: &str) -> Result<R::Item, Error> {
        self.require_crud("get")?;
        let body = self
            .client
            .get_text(&R::SPEC.item_path(id), None)
            .await?;
        decode_single(&body)
    }

    pub async fn create(&self, payload: &R::Create) -> Result<R::Item, Error> {
        self.require_crud("create")?;
        let body = self
            .client
            .send_text(Method::POST, R::SPEC.path, Some(payload))
            .await?;
        decode_single(&body)
    }

    pub async fn update(&self, id: &str, payload: &R::Update) -> Result<R::Item, Error> {
        self.require_crud("update")?;
        let body = self
            .client
            .send_text(Method::PUT, &R::SPEC.item_path(id), Some(payload))
            .await?;
        decode_single(&body)
    }

    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        self.require_crud("delete")?;
        self.client
            .send_empty::<Value>(Method::DELETE, &R::SPEC.item_path(id), None)
            .await
    }

    // ── Lifecycle actions ────────────────────────────────────────────

    /// Run a lifecycle action on one item.
    ///
    /// Returns the updated entity when the server sends one back. Actions
    /// not declared for the resource fail before any request is made.
    pub async fn perform(
        &self,
        id: &str,
        action: LifecycleAction,
        body: Option<&Value>,
    ) -> Result<Option<R::Item>, Error> {
        if !R::SPEC.supports(action) {
            return Err(self.unsupported(action.to_string()));
        }
        let path = format!("{}/{}", R::SPEC.item_path(id), action.path_segment());
        let resp = self.client.request(action.method(), &path, None, body).await?;
        let text = resp.text().await.map_err(Error::Transport)?;

        if text.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str::<Single<R::Item>>(&text) {
            Ok(single) => Ok(Some(single.into_inner())),
            Err(_) if is_acknowledgement(&text) => {
                debug!(resource = R::SPEC.name, %action, "action acknowledged without an entity");
                Ok(None)
            }
            Err(e) => Err(deser_error(&e, &text)),
        }
    }

    /// Run a lifecycle action on many items in one request.
    pub async fn perform_bulk(&self, ids: &[String], action: LifecycleAction) -> Result<(), Error> {
        if !R::SPEC.supports_bulk(action) {
            return Err(self.unsupported(format!("bulk {action}")));
        }
        let path = format!("{}/bulk-{}", R::SPEC.path, action.path_segment());
        self.client
            .send_empty(Method::POST, &path, Some(&BulkBody { ids }))
            .await
    }

    // ── Reporting ────────────────────────────────────────────────────

    /// Fetch the export for the given filters.
    pub async fn export(&self, filters: &FilterSet) -> Result<ExportPayload, Error> {
        let Some(kind) = R::SPEC.export else {
            return Err(self.unsupported("export"));
        };
        let path = R::SPEC.export_path();

        match kind {
            ExportKind::InlineCsv => {
                let body = self.client.get_text(&path, Some(filters)).await?;
                decode_inline(&body)
            }
            ExportKind::Blob => {
                let resp = self
                    .client
                    .request(Method::GET, &path, Some(filters), None)
                    .await?;
                let headers = resp.headers();
                let filename = headers
                    .get(reqwest::header::CONTENT_DISPOSITION)
                    .and_then(|v| v.to_str().ok())
                    .and_then(filename_from_disposition);
                let content_type = headers
                    .get(reqwest::header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map(String::from);
                let bytes = resp.bytes().await.map_err(Error::Transport)?;
                Ok(ExportPayload {
                    bytes,
                    filename,
                    content_type,
                    total_records: None,
                })
            }
        }
    }

    /// Aggregate counters for this resource, unmodified.
    pub async fn statistics(&self) -> Result<Stats, Error> {
        if !R::SPEC.stats {
            return Err(self.unsupported("statistics"));
        }
        self.stats_endpoint().fetch().await
    }

    /// Endpoint handle for a statistics store, if the resource has one.
    pub fn stats_endpoint(&self) -> StatsEndpoint {
        StatsEndpoint::new(self.client.clone(), R::SPEC.name, R::SPEC.stats_path())
    }
}

/// A statistics endpoint detached from any list resource (e.g. the dashboard).
#[derive(Debug, Clone)]
pub struct StatsEndpoint {
    client: ApiClient,
    name: &'static str,
    path: String,
}

impl StatsEndpoint {
    pub fn new(client: ApiClient, name: &'static str, path: impl Into<String>) -> Self {
        Self {
            client,
            name,
            path: path.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Fetch the statistics object exactly as the server sent it.
    pub async fn fetch(&self) -> Result<Stats, Error> {
        let body = self.client.get_text(&self.path, None).await?;
        serde_json::from_str(&body).map_err(|e| deser_error(&e, &body))
    }
}
