//! Async client for the ridebook back-office REST API.
//!
//! - **[`ApiClient`]** owns transport, bearer-token injection and 401
//!   credential eviction. One instance per backend, injected everywhere.
//! - **[`ResourceApi<R>`]** is the single generic implementation of list,
//!   CRUD, lifecycle actions, export and statistics. Entities plug in via
//!   the [`Resource`] marker trait ([`resources`]).
//! - **[`FilterSet`]** and **[`Page`]** normalize the query string going
//!   out and the paginated body coming back.

pub mod auth;
pub mod client;
pub mod coerce;
pub mod error;
pub mod export;
pub mod page;
pub mod query;
pub mod resource;
pub mod resources;
pub mod transport;

pub use auth::{DEFAULT_LOGIN_PATH, MemoryTokenStore, SessionState, TokenStore, TokenStoreError};
pub use client::ApiClient;
pub use error::{Error, GENERIC_FAILURE};
pub use export::{ExportKind, ExportPayload};
pub use page::{Page, normalize_list};
pub use query::{DateRange, FilterSet, FilterValue};
pub use resource::{LifecycleAction, Resource, ResourceApi, ResourceSpec, Stats, StatsEndpoint};
pub use transport::{TlsMode, TransportConfig};
