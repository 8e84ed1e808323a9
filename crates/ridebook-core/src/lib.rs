//! Reactive data layer between `ridebook-api` and its consumers.
//!
//! - **[`ResourceStore<R>`]** owns loading/error/data/filter state for one
//!   resource list. Mutations return a [`MutationOutcome`] and re-fetch on
//!   success; failures keep the last good data and record the message.
//! - **[`StatsStore`]** does the same for a single statistics object.
//! - **[`StateStream`]** is the subscription handle both stores vend.
//! - **[`Session`]** is the injection root: one client, many stores.
//! - **[`DownloadSink`]** receives the single file an export produces.

pub mod config;
pub mod download;
pub mod error;
pub mod outcome;
pub mod session;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::ClientConfig;
pub use download::{
    DirectorySink, Download, DownloadSink, ExportReceipt, RecordingSink, fallback_filename,
};
pub use error::CoreError;
pub use outcome::MutationOutcome;
pub use session::Session;
pub use store::{Phase, ResourceState, ResourceStore, StatsState, StatsStore};
pub use stream::{StateStream, StateWatchStream};

pub use ridebook_api as api;
