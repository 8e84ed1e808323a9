// ── Client-side downloads ──
//
// An export ends in exactly one `Download` handed to a `DownloadSink`.
// The sink decides where the bytes go: a directory on disk, memory, or
// whatever the consumer provides.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use bytes::Bytes;
use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::error::CoreError;

/// One file ready to be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

/// Summary of a delivered export, returned in the mutation outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReceipt {
    pub filename: String,
    pub size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_records: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<PathBuf>,
}

/// Destination for exported files.
pub trait DownloadSink: Send + Sync {
    /// Deliver one download. Returns the path written, when there is one.
    fn deliver(&self, download: Download) -> Result<Option<PathBuf>, CoreError>;
}

/// `<resource>-export-<YYYY-MM-DD>.csv`
pub fn fallback_filename(resource: &str, date: NaiveDate) -> String {
    format!("{resource}-export-{}.csv", date.format("%Y-%m-%d"))
}

/// Server-suggested name if usable, otherwise today's date-stamped fallback.
pub(crate) fn resolve_filename(resource: &str, suggested: Option<&str>) -> String {
    suggested
        .and_then(safe_file_name)
        .unwrap_or_else(|| fallback_filename(resource, Utc::now().date_naive()))
}

/// Strip any directory components so a server cannot write outside the sink.
fn safe_file_name(raw: &str) -> Option<String> {
    let name = Path::new(raw.trim()).file_name()?.to_str()?;
    (!name.is_empty() && name != "." && name != "..").then(|| name.to_owned())
}

// ── Directory sink ───────────────────────────────────────────────────

/// Writes each download into a directory.
///
/// Existing files are kept: a clashing name gets a ` (n)` suffix unless
/// `overwrite` is set.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    overwrite: bool,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            overwrite: false,
        }
    }

    #[must_use]
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn target_path(&self, filename: &str) -> PathBuf {
        let first = self.dir.join(filename);
        if self.overwrite || !first.exists() {
            return first;
        }

        let path = Path::new(filename);
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(filename);
        let ext = path.extension().and_then(|s| s.to_str());
        (1..)
            .map(|n| match ext {
                Some(ext) => self.dir.join(format!("{stem} ({n}).{ext}")),
                None => self.dir.join(format!("{stem} ({n})")),
            })
            .find(|candidate| !candidate.exists())
            .unwrap_or(first)
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&self, download: Download) -> Result<Option<PathBuf>, CoreError> {
        fs::create_dir_all(&self.dir).map_err(|e| CoreError::Download {
            message: format!("cannot create {}: {e}", self.dir.display()),
        })?;
        let path = self.target_path(&download.filename);
        fs::write(&path, &download.bytes).map_err(|e| CoreError::Download {
            message: format!("cannot write {}: {e}", path.display()),
        })?;
        tracing::info!(path = %path.display(), bytes = download.bytes.len(), "export saved");
        Ok(Some(path))
    }
}

// ── Recording sink ───────────────────────────────────────────────────

/// Keeps downloads in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    downloads: Mutex<Vec<Download>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn downloads(&self) -> Vec<Download> {
        self.downloads
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl DownloadSink for RecordingSink {
    fn deliver(&self, download: Download) -> Result<Option<PathBuf>, CoreError> {
        self.downloads
            .lock()
            .map_err(|_| CoreError::Internal("download sink lock poisoned".into()))?
            .push(download);
        Ok(None)
    }
}
