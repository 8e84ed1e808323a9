// ── Report exports ──
//
// Two wire shapes exist: a JSON object carrying CSV text inline, and a
// raw file body. Both decode into `ExportPayload`; the bytes are passed
// through untouched.

use bytes::Bytes;
use serde::Deserialize;

use crate::coerce;
use crate::error::Error;
use crate::page::deser_error;

/// How a resource's export endpoint answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// `{success, data: "<csv>", filename, totalRecords}`
    InlineCsv,
    /// Raw file body; filename (if any) comes from `Content-Disposition`.
    Blob,
}

/// A decoded export, ready to be written somewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    pub bytes: Bytes,
    /// Server-suggested filename.
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub total_records: Option<u64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineCsv {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_count")]
    total_records: Option<u64>,
    #[serde(default)]
    message: Option<String>,
}

fn default_success() -> bool {
    true
}

/// Decode the inline-CSV export shape.
pub(crate) fn decode_inline(body: &str) -> Result<ExportPayload, Error> {
    let inline: InlineCsv = serde_json::from_str(body).map_err(|e| deser_error(&e, body))?;

    if !inline.success {
        return Err(Error::Export(
            inline
                .message
                .unwrap_or_else(|| "server reported export failure".into()),
        ));
    }

    let data = inline
        .data
        .ok_or_else(|| Error::Export("export response has no data".into()))?;

    Ok(ExportPayload {
        bytes: Bytes::from(data),
        filename: inline.filename.filter(|f| !f.is_empty()),
        content_type: Some("text/csv;charset=utf-8".into()),
        total_records: inline.total_records,
    })
}

/// Pull a filename out of a `Content-Disposition` header value.
///
/// Prefers the RFC 5987 `filename*=` form when both are present.
pub(crate) fn filename_from_disposition(header: &str) -> Option<String> {
    let mut plain = None;
    for part in header.split(';').map(str::trim) {
        if let Some(encoded) = part.strip_prefix("filename*=") {
            // charset'lang'value
            let value = encoded.rsplit('\'').next().unwrap_or(encoded);
            let decoded = urlencoding::decode(value.trim_matches('"')).unwrap_or_default();
            if !decoded.is_empty() {
                return Some(decoded.into_owned());
            }
        } else if let Some(value) = part.strip_prefix("filename=") {
            let value = value.trim_matches('"');
            if !value.is_empty() {
                plain = Some(value.to_owned());
            }
        }
    }
    plain
}
