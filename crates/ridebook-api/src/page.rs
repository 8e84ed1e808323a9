// ── Paginated list contract ──
//
// Every list endpoint is normalized into `Page<T>`, whichever shape the
// server actually sent: the `{data, total, page, limit}` envelope, or a
// bare array.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::coerce;
use crate::error::Error;

/// One page of a resource list.
///
/// `total` counts items across all pages. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

impl<T> Page<T> {
    /// Wrap a bare item array: total and page size are the array length,
    /// and it is always page 1.
    pub fn from_items(items: Vec<T>) -> Self {
        let len = u64::try_from(items.len()).unwrap_or(u64::MAX);
        Self {
            items,
            total: len,
            page: 1,
            page_size: len,
        }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            page_size: 0,
        }
    }

    /// Number of pages implied by `total` and `page_size`.
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return u64::from(self.total > 0);
        }
        self.total.div_ceil(self.page_size)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Zero-based index of the first item on this page.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// 1-based `(first, last)` item numbers shown on this page, or `None`
    /// when the page is empty.
    pub fn range(&self) -> Option<(u64, u64)> {
        let shown = u64::try_from(self.items.len()).ok()?;
        if shown == 0 {
            return None;
        }
        let first = self.offset().checked_add(1)?;
        Some((first, first.checked_add(shown - 1)?))
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Conventional list envelope. Counters are coerced because some
/// endpoints send them as strings.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T> {
    #[serde(alias = "items")]
    data: Vec<T>,
    #[serde(default, deserialize_with = "coerce::opt_count")]
    total: Option<u64>,
    #[serde(default, deserialize_with = "coerce::opt_count")]
    page: Option<u64>,
    #[serde(default, alias = "pageSize", deserialize_with = "coerce::opt_count")]
    limit: Option<u64>,
}

impl<T> From<Envelope<T>> for Page<T> {
    fn from(env: Envelope<T>) -> Self {
        let len = u64::try_from(env.data.len()).unwrap_or(u64::MAX);
        let page_size = match env.limit.filter(|l| *l > 0) {
            Some(limit) if limit < len => {
                tracing::debug!(limit, len, "envelope holds more items than its limit");
                len
            }
            Some(limit) => limit,
            None => len.max(1),
        };
        Self {
            total: env.total.unwrap_or(len),
            page: env.page.filter(|p| *p > 0).unwrap_or(1),
            page_size,
            items: env.data,
        }
    }
}

/// Normalize a list response body into a [`Page`].
///
/// A bare JSON array is a known degraded shape and is repaired silently;
/// anything other than an array or an object is a deserialization error.
pub fn normalize_list<T: DeserializeOwned>(body: &str) -> Result<Page<T>, Error> {
    let value: Value = serde_json::from_str(body).map_err(|e| deser_error(&e, body))?;

    match value {
        Value::Array(_) => {
            let items: Vec<T> = serde_json::from_value(value).map_err(|e| deser_error(&e, body))?;
            Ok(Page::from_items(items))
        }
        Value::Object(_) => {
            let env: Envelope<T> =
                serde_json::from_value(value).map_err(|e| deser_error(&e, body))?;
            Ok(env.into())
        }
        other => Err(Error::Deserialization {
            message: format!("expected a list envelope or array, got {other}"),
            body: body.to_owned(),
        }),
    }
}

pub(crate) fn deser_error(e: &serde_json::Error, body: &str) -> Error {
    let preview: String = body.chars().take(200).collect();
    Error::Deserialization {
        message: format!("{e} (body preview: {preview:?})"),
        body: body.to_owned(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct Row {
        id: String,
    }

    fn row(id: &str) -> Row {
        Row { id: id.into() }
    }

    #[test]
    fn bare_array_becomes_single_page() {
        let page: Page<Row> = normalize_list(r#"[{"id":"1"},{"id":"2"}]"#).unwrap();
        assert_eq!(page, Page {
            items: vec![row("1"), row("2")],
            total: 2,
            page: 1,
            page_size: 2,
        });
    }

    #[test]
    fn envelope_counters_are_coerced() {
        let body = json!({
            "data": [{ "id": "a" }],
            "total": "41",
            "page": "3",
            "limit": "20"
        })
        .to_string();

        let page: Page<Row> = normalize_list(&body).unwrap();
        assert_eq!(page.total, 41);
        assert_eq!(page.page, 3);
        assert_eq!(page.page_size, 20);
        assert_eq!(page.total_pages(), 3);
        assert!(!page.has_next());
        assert_eq!(page.range(), Some((41, 41)));
    }

    #[test]
    fn envelope_accepts_page_size_alias() {
        let body = json!({ "data": [], "total": 0, "page": 1, "pageSize": 50 }).to_string();
        let page: Page<Row> = normalize_list(&body).unwrap();
        assert_eq!(page.page_size, 50);
        assert_eq!(page.range(), None);
    }

    #[test]
    fn envelope_missing_counters_default_from_data() {
        let body = json!({ "data": [{ "id": "x" }, { "id": "y" }] }).to_string();
        let page: Page<Row> = normalize_list(&body).unwrap();
        assert_eq!((page.total, page.page, page.page_size), (2, 1, 2));
    }

    #[test]
    fn huge_page_number_has_no_range() {
        let body = json!({
            "data": [{ "id": "a" }],
            "total": "1",
            "page": "18446744073709551615",
            "limit": "2"
        })
        .to_string();

        let page: Page<Row> = normalize_list(&body).unwrap();
        assert_eq!(page.page, u64::MAX);
        assert_eq!(page.range(), None);
        assert!(!page.has_next());
    }

    #[test]
    fn envelope_larger_than_limit_widens_page_size() {
        let body = json!({
            "data": [{ "id": "1" }, { "id": "2" }, { "id": "3" }, { "id": "4" }, { "id": "5" }],
            "total": 5,
            "limit": 2
        })
        .to_string();

        let page: Page<Row> = normalize_list(&body).unwrap();
        assert_eq!(page.page_size, 5);
        assert_eq!(page.range(), Some((1, 5)));
        assert_eq!(page.total_pages(), 1);
    }

    #[test]
    fn scalar_body_is_an_error() {
        let err = normalize_list::<Row>("42").unwrap_err();
        assert!(matches!(err, Error::Deserialization { .. }));
    }

    #[test]
    fn offset_math() {
        let page = Page {
            items: vec![row("k")],
            total: 95,
            page: 4,
            page_size: 10,
        };
        assert_eq!(page.offset(), 30);
        assert_eq!(page.total_pages(), 10);
        assert!(page.has_next());
        assert!(page.has_previous());
    }
}
