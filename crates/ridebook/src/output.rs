//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use ridebook_core::api::{Page, Stats};
use serde_json::Value;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Color a status label by its meaning.
pub fn paint_status(status: &str, color: bool) -> String {
    if !color {
        return status.to_owned();
    }
    match status {
        "approved" | "active" | "paid" | "completed" | "processed" | "published"
        | "converted" | "available" => status.green().to_string(),
        "pending" | "processing" | "draft" | "maintenance" => status.yellow().to_string(),
        "rejected" | "failed" | "cancelled" | "suspended" | "inactive" | "refunded" => {
            status.red().to_string()
        }
        _ => status.dimmed().to_string(),
    }
}

/// Status line on stderr, e.g. after a mutation. Silent in quiet mode.
pub fn notice(message: &str, color: bool, quiet: bool) {
    if quiet {
        return;
    }
    let mut stderr = io::stderr().lock();
    if color {
        let _ = writeln!(stderr, "{} {message}", "✓".green().bold());
    } else {
        let _ = writeln!(stderr, "{message}");
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render one page of a list. Structured formats carry the paging
/// metadata; table adds a footer line.
pub fn render_page<T, R>(
    format: OutputFormat,
    page: &Page<T>,
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Json => render_json(page, false),
        OutputFormat::JsonCompact => render_json(page, true),
        OutputFormat::Yaml => render_yaml(page),
        OutputFormat::Table => {
            let table = render_list(format, &page.items, to_row, id_fn);
            match page.range() {
                Some((first, last)) => format!(
                    "{table}\n{first}-{last} of {} (page {}/{})",
                    page.total,
                    page.page,
                    page.total_pages()
                ),
                None => format!("{table}\nNo results"),
            }
        }
        OutputFormat::Plain => render_list(format, &page.items, to_row, id_fn),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses a custom `detail_fn` that returns a pre-formatted string,
/// since single-item detail views don't use `Tabled` derive.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => id_fn(data),
    }
}

#[derive(Tabled)]
struct StatRow {
    #[tabled(rename = "Metric")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Render a statistics payload. Nested objects are flattened to
/// dotted keys in table and plain form.
pub fn render_stats(format: OutputFormat, stats: &Stats) -> String {
    let mut flat = Vec::new();
    flatten_stats("", stats, &mut flat);

    match format {
        OutputFormat::Table => render_table(
            &flat
                .into_iter()
                .map(|(key, value)| StatRow { key, value })
                .collect::<Vec<_>>(),
        ),
        OutputFormat::Plain => flat
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Json => render_json(stats, false),
        OutputFormat::JsonCompact => render_json(stats, true),
        OutputFormat::Yaml => render_yaml(stats),
    }
}

fn flatten_stats(prefix: &str, map: &Stats, out: &mut Vec<(String, String)>) {
    for (key, value) in map {
        let key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(inner) => flatten_stats(&key, inner, out),
            Value::String(s) => out.push((key, s.clone())),
            Value::Null => out.push((key, "-".into())),
            other => out.push((key, other.to_string())),
        }
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let result = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    result.unwrap_or_else(|e| format!("{{\"error\":\"serialization failed: {e}\"}}"))
}

/// YAML output.
fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).unwrap_or_else(|e| format!("error: serialization failed: {e}"))
}

/// Table cell for an absent optional field.
pub fn or_dash(value: Option<&str>) -> String {
    value.map_or_else(|| "-".into(), str::to_owned)
}

/// Money with two decimals.
pub fn money(value: f64) -> String {
    format!("{value:.2}")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn stats_flatten_nested_objects() {
        let stats: Stats = serde_json::from_value(json!({
            "total": 12,
            "byStatus": { "pending": 3, "approved": 9 },
            "label": "week"
        }))
        .unwrap_or_default();

        let plain = render_stats(OutputFormat::Plain, &stats);
        assert!(plain.contains("total=12"), "{plain}");
        assert!(plain.contains("byStatus.pending=3"), "{plain}");
        assert!(plain.contains("label=week"), "{plain}");
    }

    #[test]
    fn status_is_uncolored_without_color() {
        assert_eq!(paint_status("approved", false), "approved");
    }

    #[test]
    fn empty_page_table_says_no_results() {
        let page: Page<serde_json::Value> = Page::empty();
        let out = render_page(
            OutputFormat::Table,
            &page,
            |_| StatRow {
                key: String::new(),
                value: String::new(),
            },
            |_| String::new(),
        );
        assert!(out.ends_with("No results"), "{out}");
    }
}
