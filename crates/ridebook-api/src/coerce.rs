// ── Numeric coercion for declared money/count fields ──
//
// The backend serializes decimals (and sometimes counters) as strings.
// Entity types opt in per field with `deserialize_with`, which makes the
// accepted shape part of the type rather than ad hoc parsing at call sites.
//
//     #[serde(default, deserialize_with = "coerce::number")]
//     pub amount: f64,

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::{Deserializer, Error as DeError};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient {
    Number(serde_json::Number),
    Text(String),
}

fn parse_float<E: DeError>(raw: Option<Lenient>) -> Result<Option<f64>, E> {
    match raw {
        None => Ok(None),
        Some(Lenient::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| E::custom(format!("number out of range: {n}"))),
        Some(Lenient::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            match trimmed.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(Some(value)),
                _ => Err(E::custom(format!("expected a numeric string, got {s:?}"))),
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::as_conversions)]
fn to_count<E: DeError>(value: f64) -> Result<u64, E> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64 {
        Ok(value as u64)
    } else {
        Err(E::custom(format!("expected a non-negative integer, got {value}")))
    }
}

fn parse_count<E: DeError>(raw: Option<Lenient>) -> Result<Option<u64>, E> {
    match raw {
        Some(Lenient::Number(n)) if n.as_u64().is_some() => Ok(n.as_u64()),
        Some(Lenient::Text(ref s)) if s.trim().parse::<u64>().is_ok() => {
            Ok(s.trim().parse::<u64>().ok())
        }
        other => parse_float::<E>(other)?.map(to_count::<E>).transpose(),
    }
}

/// Decimal that may arrive as a number or numeric string. `null` and
/// `""` become `0.0`.
pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let raw = Option::<Lenient>::deserialize(d)?;
    Ok(parse_float(raw)?.unwrap_or_default())
}

/// Optional decimal. `null` and `""` become `None`.
pub fn opt_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let raw = Option::<Lenient>::deserialize(d)?;
    parse_float(raw)
}

/// Non-negative integer that may arrive as a number or numeric string.
/// `null` and `""` become `0`.
pub fn count<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    let raw = Option::<Lenient>::deserialize(d)?;
    Ok(parse_count(raw)?.unwrap_or_default())
}

/// Optional non-negative integer.
pub fn opt_count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    let raw = Option::<Lenient>::deserialize(d)?;
    parse_count(raw)
}

/// Timestamp in RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC), or `YYYY-MM-DD`.
/// Unparseable values become `None` rather than failing the whole list.
pub fn opt_datetime<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
    let raw = Option::<String>::deserialize(d)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
