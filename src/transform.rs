use chrono::{DateTime, NaiveDate};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{AppError, Context, Result};
use crate::fetch::RawTable;

/// Canonical column order shared by the CSV and workbook writers.
pub const CANONICAL_COLUMNS: [&str; 15] = [
    "date",
    "exchange",
    "symbol",
    "dividend",
    "open",
    "high",
    "low",
    "close",
    "volume",
    "adj_high",
    "adj_low",
    "adj_close",
    "adj_open",
    "adj_volume",
    "split_factor",
];

/// One normalized end-of-day row. Field declaration order mirrors
/// `CANONICAL_COLUMNS`, which the CSV writer relies on for its header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteRecord {
    pub date: String,
    pub exchange: String,
    pub symbol: String,
    pub dividend: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub adj_high: f64,
    pub adj_low: f64,
    pub adj_close: f64,
    pub adj_open: f64,
    pub adj_volume: f64,
    pub split_factor: f64,
}

/// Normalize the raw table into the canonical 15-column shape.
///
/// Missing and null cells become 0 across every column — string columns
/// render as "0" and `split_factor` fills with 0, not 1; downstream
/// consumers expect the uniform rule. The date column is re-rendered as
/// DD/MM/YYYY and is the only field whose absence or unparseable value is
/// a hard error.
pub fn normalize(raw: &RawTable) -> Result<Vec<QuoteRecord>> {
    if raw.is_empty() {
        log::info!("Empty table received, skipping transformation");
        return Ok(Vec::new());
    }

    let mut records = Vec::with_capacity(raw.len());
    for row in raw.rows() {
        records.push(normalize_row(row)?);
    }

    Ok(records)
}

fn normalize_row(row: &Map<String, Value>) -> Result<QuoteRecord> {
    Ok(QuoteRecord {
        date: format_quote_date(row.get("date"))?,
        exchange: string_field(row, "exchange"),
        symbol: string_field(row, "symbol"),
        dividend: numeric_field(row, "dividend"),
        open: numeric_field(row, "open"),
        high: numeric_field(row, "high"),
        low: numeric_field(row, "low"),
        close: numeric_field(row, "close"),
        volume: numeric_field(row, "volume"),
        adj_high: numeric_field(row, "adj_high"),
        adj_low: numeric_field(row, "adj_low"),
        adj_close: numeric_field(row, "adj_close"),
        adj_open: numeric_field(row, "adj_open"),
        adj_volume: numeric_field(row, "adj_volume"),
        split_factor: numeric_field(row, "split_factor"),
    })
}

fn string_field(row: &Map<String, Value>, key: &str) -> String {
    match row.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Null) | None => "0".to_string(),
        Some(other) => other.to_string(),
    }
}

fn numeric_field(row: &Map<String, Value>, key: &str) -> f64 {
    match row.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn format_quote_date(value: Option<&Value>) -> Result<String> {
    let raw = value
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::message("Quote record is missing a date value"))?;

    Ok(parse_quote_date(raw)?.format("%d/%m/%Y").to_string())
}

/// Accepts the service's timestamp form plus plain and already-normalized
/// dates, so re-running the transform over its own output is a no-op.
fn parse_quote_date(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();

    if let Ok(dt) = DateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%z") {
        return Ok(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.date_naive());
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }

    NaiveDate::parse_from_str(trimmed, "%d/%m/%Y")
        .with_context(|| format!("Failed to parse quote date '{}'", trimmed))
        .map_err(AppError::from)
}
