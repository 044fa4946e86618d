//! Dataset sanitizing for the bulk import
//!
//! The source dataset is a JSON array of loosely typed objects: years and
//! impact arrive as numbers, numeric strings or `""`, and any field may be
//! missing. Every entry becomes a complete [`Record`] with a fresh id.

use insight_common::{Error, Record, Result};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Parse a dataset file's contents into sanitized records
pub fn parse_dataset(content: &str) -> Result<Vec<Record>> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| Error::Parse(format!("Dataset is not valid JSON: {}", e)))?;

    let entries = value
        .as_array()
        .ok_or_else(|| Error::Parse("Dataset must be a JSON array".to_string()))?;

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let fields = entry.as_object().ok_or_else(|| {
                Error::Parse(format!("Dataset entry {} is not an object", index))
            })?;
            Ok(sanitize_entry(fields, Uuid::new_v4().to_string()))
        })
        .collect()
}

/// Fill defaults and normalize loosely typed values
pub fn sanitize_entry(fields: &Map<String, Value>, id: String) -> Record {
    let text = |name: &str| text_value(fields.get(name));
    let score = |name: &str| score_value(fields.get(name));
    let optional = |name: &str| optional_int(fields.get(name));

    Record {
        id,
        end_year: optional("end_year"),
        start_year: optional("start_year"),
        impact: optional("impact"),
        intensity: score("intensity"),
        likelihood: score("likelihood"),
        relevance: score("relevance"),
        sector: text("sector"),
        topic: text("topic"),
        region: text("region"),
        pestle: text("pestle"),
        source: text("source"),
        country: text("country"),
        city: text("city"),
        insight: Some(text("insight")),
        url: Some(text("url")),
        title: Some(text("title")),
        added: Some(text("added")),
        published: Some(text("published")),
    }
}

/// Number or numeric string; empty, null and garbage become `None`
fn optional_int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64)
        }
        _ => None,
    }
}

fn score_value(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn text_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
