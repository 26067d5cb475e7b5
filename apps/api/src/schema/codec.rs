//! Cell-level reading and writing for Lark Base rows.
//!
//! Reads never fail: a cell that is missing, unparseable or `null` resolves to the
//! field's default. Rows written by older encoders (for example the literal text
//! `[object Object]`) therefore decode to defaults instead of erroring.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

/// A flat Lark row: column name → cell value.
pub type FlatFields = Map<String, Value>;

/// Text content of a cell.
///
/// Text columns come back either as a plain string or as rich-text segments
/// (`[{"type":"text","text":"..."}]`); segments are concatenated.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.as_str()),
                Value::Object(seg) => seg.get("text").and_then(Value::as_str),
                _ => None,
            })
            .collect(),
        Some(Value::Object(obj)) => obj
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    }
}

/// `"\"hello\""` → `hello`. Anything that is not a JSON string literal is returned unchanged.
pub fn unwrap_json_string(text: String) -> String {
    let trimmed = text.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        if let Ok(inner) = serde_json::from_str::<String>(trimmed) {
            return inner;
        }
    }
    text
}

/// Parses a JSON text cell. Empty, unparseable and `null` cells are `None`.
pub fn parse_json_cell(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Null) | Err(_) => None,
        Ok(value) => Some(value),
    }
}

/// Read access to a row.
pub struct FieldReader<'a> {
    fields: &'a FlatFields,
}

impl<'a> FieldReader<'a> {
    pub fn new(fields: &'a FlatFields) -> Self {
        Self { fields }
    }

    pub fn text(&self, key: &str) -> String {
        unwrap_json_string(cell_text(self.fields.get(key)))
    }

    pub fn number(&self, key: &str) -> f64 {
        match self.fields.get(key) {
            Some(Value::Number(n)) => n.as_f64().unwrap_or_default(),
            Some(other) => cell_text(Some(other))
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .unwrap_or_default(),
            None => 0.0,
        }
    }

    pub fn json_value(&self, key: &str) -> Option<Value> {
        parse_json_cell(&cell_text(self.fields.get(key)))
    }

    /// Structured cell; a shape mismatch falls back to `T::default()` as well.
    pub fn json<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.json_value(key)
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }
}

/// Builds a row in column order.
#[derive(Default)]
pub struct FieldWriter {
    fields: FlatFields,
}

impl FieldWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&mut self, key: &str, value: &str) -> &mut Self {
        self.fields
            .insert(key.to_string(), Value::String(value.to_string()));
        self
    }

    pub fn number(&mut self, key: &str, value: f64) -> &mut Self {
        self.fields.insert(key.to_string(), number_value(value));
        self
    }

    /// Writes `value` as compact JSON text, or `empty` when it equals its default.
    pub fn json<T>(&mut self, key: &str, value: &T, empty: &str) -> &mut Self
    where
        T: Serialize + Default + PartialEq,
    {
        let text = if *value == T::default() {
            empty.to_string()
        } else {
            serde_json::to_string(value).unwrap_or_else(|_| empty.to_string())
        };
        self.fields.insert(key.to_string(), Value::String(text));
        self
    }

    pub fn finish(self) -> FlatFields {
        self.fields
    }
}

/// Integral scores are written as integers so the number column shows `12`, not `12.0`.
fn number_value(value: f64) -> Value {
    if !value.is_finite() {
        return Value::from(0);
    }
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        return Value::from(value as i64);
    }
    Number::from_f64(value).map_or(Value::from(0), Value::Number)
}

/// Deserializes a list of any length into exactly `N` entries.
///
/// Missing entries and entries that do not match `T` become `T::default()`.
pub fn fixed_len<'de, D, T, const N: usize>(deserializer: D) -> Result<[T; N], D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(fixed_from_value(value))
}

pub fn fixed_from_value<T, const N: usize>(value: Value) -> [T; N]
where
    T: DeserializeOwned + Default,
{
    let mut items = match value {
        Value::Array(items) => items.into_iter(),
        _ => Vec::new().into_iter(),
    };
    std::array::from_fn(|_| {
        items
            .next()
            .and_then(|item| serde_json::from_value(item).ok())
            .unwrap_or_default()
    })
}
