//! Draftable items and pool ingestion.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info, instrument};

/// One named field of an item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    /// Column name.
    pub name: String,
    /// Column value.
    pub value: String,
}

/// One row of the draft pool: ordered named fields.
///
/// The first field is the item's label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    fields: Vec<Field>,
}

impl Item {
    /// Creates an item from ordered `(name, value)` pairs.
    pub fn new<N, V>(fields: impl IntoIterator<Item = (N, V)>) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|(name, value)| Field {
                    name: name.into(),
                    value: value.into(),
                })
                .collect(),
        }
    }

    /// Creates a single-field item, handy for pools that are just names.
    pub fn named(label: impl Into<String>) -> Self {
        Self::new([("Name", label.into())])
    }

    /// Builds an item from a flat JSON object, keeping key order.
    ///
    /// Strings are taken as-is; numbers, booleans and null are stringified.
    #[instrument(skip(object), fields(keys = object.len()))]
    pub fn from_json_object(object: &Map<String, Value>) -> Result<Self, ItemError> {
        let mut fields = Vec::with_capacity(object.len());
        for (name, value) in object {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => String::new(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(ItemError::new(format!(
                        "Field '{}' must be a scalar value",
                        name
                    )));
                }
            };
            fields.push(Field {
                name: name.clone(),
                value,
            });
        }
        Ok(Self { fields })
    }

    /// Display label: the value of the first field.
    pub fn label(&self) -> &str {
        self.fields.first().map(|f| f.value.as_str()).unwrap_or("")
    }

    /// Looks up a field value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    /// All fields in pool order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Renders every field as `name - value, ...`.
    pub fn details(&self) -> String {
        self.fields
            .iter()
            .map(|f| format!("{} - {}", f.name, f.value))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Parses a JSON array of flat objects into items.
#[instrument(skip(json), fields(bytes = json.len()))]
pub fn parse_items(json: &str) -> Result<Vec<Item>, ItemError> {
    let rows: Vec<Map<String, Value>> = serde_json::from_str(json)
        .map_err(|e| ItemError::new(format!("Failed to parse items: {}", e)))?;
    let items = rows
        .iter()
        .map(Item::from_json_object)
        .collect::<Result<Vec<_>, _>>()?;
    debug!(count = items.len(), "Parsed items");
    Ok(items)
}

/// Loads an item pool from a JSON file.
#[instrument(skip(path), fields(path = %path.as_ref().display()))]
pub fn load_items(path: impl AsRef<Path>) -> Result<Vec<Item>, ItemError> {
    let content = std::fs::read_to_string(path.as_ref())
        .map_err(|e| ItemError::new(format!("Failed to read item file: {}", e)))?;
    let items = parse_items(&content)?;
    info!(count = items.len(), "Item pool loaded");
    Ok(items)
}

/// Item ingestion error.
#[derive(Debug, Clone, Display, Error)]
#[display("Item error: {} at {}:{}", message, file, line)]
pub struct ItemError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ItemError {
    /// Creates a new item error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_is_first_field() {
        let item = Item::new([("Card", "Bolt"), ("Cost", "R")]);
        assert_eq!(item.label(), "Bolt");
        assert_eq!(item.get("Cost"), Some("R"));
        assert_eq!(item.details(), "Card - Bolt, Cost - R");
    }

    #[test]
    fn parse_keeps_key_order_and_stringifies() {
        let items = parse_items(r#"[{"Name": "Giant", "Power": 4, "Rare": true}]"#)
            .expect("Valid items");
        let names: Vec<_> = items[0].fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["Name", "Power", "Rare"]);
        assert_eq!(items[0].get("Power"), Some("4"));
    }

    #[test]
    fn nested_values_are_rejected() {
        let result = parse_items(r#"[{"Name": "Giant", "Tags": ["big"]}]"#);
        assert!(result.is_err());
    }
}
