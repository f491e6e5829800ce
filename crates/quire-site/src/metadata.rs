//! Document metadata parsed from the YAML header.

use serde_yaml::{Mapping, Value};

/// Error returned when a header block cannot be interpreted.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// Header is not valid YAML or is not a mapping.
    #[error("malformed header: {0}")]
    MalformedHeader(String),
}

/// Optional metadata fields of a document.
///
/// Unknown header keys are ignored. Fields with an unusable value are left
/// absent rather than failing the whole header.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DocumentMetadata {
    /// Display title.
    pub title: Option<String>,
    /// Short description shown on the index.
    pub description: Option<String>,
    /// Position hint for index ordering.
    pub order: Option<f64>,
}

impl DocumentMetadata {
    /// Parse metadata from raw header text.
    ///
    /// An empty header yields empty metadata.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::MalformedHeader`] if the header is not valid
    /// YAML or its top level is not a mapping.
    pub fn parse(header: &str) -> Result<Self, MetadataError> {
        let trimmed = header.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }

        let value: Value = serde_yaml::from_str(trimmed)
            .map_err(|e| MetadataError::MalformedHeader(format!("invalid YAML: {e}")))?;

        match value {
            Value::Null => Ok(Self::default()),
            Value::Mapping(mapping) => Ok(Self::from_mapping(&mapping)),
            other => Err(MetadataError::MalformedHeader(format!(
                "expected a mapping, found {}",
                value_kind(&other)
            ))),
        }
    }

    fn from_mapping(mapping: &Mapping) -> Self {
        Self {
            title: mapping.get("title").and_then(scalar_string),
            description: mapping.get("description").and_then(scalar_string),
            order: mapping.get("order").and_then(number),
        }
    }
}

/// Render a scalar as a string. Sequences, mappings and null are rejected.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Accept numbers and numeric strings. Non-finite values are rejected.
fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
