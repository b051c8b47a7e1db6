//! JSON record provider
//!
//! A record is a JSON object keyed by field identifier:
//!
//! ```json
//! {
//!   "PatientName": "Doe^John",
//!   "PatientID": "12345",
//!   "PatientWeight": 72.5,
//!   "ImageType": ["ORIGINAL", "PRIMARY"],
//!   "StudyTime": null,
//!   "ReferencedStudySequence": [{ "ReferencedSOPInstanceUID": "1.2.3" }]
//! }
//! ```
//!
//! `null` → `Null`, string → `Text`, number → `Number`, bool → `Text`,
//! array of scalars → `Multi`, array of objects → `Sequence`.

use super::traits::{RecordSink, RecordSource};
use crate::domain::errors::PhiGuardError;
use crate::domain::record::{FieldValue, Record};
use crate::domain::Result;
use serde_json::{Map, Number, Value};
use std::path::Path;

/// Reads and writes records as JSON objects
#[derive(Debug, Clone, Default)]
pub struct JsonRecordProvider {
    pretty: bool,
}

impl JsonRecordProvider {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }

    /// Parse a record from JSON text
    pub fn parse(&self, content: &str) -> Result<Record> {
        let value: Value = serde_json::from_str(content)?;
        record_from_value(&value, "$")
    }

    /// Render a record as JSON text
    pub fn render(&self, record: &Record) -> Result<String> {
        let value = record_to_value(record);
        let text = if self.pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        Ok(text)
    }
}

impl RecordSource for JsonRecordProvider {
    fn read_record(&self, path: &Path) -> Result<Record> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PhiGuardError::Io(format!("Failed to read record {}: {e}", path.display()))
        })?;
        let record = self.parse(&content)?;
        tracing::debug!(path = %path.display(), fields = record.len(), "Record loaded");
        Ok(record)
    }
}

impl RecordSink for JsonRecordProvider {
    fn write_record(&self, record: &Record, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let text = self.render(record)?;
        std::fs::write(path, text).map_err(|e| {
            PhiGuardError::Io(format!("Failed to write record {}: {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), fields = record.len(), "Record written");
        Ok(())
    }
}

fn record_from_value(value: &Value, location: &str) -> Result<Record> {
    let Value::Object(map) = value else {
        return Err(PhiGuardError::Record(format!(
            "{location}: expected a JSON object of fields"
        )));
    };

    map.iter()
        .map(|(id, value)| {
            let path = format!("{location}.{id}");
            field_from_value(value, &path).map(|field| (id.clone(), field))
        })
        .collect()
}

fn field_from_value(value: &Value, location: &str) -> Result<FieldValue> {
    match value {
        Value::Null => Ok(FieldValue::Null),
        Value::String(s) => Ok(FieldValue::Text(s.clone())),
        Value::Bool(b) => Ok(FieldValue::Text(b.to_string())),
        Value::Number(n) => n.as_f64().map(FieldValue::Number).ok_or_else(|| {
            PhiGuardError::Record(format!("{location}: number out of range"))
        }),
        Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_object) => {
            let records = items
                .iter()
                .enumerate()
                .map(|(i, item)| record_from_value(item, &format!("{location}[{i}]")))
                .collect::<Result<Vec<_>>>()?;
            Ok(FieldValue::Sequence(records))
        }
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                Value::Number(n) => Ok(n.to_string()),
                Value::Bool(b) => Ok(b.to_string()),
                Value::Null => Ok(String::new()),
                _ => Err(PhiGuardError::Record(format!(
                    "{location}: arrays must hold only scalars or only objects"
                ))),
            })
            .collect::<Result<Vec<_>>>()
            .map(FieldValue::Multi),
        Value::Object(_) => Err(PhiGuardError::Record(format!(
            "{location}: nested objects must be wrapped in an array (sequence)"
        ))),
    }
}

fn record_to_value(record: &Record) -> Value {
    let map: Map<String, Value> = record
        .iter()
        .map(|(id, value)| (id.clone(), field_to_value(value)))
        .collect();
    Value::Object(map)
}

fn field_to_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::Text(s) => Value::String(s.clone()),
        FieldValue::Number(n) => Number::from_f64(*n)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(n.to_string())),
        FieldValue::Multi(values) => {
            Value::Array(values.iter().cloned().map(Value::String).collect())
        }
        FieldValue::Bytes(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        FieldValue::Sequence(items) => Value::Array(items.iter().map(record_to_value).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::FieldState;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"{
        "PatientName": "Doe^John",
        "PatientWeight": 72.5,
        "ImageType": ["ORIGINAL", "PRIMARY"],
        "StudyTime": null,
        "ReferencedStudySequence": [{ "ReferencedSOPInstanceUID": "1.2.3" }]
    }"#;

    #[test]
    fn test_parse_value_kinds() {
        let record = JsonRecordProvider::new().parse(SAMPLE).unwrap();
        assert_eq!(record.get("PatientName"), Some(&FieldValue::from("Doe^John")));
        assert_eq!(record.get("PatientWeight"), Some(&FieldValue::Number(72.5)));
        assert_eq!(
            record.get("ImageType").and_then(FieldValue::normalized).unwrap(),
            "ORIGINAL\\PRIMARY"
        );
        assert_eq!(record.field("StudyTime").state, FieldState::Empty);
        assert!(record.is_sequence("ReferencedStudySequence"));
    }

    #[test]
    fn test_non_object_rejected() {
        let err = JsonRecordProvider::new().parse("[1, 2]").unwrap_err();
        assert!(matches!(err, PhiGuardError::Record(_)));
    }

    #[test]
    fn test_nested_object_rejected_with_location() {
        let err = JsonRecordProvider::new()
            .parse(r#"{"PatientName": {"family": "Doe"}}"#)
            .unwrap_err();
        assert!(err.to_string().contains("$.PatientName"));
    }

    #[test]
    fn test_write_then_read_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("record.json");
        let provider = JsonRecordProvider::new();
        let record = provider.parse(SAMPLE).unwrap();

        provider.write_record(&record, &path).unwrap();
        let reread = provider.read_record(&path).unwrap();
        assert_eq!(reread, record);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = JsonRecordProvider::new()
            .read_record(Path::new("/nonexistent/record.json"))
            .unwrap_err();
        assert!(matches!(err, PhiGuardError::Io(_)));
    }
}
