//! Record model
//!
//! A [`Record`] is an ordered mapping from field identifier to [`FieldValue`].
//! Every read classifies the field once into a [`FieldState`]
//! (absent / empty / present), and that state is what the scorer, the action
//! engine and the diff reason about.
//!
//! # Examples
//!
//! ```
//! use phi_guard::domain::{FieldState, FieldValue, Record};
//!
//! let mut record = Record::new();
//! record.insert("PatientName", "John^Doe");
//! record.insert("PatientID", "  ");
//! record.insert("StudyDate", FieldValue::Null);
//!
//! assert_eq!(record.field("PatientName").state, FieldState::Present);
//! assert_eq!(record.field("PatientID").state, FieldState::Empty);
//! assert_eq!(record.field("StudyDate").state, FieldState::Empty);
//! assert_eq!(record.field("PatientBirthDate").state, FieldState::Absent);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Values that mean "already anonymized" (compared case-insensitively)
pub const PLACEHOLDERS: [&str; 3] = ["anonymous", "anonymized", "n/a"];

/// Separator for multi-valued elements
pub const MULTI_VALUE_SEPARATOR: &str = "\\";

/// Three-way presence state of a field
///
/// Ordered by strength: `Absent < Empty < Present`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldState {
    /// Key not in the record
    Absent,
    /// Key present; value empty, whitespace-only or a placeholder
    Empty,
    /// Key present with a real value
    Present,
}

impl FieldState {
    /// Classify an optional value
    pub fn classify(value: Option<&FieldValue>) -> Self {
        match value {
            None => Self::Absent,
            Some(FieldValue::Sequence(items)) if items.is_empty() => Self::Empty,
            Some(FieldValue::Sequence(_)) => Self::Present,
            Some(v) => match v.normalized() {
                Some(text) => Self::classify_text(&text),
                None => Self::Empty,
            },
        }
    }

    /// Classify an already-normalized string
    pub fn classify_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() || is_placeholder(trimmed) {
            Self::Empty
        } else {
            Self::Present
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl fmt::Display for FieldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "absent"),
            Self::Empty => write!(f, "empty"),
            Self::Present => write!(f, "present"),
        }
    }
}

/// Returns true for `anonymous`, `anonymized` and `n/a` in any case
pub fn is_placeholder(value: &str) -> bool {
    let trimmed = value.trim();
    PLACEHOLDERS
        .iter()
        .any(|placeholder| trimmed.eq_ignore_ascii_case(placeholder))
}

/// Value stored under a field identifier
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Element present without a value
    Null,
    /// Decoded text value
    Text(String),
    /// Decoded numeric value
    Number(f64),
    /// Multi-valued element
    Multi(Vec<String>),
    /// Raw, not-yet-decoded element bytes
    Bytes(Vec<u8>),
    /// Nested sub-records. Not analyzed by any component.
    Sequence(Vec<Record>),
}

impl FieldValue {
    /// Normalized string form used for classification and comparison
    ///
    /// Strips surrounding whitespace and NUL padding, maps `Null` to `""`,
    /// renders numbers canonically (`1.0` and `1` agree) and decodes raw
    /// bytes as UTF-8. Returns `None` for sequences.
    pub fn normalized(&self) -> Option<String> {
        match self {
            Self::Null => Some(String::new()),
            Self::Text(text) => Some(trim_padding(text).to_string()),
            Self::Number(n) => Some(canonical_number(*n)),
            Self::Multi(values) => Some(
                values
                    .iter()
                    .map(|v| trim_padding(v))
                    .collect::<Vec<_>>()
                    .join(MULTI_VALUE_SEPARATOR),
            ),
            Self::Bytes(bytes) => Some(trim_padding(&String::from_utf8_lossy(bytes)).to_string()),
            Self::Sequence(_) => None,
        }
    }

    /// Numeric view of a decoded number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, Self::Sequence(_))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Vec<Record>> for FieldValue {
    fn from(items: Vec<Record>) -> Self {
        Self::Sequence(items)
    }
}

fn trim_padding(value: &str) -> &str {
    value.trim_matches(|c: char| c.is_whitespace() || c == '\0')
}

fn canonical_number(n: f64) -> String {
    if n == 0.0 {
        "0".to_string()
    } else {
        format!("{n}")
    }
}

/// A field read from a record, classified once
#[derive(Debug, Clone, Copy)]
pub struct FieldView<'a> {
    pub id: &'a str,
    pub value: Option<&'a FieldValue>,
    pub state: FieldState,
}

impl<'a> FieldView<'a> {
    pub fn is_sequence(&self) -> bool {
        self.value.is_some_and(FieldValue::is_sequence)
    }

    pub fn normalized(&self) -> Option<String> {
        self.value.and_then(FieldValue::normalized)
    }
}

/// Ordered mapping from field identifier to value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a field, returning the previous value
    pub fn insert(
        &mut self,
        id: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        self.fields.insert(id.into(), value.into())
    }

    pub fn remove(&mut self, id: &str) -> Option<FieldValue> {
        self.fields.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&FieldValue> {
        self.fields.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.fields.contains_key(id)
    }

    /// Read and classify a field
    pub fn field<'a>(&'a self, id: &'a str) -> FieldView<'a> {
        match self.fields.get_key_value(id) {
            Some((key, value)) => FieldView {
                id: key.as_str(),
                value: Some(value),
                state: FieldState::classify(Some(value)),
            },
            None => FieldView {
                id,
                value: None,
                state: FieldState::Absent,
            },
        }
    }

    /// All fields in identifier order, classified
    pub fn views(&self) -> impl Iterator<Item = FieldView<'_>> {
        self.fields.iter().map(|(id, value)| FieldView {
            id: id.as_str(),
            value: Some(value),
            state: FieldState::classify(Some(value)),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    pub fn field_ids(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// True when the field holds nested sub-records
    pub fn is_sequence(&self, id: &str) -> bool {
        self.fields.get(id).is_some_and(FieldValue::is_sequence)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
