//! Anonymization actions and rules

use crate::domain::errors::PolicyError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a rule does to its field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "value", rename_all = "UPPERCASE")]
pub enum Action {
    /// Delete the key
    Remove,
    /// Replace the value with its keyed digest
    Hash,
    /// Set the value to a literal
    Replace(String),
    /// Set the value to an empty string
    Empty,
}

impl Action {
    pub const NAMES: [&'static str; 4] = ["REMOVE", "HASH", "REPLACE", "EMPTY"];

    /// Parse an action name (case-insensitive)
    ///
    /// `index` and `field` only feed the error so the caller can locate the
    /// rule.
    pub fn parse(
        name: &str,
        value: Option<&str>,
        index: usize,
        field: &str,
    ) -> Result<Self, PolicyError> {
        match name.trim().to_uppercase().as_str() {
            "REMOVE" => Ok(Action::Remove),
            "HASH" => Ok(Action::Hash),
            "EMPTY" => Ok(Action::Empty),
            "REPLACE" => value
                .map(|v| Action::Replace(v.to_string()))
                .ok_or_else(|| PolicyError::MissingReplacement {
                    index,
                    field: field.to_string(),
                }),
            _ => Err(PolicyError::UnknownAction {
                index,
                field: field.to_string(),
                action: name.to_string(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::Remove => "REMOVE",
            Action::Hash => "HASH",
            Action::Replace(_) => "REPLACE",
            Action::Empty => "EMPTY",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One field → action pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub field: String,
    #[serde(flatten)]
    pub action: Action,
}

impl Rule {
    pub fn new(field: impl Into<String>, action: Action) -> Self {
        Self {
            field: field.into(),
            action,
        }
    }

    pub fn remove(field: impl Into<String>) -> Self {
        Self::new(field, Action::Remove)
    }

    pub fn hash(field: impl Into<String>) -> Self {
        Self::new(field, Action::Hash)
    }

    pub fn replace(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, Action::Replace(value.into()))
    }

    pub fn empty(field: impl Into<String>) -> Self {
        Self::new(field, Action::Empty)
    }
}

/// Untyped rule as written in configuration
///
/// ```toml
/// [[anonymization.rules]]
/// field = "InstitutionName"
/// action = "replace"
/// value = "ANONYMIZED"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub field: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl RuleSpec {
    /// Typed rule; `index` is the rule's position in its policy
    pub fn to_rule(&self, index: usize) -> Result<Rule, PolicyError> {
        let field = self.field.trim();
        if field.is_empty() {
            return Err(PolicyError::EmptyFieldId { index });
        }
        let action = Action::parse(&self.action, self.value.as_deref(), index, field)?;
        Ok(Rule::new(field, action))
    }
}
