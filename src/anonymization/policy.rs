//! Policies and built-in profiles
//!
//! A [`Policy`] is an ordered, validated list of [`Rule`]s. Policies come
//! from the built-in profiles, from `[[anonymization.rules]]` in the config
//! file, or from both.

use super::action::{Action, Rule, RuleSpec};
use crate::domain::errors::PolicyError;
use std::collections::HashSet;

/// Names of the built-in profiles
pub const PROFILE_NAMES: [&str; 2] = ["basic", "clean_descriptors"];

/// Validated, ordered rule list
#[derive(Debug, Clone, PartialEq)]
pub struct Policy {
    name: String,
    rules: Vec<Rule>,
}

impl Policy {
    /// Build a policy, rejecting it as a whole if any rule is invalid
    pub fn new(name: impl Into<String>, rules: Vec<Rule>) -> Result<Self, PolicyError> {
        let policy = Self {
            name: name.into(),
            rules,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Build a policy from configuration rules
    pub fn from_specs(name: impl Into<String>, specs: &[RuleSpec]) -> Result<Self, PolicyError> {
        let rules = specs
            .iter()
            .enumerate()
            .map(|(index, spec)| spec.to_rule(index))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(name, rules)
    }

    /// Check every rule; the first failure is returned
    pub fn validate(&self) -> Result<(), PolicyError> {
        for (index, rule) in self.rules.iter().enumerate() {
            if rule.field.trim().is_empty() {
                return Err(PolicyError::EmptyFieldId { index });
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn contains_hash(&self) -> bool {
        self.rules.iter().any(|rule| rule.action == Action::Hash)
    }

    /// Concatenate `other` after `self`, keeping the first rule per field
    pub fn merged_with(&self, other: &Policy) -> Policy {
        let name = match (self.is_empty(), other.is_empty()) {
            (true, _) => other.name.clone(),
            (false, true) => self.name.clone(),
            (false, false) => format!("{}+{}", self.name, other.name),
        };
        Policy {
            name,
            rules: dedup_first(self.rules.iter().chain(other.rules.iter())),
        }
    }
}

/// Built-in profile by name
pub fn profile(name: &str) -> Result<Policy, PolicyError> {
    let rules = match name.trim().to_lowercase().as_str() {
        "basic" => vec![
            Rule::remove("PatientName"),
            Rule::hash("PatientID"),
            Rule::remove("PatientBirthDate"),
            Rule::empty("StudyDate"),
            Rule::empty("StudyTime"),
            Rule::hash("StudyInstanceUID"),
            Rule::hash("SeriesInstanceUID"),
        ],
        "clean_descriptors" => vec![
            Rule::remove("AccessionNumber"),
            Rule::remove("StudyDescription"),
            Rule::remove("SeriesDescription"),
        ],
        _ => return Err(PolicyError::UnknownProfile(name.to_string())),
    };
    Policy::new(name.trim().to_lowercase(), rules)
}

/// Merge profiles in order; the first rule per field wins
pub fn merge_profiles<S: AsRef<str>>(names: &[S]) -> Result<Policy, PolicyError> {
    let profiles = names
        .iter()
        .map(|name| profile(name.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    let name = profiles
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join("+");
    let rules = dedup_first(profiles.iter().flat_map(|p| p.rules.iter()));
    Policy::new(name, rules)
}

fn dedup_first<'a>(rules: impl Iterator<Item = &'a Rule>) -> Vec<Rule> {
    let mut seen = HashSet::new();
    rules
        .filter(|rule| seen.insert(rule.field.clone()))
        .cloned()
        .collect()
}
