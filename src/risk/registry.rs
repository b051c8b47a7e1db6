//! Tag registry
//!
//! Static mapping from field identifier to inherent sensitivity and risk
//! category. The registry is built once (from the embedded TOML or a custom
//! file) and shared read-only by the scorer, the action engine and the diff.

use crate::domain::errors::PhiGuardError;
use crate::domain::record::{FieldView, Record};
use crate::domain::result::Result;
use crate::domain::tag::TagNumber;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Base risk assigned to identifiers the registry does not know
pub const UNKNOWN_BASE_RISK: f64 = 0.0;

/// Upper bound of the base-risk scale
pub const MAX_BASE_RISK: f64 = 5.0;

/// Risk category; each category carries one tunable multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Name,
    Id,
    Date,
    Time,
    Uid,
    Descriptor,
    Unknown,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 7] = [
        RiskCategory::Name,
        RiskCategory::Id,
        RiskCategory::Date,
        RiskCategory::Time,
        RiskCategory::Uid,
        RiskCategory::Descriptor,
        RiskCategory::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Name => "name",
            RiskCategory::Id => "id",
            RiskCategory::Date => "date",
            RiskCategory::Time => "time",
            RiskCategory::Uid => "uid",
            RiskCategory::Descriptor => "descriptor",
            RiskCategory::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskCategory {
    type Err = PhiGuardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(RiskCategory::Name),
            "id" => Ok(RiskCategory::Id),
            "date" => Ok(RiskCategory::Date),
            "time" => Ok(RiskCategory::Time),
            "uid" => Ok(RiskCategory::Uid),
            "descriptor" => Ok(RiskCategory::Descriptor),
            "unknown" => Ok(RiskCategory::Unknown),
            _ => Err(PhiGuardError::UnknownCategory(s.to_string())),
        }
    }
}

/// Sensitivity metadata for one field identifier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TagMeta {
    pub base_risk: f64,
    pub category: RiskCategory,
}

impl TagMeta {
    pub fn unknown() -> Self {
        Self {
            base_risk: UNKNOWN_BASE_RISK,
            category: RiskCategory::Unknown,
        }
    }

    pub fn is_phi(&self) -> bool {
        self.base_risk > 0.0
    }
}

/// Registry entry with display metadata
#[derive(Debug, Clone)]
pub struct TagEntry {
    pub keyword: String,
    pub tag: Option<TagNumber>,
    pub name: String,
    pub vr: Option<String>,
    pub meta: TagMeta,
}

/// Tag definition from TOML
#[derive(Debug, Clone, Deserialize)]
struct TagDefinition {
    tag: Option<String>,
    name: Option<String>,
    vr: Option<String>,
    base_risk: f64,
    category: String,
}

#[derive(Debug, Deserialize)]
struct TagLibrary {
    tags: BTreeMap<String, TagDefinition>,
}

/// Immutable field-identifier → sensitivity lookup
#[derive(Debug, Clone)]
pub struct TagRegistry {
    entries: HashMap<String, TagEntry>,
    keywords_by_tag: HashMap<TagNumber, String>,
}

impl TagRegistry {
    /// Load a registry from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            PhiGuardError::Configuration(format!(
                "Failed to read tag registry {}: {e}",
                path.as_ref().display()
            ))
        })?;

        Self::from_toml(&content)
    }

    /// Parse a registry from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let library: TagLibrary = toml::from_str(content)?;

        let mut entries = HashMap::with_capacity(library.tags.len());
        let mut keywords_by_tag = HashMap::new();

        for (keyword, def) in library.tags {
            let category = def.category.parse::<RiskCategory>().map_err(|_| {
                PhiGuardError::Configuration(format!(
                    "Invalid category in tag '{keyword}': {}",
                    def.category
                ))
            })?;

            if !def.base_risk.is_finite() || !(0.0..=MAX_BASE_RISK).contains(&def.base_risk) {
                return Err(PhiGuardError::Configuration(format!(
                    "Invalid base_risk in tag '{keyword}': {} (must be within 0-5)",
                    def.base_risk
                )));
            }

            let tag = match def.tag.as_deref() {
                Some(spelling) => {
                    let tag = spelling.parse::<TagNumber>().map_err(|e| {
                        PhiGuardError::Configuration(format!("Tag '{keyword}': {e}"))
                    })?;
                    keywords_by_tag.insert(tag, keyword.clone());
                    Some(tag)
                }
                None => None,
            };

            entries.insert(
                keyword.clone(),
                TagEntry {
                    name: def.name.unwrap_or_else(|| keyword.clone()),
                    keyword,
                    tag,
                    vr: def.vr,
                    meta: TagMeta {
                        base_risk: def.base_risk,
                        category,
                    },
                },
            );
        }

        Ok(Self {
            entries,
            keywords_by_tag,
        })
    }

    /// Registry with the built-in tag table
    pub fn builtin() -> Result<Self> {
        let default_toml = include_str!("../../tags/tag_registry.toml");
        Self::from_toml(default_toml)
    }

    /// Resolve a field identifier to the key every component compares on
    ///
    /// Known keywords are returned as-is. Tag-number spellings resolve to the
    /// keyword when the tag is registered, otherwise to `(GGGG,EEEE)`.
    pub fn canonical_id(&self, field_id: &str) -> String {
        if self.entries.contains_key(field_id) {
            return field_id.to_string();
        }
        match field_id.parse::<TagNumber>() {
            Ok(tag) => self
                .keywords_by_tag
                .get(&tag)
                .cloned()
                .unwrap_or_else(|| tag.to_string()),
            Err(_) => field_id.to_string(),
        }
    }

    /// Classified fields of `record` keyed by canonical identifier
    ///
    /// When two spellings resolve to the same identifier the one with the
    /// stronger state wins (present over empty), ties by record order.
    pub fn canonical_views<'a>(&self, record: &'a Record) -> BTreeMap<String, FieldView<'a>> {
        let mut views: BTreeMap<String, FieldView<'a>> = BTreeMap::new();
        for view in record.views() {
            match views.entry(self.canonical_id(view.id)) {
                Entry::Vacant(slot) => {
                    slot.insert(view);
                }
                Entry::Occupied(mut slot) => {
                    if view.state > slot.get().state {
                        slot.insert(view);
                    }
                }
            }
        }
        views
    }

    /// Every record key that resolves to `canonical`, in record order
    pub fn matching_keys<'a>(&self, record: &'a Record, canonical: &str) -> Vec<&'a str> {
        record
            .field_ids()
            .filter(|key| self.canonical_id(key) == canonical)
            .collect()
    }

    /// Metadata for an identifier; unknown identifiers get the default
    pub fn lookup(&self, field_id: &str) -> TagMeta {
        self.get(field_id)
            .map(|entry| entry.meta)
            .unwrap_or_else(TagMeta::unknown)
    }

    pub fn get(&self, field_id: &str) -> Option<&TagEntry> {
        self.entries
            .get(field_id)
            .or_else(|| self.entries.get(&self.canonical_id(field_id)))
    }

    pub fn is_known(&self, field_id: &str) -> bool {
        self.get(field_id).is_some()
    }

    /// Display name, falling back to the identifier itself
    pub fn display_name<'a>(&'a self, field_id: &'a str) -> &'a str {
        self.get(field_id)
            .map(|entry| entry.name.as_str())
            .unwrap_or(field_id)
    }

    /// Keywords with non-zero base risk, sorted
    pub fn phi_identifiers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .entries
            .values()
            .filter(|entry| entry.meta.is_phi())
            .map(|entry| entry.keyword.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
