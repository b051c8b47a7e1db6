//! Field-by-field comparison of two record versions
//!
//! Transitions over the three-way state:
//!
//! | before        | after         | transition     |
//! |---------------|---------------|----------------|
//! | absent        | empty/present | `added`        |
//! | empty/present | absent        | `removed`      |
//! | non-absent    | non-absent    | `changed` / `unchanged` by normalized value |
//! | absent        | absent        | `still_absent` |
//!
//! The universe is every identifier of either record plus every registry
//! identifier with non-zero base risk. Sequence fields are listed under
//! `not_analyzed`.

use super::normalize::values_equal;
use crate::domain::record::{FieldState, FieldView, Record};
use crate::risk::registry::TagRegistry;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Write};
use std::sync::Arc;

/// Classified state transition of one field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Added,
    Removed,
    Changed,
    Unchanged,
    StillAbsent,
}

impl Transition {
    pub fn classify(before: FieldState, after: FieldState, values_equal: bool) -> Self {
        match (before.is_absent(), after.is_absent()) {
            (true, true) => Transition::StillAbsent,
            (true, false) => Transition::Added,
            (false, true) => Transition::Removed,
            (false, false) if values_equal => Transition::Unchanged,
            (false, false) => Transition::Changed,
        }
    }

    /// Reverse-direction counterpart
    pub fn inverse(&self) -> Self {
        match self {
            Transition::Added => Transition::Removed,
            Transition::Removed => Transition::Added,
            other => *other,
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Added => write!(f, "added"),
            Transition::Removed => write!(f, "removed"),
            Transition::Changed => write!(f, "changed"),
            Transition::Unchanged => write!(f, "unchanged"),
            Transition::StillAbsent => write!(f, "still_absent"),
        }
    }
}

/// Diff entry for one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDelta {
    pub field: String,
    pub transition: Transition,
    pub before_state: FieldState,
    pub after_state: FieldState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_value: Option<String>,
}

/// Sequence field seen but not compared
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotAnalyzed {
    pub field: String,
    pub before_state: FieldState,
    pub after_state: FieldState,
}

/// Number of fields per transition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaCounts {
    pub added: usize,
    pub removed: usize,
    pub changed: usize,
    pub unchanged: usize,
    pub still_absent: usize,
    pub not_analyzed: usize,
}

/// Classified delta between two records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    /// Sorted by field identifier
    pub fields: Vec<FieldDelta>,
    pub not_analyzed: Vec<NotAnalyzed>,
}

impl Delta {
    pub fn get(&self, field: &str) -> Option<&FieldDelta> {
        self.fields
            .binary_search_by(|entry| entry.field.as_str().cmp(field))
            .ok()
            .map(|index| &self.fields[index])
    }

    pub fn transition(&self, field: &str) -> Option<Transition> {
        self.get(field).map(|entry| entry.transition)
    }

    /// Sequence entry for `field`, when it was routed to `not_analyzed`
    pub fn sequence(&self, field: &str) -> Option<&NotAnalyzed> {
        self.not_analyzed.iter().find(|entry| entry.field == field)
    }

    pub fn with_transition(&self, transition: Transition) -> impl Iterator<Item = &FieldDelta> {
        self.fields
            .iter()
            .filter(move |entry| entry.transition == transition)
    }

    pub fn counts(&self) -> DeltaCounts {
        let mut counts = DeltaCounts {
            not_analyzed: self.not_analyzed.len(),
            ..Default::default()
        };
        for entry in &self.fields {
            match entry.transition {
                Transition::Added => counts.added += 1,
                Transition::Removed => counts.removed += 1,
                Transition::Changed => counts.changed += 1,
                Transition::Unchanged => counts.unchanged += 1,
                Transition::StillAbsent => counts.still_absent += 1,
            }
        }
        counts
    }

    /// True when anything was added, removed or changed
    pub fn has_changes(&self) -> bool {
        let counts = self.counts();
        counts.added + counts.removed + counts.changed > 0
    }

    /// Human-readable rendering; `[=]` lines only with `show_unchanged`
    pub fn render(&self, show_unchanged: bool) -> String {
        let rule = "=".repeat(70);
        let counts = self.counts();
        let mut out = String::new();

        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "DATASET DIFF");
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(
            out,
            "Removed: {} | Changed: {} | Unchanged: {} | Added: {} | Still absent: {}",
            counts.removed, counts.changed, counts.unchanged, counts.added, counts.still_absent
        );

        let section = |out: &mut String, title: &str, transition: Transition, marker: &str| {
            let entries: Vec<&FieldDelta> = self.with_transition(transition).collect();
            if entries.is_empty() {
                return;
            }
            let _ = writeln!(out);
            let _ = writeln!(out, "{title}:");
            for entry in entries {
                match transition {
                    Transition::Changed => {
                        let _ = writeln!(out, "  {marker} {}:", entry.field);
                        let _ = writeln!(
                            out,
                            "      Before: {}",
                            entry.before_value.as_deref().unwrap_or("")
                        );
                        let _ = writeln!(
                            out,
                            "      After:  {}",
                            entry.after_value.as_deref().unwrap_or("")
                        );
                    }
                    Transition::Added => {
                        let _ = writeln!(
                            out,
                            "  {marker} {}: {}",
                            entry.field,
                            entry.after_value.as_deref().unwrap_or("")
                        );
                    }
                    _ => {
                        let _ = writeln!(
                            out,
                            "  {marker} {}: {}",
                            entry.field,
                            entry.before_value.as_deref().unwrap_or("")
                        );
                    }
                }
            }
        };

        section(&mut out, "REMOVED FIELDS", Transition::Removed, "[-]");
        section(&mut out, "CHANGED FIELDS", Transition::Changed, "[~]");
        section(&mut out, "ADDED FIELDS", Transition::Added, "[+]");
        if show_unchanged {
            section(&mut out, "UNCHANGED FIELDS", Transition::Unchanged, "[=]");
        }

        if !self.not_analyzed.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "NOT ANALYZED (sequences):");
            for entry in &self.not_analyzed {
                let _ = writeln!(
                    out,
                    "  [?] {}: {} -> {}",
                    entry.field, entry.before_state, entry.after_state
                );
            }
        }

        let _ = write!(out, "{rule}");
        out
    }
}

/// Diff engine over a shared registry
#[derive(Debug, Clone)]
pub struct DiffEngine {
    registry: Arc<TagRegistry>,
}

impl DiffEngine {
    pub fn new(registry: Arc<TagRegistry>) -> Self {
        Self { registry }
    }

    /// Classify every field transition from `before` to `after`
    pub fn compare(&self, before: &Record, after: &Record) -> Delta {
        let before_views = self.registry.canonical_views(before);
        let after_views = self.registry.canonical_views(after);

        let universe: BTreeSet<String> = before_views
            .keys()
            .chain(after_views.keys())
            .cloned()
            .chain(
                self.registry
                    .phi_identifiers()
                    .into_iter()
                    .map(str::to_string),
            )
            .collect();

        let mut fields = Vec::with_capacity(universe.len());
        let mut not_analyzed = Vec::new();

        for id in universe {
            let before_view = view_or_absent(&before_views, &id);
            let after_view = view_or_absent(&after_views, &id);
            let before_state = before_view.state;
            let after_state = after_view.state;

            if before_view.is_sequence() || after_view.is_sequence() {
                tracing::debug!(field = %id, "Sequence field not analyzed");
                not_analyzed.push(NotAnalyzed {
                    field: id.clone(),
                    before_state,
                    after_state,
                });
                continue;
            }

            let equal = match (before_view.value, after_view.value) {
                (Some(b), Some(a)) => values_equal(b, a),
                _ => false,
            };
            let before_value = before_view.normalized();
            let after_value = after_view.normalized();

            fields.push(FieldDelta {
                field: id.clone(),
                transition: Transition::classify(before_state, after_state, equal),
                before_state,
                after_state,
                before_value,
                after_value,
            });
        }

        let delta = Delta {
            fields,
            not_analyzed,
        };
        let counts = delta.counts();
        tracing::debug!(
            added = counts.added,
            removed = counts.removed,
            changed = counts.changed,
            unchanged = counts.unchanged,
            "Records compared"
        );
        delta
    }
}

fn view_or_absent<'a>(views: &BTreeMap<String, FieldView<'a>>, id: &'a str) -> FieldView<'a> {
    views.get(id).copied().unwrap_or(FieldView {
        id,
        value: None,
        state: FieldState::Absent,
    })
}
