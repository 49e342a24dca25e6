//! Legacy static source table (`LOG_GROUPS_CONFIG`).
//!
//! Maps a log source identifier to its display name and filter pattern.

use std::collections::BTreeMap;

use serde::Deserialize;

/// One configured log source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceTableEntry {
    pub display_name: String,
    #[serde(default)]
    pub filter_pattern: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Static mapping from source identifier to entry, iterated in identifier order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SourceTable {
    entries: BTreeMap<String, SourceTableEntry>,
}

impl SourceTable {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn insert(mut self, source_id: impl Into<String>, entry: SourceTableEntry) -> Self {
        self.entries.insert(source_id.into(), entry);
        self
    }

    pub fn get(&self, source_id: &str) -> Option<&SourceTableEntry> {
        self.entries.get(source_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SourceTableEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
