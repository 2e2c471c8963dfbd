use crate::schema::{NormalizedRecord, DATE_KEY, TOTAL_KEY};
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const FALLBACK_COLOR: &str = "#8884D8";

/// The branch dimensions of one dataset snapshot, in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchCatalog {
    branches: Vec<String>,
}

impl BranchCatalog {
    /// Resolves the catalog from the first record of a dataset. Every key other
    /// than `Date`, `Total` and blanks is a branch.
    pub fn from_records(records: &[NormalizedRecord]) -> Self {
        let catalog = match records.first() {
            Some(sample) => Self::from_keys(sample.fields.iter().map(|(k, _)| k.as_str())),
            None => Self::default(),
        };

        debug!("Resolved {} branches: {:?}", catalog.len(), catalog.branches);
        catalog
    }

    pub fn from_keys<'a, I>(keys: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut branches: Vec<String> = Vec::new();

        for key in keys {
            if key.trim().is_empty() || key == DATE_KEY || key == TOTAL_KEY {
                continue;
            }
            if !branches.iter().any(|b| b == key) {
                branches.push(key.to_string());
            }
        }

        Self { branches }
    }

    pub fn branches(&self) -> &[String] {
        &self.branches
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.branches.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    pub fn contains(&self, branch: &str) -> bool {
        self.branches.iter().any(|b| b == branch)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.branches.get(index).map(String::as_str)
    }

    /// Sum of the catalog branches of one record, text cells counting as zero.
    pub fn sum_record(&self, record: &NormalizedRecord) -> f64 {
        self.iter().map(|b| record.number(b)).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BranchMetadata {
    #[schemars(description = "Label shown for the branch, e.g. a localized name")]
    pub display_name: String,

    #[schemars(description = "Series color in #RRGGBB form")]
    pub color: String,
}

/// Display metadata for branches, keyed by the ids the catalog resolves.
/// Handed to presentation code explicitly; ids without an entry fall back to
/// the id itself and a neutral color.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct BranchDirectory {
    entries: BTreeMap<String, BranchMetadata>,
}

impl BranchDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_branch(
        mut self,
        id: impl Into<String>,
        display_name: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        self.entries.insert(
            id.into(),
            BranchMetadata {
                display_name: display_name.into(),
                color: color.into(),
            },
        );
        self
    }

    pub fn get(&self, id: &str) -> Option<&BranchMetadata> {
        self.entries.get(id)
    }

    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.entries
            .get(id)
            .map(|m| m.display_name.as_str())
            .unwrap_or(id)
    }

    pub fn color<'a>(&'a self, id: &str) -> &'a str {
        self.entries
            .get(id)
            .map(|m| m.color.as_str())
            .unwrap_or(FALLBACK_COLOR)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BranchMetadata)> {
        self.entries.iter()
    }

    /// Catalog branches that have no display metadata.
    pub fn missing_from(&self, catalog: &BranchCatalog) -> Vec<String> {
        catalog
            .iter()
            .filter(|b| !self.entries.contains_key(*b))
            .map(str::to_string)
            .collect()
    }
}
