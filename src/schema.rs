use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DATE_KEY: &str = "Date";
pub const TOTAL_KEY: &str = "Total";

/// One row of the source sheet before any cleaning.
/// Headers are kept exactly as they were read (BOMs, padding and all).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub cells: Vec<(String, Option<String>)>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder helper used heavily by tests and uploads.
    pub fn with_cell(mut self, header: impl Into<String>, value: impl Into<String>) -> Self {
        self.cells.push((header.into(), Some(value.into())));
        self
    }

    pub fn with_absent(mut self, header: impl Into<String>) -> Self {
        self.cells.push((header.into(), None));
        self
    }
}

/// A cleaned cell. Numbers are the common case; anything that fails numeric
/// coercion is kept verbatim rather than treated as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Arithmetic view of the cell. Text cells count as zero.
    pub fn as_number(&self) -> f64 {
        match self {
            CellValue::Number(n) => *n,
            CellValue::Text(_) => 0.0,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, CellValue::Text(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub date: NaiveDate,
    /// Every non-date column in header order, `Total` included when present.
    pub fields: Vec<(String, CellValue)>,
}

impl NormalizedRecord {
    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    /// Numeric value of a column; missing or text cells contribute 0.
    pub fn number(&self, key: &str) -> f64 {
        self.get(key).map(CellValue::as_number).unwrap_or(0.0)
    }

    pub fn total(&self) -> Option<&CellValue> {
        self.get(TOTAL_KEY)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MonthlyAggregate {
    /// `YYYY-MM`
    pub month: String,
    /// Rounded average per branch, keyed by branch id. Every value is a multiple of 5.
    pub branches: BTreeMap<String, f64>,
    #[serde(rename = "Total")]
    pub total: f64,
}

impl MonthlyAggregate {
    pub fn value(&self, branch: &str) -> f64 {
        self.branches.get(branch).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DailyWindowEntry {
    pub date: NaiveDate,
    pub branches: BTreeMap<String, f64>,
    #[serde(rename = "Total")]
    pub total: f64,
}

impl DailyWindowEntry {
    pub fn value(&self, branch: &str) -> f64 {
        self.branches.get(branch).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BranchScore {
    pub branch: Option<String>,
    pub avg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KpiSet {
    pub total_sales: f64,
    pub percent_growth: f64,
    pub best: BranchScore,
    pub worst: BranchScore,
}

impl Default for KpiSet {
    fn default() -> Self {
        Self {
            total_sales: 0.0,
            percent_growth: 0.0,
            best: BranchScore {
                branch: None,
                avg: 0.0,
            },
            worst: BranchScore {
                branch: None,
                avg: 0.0,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CommentaryLine {
    pub text: String,
    pub branch: Option<String>,
    pub number: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyKind {
    Spike,
    Drop,
    Zero,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Anomaly {
    #[serde(rename = "type")]
    pub kind: AnomalyKind,
    pub branch: String,
    pub date: NaiveDate,
    /// Relative day-over-day change, e.g. `0.3` for +30%.
    pub change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub branch_a: String,
    pub branch_b: String,
    pub month: String,
    pub value_a: f64,
    pub value_b: f64,
    pub percent_diff: f64,
    pub narrative: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    #[schemars(description = "Monthly rounded averages, one point per calendar month")]
    Averages,

    #[schemars(description = "Raw daily values over the trailing day window")]
    Totals,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ar,
}
