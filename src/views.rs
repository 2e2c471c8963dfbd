//! Presentation-facing shapes derived from aggregates: rankings, shares,
//! month navigation and chart series.

use crate::catalog::BranchCatalog;
use crate::schema::{DailyWindowEntry, MonthlyAggregate, ViewMode};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LeaderboardEntry {
    /// 1-based
    pub rank: usize,
    pub branch: String,
    pub value: f64,
}

/// Branches of one month ranked by value, highest first. Equal values keep
/// their catalog order.
pub fn leaderboard(aggregate: &MonthlyAggregate, catalog: &BranchCatalog) -> Vec<LeaderboardEntry> {
    let mut rows: Vec<(&str, f64)> = catalog.iter().map(|b| (b, aggregate.value(b))).collect();
    rows.sort_by(|a, b| b.1.total_cmp(&a.1));

    rows.into_iter()
        .enumerate()
        .map(|(idx, (branch, value))| LeaderboardEntry {
            rank: idx + 1,
            branch: branch.to_string(),
            value,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ShareSlice {
    pub branch: String,
    pub value: f64,
    /// Fraction of the month's branch sum, in `0.0..=1.0` for non-negative data.
    pub share: f64,
}

pub fn share_breakdown(aggregate: &MonthlyAggregate, catalog: &BranchCatalog) -> Vec<ShareSlice> {
    let sum: f64 = catalog.iter().map(|b| aggregate.value(b)).sum();

    catalog
        .iter()
        .map(|branch| {
            let value = aggregate.value(branch);
            ShareSlice {
                branch: branch.to_string(),
                value,
                share: if sum == 0.0 { 0.0 } else { value / sum },
            }
        })
        .collect()
}

/// Position within a month sequence. Always clamped to the sequence bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCursor {
    index: usize,
    len: usize,
}

impl MonthCursor {
    /// Starts at the latest month.
    pub fn latest(len: usize) -> Self {
        Self {
            index: len.saturating_sub(1),
            len,
        }
    }

    pub fn at(index: usize, len: usize) -> Self {
        Self {
            index: index.min(len.saturating_sub(1)),
            len,
        }
    }

    /// Explicit index when given, the latest month otherwise.
    pub fn from_selection(selection: Option<usize>, len: usize) -> Self {
        match selection {
            Some(index) => Self::at(index, len),
            None => Self::latest(len),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn previous(self) -> Self {
        Self {
            index: self.index.saturating_sub(1),
            ..self
        }
    }

    pub fn next(self) -> Self {
        Self::at(self.index + 1, self.len)
    }

    pub fn select<'a>(&self, aggregates: &'a [MonthlyAggregate]) -> Option<&'a MonthlyAggregate> {
        aggregates.get(self.index)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ChartSeries {
    Averages { points: Vec<MonthlyAggregate> },
    Totals { points: Vec<DailyWindowEntry> },
}

impl ChartSeries {
    pub fn x_key(&self) -> &'static str {
        match self {
            ChartSeries::Averages { .. } => "month",
            ChartSeries::Totals { .. } => "date",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ChartSeries::Averages { points } => points.len(),
            ChartSeries::Totals { points } => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn select_series(
    mode: ViewMode,
    monthly: &[MonthlyAggregate],
    window: &[DailyWindowEntry],
) -> ChartSeries {
    match mode {
        ViewMode::Averages => ChartSeries::Averages {
            points: monthly.to_vec(),
        },
        ViewMode::Totals => ChartSeries::Totals {
            points: window.to_vec(),
        },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

/// One branch's line in the chosen view mode.
pub fn branch_series(
    branch: &str,
    mode: ViewMode,
    monthly: &[MonthlyAggregate],
    window: &[DailyWindowEntry],
) -> Vec<SeriesPoint> {
    match mode {
        ViewMode::Averages => monthly
            .iter()
            .map(|m| SeriesPoint {
                label: m.month.clone(),
                value: m.value(branch),
            })
            .collect(),
        ViewMode::Totals => window
            .iter()
            .map(|d| SeriesPoint {
                label: d.date.format("%Y-%m-%d").to_string(),
                value: d.value(branch),
            })
            .collect(),
    }
}
