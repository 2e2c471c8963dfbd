use crate::catalog::BranchCatalog;
use crate::schema::{ComparisonResult, Locale, MonthlyAggregate};
use crate::utils::round_half_up;
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which month and which two branches to put side by side. Every field falls
/// back to a default: the latest month and the first two catalog branches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ComparisonSelection {
    #[schemars(description = "Month key (YYYY-MM). Defaults to the latest month")]
    #[serde(default)]
    pub month: Option<String>,

    #[schemars(description = "First branch id. Defaults to the first catalog branch")]
    #[serde(default)]
    pub branch_a: Option<String>,

    #[schemars(description = "Second branch id. Defaults to the second catalog branch")]
    #[serde(default)]
    pub branch_b: Option<String>,
}

/// `(a - b) / b` in whole percent, zero when `b` is zero.
pub fn percent_difference(value_a: f64, value_b: f64) -> f64 {
    if value_b == 0.0 {
        0.0
    } else {
        round_half_up((value_a - value_b) / value_b * 100.0)
    }
}

fn narrative(
    branch_a: &str,
    branch_b: &str,
    value_a: f64,
    value_b: f64,
    month: &str,
    locale: Locale,
) -> String {
    if value_a == value_b {
        return match locale {
            Locale::En => format!(
                "{} and {} are level in {} with no difference",
                branch_a, branch_b, month
            ),
            Locale::Ar => format!("لا يوجد فرق بين {} و {} في {}", branch_a, branch_b, month),
        };
    }

    let (leader, trailer, high, low) = if value_a > value_b {
        (branch_a, branch_b, value_a, value_b)
    } else {
        (branch_b, branch_a, value_b, value_a)
    };
    let gap = high - low;
    let lead_pct = percent_difference(high, low);

    match locale {
        Locale::En if low != 0.0 => format!(
            "{} leads {} by {} ({}%) in {}",
            leader, trailer, gap, lead_pct, month
        ),
        Locale::En => format!("{} leads {} by {} in {}", leader, trailer, gap, month),
        Locale::Ar => format!(
            "{} يتفوق على {} بفارق {} في {}",
            leader, trailer, gap, month
        ),
    }
}

/// Compares two branches within one month of aggregates.
///
/// Returns `None` only when there is nothing to compare: no months or no
/// branches. An unknown month falls back to the latest one; an unknown branch
/// reads as zero.
pub fn compare_branches(
    aggregates: &[MonthlyAggregate],
    catalog: &BranchCatalog,
    selection: &ComparisonSelection,
    locale: Locale,
) -> Option<ComparisonResult> {
    let latest = aggregates.last()?;
    let first = catalog.get(0)?;

    let aggregate = match selection.month.as_deref() {
        Some(month) => aggregates
            .iter()
            .find(|a| a.month == month)
            .unwrap_or_else(|| {
                debug!("Month {} not in aggregates, comparing {}", month, latest.month);
                latest
            }),
        None => latest,
    };

    let branch_a = selection.branch_a.as_deref().unwrap_or(first);
    let branch_b = selection
        .branch_b
        .as_deref()
        .or_else(|| catalog.get(1))
        .unwrap_or(first);

    let value_a = aggregate.value(branch_a);
    let value_b = aggregate.value(branch_b);

    Some(ComparisonResult {
        branch_a: branch_a.to_string(),
        branch_b: branch_b.to_string(),
        month: aggregate.month.clone(),
        value_a,
        value_b,
        percent_diff: percent_difference(value_a, value_b),
        narrative: narrative(branch_a, branch_b, value_a, value_b, &aggregate.month, locale),
    })
}
