use crate::catalog::BranchCatalog;
use crate::schema::{BranchScore, KpiSet, MonthlyAggregate};
use crate::utils::percent_change;

fn branch_sum(aggregate: Option<&MonthlyAggregate>, catalog: &BranchCatalog) -> f64 {
    aggregate
        .map(|a| catalog.iter().map(|b| a.value(b)).sum())
        .unwrap_or(0.0)
}

/// Headline figures for the latest month against the one before it.
///
/// `best` and `worst` start from the first catalog branch and only move on a
/// strictly greater (or smaller) value, so ties stay with the branch listed
/// first.
pub fn calculate_kpis(aggregates: &[MonthlyAggregate], catalog: &BranchCatalog) -> KpiSet {
    let (Some(current), Some(first)) = (aggregates.last(), catalog.get(0)) else {
        return KpiSet::default();
    };
    let previous = aggregates.len().checked_sub(2).map(|i| &aggregates[i]);

    let total_sales = branch_sum(Some(current), catalog);
    let prev_total = branch_sum(previous, catalog);

    let mut best = BranchScore {
        branch: Some(first.to_string()),
        avg: current.value(first),
    };
    let mut worst = best.clone();

    for branch in catalog.iter() {
        let value = current.value(branch);
        if value > best.avg {
            best = BranchScore {
                branch: Some(branch.to_string()),
                avg: value,
            };
        }
        if value < worst.avg {
            worst = BranchScore {
                branch: Some(branch.to_string()),
                avg: value,
            };
        }
    }

    KpiSet {
        total_sales,
        percent_growth: percent_change(total_sales, prev_total),
        best,
        worst,
    }
}
