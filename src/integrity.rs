use crate::catalog::BranchCatalog;
use crate::error::{Result, SalesInsightsError};
use crate::schema::MonthlyAggregate;
use crate::utils::{is_bucketed, parse_month_key, round_to_bucket};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub months_checked: usize,
    pub warnings: Vec<String>,
}

impl VerificationResult {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Checks the structural guarantees of a monthly aggregate sequence: bucketed
/// values, the double-rounded `Total`, and strictly ascending month keys.
pub struct AggregateVerifier<'a> {
    catalog: &'a BranchCatalog,
}

impl<'a> AggregateVerifier<'a> {
    pub fn new(catalog: &'a BranchCatalog) -> Self {
        Self { catalog }
    }

    /// Collects every problem as a warning.
    pub fn inspect(&self, aggregates: &[MonthlyAggregate]) -> VerificationResult {
        let mut result = VerificationResult {
            months_checked: aggregates.len(),
            warnings: Vec::new(),
        };

        for (idx, aggregate) in aggregates.iter().enumerate() {
            for detail in self.month_problems(aggregate) {
                result
                    .warnings
                    .push(format!("{}: {}", aggregate.month, detail));
            }

            if idx > 0 && aggregates[idx - 1].month >= aggregate.month {
                result.warnings.push(format!(
                    "{}: month key does not follow {}",
                    aggregate.month,
                    aggregates[idx - 1].month
                ));
            }
        }

        result
    }

    /// Fails on the first violation.
    pub fn verify(&self, aggregates: &[MonthlyAggregate]) -> Result<VerificationResult> {
        for (idx, aggregate) in aggregates.iter().enumerate() {
            if let Some(details) = self.month_problems(aggregate).into_iter().next() {
                return Err(SalesInsightsError::AggregateViolation {
                    month: aggregate.month.clone(),
                    details,
                });
            }

            if idx > 0 && aggregates[idx - 1].month >= aggregate.month {
                return Err(SalesInsightsError::AggregateViolation {
                    month: aggregate.month.clone(),
                    details: format!("month key does not follow {}", aggregates[idx - 1].month),
                });
            }
        }

        Ok(VerificationResult {
            months_checked: aggregates.len(),
            warnings: Vec::new(),
        })
    }

    fn month_problems(&self, aggregate: &MonthlyAggregate) -> Vec<String> {
        let mut problems = Vec::new();

        if parse_month_key(&aggregate.month).is_err() {
            problems.push("month key is not YYYY-MM".to_string());
        }

        for branch in self.catalog.iter() {
            let value = aggregate.value(branch);
            if !is_bucketed(value) {
                problems.push(format!("{} value {} is not a multiple of 5", branch, value));
            }
        }

        if !is_bucketed(aggregate.total) {
            problems.push(format!("Total {} is not a multiple of 5", aggregate.total));
        }

        let branch_sum: f64 = self.catalog.iter().map(|b| aggregate.value(b)).sum();
        let expected = round_to_bucket(branch_sum);
        if aggregate.total != expected {
            problems.push(format!(
                "Total {} does not match rounded branch sum {}",
                aggregate.total, expected
            ));
        }

        problems
    }
}

pub fn inspect_monthly_aggregates(
    aggregates: &[MonthlyAggregate],
    catalog: &BranchCatalog,
) -> VerificationResult {
    AggregateVerifier::new(catalog).inspect(aggregates)
}

pub fn verify_monthly_aggregates(
    aggregates: &[MonthlyAggregate],
    catalog: &BranchCatalog,
) -> Result<VerificationResult> {
    AggregateVerifier::new(catalog).verify(aggregates)
}
