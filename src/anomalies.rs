use crate::catalog::BranchCatalog;
use crate::schema::{Anomaly, AnomalyKind, DailyWindowEntry, NormalizedRecord};
use chrono::NaiveDate;
use log::debug;

/// Day-over-day rise above which a change counts as a spike (+20%).
pub const SPIKE_THRESHOLD: f64 = 0.2;
/// Day-over-day fall below which a change counts as a drop (-20%).
pub const DROP_THRESHOLD: f64 = -0.2;

/// Anything that can be read as one day of per-branch values.
pub trait DailyValues {
    fn day(&self) -> NaiveDate;
    fn branch_value(&self, branch: &str) -> f64;
}

impl DailyValues for DailyWindowEntry {
    fn day(&self) -> NaiveDate {
        self.date
    }

    fn branch_value(&self, branch: &str) -> f64 {
        self.value(branch)
    }
}

impl DailyValues for NormalizedRecord {
    fn day(&self) -> NaiveDate {
        self.date
    }

    fn branch_value(&self, branch: &str) -> f64 {
        self.number(branch)
    }
}

/// Classifies one branch's move from `yesterday` to `today`.
///
/// Quiet days (both zero) and restarts after a zero day are not flagged.
pub fn classify_change(yesterday: f64, today: f64) -> Option<(AnomalyKind, f64)> {
    if yesterday == 0.0 && today >= 0.0 {
        return None;
    }

    if today == 0.0 {
        return Some((AnomalyKind::Zero, 0.0));
    }

    let base = if yesterday == 0.0 { 1.0 } else { yesterday };
    let change = (today - yesterday) / base;

    if change > SPIKE_THRESHOLD {
        Some((AnomalyKind::Spike, change))
    } else if change < DROP_THRESHOLD {
        Some((AnomalyKind::Drop, change))
    } else {
        None
    }
}

/// Flags spikes, drops and zero-sales days across consecutive rows.
/// Rows must already be in chronological order.
pub fn detect_anomalies<D: DailyValues>(days: &[D], catalog: &BranchCatalog) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();

    for pair in days.windows(2) {
        let (yesterday, today) = (&pair[0], &pair[1]);

        for branch in catalog.iter() {
            let flagged = classify_change(
                yesterday.branch_value(branch),
                today.branch_value(branch),
            );

            if let Some((kind, change)) = flagged {
                anomalies.push(Anomaly {
                    kind,
                    branch: branch.to_string(),
                    date: today.day(),
                    change,
                });
            }
        }
    }

    debug!(
        "Scanned {} days across {} branches, {} anomalies",
        days.len(),
        catalog.len(),
        anomalies.len()
    );

    anomalies
}
