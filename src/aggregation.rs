use crate::catalog::BranchCatalog;
use crate::schema::{CellValue, DailyWindowEntry, MonthlyAggregate, NormalizedRecord};
use crate::utils::{month_key, round_to_bucket};
use log::debug;
use std::collections::BTreeMap;

/// Smallest trailing window the daily views accept.
pub const MIN_DAY_WINDOW: usize = 7;
pub const DEFAULT_DAY_WINDOW: usize = 30;

// Running totals for one calendar month, one slot per catalog branch.
struct MonthBucket {
    count: usize,
    sums: Vec<f64>,
}

pub struct Aggregator<'a> {
    catalog: &'a BranchCatalog,
}

impl<'a> Aggregator<'a> {
    pub fn new(catalog: &'a BranchCatalog) -> Self {
        Self { catalog }
    }

    /// Groups records by calendar month and produces rounded per-branch
    /// averages, sorted by month.
    ///
    /// Each branch average is rounded to the nearest multiple of 5. `Total` is
    /// then rounded again from the sum of the already-rounded branch values,
    /// not from the raw sums.
    pub fn monthly_averages(&self, records: &[NormalizedRecord]) -> Vec<MonthlyAggregate> {
        if records.is_empty() || self.catalog.is_empty() {
            return Vec::new();
        }

        let mut buckets: BTreeMap<String, MonthBucket> = BTreeMap::new();

        for record in records {
            let bucket = buckets
                .entry(month_key(record.date))
                .or_insert_with(|| MonthBucket {
                    count: 0,
                    sums: vec![0.0; self.catalog.len()],
                });

            bucket.count += 1;
            for (slot, branch) in bucket.sums.iter_mut().zip(self.catalog.iter()) {
                *slot += record.number(branch);
            }
        }

        let aggregates: Vec<MonthlyAggregate> = buckets
            .into_iter()
            .map(|(month, bucket)| self.finish_month(month, bucket))
            .collect();

        debug!(
            "Aggregated {} records into {} months",
            records.len(),
            aggregates.len()
        );

        aggregates
    }

    fn finish_month(&self, month: String, bucket: MonthBucket) -> MonthlyAggregate {
        let count = bucket.count.max(1) as f64;

        let branches: BTreeMap<String, f64> = self
            .catalog
            .iter()
            .zip(bucket.sums)
            .map(|(branch, sum)| (branch.to_string(), round_to_bucket(sum / count)))
            .collect();

        let rounded_sum: f64 = self.catalog.iter().map(|b| branches[b]).sum();

        MonthlyAggregate {
            month,
            branches,
            total: round_to_bucket(rounded_sum),
        }
    }

    /// The last `window` records reshaped for the daily views. The window is
    /// clamped to at least [`MIN_DAY_WINDOW`] and at most the record count.
    /// Works on row order, so callers must supply chronological rows.
    pub fn daily_window(
        &self,
        records: &[NormalizedRecord],
        window: usize,
    ) -> Vec<DailyWindowEntry> {
        if records.is_empty() || self.catalog.is_empty() {
            return Vec::new();
        }

        let size = clamp_day_window(window).min(records.len());
        let start = records.len() - size;

        records[start..]
            .iter()
            .map(|record| self.window_entry(record))
            .collect()
    }

    fn window_entry(&self, record: &NormalizedRecord) -> DailyWindowEntry {
        let branches: BTreeMap<String, f64> = self
            .catalog
            .iter()
            .map(|b| (b.to_string(), record.number(b)))
            .collect();

        // A blank, zero or non-numeric Total falls back to the branch sum.
        let total = match record.total() {
            Some(CellValue::Number(n)) if *n != 0.0 => *n,
            _ => self.catalog.sum_record(record),
        };

        DailyWindowEntry {
            date: record.date,
            branches,
            total,
        }
    }
}

pub fn clamp_day_window(window: usize) -> usize {
    window.max(MIN_DAY_WINDOW)
}

pub fn aggregate_monthly(
    records: &[NormalizedRecord],
    catalog: &BranchCatalog,
) -> Vec<MonthlyAggregate> {
    Aggregator::new(catalog).monthly_averages(records)
}

pub fn extract_daily_window(
    records: &[NormalizedRecord],
    catalog: &BranchCatalog,
    window: usize,
) -> Vec<DailyWindowEntry> {
    Aggregator::new(catalog).daily_window(records, window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, NaiveDate};

    fn day(y: i32, m: u32, d: u32, fields: &[(&str, f64)]) -> NormalizedRecord {
        NormalizedRecord {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), CellValue::Number(*v)))
                .collect(),
        }
    }

    fn series(branch: &str, values: &[f64]) -> Vec<NormalizedRecord> {
        let start = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| NormalizedRecord {
                date: start.checked_add_days(Days::new(i as u64)).unwrap(),
                fields: vec![(branch.to_string(), CellValue::Number(*v))],
            })
            .collect()
    }

    #[test]
    fn test_single_month_average_rounds_to_bucket() {
        let records = series("A", &[10.0, 12.0, 11.0, 9.0, 13.0]);
        let catalog = BranchCatalog::from_records(&records);

        let monthly = aggregate_monthly(&records, &catalog);
        assert_eq!(monthly.len(), 1);
        assert_eq!(monthly[0].month, "2025-04");
        assert_eq!(monthly[0].value("A"), 10.0);
        assert_eq!(monthly[0].total, 10.0);
    }

    #[test]
    fn test_total_is_rounded_from_rounded_branches() {
        // Both branches average 12.5 and round up to 15. Rounding the raw
        // averages' sum would give 25; Total must be built from 15 + 15.
        let records = vec![
            day(2025, 4, 1, &[("A", 12.0), ("B", 13.0)]),
            day(2025, 4, 2, &[("A", 13.0), ("B", 12.0)]),
        ];
        let catalog = BranchCatalog::from_records(&records);

        let monthly = aggregate_monthly(&records, &catalog);
        assert_eq!(monthly[0].value("A"), 15.0);
        assert_eq!(monthly[0].value("B"), 15.0);
        assert_eq!(monthly[0].total, 30.0);
    }

    #[test]
    fn test_months_sorted_and_only_present_months_emitted() {
        let records = vec![
            day(2025, 6, 3, &[("A", 100.0)]),
            day(2024, 12, 30, &[("A", 50.0)]),
            day(2025, 4, 1, &[("A", 20.0)]),
        ];
        let catalog = BranchCatalog::from_records(&records);

        let months: Vec<String> = aggregate_monthly(&records, &catalog)
            .into_iter()
            .map(|m| m.month)
            .collect();
        assert_eq!(months, vec!["2024-12", "2025-04", "2025-06"]);
    }

    #[test]
    fn test_missing_branch_cell_contributes_zero() {
        let records = vec![
            day(2025, 4, 1, &[("A", 100.0), ("B", 40.0)]),
            day(2025, 4, 2, &[("A", 100.0)]),
        ];
        let catalog = BranchCatalog::from_records(&records);

        let monthly = aggregate_monthly(&records, &catalog);
        assert_eq!(monthly[0].value("B"), 20.0);
    }

    #[test]
    fn test_text_cells_count_as_zero() {
        let mut records = vec![day(2025, 4, 1, &[("A", 100.0)]), day(2025, 4, 2, &[])];
        records[1]
            .fields
            .push(("A".to_string(), CellValue::Text("N/A".to_string())));
        let catalog = BranchCatalog::from_records(&records);

        let monthly = aggregate_monthly(&records, &catalog);
        assert_eq!(monthly[0].value("A"), 50.0);
    }

    #[test]
    fn test_empty_inputs_yield_no_months() {
        let catalog = BranchCatalog::from_keys(["A"]);
        assert!(aggregate_monthly(&[], &catalog).is_empty());

        let records = vec![day(2025, 4, 1, &[("Total", 5.0)])];
        let catalog = BranchCatalog::from_records(&records);
        assert!(catalog.is_empty());
        assert!(aggregate_monthly(&records, &catalog).is_empty());
    }

    #[test]
    fn test_daily_window_takes_trailing_rows() {
        let values: Vec<f64> = (1..=20).map(f64::from).collect();
        let records = series("A", &values);
        let catalog = BranchCatalog::from_records(&records);

        let window = extract_daily_window(&records, &catalog, 10);
        assert_eq!(window.len(), 10);
        assert_eq!(window[0].value("A"), 11.0);
        assert_eq!(window[9].value("A"), 20.0);
        assert_eq!(window[9].total, 20.0);
    }

    #[test]
    fn test_daily_window_clamps_size() {
        let values: Vec<f64> = (1..=20).map(f64::from).collect();
        let records = series("A", &values);
        let catalog = BranchCatalog::from_records(&records);

        assert_eq!(extract_daily_window(&records, &catalog, 2).len(), 7);
        assert_eq!(extract_daily_window(&records, &catalog, 500).len(), 20);

        let short = series("A", &[1.0, 2.0, 3.0]);
        assert_eq!(extract_daily_window(&short, &catalog, 7).len(), 3);
    }

    #[test]
    fn test_daily_window_total_prefers_provided_value() {
        let records = vec![
            day(2025, 4, 1, &[("A", 10.0), ("B", 5.0), ("Total", 99.0)]),
            day(2025, 4, 2, &[("A", 10.0), ("B", 5.0), ("Total", 0.0)]),
            day(2025, 4, 3, &[("A", 10.0), ("B", 5.0)]),
        ];
        let catalog = BranchCatalog::from_records(&records);

        let window = extract_daily_window(&records, &catalog, 7);
        let totals: Vec<f64> = window.iter().map(|e| e.total).collect();
        assert_eq!(totals, vec![99.0, 15.0, 15.0]);
        assert!(!window[0].branches.contains_key("Total"));
    }
}
