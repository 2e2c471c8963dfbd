//! # Branch Sales Insights
//!
//! A library for turning a daily, per-branch sales sheet into the summarized
//! views a sales dashboard displays.
//!
//! ## Core Concepts
//!
//! - **Raw rows**: one row per day, a date-like column, one column per branch and an optional `Total`
//! - **Normalization**: header cleanup, lenient number coercion, dateless rows dropped
//! - **Branch catalog**: the branch columns of the first normalized row, fixed per snapshot
//! - **Monthly aggregates**: per-branch averages rounded to the nearest 5, plus a double-rounded `Total`
//! - **Daily window**: the trailing N rows for finer-grained views
//! - **Derivations**: KPIs, commentary, day-over-day anomalies and branch comparisons
//!
//! Every stage is a pure function of an immutable [`SalesSnapshot`] and a few
//! caller-chosen [`ViewParams`]; a refresh produces a new snapshot instead of
//! mutating the old one.
//!
//! ## Example
//!
//! ```rust,ignore
//! use branch_sales_insights::*;
//!
//! let csv = "Date,Ahmed,Wael,Total\n2025-04-01,100,80,180\n2025-04-02,120,70,190\n";
//! let rows = read_raw_records(csv.as_bytes()).unwrap();
//!
//! let dashboard = process_sales_rows(&rows, &ViewParams::default());
//! println!("{:?}", dashboard.kpis);
//! ```

pub mod aggregation;
pub mod anomalies;
pub mod catalog;
pub mod commentary;
pub mod comparison;
pub mod config;
pub mod error;
pub mod ingestion;
pub mod integrity;
pub mod kpi;
pub mod schema;
pub mod snapshot;
pub mod utils;
pub mod views;

#[cfg(feature = "live")]
pub mod live;

pub use aggregation::{aggregate_monthly, clamp_day_window, extract_daily_window, Aggregator};
pub use anomalies::{classify_change, detect_anomalies, DailyValues};
pub use catalog::{BranchCatalog, BranchDirectory, BranchMetadata};
pub use commentary::generate_commentary;
pub use comparison::{compare_branches, percent_difference, ComparisonSelection};
pub use config::{DashboardConfig, ViewParams};
pub use error::{Result, SalesInsightsError};
pub use ingestion::*;
pub use integrity::{
    inspect_monthly_aggregates, verify_monthly_aggregates, AggregateVerifier, VerificationResult,
};
pub use kpi::calculate_kpis;
pub use schema::*;
pub use snapshot::{RefreshOutcome, SalesSnapshot, SnapshotLoader};
pub use utils::*;
pub use views::*;

use log::{debug, info};
use serde::Serialize;

/// Everything a dashboard renders for one snapshot and one set of view
/// parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub snapshot_version: u64,
    pub branches: Vec<String>,
    pub monthly: Vec<MonthlyAggregate>,
    pub daily_window: Vec<DailyWindowEntry>,
    pub kpis: KpiSet,
    pub commentary: Vec<CommentaryLine>,
    pub anomalies: Vec<Anomaly>,
    pub comparison: Option<ComparisonResult>,
    /// Month shown by the leaderboard and share views.
    pub selected_month: Option<String>,
    pub month_index: usize,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub shares: Vec<ShareSlice>,
    pub chart: ChartSeries,
}

pub struct SalesPipeline;

impl SalesPipeline {
    pub fn run(snapshot: &SalesSnapshot, params: &ViewParams) -> Dashboard {
        info!(
            "Building dashboard for snapshot {} ({} records)",
            snapshot.version,
            snapshot.records.len()
        );

        let mut dashboard = Self::run_records(&snapshot.records, &snapshot.catalog, params);
        dashboard.snapshot_version = snapshot.version;
        dashboard
    }

    pub fn run_with_verification(
        snapshot: &SalesSnapshot,
        params: &ViewParams,
    ) -> Result<Dashboard> {
        let dashboard = Self::run(snapshot, params);

        verify_monthly_aggregates(&dashboard.monthly, &snapshot.catalog)?;

        Ok(dashboard)
    }

    pub fn run_records(
        records: &[NormalizedRecord],
        catalog: &BranchCatalog,
        params: &ViewParams,
    ) -> Dashboard {
        let aggregator = Aggregator::new(catalog);
        let monthly = aggregator.monthly_averages(records);
        let daily_window = aggregator.daily_window(records, params.day_window);

        let kpis = calculate_kpis(&monthly, catalog);
        let commentary = generate_commentary(&monthly, catalog, params.locale);
        let anomalies = detect_anomalies(&daily_window, catalog);
        let comparison = compare_branches(&monthly, catalog, &params.comparison, params.locale);

        let cursor = MonthCursor::from_selection(params.selected_month_index, monthly.len());
        let (selected_month, leaderboard, shares) = match cursor.select(&monthly) {
            Some(month) => (
                Some(month.month.clone()),
                views::leaderboard(month, catalog),
                share_breakdown(month, catalog),
            ),
            None => (None, Vec::new(), Vec::new()),
        };

        let chart = select_series(params.view_mode, &monthly, &daily_window);

        debug!(
            "Dashboard: {} months, {} window days, {} anomalies",
            monthly.len(),
            daily_window.len(),
            anomalies.len()
        );

        Dashboard {
            snapshot_version: 0,
            branches: catalog.branches().to_vec(),
            monthly,
            daily_window,
            kpis,
            commentary,
            anomalies,
            comparison,
            selected_month,
            month_index: cursor.index(),
            leaderboard,
            shares,
            chart,
        }
    }
}

pub fn build_dashboard(snapshot: &SalesSnapshot, params: &ViewParams) -> Dashboard {
    SalesPipeline::run(snapshot, params)
}

/// One-shot path for uploads: normalize, resolve the catalog and derive
/// everything in a single call.
pub fn process_sales_rows(rows: &[RawRecord], params: &ViewParams) -> Dashboard {
    let snapshot = SalesSnapshot::from_raw(rows, 1);
    SalesPipeline::run(&snapshot, params)
}
