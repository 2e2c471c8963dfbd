use branch_sales_insights::live::{CsvFeedClient, RefreshTask};
use branch_sales_insights::{build_dashboard, DashboardConfig};
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match env::args().nth(1) {
        Some(path) => DashboardConfig::from_json_file(path)?,
        None => DashboardConfig::default(),
    };
    let url = config
        .source_url
        .clone()
        .ok_or_else(|| anyhow::anyhow!("config has no source_url"))?;

    let client = CsvFeedClient::new(url)?;
    let (task, mut snapshots) = RefreshTask::new(client, config.refresh_interval());
    let handle = task.spawn();

    let params = config.view_params();
    for _ in 0..3 {
        snapshots.changed().await?;
        let snapshot = snapshots.borrow_and_update().clone();
        let dashboard = build_dashboard(&snapshot, &params);

        println!(
            "snapshot {}: {} months, total {} ({:+.1}%), {} anomalies",
            dashboard.snapshot_version,
            dashboard.monthly.len(),
            dashboard.kpis.total_sales,
            dashboard.kpis.percent_growth,
            dashboard.anomalies.len()
        );
    }

    handle.abort();
    Ok(())
}
