use branch_sales_insights::*;
use chrono::{Datelike, Days, NaiveDate};

fn sheet_from_days(branches: &[&str], start: NaiveDate, days: &[Vec<f64>]) -> String {
    let mut out = String::from("Date");
    for branch in branches {
        out.push(',');
        out.push_str(branch);
    }
    out.push_str(",Total\n");

    for (offset, values) in days.iter().enumerate() {
        let date = start.checked_add_days(Days::new(offset as u64)).unwrap();
        out.push_str(&date.format("%Y-%m-%d").to_string());
        for value in values {
            out.push_str(&format!(",{}", value));
        }
        out.push_str(&format!(",{}\n", values.iter().sum::<f64>()));
    }

    out
}

// Deterministic, uneven sales figures without pulling in a random generator.
fn synthetic_value(day: usize, branch: usize) -> f64 {
    let base = 400.0 + 150.0 * branch as f64;
    let wobble = ((day * 37 + branch * 101) % 97) as f64 * 3.7;
    let closed = (day + branch) % 23 == 0;
    if closed {
        0.0
    } else {
        (base + wobble).round()
    }
}

fn synthetic_sheet(day_count: usize) -> String {
    let branches = ["Ahmed", "Wael", "Gihan", "Nahia", "Faisal", "Alaa"];
    let days: Vec<Vec<f64>> = (0..day_count)
        .map(|d| (0..branches.len()).map(|b| synthetic_value(d, b)).collect())
        .collect();
    sheet_from_days(&branches, NaiveDate::from_ymd_opt(2024, 11, 1).unwrap(), &days)
}

#[test]
fn test_scenario_single_month_average_bucket() {
    let csv = sheet_from_days(
        &["A"],
        NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
        &[vec![10.0], vec![12.0], vec![11.0], vec![9.0], vec![13.0]],
    );
    let rows = read_raw_records(csv.as_bytes()).unwrap();
    let records = normalize_records(&rows);
    let catalog = BranchCatalog::from_records(&records);

    let monthly = aggregate_monthly(&records, &catalog);
    assert_eq!(monthly.len(), 1);
    assert_eq!(monthly[0].value("A"), 10.0);
}

#[test]
fn test_scenario_growth_from_100_to_150() {
    let csv = "Date,A,B\n2025-03-10,60,40\n2025-04-10,90,60\n";
    let rows = read_raw_records(csv.as_bytes()).unwrap();

    let dashboard = process_sales_rows(&rows, &ViewParams::default());
    assert_eq!(dashboard.kpis.total_sales, 150.0);
    assert_eq!(dashboard.kpis.percent_growth, 50.0);
}

#[test]
fn test_scenario_spike_at_thirty_percent() {
    let csv = "Date,X\n2025-04-01,100\n2025-04-02,130\n";
    let rows = read_raw_records(csv.as_bytes()).unwrap();
    let records = normalize_records(&rows);
    let catalog = BranchCatalog::from_records(&records);

    let anomalies = detect_anomalies(&records, &catalog);
    assert_eq!(anomalies.len(), 1);
    assert_eq!(anomalies[0].kind, AnomalyKind::Spike);
    assert_eq!(anomalies[0].branch, "X");
    assert!((anomalies[0].change - 0.30).abs() < 1e-12);
}

#[test]
fn test_scenario_cell_coercion() {
    let csv = "Date,A,B,C\n2025-04-01,\"1,234\",,N/A\n";
    let rows = read_raw_records(csv.as_bytes()).unwrap();
    let records = normalize_records(&rows);

    assert_eq!(records[0].get("A"), Some(&CellValue::Number(1234.0)));
    assert_eq!(records[0].get("B"), Some(&CellValue::Number(0.0)));
    assert_eq!(records[0].get("C"), Some(&CellValue::Text("N/A".to_string())));
}

#[test]
fn test_aggregates_are_bucketed_with_double_rounded_total() {
    let csv = synthetic_sheet(200);
    let rows = read_raw_records(csv.as_bytes()).unwrap();
    let snapshot = SalesSnapshot::from_raw(&rows, 1);

    let monthly = aggregate_monthly(&snapshot.records, &snapshot.catalog);
    assert!(monthly.len() >= 6);

    for month in &monthly {
        let mut sum = 0.0;
        for branch in snapshot.catalog.iter() {
            let value = month.value(branch);
            assert_eq!(value % 5.0, 0.0, "{} {} = {}", month.month, branch, value);
            sum += value;
        }
        assert_eq!(month.total % 5.0, 0.0);
        assert_eq!(month.total, round_half_up(sum / 5.0) * 5.0);
    }

    assert!(verify_monthly_aggregates(&monthly, &snapshot.catalog).is_ok());
}

#[test]
fn test_months_follow_calendar_order_across_year_boundary() {
    let csv = synthetic_sheet(120);
    let rows = read_raw_records(csv.as_bytes()).unwrap();
    let dashboard = process_sales_rows(&rows, &ViewParams::default());

    let months: Vec<&str> = dashboard.monthly.iter().map(|m| m.month.as_str()).collect();
    assert_eq!(months, vec!["2024-11", "2024-12", "2025-01", "2025-02"]);
}

#[test]
fn test_growth_is_zero_whenever_previous_total_is_zero() {
    let csv = "Date,A,B\n2025-03-01,0,0\n2025-04-01,35,80\n";
    let rows = read_raw_records(csv.as_bytes()).unwrap();

    let dashboard = process_sales_rows(&rows, &ViewParams::default());
    assert_eq!(dashboard.kpis.percent_growth, 0.0);
    assert!(dashboard.kpis.percent_growth.is_finite());
}

#[test]
fn test_anomaly_properties_over_synthetic_data() {
    let csv = synthetic_sheet(150);
    let rows = read_raw_records(csv.as_bytes()).unwrap();
    let records = normalize_records(&rows);
    let catalog = BranchCatalog::from_records(&records);

    let anomalies = detect_anomalies(&records, &catalog);
    assert!(!anomalies.is_empty());

    for anomaly in &anomalies {
        let idx = records.iter().position(|r| r.date == anomaly.date).unwrap();
        assert!(idx > 0);
        let yesterday = records[idx - 1].number(&anomaly.branch);
        let today = records[idx].number(&anomaly.branch);

        assert!(!(yesterday == 0.0 && today == 0.0));
        if yesterday == 0.0 {
            assert_ne!(anomaly.kind, AnomalyKind::Spike);
        }
        match anomaly.kind {
            AnomalyKind::Zero => assert_eq!(today, 0.0),
            AnomalyKind::Spike => assert!(anomaly.change > 0.2),
            AnomalyKind::Drop => assert!(anomaly.change < -0.2),
        }
    }
}

#[test]
fn test_comparator_sentence_names_greater_branch() {
    let csv = synthetic_sheet(90);
    let rows = read_raw_records(csv.as_bytes()).unwrap();
    let records = normalize_records(&rows);
    let catalog = BranchCatalog::from_records(&records);
    let monthly = aggregate_monthly(&records, &catalog);

    for month in &monthly {
        for a in catalog.iter() {
            for b in catalog.iter() {
                let selection = ComparisonSelection {
                    month: Some(month.month.clone()),
                    branch_a: Some(a.to_string()),
                    branch_b: Some(b.to_string()),
                };
                let result = compare_branches(&monthly, &catalog, &selection, Locale::En).unwrap();

                if result.value_a == result.value_b {
                    assert!(result.narrative.contains("no difference"));
                } else {
                    let leader = if result.value_a > result.value_b { a } else { b };
                    assert!(
                        result.narrative.starts_with(&format!("{} leads", leader)),
                        "{}",
                        result.narrative
                    );
                }
            }
        }
    }
}

#[test]
fn test_dateless_rows_are_dropped_not_bucketed() {
    let csv = "Date,A\n2025-04-01,100\n,500\nsoon,500\n2025-04-02,100\n";
    let rows = read_raw_records(csv.as_bytes()).unwrap();

    let (records, report) = normalize_with_report(&rows);
    assert_eq!(records.len(), 2);
    assert_eq!(report.dateless_rows, 2);

    let catalog = BranchCatalog::from_records(&records);
    let monthly = aggregate_monthly(&records, &catalog);
    assert_eq!(monthly[0].value("A"), 100.0);
}

#[test]
fn test_totals_view_over_trailing_window() {
    let csv = synthetic_sheet(60);
    let rows = read_raw_records(csv.as_bytes()).unwrap();
    let params = ViewParams {
        day_window: 14,
        view_mode: ViewMode::Totals,
        ..Default::default()
    };

    let dashboard = process_sales_rows(&rows, &params);
    assert_eq!(dashboard.daily_window.len(), 14);
    assert_eq!(dashboard.chart.x_key(), "date");
    assert_eq!(dashboard.chart.len(), 14);

    let last = dashboard.daily_window.last().unwrap();
    assert_eq!(last.date.month(), 12);
    assert_eq!(last.date.day(), 30);

    let branch_sum: f64 = dashboard.branches.iter().map(|b| last.value(b)).sum();
    assert_eq!(last.total, branch_sum);
}

#[test]
fn test_month_selection_drives_leaderboard_and_shares() {
    let csv = synthetic_sheet(90);
    let rows = read_raw_records(csv.as_bytes()).unwrap();
    let params = ViewParams {
        selected_month_index: Some(0),
        ..Default::default()
    };

    let dashboard = process_sales_rows(&rows, &params);
    assert_eq!(dashboard.selected_month.as_deref(), Some("2024-11"));
    assert_eq!(dashboard.leaderboard.len(), 6);

    for pair in dashboard.leaderboard.windows(2) {
        assert!(pair[0].value >= pair[1].value);
    }

    let share_sum: f64 = dashboard.shares.iter().map(|s| s.share).sum();
    assert!((share_sum - 1.0).abs() < 1e-9);
}

#[test]
fn test_snapshot_refresh_keeps_stale_data_on_failure() {
    let mut loader = SnapshotLoader::new();
    let csv = synthetic_sheet(40);

    loader.apply(read_raw_records(csv.as_bytes()));
    let good = loader.current();
    assert_eq!(good.version, 1);

    let outcome = loader.apply(read_raw_records_from_path("/definitely/not/here.csv"));
    assert_eq!(outcome, RefreshOutcome::KeptPrevious { version: 1 });

    let dashboard = build_dashboard(&loader.current(), &ViewParams::default());
    assert_eq!(dashboard.snapshot_version, 1);
    assert!(!dashboard.monthly.is_empty());
}

#[test]
fn test_dashboard_serializes_for_presentation() {
    let csv = synthetic_sheet(45);
    let rows = read_raw_records(csv.as_bytes()).unwrap();
    let dashboard = process_sales_rows(&rows, &ViewParams::default());

    let json = serde_json::to_value(&dashboard).unwrap();
    assert!(json["kpis"]["percentGrowth"].is_number());
    assert!(json["monthly"][0]["Total"].is_number());
    assert_eq!(json["chart"]["mode"], "averages");
}
