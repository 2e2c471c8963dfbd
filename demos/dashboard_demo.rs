use branch_sales_insights::*;

const SHEET: &str = "\
\u{FEFF}Date,Ahmed,Wael,Gihan,,Total
2025-03-01,\"1,200\",800,650,,2650
2025-03-02,1150,820,0,,1970
2025-03-03,1300,790,700,,2790
2025-04-01,1400,600,720,,2720
2025-04-02,1380,N/A,710,,2090
2025-04-03,1900,610,0,,2510
,5,5,5,,15
";

fn main() {
    env_logger::init();

    let config = DashboardConfig {
        branches: BranchDirectory::new()
            .with_branch("Ahmed", "أحمد", "#9CA3AF")
            .with_branch("Wael", "وائل", "#93C5FD")
            .with_branch("Gihan", "جيهان", "#FDE68A"),
        ..Default::default()
    };

    let rows = read_raw_records(SHEET.as_bytes()).expect("inline sheet should parse");
    let dashboard = process_sales_rows(&rows, &config.view_params());

    println!("Monthly averages:");
    for month in &dashboard.monthly {
        print!("  {}", month.month);
        for branch in &dashboard.branches {
            print!("  {}={}", config.branches.display_name(branch), month.value(branch));
        }
        println!("  Total={}", month.total);
    }

    println!("\nKPIs:");
    println!("  Total sales this month: {}", dashboard.kpis.total_sales);
    println!("  Growth: {:.1}%", dashboard.kpis.percent_growth);
    println!(
        "  Best: {:?} ({})  Worst: {:?} ({})",
        dashboard.kpis.best.branch,
        dashboard.kpis.best.avg,
        dashboard.kpis.worst.branch,
        dashboard.kpis.worst.avg
    );

    println!("\nCommentary:");
    for line in &dashboard.commentary {
        let branch = line
            .branch
            .as_deref()
            .map(|b| config.branches.display_name(b))
            .unwrap_or("");
        match line.number {
            Some(n) => println!("  {}{}: {}", line.text, branch, n),
            None => println!("  {}", line.text),
        }
    }

    println!("\nAnomalies:");
    for anomaly in &dashboard.anomalies {
        println!(
            "  {:?} {} on {} ({:+.0}%)",
            anomaly.kind,
            anomaly.branch,
            anomaly.date,
            anomaly.change * 100.0
        );
    }

    if let Some(comparison) = &dashboard.comparison {
        println!("\nComparison: {}", comparison.narrative);
    }

    println!("\nLeaderboard for {:?}:", dashboard.selected_month);
    for entry in &dashboard.leaderboard {
        println!(
            "  {}. {} {} [{}]",
            entry.rank,
            config.branches.display_name(&entry.branch),
            entry.value,
            config.branches.color(&entry.branch)
        );
    }
}
