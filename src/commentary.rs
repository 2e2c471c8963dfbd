use crate::catalog::BranchCatalog;
use crate::schema::{CommentaryLine, Locale, MonthlyAggregate};

struct CommentaryTexts {
    top_performer: &'static str,
    highest_growth: &'static str,
    lowest_growth: &'static str,
    improved: &'static str,
    declined: &'static str,
}

const ENGLISH: CommentaryTexts = CommentaryTexts {
    top_performer: "Top performing branch: ",
    highest_growth: "Highest growth: ",
    lowest_growth: "Lowest growth: ",
    improved: "Performance improved this month compared to last month",
    declined: "Performance declined this month compared to last month",
};

const ARABIC: CommentaryTexts = CommentaryTexts {
    top_performer: "أعلى فرع أداءً: ",
    highest_growth: "أعلى نمو: ",
    lowest_growth: "أدنى نمو: ",
    improved: "تحسن الأداء هذا الشهر مقارنة بالشهر الماضي",
    declined: "انخفاض الأداء هذا الشهر مقارنة بالشهر الماضي",
};

fn texts(locale: Locale) -> &'static CommentaryTexts {
    match locale {
        Locale::En => &ENGLISH,
        Locale::Ar => &ARABIC,
    }
}

struct BranchMovement<'a> {
    branch: &'a str,
    latest: f64,
    change: f64,
}

// Left fold that only replaces the running pick when `better` holds strictly,
// so the first branch in catalog order wins ties.
fn pick<'a, F>(movements: &'a [BranchMovement<'a>], better: F) -> &'a BranchMovement<'a>
where
    F: Fn(&BranchMovement, &BranchMovement) -> bool,
{
    let mut chosen = &movements[0];
    for candidate in &movements[1..] {
        if better(candidate, chosen) {
            chosen = candidate;
        }
    }
    chosen
}

/// Four narrative lines about the latest month: the top branch, the biggest
/// riser, the biggest faller and an overall trend sentence.
pub fn generate_commentary(
    aggregates: &[MonthlyAggregate],
    catalog: &BranchCatalog,
    locale: Locale,
) -> Vec<CommentaryLine> {
    let Some(latest) = aggregates.last() else {
        return Vec::new();
    };
    if catalog.is_empty() {
        return Vec::new();
    }
    let previous = aggregates.len().checked_sub(2).map(|i| &aggregates[i]);

    let movements: Vec<BranchMovement> = catalog
        .iter()
        .map(|branch| {
            let now = latest.value(branch);
            let before = previous.map(|p| p.value(branch)).unwrap_or(0.0);
            BranchMovement {
                branch,
                latest: now,
                change: now - before,
            }
        })
        .collect();

    let top = pick(&movements, |c, best| c.latest > best.latest);
    let riser = pick(&movements, |c, best| c.change > best.change);
    let faller = pick(&movements, |c, worst| c.change < worst.change);

    let overall: f64 = movements.iter().map(|m| m.change).sum();
    let texts = texts(locale);
    let trend = if overall >= 0.0 {
        texts.improved
    } else {
        texts.declined
    };

    vec![
        CommentaryLine {
            text: texts.top_performer.to_string(),
            branch: Some(top.branch.to_string()),
            number: Some(top.latest),
        },
        CommentaryLine {
            text: texts.highest_growth.to_string(),
            branch: Some(riser.branch.to_string()),
            number: Some(riser.change),
        },
        CommentaryLine {
            text: texts.lowest_growth.to_string(),
            branch: Some(faller.branch.to_string()),
            number: Some(faller.change),
        },
        CommentaryLine {
            text: trend.to_string(),
            branch: None,
            number: None,
        },
    ]
}
