use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::store::{AccuracyPeriod, AccuracySummary, PredictionStore, StoredPrediction};

pub struct ExportReport {
    pub predictions: usize,
    pub verified: usize,
}

/// Writes every stored prediction to an Excel workbook.
///
/// Sheets: `Predictions` (one row per prediction) and `Accuracy`.
pub fn export_predictions(store: &PredictionStore, path: &Path) -> Result<ExportReport> {
    let stored = store.all()?;
    let summary = store.accuracy(AccuracyPeriod::All)?;

    let mut rows = vec![
        [
            "ID",
            "Match ID",
            "Kickoff",
            "League",
            "Home",
            "Away",
            "Prediction",
            "Confidence",
            "xG Home",
            "xG Away",
            "Total",
            "Tips",
            "Score",
            "Result Hit",
            "Total Hit",
            "Created",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>(),
    ];
    rows.extend(stored.iter().map(prediction_row));

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Predictions")?;
        write_rows(sheet, &rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Accuracy")?;
        write_rows(sheet, &accuracy_rows(&summary))?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        predictions: stored.len(),
        verified: summary.verified,
    })
}

fn prediction_row(p: &StoredPrediction) -> Vec<String> {
    let tips = p
        .tips
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    let (score, result_hit, total_hit) = match &p.verification {
        Some(v) => (
            format!("{}:{}", v.home_goals, v.away_goals),
            yes_no(v.result_correct),
            v.total_correct.map_or_else(|| "push".to_string(), yes_no),
        ),
        None => (String::new(), String::new(), String::new()),
    };
    vec![
        p.id.to_string(),
        p.match_id.map(|id| id.to_string()).unwrap_or_default(),
        p.kickoff.clone().unwrap_or_default(),
        p.league_name.clone(),
        p.home_team.clone(),
        p.away_team.clone(),
        p.expected_result.as_str().to_string(),
        format!("{:.1}", p.confidence),
        format!("{:.2}", p.expected_home_goals),
        format!("{:.2}", p.expected_away_goals),
        format!("{:.2}", p.total_goals),
        tips,
        score,
        result_hit,
        total_hit,
        p.created_at.clone(),
    ]
}

fn accuracy_rows(summary: &AccuracySummary) -> Vec<Vec<String>> {
    let pct = |r: Option<f64>| r.map(|r| format!("{:.1}%", r * 100.0)).unwrap_or_default();
    vec![
        vec!["Metric".to_string(), "Value".to_string()],
        vec!["Verified".to_string(), summary.verified.to_string()],
        vec!["Result hits".to_string(), summary.result_hits.to_string()],
        vec!["Result hit rate".to_string(), pct(summary.result_rate())],
        vec!["Totals settled".to_string(), summary.totals_settled.to_string()],
        vec!["Total hits".to_string(), summary.total_hits.to_string()],
        vec!["Total hit rate".to_string(), pct(summary.total_rate())],
        vec![
            "Avg total error".to_string(),
            summary
                .avg_total_error
                .map(|e| format!("{e:.2}"))
                .unwrap_or_default(),
        ],
        vec![
            "Win calls".to_string(),
            format!("{}/{}", summary.win_hits, summary.win_calls),
        ],
        vec!["Win hit rate".to_string(), pct(summary.win_rate())],
        vec![
            "Draw calls".to_string(),
            format!("{}/{}", summary.draw_hits, summary.draw_calls),
        ],
        vec!["Draw hit rate".to_string(), pct(summary.draw_rate())],
    ]
}

fn yes_no(v: bool) -> String {
    if v { "yes" } else { "no" }.to_string()
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
