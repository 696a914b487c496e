use chrono::NaiveDateTime;
use serde::Serialize;

use crate::state::test_run::TestRun;

/// Combined totals for one or more selected test runs, as shown on the
/// summary sheet. Identification fields from the runs are comma-joined;
/// part fields come from the first run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub filename: String,
    pub id: String,
    pub plt: String,
    pub datecode: String,
    pub pn: String,
    pub application: String,
    pub revision: String,
    pub start_datetime: Option<NaiveDateTime>,
    pub relays_tested: u64,
    pub relays_passed_420: u64,
    pub relays_failed_420: u64,
    /// Percent of tested relays that passed, rounded to whole percent.
    #[serde(rename = "yield")]
    pub yield_pct: i64,
    pub relays_failed_non_420: u64,
    pub total_quantity: u64,
    pub reject_quantity: u64,
    /// Yield including rejects that never reached the tester.
    pub final_yield: i64,
    pub issue_quantity: u64,
    /// Mean of the per-run issue yields.
    pub issue_yield: i64,
    pub elapsed_time: String,
    pub idle_time: String,
    pub test_time: String,
}

/// Combine selected runs into one summary. An empty selection gives the
/// all-zero summary.
pub fn combine(runs: &[&TestRun]) -> RunSummary {
    if runs.is_empty() {
        return RunSummary::default();
    }

    let join = |field: fn(&TestRun) -> &str| -> String {
        runs.iter()
            .map(|r| field(r))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let relays_tested: u64 = runs.iter().map(|r| r.relays_tested).sum();
    let relays_passed_420: u64 = runs.iter().map(|r| r.relays_passed_420).sum();
    let relays_failed_420: u64 = runs.iter().map(|r| r.relays_failed_420).sum();
    let relays_failed_non_420: u64 = runs.iter().map(|r| r.relays_failed_non_420).sum();

    let yield_pct = if relays_tested > 0 {
        (100.0 * relays_passed_420 as f64 / relays_tested as f64).round() as i64
    } else {
        0
    };

    let final_denominator = relays_tested + relays_failed_non_420;
    let final_yield = if final_denominator > 0 {
        let failed = (relays_failed_420 + relays_failed_non_420) as f64;
        (100.0 - 100.0 * failed / final_denominator as f64).round() as i64
    } else {
        0
    };

    let issue_yield =
        (runs.iter().map(|r| r.issue_yield).sum::<f64>() / runs.len() as f64).round() as i64;

    let sum_duration = |field: fn(&TestRun) -> &str| -> String {
        format_duration_hms(runs.iter().map(|r| parse_duration_hms(field(r))).sum())
    };

    RunSummary {
        filename: join(|r| &r.filename),
        id: join(|r| &r.id),
        plt: join(|r| &r.plt),
        datecode: join(|r| &r.datecode),
        pn: runs[0].pn.clone(),
        application: runs[0].application.clone(),
        revision: runs[0].revision.clone(),
        start_datetime: runs[0].start_datetime,
        relays_tested,
        relays_passed_420,
        relays_failed_420,
        yield_pct,
        relays_failed_non_420,
        total_quantity: runs.iter().map(|r| r.total_quantity).sum(),
        reject_quantity: runs.iter().map(|r| r.reject_quantity).sum(),
        final_yield,
        issue_quantity: runs.iter().map(|r| r.issue_quantity).sum(),
        issue_yield,
        elapsed_time: sum_duration(|r| &r.elapsed_time),
        idle_time: sum_duration(|r| &r.idle_time),
        test_time: sum_duration(|r| &r.test_time),
    }
}

/// Parse a `HH:MM:SS` duration; missing or malformed pieces count as zero.
pub fn parse_duration_hms(text: &str) -> u64 {
    let mut parts = text.trim().splitn(3, ':');
    let mut next = || {
        parts
            .next()
            .and_then(|p| p.trim().parse::<u64>().ok())
            .unwrap_or(0)
    };
    let (h, m, s) = (next(), next(), next());
    h * 3600 + m * 60 + s
}

/// Format seconds as zero-padded `HH:MM:SS`.
pub fn format_duration_hms(total_seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        total_seconds / 3600,
        (total_seconds % 3600) / 60,
        total_seconds % 60
    )
}
