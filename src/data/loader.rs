use std::path::Path;

use crate::data::{datetime, parser};
use crate::profiles::TestType;
use crate::state::test_run::{TestResultRow, TestRun};

/// Load a test-report file into a [`TestRun`].
///
/// JSON files are complete run exports; CSV/Excel files carry `key,value`
/// metadata rows followed by the measurement table.
pub fn load_run(path: &Path) -> Result<TestRun, String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let fallback_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    let run = match ext.as_str() {
        "json" => {
            let text = std::fs::read_to_string(path).map_err(|e| format!("Cannot read file: {e}"))?;
            serde_json::from_str::<TestRun>(&text).map_err(|e| format!("Cannot parse report: {e}"))?
        }
        "csv" => run_from_rows(&parser::read_rows_csv(path)?, fallback_name)?,
        "xls" | "xlsx" => run_from_rows(&parser::read_rows_excel(path)?, fallback_name)?,
        _ => return Err(format!("Unsupported file format: .{ext}")),
    };

    tracing::info!(
        "Loaded {} ({} result rows) from {:?}",
        run.filename,
        run.results.len(),
        path
    );
    Ok(run)
}

/// Build a run from tabular rows: metadata above the header, measurement
/// rows below it. Unknown metadata keys and unparseable measurement rows
/// are skipped with a log line, never a hard error.
pub fn run_from_rows(rows: &[Vec<String>], fallback_name: &str) -> Result<TestRun, String> {
    let header =
        parser::detect_result_header(rows).ok_or("No measurement table found in file")?;

    let mut run = TestRun::default();
    for row in &rows[..header] {
        let (Some(key), Some(value)) = (row.first(), row.get(1)) else {
            continue;
        };
        apply_metadata(&mut run, key.trim(), value.trim());
    }
    if run.filename.is_empty() {
        run.filename = fallback_name.to_string();
    }

    for (offset, row) in rows[header + 1..].iter().enumerate() {
        match parse_result_row(row) {
            Some(parsed) => run.results.push(parsed),
            None => {
                tracing::warn!("Skipping malformed result row {}", header + 1 + offset);
            }
        }
    }

    Ok(run)
}

fn apply_metadata(run: &mut TestRun, key: &str, value: &str) {
    let parse_count = |v: &str| v.trim().parse::<u64>().unwrap_or(0);

    match key {
        "filename" => run.filename = value.to_string(),
        "id" => run.id = value.to_string(),
        "pn" => run.pn = value.to_string(),
        "application" => run.application = value.to_string(),
        "revision" => run.revision = value.to_string(),
        "plt" => run.plt = value.to_string(),
        "datecode" => run.datecode = value.to_string(),
        "start_datetime" => run.start_datetime = datetime::parse_datetime(value),
        "relays_tested" => run.relays_tested = parse_count(value),
        "relays_passed_420" => run.relays_passed_420 = parse_count(value),
        "relays_failed_420" => run.relays_failed_420 = parse_count(value),
        "relays_failed_non_420" => run.relays_failed_non_420 = parse_count(value),
        "total_quantity" => run.total_quantity = parse_count(value),
        "reject_quantity" => run.reject_quantity = parse_count(value),
        "issue_quantity" => run.issue_quantity = parse_count(value),
        "yield" => run.yield_pct = value.parse().unwrap_or(0.0),
        "issue_yield" => run.issue_yield = value.parse().unwrap_or(0.0),
        "elapsed_time" => run.elapsed_time = value.to_string(),
        "idle_time" => run.idle_time = value.to_string(),
        "test_time" => run.test_time = value.to_string(),
        _ => {
            // Anything else is either a specification column or noise.
            let recognized = value
                .parse::<f64>()
                .map(|number| run.specifications.set_field(key, number))
                .unwrap_or(false);
            if !recognized {
                tracing::debug!("Ignoring metadata key {key:?}");
            }
        }
    }
}

fn parse_result_row(row: &[String]) -> Option<TestResultRow> {
    if row.len() < parser::RESULT_COLUMNS.len() {
        return None;
    }
    let test_type = TestType::from_code(&row[2])?;
    Some(TestResultRow {
        dut_no: row[0].trim().parse().ok()?,
        switch: row[1].trim().parse().ok()?,
        test_type,
        value: parser::parse_measurement(&row[3]),
        result: row[4].trim().to_string(),
    })
}
