use std::path::Path;

use serde::Serialize;

use crate::processing::histogram::{self, HistogramDataSet};
use crate::processing::pareto::{self, ParetoAnalysis};
use crate::processing::summary::{self, RunSummary};
use crate::profiles::TestType;
use crate::state::test_run::TestRun;
use crate::state::view_window::ViewWindow;

/// One histogram of the report: which switch and test it belongs to,
/// plus the full chart dataset at the default view window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramFeed {
    pub switch: u32,
    pub test_type: TestType,
    pub name: &'static str,
    pub units: &'static str,
    pub dataset: HistogramDataSet,
}

/// Everything a report renderer needs for one run: summary block, Pareto
/// bars, and one histogram per (switch, test type).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportFeed {
    pub summary: RunSummary,
    pub pareto: ParetoAnalysis,
    pub histograms: Vec<HistogramFeed>,
}

/// Assemble the complete chart feed for a run. Tests whose specification
/// is missing required values are left out.
pub fn build_report_feed(run: &TestRun) -> ReportFeed {
    let mut histograms = Vec::new();
    for (switch, tests) in run.switch_samples() {
        for (test_type, samples) in tests {
            let Some(profile) = test_type.view_profile(&run.specifications) else {
                tracing::debug!("No view profile for {test_type} on switch {switch}");
                continue;
            };
            let dataset = histogram::build(&samples, &profile, ViewWindow::from_profile(&profile));
            histograms.push(HistogramFeed {
                switch,
                test_type,
                name: test_type.name(),
                units: test_type.units().unwrap_or_default(),
                dataset,
            });
        }
    }

    ReportFeed {
        summary: summary::combine(&[run]),
        pareto: pareto::first_failure_pareto(run),
        histograms,
    }
}

/// Write the JSON chart feed for a run. Non-finite statistics serialize
/// as null; renderers show those as "N/A".
pub fn write_chart_feed(run: &TestRun, path: &Path) -> Result<(), String> {
    let feed = build_report_feed(run);
    let json =
        serde_json::to_string_pretty(&feed).map_err(|e| format!("Failed to serialize feed: {e}"))?;
    std::fs::write(path, json).map_err(|e| format!("Failed to write {path:?}: {e}"))?;
    tracing::info!("Exported chart feed to {:?}", path);
    Ok(())
}

/// Write the raw measurement table as CSV, one row per result, blank
/// value cells for null measurements.
pub fn write_raw_table(run: &TestRun, path: &Path) -> Result<(), String> {
    let mut out = String::from("dut_no,switch,test_type,value,result\n");
    for row in &run.results {
        let value = match row.value {
            Some(v) => format!("{v}"),
            None => String::new(),
        };
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            row.dut_no, row.switch, row.test_type, value, row.result
        ));
    }
    std::fs::write(path, out).map_err(|e| format!("Failed to write {path:?}: {e}"))?;
    tracing::info!("Exported raw table to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::SpecLimits;
    use crate::state::test_run::TestResultRow;

    fn sample_run() -> TestRun {
        let specifications = SpecLimits {
            nominal_voltage: Some(12.0),
            ovt_min_voltage: Some(3.0),
            ovt_max_voltage: Some(9.0),
            ..Default::default()
        };
        let mut results = Vec::new();
        for (dut, value, result) in [(1, Some(4.2), "PASS"), (2, Some(9.5), "OVT"), (3, None, "KEL")]
        {
            results.push(TestResultRow {
                dut_no: dut,
                switch: 0,
                test_type: if value.is_some() { TestType::Ovt } else { TestType::Kel },
                value,
                result: result.to_string(),
            });
        }
        TestRun {
            filename: "A1234.dat".to_string(),
            relays_tested: 3,
            relays_passed_420: 1,
            relays_failed_420: 2,
            specifications,
            results,
            ..Default::default()
        }
    }

    #[test]
    fn feed_contains_one_histogram_per_switch_test_pair() {
        let feed = build_report_feed(&sample_run());
        assert_eq!(feed.histograms.len(), 1);
        let histogram = &feed.histograms[0];
        assert_eq!(histogram.test_type, TestType::Ovt);
        assert_eq!(histogram.units, "Volts");
        assert_eq!(histogram.dataset.sample_count(), 2);
        assert_eq!(feed.summary.relays_tested, 3);
        // Two DUTs failed: one at OVT, one at KEL.
        assert_eq!(feed.pareto.entries.len(), 2);
    }

    #[test]
    fn chart_feed_serializes_nan_as_null() {
        let mut run = sample_run();
        run.results.truncate(1); // a single sample leaves sigma undefined
        let feed = build_report_feed(&run);
        let json = serde_json::to_string(&feed).unwrap();
        assert!(json.contains("\"sigma\":null"));
        assert!(!json.contains("NaN"));
    }

    #[test]
    fn raw_table_round_trips_through_the_loader() {
        let run = sample_run();
        let dir = std::env::temp_dir().join("relayscope-export-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("raw.csv");
        write_raw_table(&run, &path).unwrap();

        let rows = crate::data::parser::read_rows_csv(&path).unwrap();
        let reloaded = crate::data::loader::run_from_rows(&rows, "raw.csv").unwrap();
        assert_eq!(reloaded.results, run.results);
    }
}
