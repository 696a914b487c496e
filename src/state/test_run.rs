use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::profiles::{SpecLimits, TestType};

/// One measurement row: a device-under-test, one of its switches, one
/// test, the measured value (null for pass/fail-only tests or skipped
/// measurements) and the tester's verdict code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResultRow {
    pub dut_no: u32,
    pub switch: u32,
    pub test_type: TestType,
    pub value: Option<f64>,
    /// `"PASS"` or a failure reason code.
    pub result: String,
}

impl TestResultRow {
    pub fn passed(&self) -> bool {
        self.result == "PASS"
    }
}

/// One production test run: report header, operator-entered quantities,
/// the part's specification limits, and all measurement rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestRun {
    pub filename: String,
    pub id: String,
    pub pn: String,
    pub application: String,
    pub revision: String,
    pub plt: String,
    pub datecode: String,
    pub start_datetime: Option<NaiveDateTime>,
    pub relays_tested: u64,
    pub relays_passed_420: u64,
    pub relays_failed_420: u64,
    pub relays_failed_non_420: u64,
    pub total_quantity: u64,
    pub reject_quantity: u64,
    pub issue_quantity: u64,
    #[serde(rename = "yield")]
    pub yield_pct: f64,
    pub issue_yield: f64,
    /// `HH:MM:SS` strings as reported by the tester.
    pub elapsed_time: String,
    pub idle_time: String,
    pub test_time: String,
    pub specifications: SpecLimits,
    pub results: Vec<TestResultRow>,
}

impl TestRun {
    /// Group measurement rows into per-switch, per-test sample vectors for
    /// histogram rendering. Pass/fail-only tests are skipped; null values
    /// stay in place (the binner filters them when it counts).
    pub fn switch_samples(&self) -> BTreeMap<u32, BTreeMap<TestType, Vec<Option<f64>>>> {
        let mut grouped: BTreeMap<u32, BTreeMap<TestType, Vec<Option<f64>>>> = BTreeMap::new();
        for row in &self.results {
            if !row.test_type.has_histogram() {
                continue;
            }
            grouped
                .entry(row.switch)
                .or_default()
                .entry(row.test_type)
                .or_default()
                .push(row.value);
        }
        grouped
    }

    /// Distinct DUT count present in the measurement rows.
    pub fn dut_count(&self) -> usize {
        let mut duts: Vec<u32> = self.results.iter().map(|r| r.dut_no).collect();
        duts.sort_unstable();
        duts.dedup();
        duts.len()
    }
}

/// Search criteria over loaded test runs.
///
/// A non-empty `filenames` list matches by filename alone; otherwise all
/// present criteria must hold at once. Date bounds compare against the
/// calendar date of `start_datetime`, inclusive on both ends.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TestRunFilter {
    pub filenames: Vec<String>,
    pub pn: Option<String>,
    pub application: Option<String>,
    pub plt: Option<String>,
    pub start_date_from: Option<NaiveDate>,
    pub start_date_to: Option<NaiveDate>,
    pub min_yield: Option<f64>,
    pub max_yield: Option<f64>,
}

impl TestRunFilter {
    pub fn is_empty(&self) -> bool {
        self == &TestRunFilter::default()
    }

    pub fn matches(&self, run: &TestRun) -> bool {
        if !self.filenames.is_empty() {
            return self.filenames.iter().any(|f| f == &run.filename);
        }

        if self.pn.as_deref().is_some_and(|pn| pn != run.pn) {
            return false;
        }
        if self
            .application
            .as_deref()
            .is_some_and(|a| a != run.application)
        {
            return false;
        }
        if self.plt.as_deref().is_some_and(|plt| plt != run.plt) {
            return false;
        }

        if self.start_date_from.is_some() || self.start_date_to.is_some() {
            let Some(start) = run.start_datetime else {
                return false;
            };
            let date = start.date();
            if self.start_date_from.is_some_and(|from| date < from) {
                return false;
            }
            if self.start_date_to.is_some_and(|to| date > to) {
                return false;
            }
        }

        if self.min_yield.is_some_and(|y| run.yield_pct < y) {
            return false;
        }
        if self.max_yield.is_some_and(|y| run.yield_pct > y) {
            return false;
        }

        true
    }

    pub fn apply<'a>(&self, runs: &'a [TestRun]) -> Vec<&'a TestRun> {
        runs.iter().filter(|run| self.matches(run)).collect()
    }
}
