use std::collections::HashSet;

use serde::Serialize;

use crate::profiles::TestType;
use crate::state::test_run::TestRun;

/// Attribution order for failure scanning: a DUT that failed several
/// tests is charged to the first failing test in this order. Test types
/// not listed here sort last.
pub const FAILURE_SCAN_ORDER: [TestType; 18] = [
    TestType::Kel,
    TestType::Sho,
    TestType::Dio,
    TestType::Crs,
    TestType::Irs,
    TestType::Scr,
    TestType::Ovt,
    TestType::Rvt,
    TestType::Rcu,
    TestType::Ocu,
    TestType::Vtd,
    TestType::Vtr,
    TestType::Atm,
    TestType::Otm,
    TestType::Rtm,
    TestType::Dcr,
    TestType::Dcp,
    TestType::Scs,
];

fn scan_rank(test_type: TestType) -> usize {
    FAILURE_SCAN_ORDER
        .iter()
        .position(|&t| t == test_type)
        .unwrap_or(FAILURE_SCAN_ORDER.len())
}

/// One bar of the Pareto chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParetoEntry {
    pub test_type: TestType,
    pub reason: String,
    pub count: u64,
    /// `"{test name} ({count}) - {reason}"`, ready for the axis.
    pub label: String,
}

/// First-failure Pareto breakdown of one run, plus the rejects that never
/// reached this tester.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParetoAnalysis {
    /// Sorted ascending by count (the chart stacks smallest first).
    pub entries: Vec<ParetoEntry>,
    pub non_420_rejects: u64,
}

/// Count each DUT's first failure, grouped by (test type, reason).
///
/// Rows are scanned in [`FAILURE_SCAN_ORDER`]; once a DUT has been charged
/// to a failure, its remaining rows are ignored.
pub fn first_failure_pareto(run: &TestRun) -> ParetoAnalysis {
    let mut rows: Vec<_> = run.results.iter().collect();
    rows.sort_by_key(|r| scan_rank(r.test_type));

    let mut charged: HashSet<u32> = HashSet::new();
    // Keyed counts in first-appearance order, so equal-count entries keep
    // a stable position after the sort below.
    let mut counts: Vec<(TestType, String, u64)> = Vec::new();

    for row in rows {
        if row.passed() || charged.contains(&row.dut_no) {
            continue;
        }
        charged.insert(row.dut_no);

        match counts
            .iter_mut()
            .find(|(t, reason, _)| *t == row.test_type && *reason == row.result)
        {
            Some((_, _, n)) => *n += 1,
            None => counts.push((row.test_type, row.result.clone(), 1)),
        }
    }

    let mut entries: Vec<ParetoEntry> = counts
        .into_iter()
        .map(|(test_type, reason, count)| ParetoEntry {
            label: format!("{} ({}) - {}", test_type.name(), count, reason),
            test_type,
            reason,
            count,
        })
        .collect();
    entries.sort_by_key(|e| e.count);

    ParetoAnalysis {
        entries,
        non_420_rejects: run.relays_failed_non_420,
    }
}
