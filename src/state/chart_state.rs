use crate::processing::histogram::{self, HistogramDataSet};
use crate::profiles::{SpecLimits, TestType, ViewProfile};
use crate::state::view_window::ViewWindow;

static NEXT_CHART_ID: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);

fn next_chart_id() -> u64 {
    NEXT_CHART_ID.fetch_add(1, std::sync::atomic::Ordering::Relaxed)
}

/// One histogram chart instance: a test type, its resolved profile, the
/// raw samples behind it, and the visible window the user has panned or
/// zoomed to.
///
/// The window is the only mutable piece. Every interaction event triggers
/// a full recomputation through [`histogram::build`]; nothing is cached
/// between events.
#[derive(Debug, Clone)]
pub struct ChartState {
    pub id: u64,
    pub test_type: TestType,
    profile: ViewProfile,
    samples: Vec<Option<f64>>,
    view: ViewWindow,
}

impl ChartState {
    /// Create a chart for a histogram-capable test. `None` when the test
    /// type has no histogram or the specification lacks required values.
    pub fn new(
        test_type: TestType,
        limits: &SpecLimits,
        samples: Vec<Option<f64>>,
    ) -> Option<Self> {
        let profile = test_type.view_profile(limits)?;
        Some(Self {
            id: next_chart_id(),
            test_type,
            profile,
            samples,
            view: ViewWindow::from_profile(&profile),
        })
    }

    pub fn profile(&self) -> &ViewProfile {
        &self.profile
    }

    pub fn view(&self) -> ViewWindow {
        self.view
    }

    /// Recompute the chart feed for the current window.
    pub fn dataset(&self) -> HistogramDataSet {
        histogram::build(&self.samples, &self.profile, self.view)
    }

    /// Pan finished: adopt the new range and rebucket everything.
    pub fn on_pan_complete(&mut self, min: f64, max: f64) -> HistogramDataSet {
        self.view.set_range(min, max);
        self.dataset()
    }

    /// Zoom finished: adopt the new range and rebucket everything.
    pub fn on_zoom_complete(&mut self, min: f64, max: f64) -> HistogramDataSet {
        self.view.set_range(min, max);
        self.dataset()
    }

    /// Reset to the test's full view range (not the last panned range).
    pub fn on_reset(&mut self) -> HistogramDataSet {
        self.view = ViewWindow::from_profile(&self.profile);
        self.dataset()
    }

    /// Switch this chart to a different test or specification. The window
    /// resets to the new profile's defaults. `false` (and no change) when
    /// the new test has no profile.
    pub fn set_test(
        &mut self,
        test_type: TestType,
        limits: &SpecLimits,
        samples: Vec<Option<f64>>,
    ) -> bool {
        match test_type.view_profile(limits) {
            Some(profile) => {
                self.test_type = test_type;
                self.profile = profile;
                self.samples = samples;
                self.view = ViewWindow::from_profile(&profile);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> SpecLimits {
        SpecLimits {
            nominal_voltage: Some(12.0),
            ovt_min_voltage: Some(3.0),
            ovt_max_voltage: Some(9.0),
            ..Default::default()
        }
    }

    fn chart() -> ChartState {
        let samples = vec![Some(4.1), Some(5.0), Some(8.2), Some(10.5), None];
        ChartState::new(TestType::Ovt, &limits(), samples).unwrap()
    }

    #[test]
    fn new_rejects_tests_without_histograms() {
        assert!(ChartState::new(TestType::Kel, &limits(), Vec::new()).is_none());
        assert!(ChartState::new(TestType::Crs, &limits(), Vec::new()).is_none());
    }

    #[test]
    fn window_starts_at_the_full_view_range() {
        let chart = chart();
        assert_eq!(chart.view(), ViewWindow { min: 0.0, max: 12.0 });
    }

    #[test]
    fn zoom_rebuckets_and_reset_restores_defaults() {
        let mut chart = chart();

        let zoomed = chart.on_zoom_complete(0.0, 10.0);
        assert_eq!(chart.view(), ViewWindow { min: 0.0, max: 10.0 });
        assert!(zoomed.overflow_array.iter().all(|b| b.x > 10.0));

        chart.on_pan_complete(2.0, 6.0);
        assert_eq!(chart.view(), ViewWindow { min: 2.0, max: 6.0 });

        let reset = chart.on_reset();
        assert_eq!(chart.view(), ViewWindow { min: 0.0, max: 12.0 });
        // 10.5 is visible again in the full range.
        assert!(reset.overflow_array.is_empty());
    }

    #[test]
    fn degenerate_event_range_keeps_the_previous_window() {
        let mut chart = chart();
        chart.on_zoom_complete(5.0, 5.0);
        assert_eq!(chart.view(), ViewWindow { min: 0.0, max: 12.0 });
    }

    #[test]
    fn chart_ids_are_unique() {
        assert_ne!(chart().id, chart().id);
    }
}
