use serde::{Deserialize, Serialize};

use crate::profiles::ViewProfile;

/// Visible x-axis range of one histogram chart, in measurement units.
///
/// Owned by the chart instance presenting the data; the binning function
/// takes it by value and never mutates it. Invariant: `min < max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewWindow {
    pub min: f64,
    pub max: f64,
}

impl ViewWindow {
    /// Build a window, rejecting empty or non-finite ranges.
    pub fn new(min: f64, max: f64) -> Option<Self> {
        if min.is_finite() && max.is_finite() && min < max {
            Some(Self { min, max })
        } else {
            None
        }
    }

    /// The default window for a test: its full view range.
    pub fn from_profile(profile: &ViewProfile) -> Self {
        Self {
            min: profile.min_view,
            max: profile.max_view,
        }
    }

    /// Apply a pan/zoom range from the chart. Degenerate ranges are
    /// ignored and leave the window unchanged; returns whether it moved.
    pub fn set_range(&mut self, min: f64, max: f64) -> bool {
        match Self::new(min, max) {
            Some(next) => {
                *self = next;
                true
            }
            None => false,
        }
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_ranges() {
        assert!(ViewWindow::new(0.0, 10.0).is_some());
        assert!(ViewWindow::new(10.0, 10.0).is_none());
        assert!(ViewWindow::new(10.0, 0.0).is_none());
        assert!(ViewWindow::new(f64::NAN, 1.0).is_none());
        assert!(ViewWindow::new(0.0, f64::INFINITY).is_none());
    }

    #[test]
    fn set_range_ignores_bad_input() {
        let mut window = ViewWindow::new(0.0, 10.0).unwrap();
        assert!(!window.set_range(5.0, 5.0));
        assert_eq!(window, ViewWindow { min: 0.0, max: 10.0 });
        assert!(window.set_range(2.0, 8.0));
        assert_eq!(window, ViewWindow { min: 2.0, max: 8.0 });
    }

    #[test]
    fn contains_is_inclusive() {
        let window = ViewWindow::new(0.0, 10.0).unwrap();
        assert!(window.contains(0.0));
        assert!(window.contains(10.0));
        assert!(!window.contains(10.1));
    }
}
