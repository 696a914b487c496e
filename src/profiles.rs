use serde::{Deserialize, Serialize};

/// Electrical test codes produced by the production tester.
///
/// The first group has numeric measurements and renders as a histogram;
/// the second group (DIO..TTM) is pass/fail only and has no view profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestType {
    Crs,
    Ovt,
    Rvt,
    Ocu,
    Rcu,
    Vtd,
    Vtr,
    Atm,
    Otm,
    Rtm,
    Scr,
    Scs,
    Dcr,
    Dcp,
    Dio,
    Kel,
    Sho,
    Irs,
    Ttm,
}

pub const ALL_TEST_TYPES: [TestType; 19] = [
    TestType::Crs,
    TestType::Ovt,
    TestType::Rvt,
    TestType::Ocu,
    TestType::Rcu,
    TestType::Vtd,
    TestType::Vtr,
    TestType::Atm,
    TestType::Otm,
    TestType::Rtm,
    TestType::Scr,
    TestType::Scs,
    TestType::Dcr,
    TestType::Dcp,
    TestType::Dio,
    TestType::Kel,
    TestType::Sho,
    TestType::Irs,
    TestType::Ttm,
];

impl TestType {
    /// Parse a wire code such as `"CRS"`. Unknown codes return `None`.
    pub fn from_code(code: &str) -> Option<TestType> {
        let code = code.trim().to_ascii_uppercase();
        ALL_TEST_TYPES.iter().copied().find(|t| t.code() == code)
    }

    pub fn code(&self) -> &'static str {
        match self {
            TestType::Crs => "CRS",
            TestType::Ovt => "OVT",
            TestType::Rvt => "RVT",
            TestType::Ocu => "OCU",
            TestType::Rcu => "RCU",
            TestType::Vtd => "VTD",
            TestType::Vtr => "VTR",
            TestType::Atm => "ATM",
            TestType::Otm => "OTM",
            TestType::Rtm => "RTM",
            TestType::Scr => "SCR",
            TestType::Scs => "SCS",
            TestType::Dcr => "DCR",
            TestType::Dcp => "DCP",
            TestType::Dio => "DIO",
            TestType::Kel => "KEL",
            TestType::Sho => "SHO",
            TestType::Irs => "IRS",
            TestType::Ttm => "TTM",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TestType::Crs => "Coil Resistance",
            TestType::Ovt => "Operate Voltage",
            TestType::Rvt => "Release Voltage",
            TestType::Ocu => "Operate Current",
            TestType::Rcu => "Release Current",
            TestType::Vtd => "Operate-Release Voltage Differential",
            TestType::Vtr => "Operate/Release Voltage Ratio",
            TestType::Atm => "Actuate Time",
            TestType::Otm => "Operate Time",
            TestType::Rtm => "Release Time",
            TestType::Scr => "Static Contact Resistance",
            TestType::Scs => "Contact Resistance Stability",
            TestType::Dcr => "Dynamic Contact Resistance",
            TestType::Dcp => "Dynamic CR Peak to Peak",
            TestType::Dio => "Diode",
            TestType::Kel => "Kelvin",
            TestType::Sho => "Shorts",
            TestType::Irs => "Insulation Resistance",
            TestType::Ttm => "Transfer Time",
        }
    }

    /// Measurement units, or `None` for pass/fail-only tests.
    pub fn units(&self) -> Option<&'static str> {
        match self {
            TestType::Crs | TestType::Scr | TestType::Scs | TestType::Dcr | TestType::Dcp => {
                Some("Ohms")
            }
            TestType::Ovt | TestType::Rvt | TestType::Vtd => Some("Volts"),
            TestType::Ocu | TestType::Rcu => Some("Amps"),
            TestType::Vtr => Some("%"),
            TestType::Atm | TestType::Otm | TestType::Rtm => Some("\u{03bc}sec"),
            TestType::Dio | TestType::Kel | TestType::Sho | TestType::Irs | TestType::Ttm => None,
        }
    }

    /// Display precision for measurement values of this test.
    pub fn decimals(&self) -> u32 {
        match self {
            TestType::Crs => 3,
            TestType::Ovt | TestType::Rvt | TestType::Ocu | TestType::Rcu => 2,
            TestType::Vtd | TestType::Vtr => 2,
            TestType::Atm | TestType::Otm | TestType::Rtm | TestType::Ttm => 0,
            TestType::Scr | TestType::Scs | TestType::Dcr | TestType::Dcp => 4,
            TestType::Dio | TestType::Kel | TestType::Sho => 2,
            TestType::Irs => 0,
        }
    }

    /// Histogram bin width, or `None` for tests without a histogram.
    pub fn bin_size(&self) -> Option<f64> {
        match self {
            TestType::Crs => Some(1.0),
            TestType::Ovt | TestType::Rvt => Some(0.1),
            TestType::Ocu | TestType::Rcu => Some(0.02),
            TestType::Vtd | TestType::Vtr => Some(0.5),
            TestType::Atm | TestType::Otm | TestType::Rtm => Some(0.01),
            TestType::Scr | TestType::Scs | TestType::Dcr => Some(0.001),
            TestType::Dcp => Some(0.002),
            TestType::Dio | TestType::Kel | TestType::Sho | TestType::Irs | TestType::Ttm => None,
        }
    }

    /// Whether this test renders as a histogram (has units and a bin size).
    pub fn has_histogram(&self) -> bool {
        self.units().is_some()
    }

    /// Resolve the view/pass parameters for this test against a part's
    /// specification limits. `None` when the test has no histogram or the
    /// specification is missing a value the formulas need.
    pub fn view_profile(&self, limits: &SpecLimits) -> Option<ViewProfile> {
        let bin_size = self.bin_size()?;
        let decimals = self.decimals();

        let (min_view, max_view, min_pass, max_pass) = match self {
            TestType::Crs => {
                let nom = limits.crs_nom_resistance?;
                let tol = limits.crs_tolerance?;
                let hi = nom * (1.0 + tol / 100.0);
                let lo = nom * (1.0 - tol / 100.0);
                (
                    (lo / 50.0).ceil() * 50.0 - 50.0,
                    (hi / 50.0).ceil() * 50.0 + 50.0,
                    Some(lo),
                    Some(hi),
                )
            }
            TestType::Ovt => (
                0.0,
                limits.nominal_voltage?,
                limits.ovt_min_voltage,
                limits.ovt_max_voltage,
            ),
            TestType::Rvt => (
                0.0,
                limits.nominal_voltage?,
                limits.rvt_min_voltage,
                limits.rvt_max_voltage,
            ),
            TestType::Ocu => {
                let max = limits.ocu_max_current?;
                (
                    0.0,
                    (max / 0.02).ceil() * 0.02 + 0.02,
                    limits.ocu_min_current,
                    Some(max),
                )
            }
            TestType::Rcu => {
                let max = limits.rcu_max_current?;
                (
                    0.0,
                    (max / 0.02).ceil() * 0.02 + 0.02,
                    limits.rcu_min_current,
                    Some(max),
                )
            }
            TestType::Vtd => (
                0.0,
                limits.nominal_voltage?,
                limits.vtd_min_differential,
                limits.vtd_max_differential,
            ),
            TestType::Vtr => (
                0.0,
                limits.nominal_voltage?,
                limits.vtr_min_percentage,
                limits.vtr_max_percentage,
            ),
            // Time limits are specified in milliseconds; charts use microseconds.
            TestType::Atm => {
                let max = limits.atm_max_time?;
                (
                    0.0,
                    (max * 1000.0 / 0.05).ceil() * 0.05 + 0.05,
                    None,
                    Some((max * 1000.0).ceil()),
                )
            }
            TestType::Otm => {
                let max = limits.otm_max_time?;
                (
                    0.0,
                    (max * 1000.0 / 0.05).ceil() * 0.05 + 0.05,
                    None,
                    Some((max * 1000.0).ceil()),
                )
            }
            TestType::Rtm => {
                let max = limits.rtm_max_time?;
                (
                    0.0,
                    ((max / 0.05).ceil() * 0.05 + 0.05) * 1000.0,
                    None,
                    Some(max * 1000.0),
                )
            }
            TestType::Scr => {
                let max = limits.scr_max_resistance?;
                (
                    0.0,
                    (max / 0.01).ceil() * 0.01 + 0.01,
                    limits.scr_min_resistance,
                    Some(max),
                )
            }
            TestType::Scs => {
                let max = limits.scs_max_delta?;
                (0.0, (max / 0.03).ceil() * 0.03 + 0.03, None, Some(max))
            }
            TestType::Dcr => {
                let max = limits.dcr_max_peak?;
                (0.0, (max / 0.01).ceil() * 0.01 + 0.01, None, Some(max))
            }
            TestType::Dcp => {
                let max = limits.dcp_max_peak_to_peak?;
                (0.0, (max / 0.01).ceil() * 0.01 + 0.01, None, Some(max))
            }
            TestType::Dio
            | TestType::Kel
            | TestType::Sho
            | TestType::Irs
            | TestType::Ttm => return None,
        };

        Some(ViewProfile {
            min_view,
            max_view,
            min_pass,
            max_pass,
            bin_size,
            decimals,
        })
    }
}

impl std::fmt::Display for TestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Resolved chart parameters for one (test type, specification) pair.
///
/// `min_pass`/`max_pass` absent means no limit on that side; every
/// in-window value is then a pass on that side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewProfile {
    pub min_view: f64,
    pub max_view: f64,
    pub min_pass: Option<f64>,
    pub max_pass: Option<f64>,
    pub bin_size: f64,
    pub decimals: u32,
}

/// Specification limits for one part number, as entered on the
/// specification sheet. Columns are nullable; a profile that needs a
/// missing value resolves to `None` instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecLimits {
    pub nominal_voltage: Option<f64>,
    pub crs_nom_resistance: Option<f64>,
    pub crs_tolerance: Option<f64>,
    pub ovt_min_voltage: Option<f64>,
    pub ovt_max_voltage: Option<f64>,
    pub rvt_min_voltage: Option<f64>,
    pub rvt_max_voltage: Option<f64>,
    pub ocu_min_current: Option<f64>,
    pub ocu_max_current: Option<f64>,
    pub rcu_min_current: Option<f64>,
    pub rcu_max_current: Option<f64>,
    pub vtd_min_differential: Option<f64>,
    pub vtd_max_differential: Option<f64>,
    pub vtr_min_percentage: Option<f64>,
    pub vtr_max_percentage: Option<f64>,
    pub atm_max_time: Option<f64>,
    pub otm_max_time: Option<f64>,
    pub rtm_max_time: Option<f64>,
    pub scr_min_resistance: Option<f64>,
    pub scr_max_resistance: Option<f64>,
    pub scs_max_delta: Option<f64>,
    pub dcr_max_peak: Option<f64>,
    pub dcp_max_peak_to_peak: Option<f64>,
}

impl SpecLimits {
    /// Set a limit column by its sheet name. Returns false for unknown names.
    pub fn set_field(&mut self, name: &str, value: f64) -> bool {
        let slot = match name {
            "nominal_voltage" => &mut self.nominal_voltage,
            "crs_nom_resistance" => &mut self.crs_nom_resistance,
            "crs_tolerance" => &mut self.crs_tolerance,
            "ovt_min_voltage" => &mut self.ovt_min_voltage,
            "ovt_max_voltage" => &mut self.ovt_max_voltage,
            "rvt_min_voltage" => &mut self.rvt_min_voltage,
            "rvt_max_voltage" => &mut self.rvt_max_voltage,
            "ocu_min_current" => &mut self.ocu_min_current,
            "ocu_max_current" => &mut self.ocu_max_current,
            "rcu_min_current" => &mut self.rcu_min_current,
            "rcu_max_current" => &mut self.rcu_max_current,
            "vtd_min_differential" => &mut self.vtd_min_differential,
            "vtd_max_differential" => &mut self.vtd_max_differential,
            "vtr_min_percentage" => &mut self.vtr_min_percentage,
            "vtr_max_percentage" => &mut self.vtr_max_percentage,
            "atm_max_time" => &mut self.atm_max_time,
            "otm_max_time" => &mut self.otm_max_time,
            "rtm_max_time" => &mut self.rtm_max_time,
            "scr_min_resistance" => &mut self.scr_min_resistance,
            "scr_max_resistance" => &mut self.scr_max_resistance,
            "scs_max_delta" => &mut self.scs_max_delta,
            "dcr_max_peak" => &mut self.dcr_max_peak,
            "dcp_max_peak_to_peak" => &mut self.dcp_max_peak_to_peak,
            _ => return false,
        };
        *slot = Some(value);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coil_limits() -> SpecLimits {
        SpecLimits {
            crs_nom_resistance: Some(500.0),
            crs_tolerance: Some(10.0),
            ..Default::default()
        }
    }

    #[test]
    fn code_roundtrip() {
        for t in ALL_TEST_TYPES {
            assert_eq!(TestType::from_code(t.code()), Some(t));
        }
        assert_eq!(TestType::from_code(" crs "), Some(TestType::Crs));
        assert_eq!(TestType::from_code("FBO"), None);
    }

    #[test]
    fn crs_view_range_rounds_outward_to_fifty() {
        let profile = TestType::Crs.view_profile(&coil_limits()).unwrap();
        // Pass band 450..550; the view widens each side to a 50-Ohm step.
        let lo = profile.min_pass.unwrap();
        let hi = profile.max_pass.unwrap();
        assert!((lo - 450.0).abs() < 1e-9);
        assert!((hi - 550.0).abs() < 1e-9);
        assert_eq!(profile.min_view, 400.0);
        assert!(profile.max_view > hi);
        assert!(profile.max_view <= hi + 100.0);
        assert_eq!(profile.max_view % 50.0, 0.0);
        assert_eq!(profile.bin_size, 1.0);
        assert_eq!(profile.decimals, 3);
    }

    #[test]
    fn actuate_time_limits_scale_to_microseconds() {
        let limits = SpecLimits {
            atm_max_time: Some(0.5), // 0.5 ms
            ..Default::default()
        };
        let profile = TestType::Atm.view_profile(&limits).unwrap();
        assert_eq!(profile.max_pass, Some(500.0));
        assert_eq!(profile.min_pass, None);
        assert!(profile.max_view > 500.0);
    }

    #[test]
    fn pass_fail_only_tests_have_no_profile() {
        let limits = coil_limits();
        for t in [
            TestType::Dio,
            TestType::Kel,
            TestType::Sho,
            TestType::Irs,
            TestType::Ttm,
        ] {
            assert!(t.view_profile(&limits).is_none());
            assert!(!t.has_histogram());
            assert!(t.units().is_none());
        }
    }

    #[test]
    fn missing_specification_value_yields_no_profile() {
        let empty = SpecLimits::default();
        assert!(TestType::Crs.view_profile(&empty).is_none());
        assert!(TestType::Ovt.view_profile(&empty).is_none());
        assert!(TestType::Scr.view_profile(&empty).is_none());
    }

    #[test]
    fn operate_current_view_max_steps_past_limit() {
        let limits = SpecLimits {
            ocu_max_current: Some(0.05),
            ocu_min_current: Some(0.01),
            ..Default::default()
        };
        let profile = TestType::Ocu.view_profile(&limits).unwrap();
        // 0.05 rounds up to 0.06, plus one more 0.02 step.
        assert!((profile.max_view - 0.08).abs() < 1e-12);
        assert_eq!(profile.min_view, 0.0);
        assert_eq!(profile.max_pass, Some(0.05));
        assert_eq!(profile.min_pass, Some(0.01));
    }

    #[test]
    fn set_field_by_sheet_name() {
        let mut limits = SpecLimits::default();
        assert!(limits.set_field("scs_max_delta", 0.15));
        assert_eq!(limits.scs_max_delta, Some(0.15));
        assert!(!limits.set_field("bogus_column", 1.0));
    }
}
