//! Shared temperature checking
//!
//! Devices report temperatures in °C, °F or K depending on vendor and
//! configuration; everything is normalized to °C before levels apply.

use std::str::FromStr;

use crate::check::{CheckResult, Metric};
use crate::levels::{check_levels, LowerLevels, UpperLevels};
use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Unit, String> {
        match s.trim().to_lowercase().as_str() {
            "c" | "°c" | "deg c" | "celsius" => Ok(Unit::Celsius),
            "f" | "°f" | "deg f" | "fahrenheit" => Ok(Unit::Fahrenheit),
            "k" | "kelvin" => Ok(Unit::Kelvin),
            other => Err(format!("unknown temperature unit '{}'", other)),
        }
    }
}

pub fn to_celsius(value: f64, unit: Unit) -> f64 {
    match unit {
        Unit::Celsius => value,
        Unit::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
        Unit::Kelvin => value - 273.15,
    }
}

#[derive(Debug, Clone, Default)]
pub struct TempParams {
    pub levels: Option<UpperLevels<f64>>,
    pub levels_lower: Option<LowerLevels<f64>>,
}

impl TempParams {
    pub fn upper(warn: f64, crit: f64) -> TempParams {
        TempParams {
            levels: Some(UpperLevels::warn_crit(warn, crit)),
            levels_lower: None,
        }
    }
}

/// Check a temperature already normalized to °C. Emits the `temp` metric.
pub fn check_temperature(celsius: f64, params: &TempParams) -> CheckResult {
    check_levels(celsius, "", &params.levels, &params.levels_lower, render::celsius)
        .metric(Metric::new("temp", celsius).levels(&params.levels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Status;

    #[test]
    fn normalizes_units() {
        assert_eq!(to_celsius(212.0, Unit::Fahrenheit), 100.0);
        assert_eq!(to_celsius(273.15, Unit::Kelvin), 0.0);
        assert_eq!(to_celsius(21.5, Unit::Celsius), 21.5);
        assert_eq!("deg F".parse::<Unit>().unwrap(), Unit::Fahrenheit);
        assert!("smoots".parse::<Unit>().is_err());
    }

    #[test]
    fn ok_temperature() {
        let r = check_temperature(21.5, &TempParams::upper(30.0, 35.0));
        assert_eq!(r.status, Status::Ok);
        assert_eq!(r.text, "21.5 \u{b0}C");
        assert_eq!(r.metrics[0].to_string(), "temp=21.5;30;35;;");
    }

    #[test]
    fn hot_temperature_goes_critical() {
        let r = check_temperature(36.0, &TempParams::upper(30.0, 35.0));
        assert_eq!(r.status, Status::Critical);
        assert_eq!(r.text, "36.0 \u{b0}C (warn/crit at 30.0 \u{b0}C/35.0 \u{b0}C)");
    }

    #[test]
    fn freezer_has_lower_levels() {
        let params = TempParams {
            levels: None,
            levels_lower: Some(LowerLevels::warn_crit(-5.0, -10.0)),
        };
        let r = check_temperature(-7.0, &params);
        assert_eq!(r.status, Status::Warning);
        let r = check_temperature(-20.0, &params);
        assert_eq!(r.status, Status::Critical);
    }
}
