//! Shared relative-humidity checking

use crate::check::{CheckResult, Metric};
use crate::levels::{check_levels, LowerLevels, UpperLevels};
use crate::render;

#[derive(Debug, Clone, Default)]
pub struct HumidityParams {
    pub levels: Option<UpperLevels<f64>>,
    pub levels_lower: Option<LowerLevels<f64>>,
}

impl HumidityParams {
    pub fn upper(warn: f64, crit: f64) -> HumidityParams {
        HumidityParams {
            levels: Some(UpperLevels::warn_crit(warn, crit)),
            levels_lower: None,
        }
    }
}

/// Check a relative humidity in percent. Emits the `humidity` metric bounded
/// to 0..100.
pub fn check_humidity(percent: f64, params: &HumidityParams) -> CheckResult {
    check_levels(percent, "", &params.levels, &params.levels_lower, render::percent).metric(
        Metric::new("humidity", percent)
            .unit("%")
            .levels(&params.levels)
            .bounds(0.0, 100.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Status;

    #[test]
    fn comfortable_room() {
        let r = check_humidity(56.2, &HumidityParams::upper(60.0, 70.0));
        assert_eq!(r.status, Status::Ok);
        assert_eq!(r.text, "56.2%");
        assert_eq!(r.metrics[0].to_string(), "humidity=56.2%;60;70;0;100");
    }

    #[test]
    fn damp_room_warns() {
        let r = check_humidity(65.0, &HumidityParams::upper(60.0, 70.0));
        assert_eq!(r.status, Status::Warning);
        assert_eq!(r.text, "65.0% (warn/crit at 60.0%/70.0%)");
    }
}
