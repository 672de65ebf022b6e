//! NTI ENVIROMUX server environment monitors
//!
//! One internal-sensor table feeds three plugins (temperature, voltage,
//! humidity), split by the sensor type code. Temperature and voltage values
//! arrive scaled by ten; the device's own min/max thresholds become the
//! default levels.

use std::collections::BTreeMap;

use crate::check::{CheckResult, Metric, ServiceReport};
use crate::checks::humidity::{check_humidity, HumidityParams};
use crate::checks::temperature::{check_temperature, TempParams};
use crate::levels::{check_levels, LowerLevels, UpperLevels};
use crate::plugin::{CheckContext, SnmpPlugin};
use crate::render;
use crate::snmp::{startswith, Detect, SnmpTree, StringTable, SYS_OBJECT_ID};

pub fn detect_enviromux() -> Detect {
    startswith(SYS_OBJECT_ID, ".1.3.6.1.4.1.3699")
}

const SENSOR_TABLE: SnmpTree = SnmpTree {
    base: ".1.3.6.1.4.1.3699.1.1.11.1.3.1.1",
    // index, type, description, value, min threshold, max threshold
    columns: &["1", "2", "3", "6", "10", "11"],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Temperature,
    Humidity,
    Voltage,
}

#[derive(Debug)]
pub struct Sensor {
    pub kind: SensorKind,
    pub value: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

pub type Section = BTreeMap<String, Sensor>;

/// Tenth-scaled raw readings for temperature and voltage, plain percent for
/// humidity.
fn scale(kind: SensorKind, raw: f64) -> f64 {
    match kind {
        SensorKind::Temperature | SensorKind::Voltage => raw / 10.0,
        SensorKind::Humidity => raw,
    }
}

pub fn parse_enviromux(table: &StringTable) -> Section {
    let mut section = Section::new();
    for row in table {
        let (index, kind, descr, value, min, max) = match row.as_slice() {
            [index, kind, descr, value, min, max] => (index, kind, descr, value, min, max),
            _ => continue,
        };
        let kind = match kind.as_str() {
            "1" => SensorKind::Temperature,
            "2" => SensorKind::Humidity,
            "3" => SensorKind::Voltage,
            _ => continue,
        };
        let value: f64 = match value.parse() {
            Ok(value) => scale(kind, value),
            Err(_) => continue,
        };
        section.insert(
            format!("{} {}", index, descr),
            Sensor {
                kind,
                value,
                min: min.parse().ok().map(|m| scale(kind, m)),
                max: max.parse().ok().map(|m| scale(kind, m)),
            },
        );
    }
    section
}

pub fn discover(section: &Section, kind: SensorKind) -> Vec<String> {
    section
        .iter()
        .filter(|(_, sensor)| sensor.kind == kind)
        .map(|(item, _)| item.clone())
        .collect()
}

/// Device-provided min/max as warn=crit levels unless the params say
/// otherwise.
fn device_levels(sensor: &Sensor) -> (Option<UpperLevels<f64>>, Option<LowerLevels<f64>>) {
    (
        sensor.max.map(|max| UpperLevels::warn_crit(max, max)),
        sensor.min.map(|min| LowerLevels::warn_crit(min, min)),
    )
}

pub fn check_enviromux_temp(item: &str, section: &Section) -> Option<CheckResult> {
    let sensor = section.get(item)?;
    let (upper, lower) = device_levels(sensor);
    let params = TempParams {
        levels: upper,
        levels_lower: lower,
    };
    Some(check_temperature(sensor.value, &params))
}

pub fn check_enviromux_humidity(item: &str, section: &Section) -> Option<CheckResult> {
    let sensor = section.get(item)?;
    let (upper, lower) = device_levels(sensor);
    let params = HumidityParams {
        levels: upper,
        levels_lower: lower,
    };
    Some(check_humidity(sensor.value, &params))
}

pub fn check_enviromux_voltage(item: &str, section: &Section) -> Option<CheckResult> {
    let sensor = section.get(item)?;
    let (upper, lower) = device_levels(sensor);
    let result = check_levels(sensor.value, "Input voltage", &upper, &lower, render::volts)
        .metric(Metric::new("voltage", sensor.value).levels(&upper));
    Some(result)
}

macro_rules! enviromux_plugin {
    ($plugin:ident, $name:expr, $kind:expr, $service:expr, $check:ident) => {
        pub struct $plugin;

        impl SnmpPlugin for $plugin {
            fn name(&self) -> &'static str {
                $name
            }

            fn detect(&self) -> Detect {
                detect_enviromux()
            }

            fn trees(&self) -> &'static [SnmpTree] {
                &[SENSOR_TABLE]
            }

            fn run(&self, tables: &[StringTable], _ctx: &mut CheckContext) -> Vec<ServiceReport> {
                let section = parse_enviromux(&tables[0]);
                discover(&section, $kind)
                    .into_iter()
                    .filter_map(|item| {
                        $check(&item, &section).map(|result| {
                            ServiceReport::new(format!("{} {}", $service, item), result)
                        })
                    })
                    .collect()
            }
        }
    };
}

enviromux_plugin!(
    EnviromuxTemp,
    "enviromux_temp",
    SensorKind::Temperature,
    "Sensor",
    check_enviromux_temp
);
enviromux_plugin!(
    EnviromuxHumidity,
    "enviromux_humidity",
    SensorKind::Humidity,
    "Sensor",
    check_enviromux_humidity
);
enviromux_plugin!(
    EnviromuxVoltage,
    "enviromux_voltage",
    SensorKind::Voltage,
    "Sensor",
    check_enviromux_voltage
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Status;

    fn table() -> StringTable {
        let rows: &[&[&str]] = &[
            &["1", "1", "Internal Temperature", "285", "100", "300"],
            &["2", "2", "Internal Humidity", "37", "20", "80"],
            &["3", "3", "Input Voltage", "115", "100", "130"],
            &["4", "9", "Dry contact", "0", "", ""],
        ];
        rows.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn parse_scales_and_names() {
        let section = parse_enviromux(&table());
        assert_eq!(section.len(), 3);
        let temp = &section["1 Internal Temperature"];
        assert_eq!(temp.value, 28.5);
        assert_eq!(temp.max, Some(30.0));
        assert_eq!(section["2 Internal Humidity"].value, 37.0);
        assert_eq!(section["3 Input Voltage"].value, 11.5);
    }

    #[test]
    fn discovery_splits_kinds() {
        let section = parse_enviromux(&table());
        assert_eq!(
            discover(&section, SensorKind::Temperature),
            vec!["1 Internal Temperature"]
        );
        assert_eq!(
            discover(&section, SensorKind::Voltage),
            vec!["3 Input Voltage"]
        );
    }

    #[test]
    fn device_thresholds_fire() {
        let mut section = parse_enviromux(&table());
        section.get_mut("1 Internal Temperature").unwrap().value = 31.0;
        let r = check_enviromux_temp("1 Internal Temperature", &section).unwrap();
        assert_eq!(r.status, Status::Critical);
    }

    #[test]
    fn voltage_in_range_is_ok() {
        let section = parse_enviromux(&table());
        let r = check_enviromux_voltage("3 Input Voltage", &section).unwrap();
        assert_eq!(r.status, Status::Ok);
        assert_eq!(r.text, "Input voltage: 11.5 V");
    }
}
