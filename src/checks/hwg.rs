//! HW group (HWg-STE) environment sensors
//!
//! One sensor table carries both temperature and humidity probes; the unit
//! column decides which plugin a row belongs to. Rows the device flags as
//! `invalid` are never discovered.

use std::collections::BTreeMap;

use crate::check::{CheckResult, ServiceReport};
use crate::checks::humidity::{check_humidity, HumidityParams};
use crate::checks::temperature::{check_temperature, to_celsius, TempParams, Unit};
use crate::plugin::{CheckContext, SnmpPlugin};
use crate::snmp::{contains, Detect, SnmpTree, StringTable, SYS_DESCR};
use crate::Status;

pub fn detect_hwg() -> Detect {
    contains(SYS_DESCR, "HWg")
}

const SENSOR_TABLE: SnmpTree = SnmpTree {
    base: ".1.3.6.1.4.1.21796.4.1.3.1",
    // index, name, state, reading, unit
    columns: &["1", "2", "3", "4", "7"],
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DevState {
    Invalid,
    Normal,
    OutOfRangeLow,
    OutOfRangeHigh,
    AlarmLow,
    AlarmHigh,
}

impl DevState {
    fn from_code(code: &str) -> Option<DevState> {
        match code {
            "0" => Some(DevState::Invalid),
            "1" => Some(DevState::Normal),
            "2" => Some(DevState::OutOfRangeLow),
            "3" => Some(DevState::OutOfRangeHigh),
            "4" => Some(DevState::AlarmLow),
            "5" => Some(DevState::AlarmHigh),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            DevState::Invalid => "invalid",
            DevState::Normal => "normal",
            DevState::OutOfRangeLow => "out of range low",
            DevState::OutOfRangeHigh => "out of range high",
            DevState::AlarmLow => "alarm low",
            DevState::AlarmHigh => "alarm high",
        }
    }

    fn status(self) -> Status {
        match self {
            DevState::Normal => Status::Ok,
            DevState::Invalid => Status::Unknown,
            _ => Status::Critical,
        }
    }
}

#[derive(Debug)]
pub struct Sensor {
    pub descr: String,
    pub state: DevState,
    pub reading: Option<f64>,
    /// `None` for the `%` unit code, which marks a humidity probe.
    pub unit: Option<Unit>,
    pub is_humidity: bool,
}

pub type Section = BTreeMap<String, Sensor>;

pub fn parse_hwg(table: &StringTable) -> Section {
    let mut section = Section::new();
    for row in table {
        let (index, descr, state, value, unit) = match row.as_slice() {
            [index, descr, state, value, unit] => (index, descr, state, value, unit),
            _ => continue,
        };
        let state = match DevState::from_code(state) {
            Some(state) => state,
            None => continue,
        };
        let (unit, is_humidity) = match unit.as_str() {
            "1" => (Some(Unit::Celsius), false),
            "2" => (Some(Unit::Fahrenheit), false),
            "3" => (Some(Unit::Kelvin), false),
            "4" => (None, true),
            _ => (None, false),
        };
        section.insert(
            index.clone(),
            Sensor {
                descr: descr.clone(),
                state,
                reading: value.parse().ok(),
                unit,
                is_humidity,
            },
        );
    }
    section
}

pub fn discover_hwg_temp(section: &Section) -> Vec<String> {
    section
        .iter()
        .filter(|(_, sensor)| {
            !sensor.is_humidity && sensor.reading.is_some() && sensor.state != DevState::Invalid
        })
        .map(|(item, _)| item.clone())
        .collect()
}

pub fn discover_hwg_humidity(section: &Section) -> Vec<String> {
    section
        .iter()
        .filter(|(_, sensor)| {
            sensor.is_humidity && sensor.reading.is_some() && sensor.state != DevState::Invalid
        })
        .map(|(item, _)| item.clone())
        .collect()
}

fn sensor_info(sensor: &Sensor) -> CheckResult {
    CheckResult::new(
        sensor.state.status(),
        format!("(Description: {}, Status: {})", sensor.descr, sensor.state.name()),
    )
}

pub fn check_hwg_temp(item: &str, params: &TempParams, section: &Section) -> Option<CheckResult> {
    let sensor = section.get(item)?;
    let reading = sensor.reading?;
    let celsius = to_celsius(reading, sensor.unit.unwrap_or(Unit::Celsius));
    let mut result = check_temperature(celsius, params);
    result.append(sensor_info(sensor));
    Some(result)
}

pub fn check_hwg_humidity(
    item: &str,
    params: &HumidityParams,
    section: &Section,
) -> Option<CheckResult> {
    let sensor = section.get(item)?;
    let mut result = check_humidity(sensor.reading?, params);
    result.append(sensor_info(sensor));
    Some(result)
}

pub struct HwgTemp;

impl SnmpPlugin for HwgTemp {
    fn name(&self) -> &'static str {
        "hwg_temp"
    }

    fn detect(&self) -> Detect {
        detect_hwg()
    }

    fn trees(&self) -> &'static [SnmpTree] {
        &[SENSOR_TABLE]
    }

    fn run(&self, tables: &[StringTable], _ctx: &mut CheckContext) -> Vec<ServiceReport> {
        let section = parse_hwg(&tables[0]);
        let params = TempParams::upper(30.0, 35.0);
        discover_hwg_temp(&section)
            .into_iter()
            .filter_map(|item| {
                check_hwg_temp(&item, &params, &section)
                    .map(|result| ServiceReport::new(format!("Temperature {}", item), result))
            })
            .collect()
    }
}

pub struct HwgHumidity;

impl SnmpPlugin for HwgHumidity {
    fn name(&self) -> &'static str {
        "hwg_humidity"
    }

    fn detect(&self) -> Detect {
        detect_hwg()
    }

    fn trees(&self) -> &'static [SnmpTree] {
        &[SENSOR_TABLE]
    }

    fn run(&self, tables: &[StringTable], _ctx: &mut CheckContext) -> Vec<ServiceReport> {
        let section = parse_hwg(&tables[0]);
        let params = HumidityParams::upper(60.0, 70.0);
        discover_hwg_humidity(&section)
            .into_iter()
            .filter_map(|item| {
                check_hwg_humidity(&item, &params, &section)
                    .map(|result| ServiceReport::new(format!("Humidity {}", item), result))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> StringTable {
        vec![
            row(&["1", "Server room", "1", "21.5", "1"]),
            row(&["2", "Rack 4", "1", "56.2", "4"]),
            row(&["3", "Broken probe", "0", "-999", "1"]),
            row(&["4", "Hot aisle", "3", "38.1", "1"]),
        ]
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn parse_splits_probe_kinds() {
        let section = parse_hwg(&table());
        assert_eq!(section.len(), 4);
        assert!(!section["1"].is_humidity);
        assert!(section["2"].is_humidity);
        assert_eq!(section["1"].unit, Some(Unit::Celsius));
    }

    #[test]
    fn discovery_skips_invalid_and_wrong_kind() {
        let section = parse_hwg(&table());
        assert_eq!(discover_hwg_temp(&section), vec!["1", "4"]);
        assert_eq!(discover_hwg_humidity(&section), vec!["2"]);
    }

    #[test]
    fn temperature_carries_device_state() {
        let section = parse_hwg(&table());
        let r = check_hwg_temp("1", &TempParams::upper(30.0, 35.0), &section).unwrap();
        assert_eq!(r.status, Status::Ok);
        assert_eq!(r.text, "21.5 \u{b0}C, (Description: Server room, Status: normal)");

        let r = check_hwg_temp("4", &TempParams::upper(30.0, 35.0), &section).unwrap();
        assert_eq!(r.status, Status::Critical);
        assert!(r.text.contains("Status: out of range high"));
    }

    #[test]
    fn humidity_check() {
        let section = parse_hwg(&table());
        let r = check_hwg_humidity("2", &HumidityParams::upper(60.0, 70.0), &section).unwrap();
        assert_eq!(r.status, Status::Ok);
        assert!(r.text.starts_with("56.2%"));
    }
}
