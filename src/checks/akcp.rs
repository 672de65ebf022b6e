//! AKCP sensorProbe temperature sensors
//!
//! The probe reports its own alarm judgement next to the reading; both feed
//! the result. Sensors reported offline are not discovered.

use std::collections::BTreeMap;

use crate::check::{CheckResult, ServiceReport};
use crate::checks::temperature::{check_temperature, TempParams};
use crate::plugin::{CheckContext, SnmpPlugin};
use crate::snmp::{all_of, exists, startswith, Detect, SnmpTree, StringTable, SYS_OBJECT_ID};
use crate::Status;

pub fn detect_akcp() -> Detect {
    all_of(vec![
        startswith(SYS_OBJECT_ID, ".1.3.6.1.4.1.3854.1"),
        exists(".1.3.6.1.4.1.3854.1.2.*"),
    ])
}

const TEMP_TABLE: SnmpTree = SnmpTree {
    base: ".1.3.6.1.4.1.3854.1.2.2.1.16.1",
    // description, degree, status, online
    columns: &["1", "3", "4", "5"],
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbeStatus {
    NoStatus,
    Normal,
    HighWarning,
    HighCritical,
    LowWarning,
    LowCritical,
    SensorError,
}

impl ProbeStatus {
    fn from_code(code: &str) -> Option<ProbeStatus> {
        match code {
            "1" => Some(ProbeStatus::NoStatus),
            "2" => Some(ProbeStatus::Normal),
            "3" => Some(ProbeStatus::HighWarning),
            "4" => Some(ProbeStatus::HighCritical),
            "5" => Some(ProbeStatus::LowWarning),
            "6" => Some(ProbeStatus::LowCritical),
            "7" => Some(ProbeStatus::SensorError),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            ProbeStatus::NoStatus => "no status",
            ProbeStatus::Normal => "normal",
            ProbeStatus::HighWarning => "high warning",
            ProbeStatus::HighCritical => "high critical",
            ProbeStatus::LowWarning => "low warning",
            ProbeStatus::LowCritical => "low critical",
            ProbeStatus::SensorError => "sensor error",
        }
    }

    fn status(self) -> Status {
        match self {
            ProbeStatus::Normal => Status::Ok,
            ProbeStatus::HighWarning | ProbeStatus::LowWarning => Status::Warning,
            ProbeStatus::HighCritical | ProbeStatus::LowCritical | ProbeStatus::SensorError => {
                Status::Critical
            }
            ProbeStatus::NoStatus => Status::Unknown,
        }
    }
}

#[derive(Debug)]
pub struct Probe {
    pub degree: Option<f64>,
    pub status: ProbeStatus,
    pub online: bool,
}

pub type Section = BTreeMap<String, Probe>;

pub fn parse_akcp_sensor_temp(table: &StringTable) -> Section {
    let mut section = Section::new();
    for row in table {
        let (descr, degree, status, online) = match row.as_slice() {
            [descr, degree, status, online] => (descr, degree, status, online),
            _ => continue,
        };
        let status = match ProbeStatus::from_code(status) {
            Some(status) => status,
            None => continue,
        };
        section.insert(
            descr.clone(),
            Probe {
                degree: degree.parse().ok(),
                status,
                online: online == "1",
            },
        );
    }
    section
}

pub fn discover_akcp_sensor_temp(section: &Section) -> Vec<String> {
    section
        .iter()
        .filter(|(_, probe)| probe.online)
        .map(|(item, _)| item.clone())
        .collect()
}

pub fn check_akcp_sensor_temp(
    item: &str,
    params: &TempParams,
    section: &Section,
) -> Option<CheckResult> {
    let probe = section.get(item)?;
    let mut result = match probe.degree {
        Some(degree) => check_temperature(degree, params),
        None => CheckResult::unknown("no reading reported"),
    };
    result.append(CheckResult::new(
        probe.status.status(),
        format!("Device status: {}", probe.status.name()),
    ));
    Some(result)
}

pub struct AkcpSensorTemp;

impl SnmpPlugin for AkcpSensorTemp {
    fn name(&self) -> &'static str {
        "akcp_sensor_temp"
    }

    fn detect(&self) -> Detect {
        detect_akcp()
    }

    fn trees(&self) -> &'static [SnmpTree] {
        &[TEMP_TABLE]
    }

    fn run(&self, tables: &[StringTable], _ctx: &mut CheckContext) -> Vec<ServiceReport> {
        let section = parse_akcp_sensor_temp(&tables[0]);
        let params = TempParams::default();
        discover_akcp_sensor_temp(&section)
            .into_iter()
            .filter_map(|item| {
                check_akcp_sensor_temp(&item, &params, &section)
                    .map(|result| ServiceReport::new(format!("Temperature {}", item), result))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> StringTable {
        let rows: &[&[&str]] = &[
            &["Temperature1 Description", "22", "2", "1"],
            &["Cold aisle", "16", "5", "1"],
            &["Spare port", "0", "1", "2"],
        ];
        rows.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn offline_probes_are_not_discovered() {
        let section = parse_akcp_sensor_temp(&table());
        assert_eq!(
            discover_akcp_sensor_temp(&section),
            vec!["Cold aisle", "Temperature1 Description"]
        );
    }

    #[test]
    fn probe_judgement_drives_status() {
        let section = parse_akcp_sensor_temp(&table());
        let params = TempParams::default();
        let r = check_akcp_sensor_temp("Temperature1 Description", &params, &section).unwrap();
        assert_eq!(r.status, Status::Ok);
        assert_eq!(r.text, "22.0 \u{b0}C, Device status: normal");

        let r = check_akcp_sensor_temp("Cold aisle", &params, &section).unwrap();
        assert_eq!(r.status, Status::Warning);
        assert!(r.text.ends_with("Device status: low warning"));
    }

    #[test]
    fn explicit_levels_beat_a_happy_probe() {
        let section = parse_akcp_sensor_temp(&table());
        let params = TempParams::upper(20.0, 25.0);
        let r = check_akcp_sensor_temp("Temperature1 Description", &params, &section).unwrap();
        assert_eq!(r.status, Status::Warning);
    }
}
