//! Liebert/Vertiv precision cooling units
//!
//! The device exports flat (name, value, unit) triples rather than a proper
//! table; rows are consumed in threes. Sensor names repeat between
//! subsystems, duplicates get a numeric suffix the way the device GUI shows
//! them. Readings in °F are normalized.

use std::collections::{BTreeMap, HashSet};

use itertools::Itertools;

use crate::check::{CheckResult, ServiceReport};
use crate::checks::temperature::{check_temperature, to_celsius, TempParams, Unit};
use crate::plugin::{CheckContext, SnmpPlugin};
use crate::snmp::{startswith, Detect, SnmpTree, StringTable, SYS_OBJECT_ID};

pub fn detect_liebert() -> Detect {
    startswith(SYS_OBJECT_ID, ".1.3.6.1.4.1.476.1.42")
}

const FLEX_TABLE: SnmpTree = SnmpTree {
    base: ".1.3.6.1.4.1.476.1.42.3.9.20.1",
    // name, value, unit columns of the flexible data table
    columns: &["10.1.2.1", "20.1.2.1", "30.1.2.1"],
};

#[derive(Debug, PartialEq)]
pub struct Reading {
    pub value: f64,
    pub unit: String,
}

pub type Section = BTreeMap<String, Reading>;

/// Parse (name, value, unit) triples, skipping unnamed or unparseable
/// entries. Duplicate names become `"name 2"`, `"name 3"`, ...
pub fn parse_liebert(table: &StringTable) -> Section {
    let mut section = Section::new();
    let mut used_names = HashSet::new();
    for row in table {
        for (name, value, unit) in row.iter().tuples::<(_, _, _)>() {
            if name.is_empty() {
                continue;
            }
            let value: f64 = match value.parse() {
                Ok(value) => value,
                Err(_) => continue,
            };
            let mut item = name.clone();
            let mut counter = 2;
            while !used_names.insert(item.clone()) {
                item = format!("{} {}", name, counter);
                counter += 1;
            }
            section.insert(
                item,
                Reading {
                    value,
                    unit: unit.clone(),
                },
            );
        }
    }
    section
}

fn temperature_unit(unit: &str) -> Option<Unit> {
    unit.parse().ok()
}

pub fn discover_liebert_temp(section: &Section) -> Vec<String> {
    section
        .iter()
        .filter(|(_, reading)| temperature_unit(&reading.unit).is_some())
        .map(|(item, _)| item.clone())
        .collect()
}

pub fn check_liebert_temp(
    item: &str,
    params: &TempParams,
    section: &Section,
) -> Option<CheckResult> {
    let reading = section.get(item)?;
    let unit = temperature_unit(&reading.unit)?;
    Some(check_temperature(to_celsius(reading.value, unit), params))
}

pub struct LiebertTemp;

impl SnmpPlugin for LiebertTemp {
    fn name(&self) -> &'static str {
        "liebert_temp"
    }

    fn detect(&self) -> Detect {
        detect_liebert()
    }

    fn trees(&self) -> &'static [SnmpTree] {
        &[FLEX_TABLE]
    }

    fn run(&self, tables: &[StringTable], _ctx: &mut CheckContext) -> Vec<ServiceReport> {
        let section = parse_liebert(&tables[0]);
        let params = TempParams::upper(35.0, 40.0);
        discover_liebert_temp(&section)
            .into_iter()
            .filter_map(|item| {
                check_liebert_temp(&item, &params, &section)
                    .map(|result| ServiceReport::new(format!("Temperature {}", item), result))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Status;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn parse_takes_triples_and_renames_duplicates() {
        let table = vec![row(&[
            "Return Air Temperature",
            "77",
            "deg F",
            "Return Air Temperature",
            "75",
            "deg F",
            "Fan Speed",
            "85",
            "%",
        ])];
        let section = parse_liebert(&table);
        assert_eq!(section.len(), 3);
        assert_eq!(section["Return Air Temperature"].value, 77.0);
        assert_eq!(section["Return Air Temperature 2"].value, 75.0);
        assert_eq!(section["Fan Speed"].unit, "%");
    }

    #[test]
    fn incomplete_trailing_triple_is_dropped() {
        let table = vec![row(&["Supply Air Temperature", "18.3", "deg C", "Orphan"])];
        let section = parse_liebert(&table);
        assert_eq!(section.len(), 1);
    }

    #[test]
    fn fahrenheit_is_normalized() {
        let table = vec![row(&["Return Air Temperature", "77", "deg F"])];
        let section = parse_liebert(&table);
        assert_eq!(
            discover_liebert_temp(&section),
            vec!["Return Air Temperature"]
        );
        let r =
            check_liebert_temp("Return Air Temperature", &TempParams::upper(35.0, 40.0), &section)
                .unwrap();
        assert_eq!(r.status, Status::Ok);
        assert_eq!(r.text, "25.0 \u{b0}C");
    }

    #[test]
    fn percent_rows_are_not_temperatures() {
        let table = vec![row(&["Fan Speed", "85", "%"])];
        let section = parse_liebert(&table);
        assert!(discover_liebert_temp(&section).is_empty());
    }
}
