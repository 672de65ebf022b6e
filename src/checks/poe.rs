//! Power-over-Ethernet power budget (POWER-ETHERNET-MIB)
//!
//! The standard `pethMainPseTable` reports nominal and consumed power per
//! PSE group. Consumption is checked as a percentage of the nominal budget.

use std::collections::BTreeMap;

use crate::check::{CheckResult, Metric, ServiceReport};
use crate::levels::{check_levels, UpperLevels};
use crate::plugin::{CheckContext, SnmpPlugin};
use crate::render;
use crate::snmp::{exists, Detect, SnmpTree, StringTable};

pub fn detect_poe() -> Detect {
    exists(".1.3.6.1.2.1.105.1.3.1.1.*")
}

const PSE_TABLE: SnmpTree = SnmpTree {
    base: ".1.3.6.1.2.1.105.1.3.1.1",
    // nominal power (W), operational status, consumption (W)
    columns: &["2", "3", "4"],
};

pub fn default_levels() -> UpperLevels<f64> {
    UpperLevels::warn_crit(90.0, 95.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PoeStatus {
    On,
    Off,
    Faulty,
}

#[derive(Debug, Clone, Copy)]
pub struct PoeValues {
    pub poe_max: f64,
    pub poe_used: f64,
    pub status: Option<PoeStatus>,
}

pub type Section = BTreeMap<String, PoeValues>;

pub fn parse_poe(table: &StringTable) -> Section {
    let mut section = Section::new();
    for (index, row) in table.iter().enumerate() {
        let (max, status, used) = match row.as_slice() {
            [max, status, used] => (max, status, used),
            _ => continue,
        };
        let status = match status.as_str() {
            "1" => Some(PoeStatus::On),
            "2" => Some(PoeStatus::Off),
            "3" => Some(PoeStatus::Faulty),
            _ => None,
        };
        section.insert(
            (index + 1).to_string(),
            PoeValues {
                poe_max: max.parse().unwrap_or(-1.0),
                poe_used: used.parse().unwrap_or(-1.0),
                status,
            },
        );
    }
    section
}

pub fn discover_poe(section: &Section) -> Vec<String> {
    section.keys().cloned().collect()
}

/// The shared PoE judgement: sanity-check the reported data, then levels on
/// the consumed percentage when the group is on.
pub fn check_poe_data(values: &PoeValues, levels: &UpperLevels<f64>) -> CheckResult {
    let status = match values.status {
        Some(status) => status,
        None => {
            return CheckResult::unknown(format!(
                "Device returned faulty data: nominal power: {}, power consumption: {}",
                values.poe_max, values.poe_used
            ))
        }
    };
    if values.poe_max < 0.0 || values.poe_used < 0.0 {
        return CheckResult::unknown(format!(
            "Device returned faulty data: nominal power: {}, power consumption: {}",
            values.poe_max, values.poe_used
        ));
    }
    match status {
        PoeStatus::On => {
            let used_percent = if values.poe_max > 0.0 {
                values.poe_used / values.poe_max * 100.0
            } else {
                0.0
            };
            let label = format!(
                "POE usage ({}/{})",
                render::watts(values.poe_used),
                render::watts(values.poe_max)
            );
            check_levels(used_percent, &label, &Some(*levels), &None, render::percent).metric(
                Metric::new("power_usage_percentage", used_percent)
                    .unit("%")
                    .levels(&Some(*levels)),
            )
        }
        PoeStatus::Off => CheckResult::ok("Operational status of the PSE is OFF"),
        PoeStatus::Faulty => CheckResult::crit("Operational status of the PSE is FAULTY"),
    }
}

pub fn check_poe(item: &str, levels: &UpperLevels<f64>, section: &Section) -> Option<CheckResult> {
    section.get(item).map(|values| check_poe_data(values, levels))
}

pub struct PoeMain;

impl SnmpPlugin for PoeMain {
    fn name(&self) -> &'static str {
        "poe_main"
    }

    fn detect(&self) -> Detect {
        detect_poe()
    }

    fn trees(&self) -> &'static [SnmpTree] {
        &[PSE_TABLE]
    }

    fn run(&self, tables: &[StringTable], _ctx: &mut CheckContext) -> Vec<ServiceReport> {
        let section = parse_poe(&tables[0]);
        let levels = default_levels();
        discover_poe(&section)
            .into_iter()
            .filter_map(|item| {
                check_poe(&item, &levels, &section)
                    .map(|result| ServiceReport::new(format!("PoE Group {}", item), result))
            })
            .collect()
    }
}
