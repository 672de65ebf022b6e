//! Network interface status and traffic (IF-MIB ifTable)
//!
//! Discovery keeps interfaces that were up when the device was scanned;
//! a discovered interface that later reports anything but `up` goes
//! critical. Octet counters become byte rates through the value store, so
//! the very first run only reports the counters as initialized.

use std::collections::BTreeMap;

use crate::check::{CheckResult, Metric, ServiceReport};
use crate::levels::{check_levels, UpperLevels};
use crate::plugin::{CheckContext, SnmpPlugin};
use crate::rate::RateError;
use crate::render;
use crate::snmp::{exists, Detect, SnmpTree, StringTable};
use crate::Status;

pub fn detect_interfaces() -> Detect {
    exists(".1.3.6.1.2.1.2.2.1.1.*")
}

const IF_TABLE: SnmpTree = SnmpTree {
    base: ".1.3.6.1.2.1.2.2.1",
    // ifIndex, ifDescr, ifOperStatus, ifInOctets, ifOutOctets
    columns: &["1", "2", "8", "10", "16"],
};

#[derive(Debug)]
pub struct Interface {
    pub descr: String,
    pub oper_status: u8,
    pub in_octets: Option<f64>,
    pub out_octets: Option<f64>,
}

pub type Section = BTreeMap<String, Interface>;

#[derive(Debug, Clone, Default)]
pub struct TrafficParams {
    /// Levels on the in/out byte rates.
    pub levels: Option<UpperLevels<f64>>,
}

fn oper_status_name(status: u8) -> &'static str {
    match status {
        1 => "up",
        2 => "down",
        3 => "testing",
        4 => "unknown",
        5 => "dormant",
        6 => "notPresent",
        7 => "lowerLayerDown",
        _ => "invalid",
    }
}

fn oper_status_state(status: u8) -> Status {
    match status {
        1 => Status::Ok,
        2 | 7 => Status::Critical,
        4 => Status::Unknown,
        _ => Status::Warning,
    }
}

pub fn parse_interfaces(table: &StringTable) -> Section {
    let mut section = Section::new();
    for row in table {
        let (index, descr, oper, in_octets, out_octets) = match row.as_slice() {
            [index, descr, oper, in_octets, out_octets] => {
                (index, descr, oper, in_octets, out_octets)
            }
            _ => continue,
        };
        let oper_status = match oper.parse() {
            Ok(status) => status,
            Err(_) => continue,
        };
        // Descriptions are not unique on stacked switches; a repeated name
        // gets its ifIndex appended so both ports stay discoverable and keep
        // separate rate-store keys.
        let item = if descr.is_empty() {
            index.clone()
        } else if section.contains_key(descr.as_str()) {
            format!("{} {}", descr, index)
        } else {
            descr.clone()
        };
        section.insert(
            item,
            Interface {
                descr: descr.clone(),
                oper_status,
                in_octets: in_octets.parse().ok(),
                out_octets: out_octets.parse().ok(),
            },
        );
    }
    section
}

pub fn discover_interfaces(section: &Section) -> Vec<String> {
    section
        .iter()
        .filter(|(_, interface)| interface.oper_status == 1)
        .map(|(item, _)| item.clone())
        .collect()
}

fn traffic_result(
    direction: &str,
    item: &str,
    counter: Option<f64>,
    params: &TrafficParams,
    ctx: &mut CheckContext,
) -> CheckResult {
    let counter = match counter {
        Some(counter) => counter,
        None => return CheckResult::unknown(format!("{}: no counter reported", direction)),
    };
    let key = format!("interfaces.{}_octets.{}", direction, item);
    match ctx.store.get_rate(&key, ctx.now, counter) {
        Ok(rate) => check_levels(
            rate,
            direction,
            &params.levels,
            &None,
            render::bytes_per_second,
        )
        .metric(Metric::new(&format!("{}_rate", direction), rate).levels(&params.levels)),
        Err(RateError::FirstSample) => CheckResult::ok(format!("{}: counter initialized", direction)),
        Err(err) => CheckResult::ok(format!("{}: {}", direction, err)),
    }
}

pub fn check_interface(
    item: &str,
    params: &TrafficParams,
    section: &Section,
    ctx: &mut CheckContext,
) -> Option<CheckResult> {
    let interface = section.get(item)?;
    let mut result = CheckResult::new(
        oper_status_state(interface.oper_status),
        format!("Status: {}", oper_status_name(interface.oper_status)),
    );
    result.append(traffic_result("in", item, interface.in_octets, params, ctx));
    result.append(traffic_result("out", item, interface.out_octets, params, ctx));
    Some(result)
}

pub struct Interfaces;

impl SnmpPlugin for Interfaces {
    fn name(&self) -> &'static str {
        "interfaces"
    }

    fn detect(&self) -> Detect {
        detect_interfaces()
    }

    fn trees(&self) -> &'static [SnmpTree] {
        &[IF_TABLE]
    }

    fn run(&self, tables: &[StringTable], ctx: &mut CheckContext) -> Vec<ServiceReport> {
        let section = parse_interfaces(&tables[0]);
        let params = TrafficParams::default();
        discover_interfaces(&section)
            .into_iter()
            .filter_map(|item| {
                check_interface(&item, &params, &section, ctx)
                    .map(|result| ServiceReport::new(format!("Interface {}", item), result))
            })
            .collect()
    }
}
