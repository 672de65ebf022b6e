//! F5 BIG-IP failover status
//!
//! One scalar holds the node's failover state. State codes follow the
//! v11.2+ firmware table: 0 unknown, 1 offline, 2 forced offline, 3 standby,
//! 4 active. Standby and active are fine, offline pages someone.

use crate::check::{CheckResult, ServiceReport};
use crate::plugin::{CheckContext, SnmpPlugin};
use crate::snmp::{startswith, Detect, SnmpTree, StringTable, SYS_OBJECT_ID};
use crate::Status;

pub fn detect_f5_bigip() -> Detect {
    startswith(SYS_OBJECT_ID, ".1.3.6.1.4.1.3375.2")
}

const FAILOVER_STATUS: SnmpTree = SnmpTree {
    base: ".1.3.6.1.4.1.3375.2.1.14.3.1",
    columns: &["0"],
};

pub type Section = u8;

pub fn parse_f5_bigip_cluster_status(table: &StringTable) -> Option<Section> {
    table.first()?.first()?.parse().ok()
}

fn state_name(state: Section) -> &'static str {
    match state {
        0 => "unknown",
        1 => "offline",
        2 => "forced offline",
        3 => "standby",
        4 => "active",
        _ => "unknown",
    }
}

fn state_status(state: Section) -> Status {
    match state {
        3 | 4 => Status::Ok,
        1 | 2 => Status::Critical,
        _ => Status::Unknown,
    }
}

pub fn check_f5_bigip_cluster_status(section: Section) -> CheckResult {
    CheckResult::new(
        state_status(section),
        format!("Node is {}", state_name(section)),
    )
}

pub struct F5BigipClusterStatus;

impl SnmpPlugin for F5BigipClusterStatus {
    fn name(&self) -> &'static str {
        "f5_bigip_cluster_status"
    }

    fn detect(&self) -> Detect {
        detect_f5_bigip()
    }

    fn trees(&self) -> &'static [SnmpTree] {
        &[FAILOVER_STATUS]
    }

    fn run(&self, tables: &[StringTable], _ctx: &mut CheckContext) -> Vec<ServiceReport> {
        let section = match parse_f5_bigip_cluster_status(&tables[0]) {
            Some(section) => section,
            None => return Vec::new(),
        };
        vec![ServiceReport::new(
            "Cluster Status",
            check_f5_bigip_cluster_status(section),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_scalar() {
        let table = vec![vec!["4".to_string()]];
        assert_eq!(parse_f5_bigip_cluster_status(&table), Some(4));
        assert_eq!(parse_f5_bigip_cluster_status(&Vec::new()), None);
        assert_eq!(parse_f5_bigip_cluster_status(&vec![vec!["x".to_string()]]), None);
    }

    #[test]
    fn active_and_standby_are_ok() {
        let r = check_f5_bigip_cluster_status(4);
        assert_eq!(r.status, Status::Ok);
        assert_eq!(r.text, "Node is active");
        assert_eq!(check_f5_bigip_cluster_status(3).status, Status::Ok);
    }

    #[test]
    fn offline_is_critical_unknown_is_unknown() {
        assert_eq!(check_f5_bigip_cluster_status(1).status, Status::Critical);
        assert_eq!(check_f5_bigip_cluster_status(2).status, Status::Critical);
        let r = check_f5_bigip_cluster_status(0);
        assert_eq!(r.status, Status::Unknown);
        assert_eq!(r.text, "Node is unknown");
    }
}
