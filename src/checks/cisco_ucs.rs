//! Cisco UCS rack server equipment health
//!
//! UCS reports an `operability` code per component; the map below follows
//! the CISCO-UNIFIED-COMPUTING MIB. PSUs additionally report `presence`,
//! never-equipped bays are not discovered.

use std::collections::BTreeMap;

use crate::check::{CheckResult, ServiceReport};
use crate::plugin::{CheckContext, SnmpPlugin};
use crate::snmp::{any_of, contains, Detect, SnmpTree, StringTable, SYS_OBJECT_ID};
use crate::Status;

pub fn detect_cisco_ucs() -> Detect {
    any_of(vec![
        contains(SYS_OBJECT_ID, ".1.3.6.1.4.1.9.1.1682"),
        contains(SYS_OBJECT_ID, ".1.3.6.1.4.1.9.1.1683"),
        contains(SYS_OBJECT_ID, ".1.3.6.1.4.1.9.1.1684"),
        contains(SYS_OBJECT_ID, ".1.3.6.1.4.1.9.1.1685"),
        contains(SYS_OBJECT_ID, ".1.3.6.1.4.1.9.1.2178"),
        contains(SYS_OBJECT_ID, ".1.3.6.1.4.1.9.1.2424"),
        contains(SYS_OBJECT_ID, ".1.3.6.1.4.1.9.1.2492"),
        contains(SYS_OBJECT_ID, ".1.3.6.1.4.1.9.1.2493"),
    ])
}

const FAN_TABLE: SnmpTree = SnmpTree {
    base: ".1.3.6.1.4.1.9.9.719.1.15.12.1",
    // dn, operability
    columns: &["2", "10"],
};

const PSU_TABLE: SnmpTree = SnmpTree {
    base: ".1.3.6.1.4.1.9.9.719.1.15.56.1",
    // dn, presence, operability
    columns: &["2", "5", "8"],
};

/// `(status, name)` for an operability code.
pub fn operability(code: &str) -> (Status, &'static str) {
    match code {
        "1" => (Status::Ok, "operable"),
        "2" => (Status::Critical, "inoperable"),
        "3" => (Status::Critical, "degraded"),
        "4" => (Status::Warning, "poweredOff"),
        "5" => (Status::Critical, "powerProblem"),
        "6" => (Status::Ok, "removed"),
        "7" => (Status::Critical, "voltageProblem"),
        "8" => (Status::Critical, "thermalProblem"),
        "9" => (Status::Warning, "performanceProblem"),
        "10" => (Status::Warning, "accessibilityProblem"),
        "11" => (Status::Warning, "identityUnestablishable"),
        "12" => (Status::Critical, "biosPostTimeout"),
        "13" => (Status::Warning, "disabled"),
        "51" => (Status::Warning, "fabricConnProblem"),
        "52" => (Status::Warning, "fabricUnsupportedConn"),
        "81" => (Status::Warning, "config"),
        "82" => (Status::Critical, "equipmentProblem"),
        "83" => (Status::Critical, "decomissioning"),
        "84" => (Status::Warning, "chassisLimitExceeded"),
        "100" => (Status::Warning, "notSupported"),
        "101" => (Status::Warning, "discovery"),
        "102" => (Status::Critical, "discoveryFailed"),
        "104" => (Status::Critical, "postFailure"),
        "105" => (Status::Warning, "upgradeProblem"),
        "106" => (Status::Warning, "peerCommProblem"),
        "107" => (Status::Ok, "autoUpgrade"),
        _ => (Status::Critical, "unknown"),
    }
}

/// `(status, name)` for a presence code.
pub fn presence(code: &str) -> (Status, &'static str) {
    match code {
        "1" => (Status::Ok, "empty"),
        "10" => (Status::Ok, "equipped"),
        "11" => (Status::Critical, "missing"),
        "12" => (Status::Warning, "mismatch"),
        "13" => (Status::Ok, "equippedNotPrimary"),
        "20" => (Status::Warning, "equippedIdentityUnestablishable"),
        "21" => (Status::Warning, "mismatchIdentityUnestablishable"),
        "30" => (Status::Ok, "inaccessible"),
        "40" => (Status::Warning, "unauthorized"),
        _ => (Status::Warning, "unknown"),
    }
}

#[derive(Debug)]
pub struct Component {
    pub operability: String,
    pub presence: Option<String>,
}

pub type Section = BTreeMap<String, Component>;

/// Items are the distinguished name with the `sys/` prefix dropped, the way
/// the UCS manager shows them.
fn item_from_dn(dn: &str) -> String {
    dn.strip_prefix("sys/").unwrap_or(dn).to_string()
}

pub fn parse_cisco_ucs_fan(table: &StringTable) -> Section {
    let mut section = Section::new();
    for row in table {
        if let [dn, operability] = row.as_slice() {
            if dn.is_empty() {
                continue;
            }
            section.insert(
                item_from_dn(dn),
                Component {
                    operability: operability.clone(),
                    presence: None,
                },
            );
        }
    }
    section
}

pub fn parse_cisco_ucs_psu(table: &StringTable) -> Section {
    let mut section = Section::new();
    for row in table {
        if let [dn, presence, operability] = row.as_slice() {
            if dn.is_empty() {
                continue;
            }
            section.insert(
                item_from_dn(dn),
                Component {
                    operability: operability.clone(),
                    presence: Some(presence.clone()),
                },
            );
        }
    }
    section
}

pub fn discover_cisco_ucs(section: &Section) -> Vec<String> {
    section
        .iter()
        .filter(|(_, component)| {
            // empty bays exist in the table but are not services
            component.presence.as_deref() != Some("1")
        })
        .map(|(item, _)| item.clone())
        .collect()
}

pub fn check_cisco_ucs(item: &str, section: &Section) -> Option<CheckResult> {
    let component = section.get(item)?;
    let (status, name) = operability(&component.operability);
    let mut result = CheckResult::new(status, format!("Operability: {}", name));
    if let Some(code) = &component.presence {
        let (status, name) = presence(code);
        result.append(CheckResult::new(status, format!("Presence: {}", name)));
    }
    Some(result)
}

macro_rules! ucs_plugin {
    ($plugin:ident, $name:expr, $tree:ident, $parse:ident, $service:expr) => {
        pub struct $plugin;

        impl SnmpPlugin for $plugin {
            fn name(&self) -> &'static str {
                $name
            }

            fn detect(&self) -> Detect {
                detect_cisco_ucs()
            }

            fn trees(&self) -> &'static [SnmpTree] {
                &[$tree]
            }

            fn run(&self, tables: &[StringTable], _ctx: &mut CheckContext) -> Vec<ServiceReport> {
                let section = $parse(&tables[0]);
                discover_cisco_ucs(&section)
                    .into_iter()
                    .filter_map(|item| {
                        check_cisco_ucs(&item, &section).map(|result| {
                            ServiceReport::new(format!("{} {}", $service, item), result)
                        })
                    })
                    .collect()
            }
        }
    };
}

ucs_plugin!(CiscoUcsFan, "cisco_ucs_fan", FAN_TABLE, parse_cisco_ucs_fan, "Fan");
ucs_plugin!(CiscoUcsPsu, "cisco_ucs_psu", PSU_TABLE, parse_cisco_ucs_psu, "PSU");

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn fan_operability() {
        let table = vec![
            row(&["sys/rack-unit-1/fan-module-1-1/fan-1", "1"]),
            row(&["sys/rack-unit-1/fan-module-1-1/fan-2", "3"]),
        ];
        let section = parse_cisco_ucs_fan(&table);
        let items = discover_cisco_ucs(&section);
        assert_eq!(items.len(), 2);

        let r = check_cisco_ucs("rack-unit-1/fan-module-1-1/fan-1", &section).unwrap();
        assert_eq!(r.status, Status::Ok);
        assert_eq!(r.text, "Operability: operable");

        let r = check_cisco_ucs("rack-unit-1/fan-module-1-1/fan-2", &section).unwrap();
        assert_eq!(r.status, Status::Critical);
        assert_eq!(r.text, "Operability: degraded");
    }

    #[test]
    fn empty_psu_bays_are_skipped() {
        let table = vec![
            row(&["sys/rack-unit-1/psu-1", "10", "1"]),
            row(&["sys/rack-unit-1/psu-2", "1", "2"]),
        ];
        let section = parse_cisco_ucs_psu(&table);
        assert_eq!(discover_cisco_ucs(&section), vec!["rack-unit-1/psu-1"]);
    }

    #[test]
    fn missing_psu_is_critical() {
        let table = vec![row(&["sys/rack-unit-1/psu-1", "11", "1"])];
        let section = parse_cisco_ucs_psu(&table);
        let r = check_cisco_ucs("rack-unit-1/psu-1", &section).unwrap();
        assert_eq!(r.status, Status::Critical);
        assert_eq!(r.text, "Operability: operable, Presence: missing");
    }

    #[test]
    fn unknown_operability_code_is_critical() {
        let table = vec![row(&["sys/switch-A/fan-1", "77"])];
        let section = parse_cisco_ucs_fan(&table);
        let r = check_cisco_ucs("switch-A/fan-1", &section).unwrap();
        assert_eq!(r.status, Status::Critical);
    }
}
