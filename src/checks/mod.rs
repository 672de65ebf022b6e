//! The plugin catalogue
//!
//! One module per vendor/product family, each with its `parse_*`,
//! `discover_*` and `check_*` functions plus the registry glue. Shared
//! helpers ([`temperature`], [`humidity`]) live here too so families with
//! the same physics share one judgement.

use crate::plugin::{AgentPlugin, SnmpPlugin};

pub mod akcp;
pub mod cisco_ucs;
pub mod enviromux;
pub mod f5_bigip;
pub mod humidity;
pub mod hwg;
pub mod interfaces;
pub mod liebert;
pub mod meraki_licenses;
pub mod poe;
pub mod rabbitmq_queues;
pub mod systemtime;
pub mod temperature;

/// Every compiled-in SNMP plugin.
pub fn snmp_plugins() -> Vec<Box<dyn SnmpPlugin>> {
    vec![
        Box::new(akcp::AkcpSensorTemp),
        Box::new(cisco_ucs::CiscoUcsFan),
        Box::new(cisco_ucs::CiscoUcsPsu),
        Box::new(enviromux::EnviromuxTemp),
        Box::new(enviromux::EnviromuxHumidity),
        Box::new(enviromux::EnviromuxVoltage),
        Box::new(f5_bigip::F5BigipClusterStatus),
        Box::new(hwg::HwgTemp),
        Box::new(hwg::HwgHumidity),
        Box::new(interfaces::Interfaces),
        Box::new(liebert::LiebertTemp),
        Box::new(poe::PoeMain),
    ]
}

/// Every compiled-in agent plugin.
pub fn agent_plugins() -> Vec<Box<dyn AgentPlugin>> {
    vec![
        Box::new(meraki_licenses::MerakiLicenses),
        Box::new(rabbitmq_queues::RabbitmqQueues),
        Box::new(systemtime::Systemtime),
    ]
}
