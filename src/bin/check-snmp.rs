//! Run every applicable SNMP check plugin over a stored walk

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use regex::Regex;
use structopt::StructOpt;

use rackmon_plugins::check::ServiceReport;
use rackmon_plugins::plugin::{CheckContext, Registry};
use rackmon_plugins::rate::PersistentStore;
use rackmon_plugins::snmp::SnmpWalk;
use rackmon_plugins::Status;

/// Check a device from a stored SNMP walk.
///
/// Every registered plugin whose detection predicate matches the walk is
/// run; each discovered service prints one line and the exit code is the
/// worst status seen.
#[derive(StructOpt, Debug)]
#[structopt(
    name = "check-snmp (part of rackmon-plugins)",
    setting = structopt::clap::AppSettings::ColoredHelp,
    after_help = "Examples:

    Check everything a walk of a rack sensor offers:

        check-snmp hwg-ste.walk

    Only temperature services, with counters persisted between runs:

        check-snmp --service 'Temperature' --state-file /var/tmp/ste.json hwg-ste.walk

    See what would run without a device at hand:

        check-snmp --list-plugins /dev/null"
)]
struct Args {
    #[structopt(help = "Path to a stored snmpwalk dump of the device")]
    walk: PathBuf,

    #[structopt(
        long = "plugin",
        name = "NAME",
        help = "Only run the named plugin. May be passed multiple times."
    )]
    plugins: Vec<String>,

    #[structopt(
        long = "service",
        name = "REGEX",
        help = "Only report services whose description matches"
    )]
    service: Option<Regex>,

    #[structopt(
        long = "state-file",
        name = "PATH",
        help = "JSON file remembering counter samples between runs. \
                Without it every run looks like the first."
    )]
    state_file: Option<PathBuf>,

    #[structopt(long = "list-plugins", help = "List plugin names and exit")]
    list_plugins: bool,
}

fn epoch_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

fn print_reports(reports: &[ServiceReport]) -> Status {
    let mut worst = Status::Ok;
    for report in reports {
        println!("{}", report);
        worst.worsen(report.result.status);
    }
    worst
}

fn main() {
    let args = Args::from_args();
    let registry = Registry::builtin();

    if args.list_plugins {
        for name in registry.names() {
            println!("{}", name);
        }
        Status::Ok.exit();
    }

    for name in &args.plugins {
        if !registry.has(name) {
            println!("UNKNOWN - no plugin named '{}', see --list-plugins", name);
            Status::Unknown.exit();
        }
    }

    let walk = match SnmpWalk::load(&args.walk) {
        Ok(walk) => walk,
        Err(e) => {
            println!("UNKNOWN - {}", e);
            Status::Unknown.exit();
        }
    };

    let mut store = match args.state_file.clone().map(PersistentStore::open) {
        Some(Ok(store)) => store,
        Some(Err(e)) => {
            println!("UNKNOWN - {}", e);
            Status::Unknown.exit();
        }
        None => PersistentStore::ephemeral(),
    };

    let mut ctx = CheckContext::new(epoch_now(), &mut store.store);
    let only = &args.plugins;
    let mut reports = registry.run_snmp(&walk, &mut ctx, &|name| {
        only.is_empty() || only.iter().any(|n| n == name)
    });
    if let Some(pattern) = &args.service {
        reports.retain(|report| pattern.is_match(&report.service));
    }

    if let Err(e) = store.persist() {
        eprintln!("warning: {}", e);
    }

    if reports.is_empty() {
        println!("OK - no services discovered on this device");
        Status::Ok.exit();
    }
    print_reports(&reports).exit();
}

#[cfg(test)]
mod tests {
    use super::*;
    use rackmon_plugins::rate::ValueStore;

    const HWG_WALK: &str = "\
.1.3.6.1.2.1.1.1.0 = STRING: HWg-STE plus
.1.3.6.1.4.1.21796.4.1.3.1.1.1 = INTEGER: 1
.1.3.6.1.4.1.21796.4.1.3.1.2.1 = STRING: Server room
.1.3.6.1.4.1.21796.4.1.3.1.3.1 = INTEGER: 1
.1.3.6.1.4.1.21796.4.1.3.1.4.1 = STRING: 21.5
.1.3.6.1.4.1.21796.4.1.3.1.7.1 = INTEGER: 1
";

    #[test]
    fn end_to_end_over_a_walk() {
        let walk: SnmpWalk = HWG_WALK.parse().unwrap();
        let registry = Registry::builtin();
        let mut store = ValueStore::new();
        let mut ctx = CheckContext::new(100.0, &mut store);
        let reports = registry.run_snmp(&walk, &mut ctx, &|_| true);
        assert_eq!(reports.len(), 1);
        assert_eq!(
            reports[0].to_string(),
            "OK - Temperature 1: 21.5 \u{b0}C, (Description: Server room, Status: normal) \
             | temp=21.5;30;35;;"
        );
        assert_eq!(print_reports(&reports), Status::Ok);
    }

    #[test]
    fn plugin_filter_narrows_the_run() {
        let walk: SnmpWalk = HWG_WALK.parse().unwrap();
        let registry = Registry::builtin();
        let mut store = ValueStore::new();
        let mut ctx = CheckContext::new(100.0, &mut store);
        let reports = registry.run_snmp(&walk, &mut ctx, &|name| name == "hwg_humidity");
        assert!(reports.is_empty());
    }

    #[test]
    fn args_parse() {
        let args = Args::from_iter(vec![
            "check-snmp",
            "--plugin",
            "hwg_temp",
            "--service",
            "Temp",
            "device.walk",
        ]);
        assert_eq!(args.plugins, vec!["hwg_temp"]);
        assert!(args.service.unwrap().is_match("Temperature 1"));
    }
}
