//! Run every applicable agent check plugin over agent output

use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use regex::Regex;
use structopt::StructOpt;

use rackmon_plugins::agent::AgentOutput;
use rackmon_plugins::plugin::{CheckContext, Registry};
use rackmon_plugins::rate::PersistentStore;
use rackmon_plugins::Status;

/// Check a host from its monitoring agent output.
///
/// Reads the `<<<section>>>`-structured text from a file or stdin, runs
/// every plugin whose section is present, prints one line per service and
/// exits with the worst status.
#[derive(StructOpt, Debug)]
#[structopt(
    name = "check-agent (part of rackmon-plugins)",
    setting = structopt::clap::AppSettings::ColoredHelp,
    after_help = "Examples:

    Pipe a host's agent straight in:

        ssh host rackmon-agent | check-agent

    Only the queue checks from a captured dump:

        check-agent --plugin rabbitmq_queues host.out"
)]
struct Args {
    #[structopt(help = "Agent output file. Reads stdin when omitted.")]
    input: Option<PathBuf>,

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
        help = "JSON file remembering counter samples between runs"
    )]
    state_file: Option<PathBuf>,

    #[structopt(long = "list-plugins", help = "List plugin names and exit")]
    list_plugins: bool,
}

fn read_input(path: &Option<PathBuf>) -> io::Result<String> {
    let mut contents = String::new();
    match path {
        Some(path) => {
            File::open(path)?.read_to_string(&mut contents)?;
        }
        None => {
            io::stdin().read_to_string(&mut contents)?;
        }
    }
    Ok(contents)
}

fn epoch_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
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

    let text = match read_input(&args.input) {
        Ok(text) => text,
        Err(e) => {
            println!("UNKNOWN - could not read agent output: {}", e);
            Status::Unknown.exit();
        }
    };
    let output = AgentOutput::parse(&text);

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
    let mut reports = registry.run_agent(&output, &mut ctx, &|name| {
        only.is_empty() || only.iter().any(|n| n == name)
    });
    if let Some(pattern) = &args.service {
        reports.retain(|report| pattern.is_match(&report.service));
    }

    if let Err(e) = store.persist() {
        eprintln!("warning: {}", e);
    }

    if reports.is_empty() {
        println!("OK - no services discovered on this host");
        Status::Ok.exit();
    }

    let mut worst = Status::Ok;
    for report in &reports {
        println!("{}", report);
        worst.worsen(report.result.status);
    }
    worst.exit();
}
