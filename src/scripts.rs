//! Documentation about the runner binaries
//!
//! - [check-snmp](#check-snmp)
//! - [check-agent](#check-agent)
//!
//! This module is regenerated by the `make-docs` crate, which runs each
//! binary with `--help` and pastes the output here.
//!
//! # check-snmp
//!
//! Cross platform, only requires a stored snmpwalk dump.
//!
//! ```plain
//! $ check-snmp --help
//! check-snmp (part of rackmon-plugins) 0.1.0
//! Check a device from a stored SNMP walk.
//!
//! Every registered plugin whose detection predicate matches the walk is run; each discovered service prints one line
//! and the exit code is the worst status seen.
//!
//! USAGE:
//!     check-snmp [FLAGS] [OPTIONS] <walk>
//!
//! FLAGS:
//!     -h, --help            Prints help information
//!         --list-plugins    List plugin names and exit
//!     -V, --version         Prints version information
//!
//! OPTIONS:
//!         --plugin <NAME>...     Only run the named plugin. May be passed multiple times.
//!         --service <REGEX>      Only report services whose description matches
//!         --state-file <PATH>    JSON file remembering counter samples between runs. Without it every run looks like
//!                                the first.
//!
//! ARGS:
//!     <walk>    Path to a stored snmpwalk dump of the device
//!
//! Examples:
//!
//!     Check everything a walk of a rack sensor offers:
//!
//!         check-snmp hwg-ste.walk
//!
//!     Only temperature services, with counters persisted between runs:
//!
//!         check-snmp --service 'Temperature' --state-file /var/tmp/ste.json hwg-ste.walk
//!
//!     See what would run without a device at hand:
//!
//!         check-snmp --list-plugins /dev/null
//! ```
//!
//! # check-agent
//!
//! Cross platform, reads agent output from a file or stdin.
//!
//! ```plain
//! $ check-agent --help
//! check-agent (part of rackmon-plugins) 0.1.0
//! Check a host from its monitoring agent output.
//!
//! Reads the `<<<section>>>`-structured text from a file or stdin, runs every plugin whose section is present, prints
//! one line per service and exits with the worst status.
//!
//! USAGE:
//!     check-agent [FLAGS] [OPTIONS] [input]
//!
//! FLAGS:
//!     -h, --help            Prints help information
//!         --list-plugins    List plugin names and exit
//!     -V, --version         Prints version information
//!
//! OPTIONS:
//!         --plugin <NAME>...     Only run the named plugin. May be passed multiple times.
//!         --service <REGEX>      Only report services whose description matches
//!         --state-file <PATH>    JSON file remembering counter samples between runs
//!
//! ARGS:
//!     <input>    Agent output file. Reads stdin when omitted.
//!
//! Examples:
//!
//!     Pipe a host's agent straight in:
//!
//!         ssh host rackmon-agent | check-agent
//!
//!     Only the queue checks from a captured dump:
//!
//!         check-agent --plugin rabbitmq_queues host.out
//! ```
