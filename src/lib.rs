//! rackmon-plugins: check plugins for rack gear
//!
//! Each plugin in [`checks`](checks/index.html) knows how to read one metric
//! family (temperature, PSU state, PoE budget, queue depth, ...) for one
//! vendor/product family out of either a stored SNMP walk or a monitoring
//! agent's text output. A plugin is four small steps:
//!
//! 1. a *detection* predicate deciding whether the plugin applies to a device,
//! 2. a *parse* step turning raw table rows or text lines into a typed section,
//! 3. a *discovery* step listing the service instances present in the section,
//! 4. a *check* step comparing values against warn/crit levels.
//!
//! The `check-snmp` and `check-agent` binaries drive every registered plugin
//! over a device's data and speak the usual plugin protocol: one
//! `STATUS - Service: text | perfdata` line per service, exit code of the
//! worst status seen. See the [`scripts`](scripts/index.html) module for
//! their documentation.

use std::fmt;
use std::process;
use std::str::FromStr;

pub mod agent;
pub mod check;
pub mod checks;
pub mod levels;
pub mod plugin;
pub mod rate;
pub mod render;
pub mod scripts;
pub mod snmp;

/// The status of a check, in the order of the exit codes monitoring systems
/// expect.
///
/// Aggregation does *not* follow exit-code order: `Unknown` is considered
/// worse than `Warning` but less bad than `Critical`, see
/// [`worst`](#method.worst).
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Status {
    /// Terminate the process with this status' exit code.
    pub fn exit(self) -> ! {
        process::exit(self.exit_code())
    }

    pub fn exit_code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Warning => 1,
            Status::Critical => 2,
            Status::Unknown => 3,
        }
    }

    /// How bad this status is when merging several partial results.
    fn badness(self) -> u8 {
        match self {
            Status::Ok => 0,
            Status::Warning => 1,
            Status::Unknown => 2,
            Status::Critical => 3,
        }
    }

    /// The worse of two statuses.
    pub fn worst(self, other: Status) -> Status {
        if other.badness() > self.badness() {
            other
        } else {
            self
        }
    }

    /// Replace self if `other` is worse.
    pub fn worsen(&mut self, other: Status) {
        *self = self.worst(other);
    }

    pub fn str_values() -> [&'static str; 4] {
        ["ok", "warning", "critical", "unknown"]
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Status::Ok => write!(f, "OK"),
            Status::Warning => write!(f, "WARNING"),
            Status::Critical => write!(f, "CRITICAL"),
            Status::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Status, String> {
        match s {
            "ok" => Ok(Status::Ok),
            "warn" | "warning" => Ok(Status::Warning),
            "crit" | "critical" => Ok(Status::Critical),
            "unknown" => Ok(Status::Unknown),
            _ => Err(format!(
                "unexpected status '{}', expected one of {:?}",
                s,
                Status::str_values()
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Status;

    #[test]
    fn worst_prefers_critical_over_unknown() {
        assert_eq!(Status::Unknown.worst(Status::Critical), Status::Critical);
        assert_eq!(Status::Critical.worst(Status::Unknown), Status::Critical);
        assert_eq!(Status::Warning.worst(Status::Unknown), Status::Unknown);
        assert_eq!(Status::Ok.worst(Status::Ok), Status::Ok);
    }

    #[test]
    fn exit_codes_are_protocol_order() {
        assert_eq!(Status::Ok.exit_code(), 0);
        assert_eq!(Status::Warning.exit_code(), 1);
        assert_eq!(Status::Critical.exit_code(), 2);
        assert_eq!(Status::Unknown.exit_code(), 3);
    }

    #[test]
    fn parses_cli_spellings() {
        assert_eq!("warn".parse::<Status>().unwrap(), Status::Warning);
        assert_eq!("critical".parse::<Status>().unwrap(), Status::Critical);
        assert!("grand".parse::<Status>().is_err());
    }
}
