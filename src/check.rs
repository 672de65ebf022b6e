//! Check results and performance metrics
//!
//! A check step produces a [`CheckResult`]: an aggregated [`Status`], the
//! human-readable summary, and any perf-data [`Metric`]s. Partial results are
//! merged with [`CheckResult::append`], which joins texts with `", "` and
//! keeps the worst status.

use std::fmt;

use crate::Status;
use crate::levels::UpperLevels;

/// A single perf-data metric, rendered as `name=value[unit];warn;crit;min;max`
/// with empty fields left blank.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub name: String,
    pub value: f64,
    pub unit: &'static str,
    pub warn: Option<f64>,
    pub crit: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Metric {
    pub fn new(name: &str, value: f64) -> Metric {
        Metric {
            name: name.into(),
            value,
            unit: "",
            warn: None,
            crit: None,
            min: None,
            max: None,
        }
    }

    pub fn unit(mut self, unit: &'static str) -> Metric {
        self.unit = unit;
        self
    }

    pub fn levels(mut self, levels: &Option<UpperLevels<f64>>) -> Metric {
        if let Some(levels) = levels {
            self.warn = Some(levels.warn);
            self.crit = levels.crit;
        }
        self
    }

    pub fn bounds(mut self, min: f64, max: f64) -> Metric {
        self.min = Some(min);
        self.max = Some(max);
        self
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fn opt(f: &mut fmt::Formatter, val: Option<f64>) -> fmt::Result {
            if let Some(val) = val {
                write!(f, "{}", val)?;
            }
            Ok(())
        }
        write!(f, "{}={}{}", self.name, self.value, self.unit)?;
        write!(f, ";")?;
        opt(f, self.warn)?;
        write!(f, ";")?;
        opt(f, self.crit)?;
        write!(f, ";")?;
        opt(f, self.min)?;
        write!(f, ";")?;
        opt(f, self.max)
    }
}

/// What a check step says about one service.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    pub status: Status,
    pub text: String,
    pub metrics: Vec<Metric>,
}

impl CheckResult {
    pub fn new(status: Status, text: impl Into<String>) -> CheckResult {
        CheckResult {
            status,
            // The pipe starts the perf-data section, it must not appear in
            // the text.
            text: text.into().replace('|', "\u{2758}"),
            metrics: Vec::new(),
        }
    }

    pub fn ok(text: impl Into<String>) -> CheckResult {
        CheckResult::new(Status::Ok, text)
    }

    pub fn warn(text: impl Into<String>) -> CheckResult {
        CheckResult::new(Status::Warning, text)
    }

    pub fn crit(text: impl Into<String>) -> CheckResult {
        CheckResult::new(Status::Critical, text)
    }

    pub fn unknown(text: impl Into<String>) -> CheckResult {
        CheckResult::new(Status::Unknown, text)
    }

    pub fn metric(mut self, metric: Metric) -> CheckResult {
        self.metrics.push(metric);
        self
    }

    /// Merge another partial result into this one.
    pub fn append(&mut self, other: CheckResult) {
        self.status.worsen(other.status);
        if !other.text.is_empty() {
            if !self.text.is_empty() {
                self.text.push_str(", ");
            }
            self.text.push_str(&other.text);
        }
        self.metrics.extend(other.metrics);
    }

    /// Merge a sequence of partial results. Returns OK with empty text for an
    /// empty sequence.
    pub fn merge(parts: impl IntoIterator<Item = CheckResult>) -> CheckResult {
        let mut merged = CheckResult::ok("");
        for part in parts {
            merged.append(part);
        }
        merged
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.text)?;
        if !self.metrics.is_empty() {
            write!(f, " |")?;
            for metric in &self.metrics {
                write!(f, " {}", metric)?;
            }
        }
        Ok(())
    }
}

/// One discovered service together with its check result.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceReport {
    /// The service description, e.g. `Temperature Sensor 1`.
    pub service: String,
    pub result: CheckResult,
}

impl ServiceReport {
    pub fn new(service: impl Into<String>, result: CheckResult) -> ServiceReport {
        ServiceReport {
            service: service.into(),
            result,
        }
    }
}

impl fmt::Display for ServiceReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} - {}: {}",
            self.result.status, self.service, self.result
        )
    }
}
