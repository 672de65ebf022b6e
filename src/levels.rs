//! Warning/critical threshold pairs and the generic levels check
//!
//! Levels come in two directions: [`UpperLevels`] alert when the value climbs
//! *to or above* a threshold, [`LowerLevels`] when it drops *below* one. Both
//! check crit before warn. They parse from the `"warn"` / `"warn,crit"`
//! strings the command lines use.

use std::fmt;
use std::num::ParseFloatError;
use std::str::FromStr;

use derive_more::From;

use crate::Status;
use crate::check::CheckResult;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpperLevels<T> {
    pub warn: T,
    pub crit: Option<T>,
}

impl<T: PartialOrd> UpperLevels<T> {
    pub fn warn(warn: T) -> UpperLevels<T> {
        UpperLevels { warn, crit: None }
    }

    pub fn warn_crit(warn: T, crit: T) -> UpperLevels<T> {
        UpperLevels {
            warn,
            crit: Some(crit),
        }
    }

    pub fn evaluate(&self, value: &T) -> Status {
        match self {
            UpperLevels {
                crit: Some(crit), ..
            } if value >= crit => Status::Critical,
            UpperLevels { warn, .. } if value >= warn => Status::Warning,
            _ => Status::Ok,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowerLevels<T> {
    pub warn: T,
    pub crit: Option<T>,
}

impl<T: PartialOrd> LowerLevels<T> {
    pub fn warn(warn: T) -> LowerLevels<T> {
        LowerLevels { warn, crit: None }
    }

    pub fn warn_crit(warn: T, crit: T) -> LowerLevels<T> {
        LowerLevels {
            warn,
            crit: Some(crit),
        }
    }

    pub fn evaluate(&self, value: &T) -> Status {
        match self {
            LowerLevels {
                crit: Some(crit), ..
            } if value < crit => Status::Critical,
            LowerLevels { warn, .. } if value < warn => Status::Warning,
            _ => Status::Ok,
        }
    }
}

#[derive(Debug, From)]
pub enum ParseLevelsError {
    InvalidFloat(ParseFloatError),
    WrongCount(usize),
}

impl fmt::Display for ParseLevelsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseLevelsError::InvalidFloat(e) => write!(f, "{}", e),
            ParseLevelsError::WrongCount(n) => write!(
                f,
                "expected 'warn' or 'warn,crit', got {} comma-separated values",
                n
            ),
        }
    }
}

fn parse_pair(s: &str) -> Result<(f64, Option<f64>), ParseLevelsError> {
    let parts: Vec<&str> = s.split(',').collect();
    match parts.as_slice() {
        [warn] => Ok((warn.trim().parse()?, None)),
        [warn, crit] => Ok((warn.trim().parse()?, Some(crit.trim().parse()?))),
        parts => Err(ParseLevelsError::WrongCount(parts.len())),
    }
}

impl FromStr for UpperLevels<f64> {
    type Err = ParseLevelsError;

    fn from_str(s: &str) -> Result<Self, ParseLevelsError> {
        let (warn, crit) = parse_pair(s)?;
        Ok(UpperLevels { warn, crit })
    }
}

impl FromStr for LowerLevels<f64> {
    type Err = ParseLevelsError;

    fn from_str(s: &str) -> Result<Self, ParseLevelsError> {
        let (warn, crit) = parse_pair(s)?;
        Ok(LowerLevels { warn, crit })
    }
}

fn levels_info<F>(preposition: &str, warn: f64, crit: Option<f64>, render: &F) -> String
where
    F: Fn(f64) -> String,
{
    let crit = crit.map_or_else(|| "never".to_string(), render);
    format!(" (warn/crit {} {}/{})", preposition, render(warn), crit)
}

/// Check a value against optional upper and lower levels.
///
/// The text is `"{label}: {rendered}"` plus, when a level fired, which
/// thresholds it fired at:
///
/// ```
/// use rackmon_plugins::Status;
/// use rackmon_plugins::levels::{check_levels, UpperLevels};
///
/// let r = check_levels(
///     23.0,
///     "Fridge",
///     &Some(UpperLevels::warn_crit(12.0, 42.0)),
///     &None,
///     |v| format!("{:.1} \u{b0}C", v),
/// );
/// assert_eq!(r.status, Status::Warning);
/// assert_eq!(r.text, "Fridge: 23.0 \u{b0}C (warn/crit at 12.0 \u{b0}C/42.0 \u{b0}C)");
/// ```
pub fn check_levels<F>(
    value: f64,
    label: &str,
    upper: &Option<UpperLevels<f64>>,
    lower: &Option<LowerLevels<f64>>,
    render: F,
) -> CheckResult
where
    F: Fn(f64) -> String,
{
    let (status, info) = evaluate(value, upper, lower, &render);
    let text = if label.is_empty() {
        format!("{}{}", render(value), info)
    } else {
        format!("{}: {}{}", label, render(value), info)
    };
    CheckResult::new(status, text)
}

fn evaluate<F>(
    value: f64,
    upper: &Option<UpperLevels<f64>>,
    lower: &Option<LowerLevels<f64>>,
    render: &F,
) -> (Status, String)
where
    F: Fn(f64) -> String,
{
    if let Some(upper) = upper {
        match upper.evaluate(&value) {
            Status::Ok => {}
            worse => return (worse, levels_info("at", upper.warn, upper.crit, render)),
        }
    }
    if let Some(lower) = lower {
        match lower.evaluate(&value) {
            Status::Ok => {}
            worse => return (worse, levels_info("below", lower.warn, lower.crit, render)),
        }
    }
    (Status::Ok, String::new())
}
