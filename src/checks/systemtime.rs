//! Agent-reported system time vs our clock

use crate::check::{CheckResult, Metric, ServiceReport};
use crate::levels::{check_levels, UpperLevels};
use crate::plugin::{AgentPlugin, CheckContext};
use crate::render;
use crate::snmp::StringTable;

#[derive(Debug)]
pub struct Section {
    pub foreign_systemtime: f64,
    /// Some agents also report the collection-side timestamp, which beats
    /// our own clock because it ignores transport delay.
    pub our_systemtime: Option<f64>,
}

pub fn parse_systemtime(section: &StringTable) -> Option<Section> {
    let row = section.first()?;
    Some(Section {
        foreign_systemtime: row.first()?.parse().ok()?,
        our_systemtime: row.get(1).and_then(|v| v.parse().ok()),
    })
}

#[derive(Debug, Clone)]
pub struct TimeParams {
    /// Levels on the absolute offset in seconds.
    pub levels: UpperLevels<f64>,
}

impl Default for TimeParams {
    fn default() -> TimeParams {
        TimeParams {
            levels: UpperLevels::warn_crit(30.0, 60.0),
        }
    }
}

pub fn check_systemtime(section: &Section, params: &TimeParams, now: f64) -> CheckResult {
    let reference = section.our_systemtime.unwrap_or(now);
    let offset = section.foreign_systemtime - reference;
    check_levels(
        offset.abs(),
        "Offset",
        &Some(params.levels),
        &None,
        render::seconds,
    )
    .metric(Metric::new("offset", offset).unit("s").levels(&Some(params.levels)))
}

pub struct Systemtime;

impl AgentPlugin for Systemtime {
    fn name(&self) -> &'static str {
        "systemtime"
    }

    fn section(&self) -> &'static str {
        "systemtime"
    }

    fn run(&self, section: &StringTable, ctx: &mut CheckContext) -> Vec<ServiceReport> {
        let section = match parse_systemtime(section) {
            Some(section) => section,
            None => return Vec::new(),
        };
        vec![ServiceReport::new(
            "System Time",
            check_systemtime(&section, &TimeParams::default(), ctx.now),
        )]
    }
}
