//! Cisco Meraki organisation license overview
//!
//! The special agent dumps one JSON object per organisation. A non-OK
//! license status warns, the expiration date is checked as remaining days.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::check::{CheckResult, ServiceReport};
use crate::levels::{check_levels, LowerLevels};
use crate::plugin::{AgentPlugin, CheckContext};
use crate::render;
use crate::snmp::StringTable;
use crate::Status;

#[derive(Debug, Deserialize)]
struct RawOverview {
    id: String,
    #[serde(default)]
    name: Option<String>,
    status: String,
    #[serde(rename = "expirationDate", default)]
    expiration_date: Option<String>,
    #[serde(rename = "licensedDeviceCounts", default)]
    licensed_device_counts: BTreeMap<String, u64>,
}

#[derive(Debug)]
pub struct Overview {
    pub status: String,
    pub expiration_date: Option<NaiveDate>,
    pub licensed_device_counts: BTreeMap<String, u64>,
}

pub type Section = BTreeMap<String, Overview>;

/// `"Mar 16, 2024 UTC"`; the timezone suffix varies and carries no
/// information for a date.
fn parse_expiration_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%b %d, %Y")
        .or_else(|_| {
            let without_zone = raw.trim().rsplitn(2, ' ').last().unwrap_or(raw);
            NaiveDate::parse_from_str(without_zone.trim(), "%b %d, %Y")
        })
        .ok()
}

pub fn parse_meraki_licenses(section: &StringTable) -> Section {
    let mut parsed = Section::new();
    for row in section {
        let line = match row.first() {
            Some(line) => line,
            None => continue,
        };
        let raw: RawOverview = match serde_json::from_str(line) {
            Ok(raw) => raw,
            Err(_) => continue,
        };
        let item = match &raw.name {
            Some(name) => format!("{}/{}", name, raw.id),
            None => raw.id.clone(),
        };
        parsed.insert(
            item,
            Overview {
                status: raw.status,
                expiration_date: raw.expiration_date.as_deref().and_then(parse_expiration_date),
                licensed_device_counts: raw.licensed_device_counts,
            },
        );
    }
    parsed
}

pub fn discover_meraki_licenses(section: &Section) -> Vec<String> {
    section.keys().cloned().collect()
}

#[derive(Debug, Clone)]
pub struct LicenseParams {
    /// Levels on the remaining days before expiration.
    pub remaining_days: LowerLevels<f64>,
}

impl Default for LicenseParams {
    fn default() -> LicenseParams {
        LicenseParams {
            remaining_days: LowerLevels::warn_crit(30.0, 15.0),
        }
    }
}

pub fn check_meraki_licenses(
    item: &str,
    params: &LicenseParams,
    section: &Section,
    today: NaiveDate,
) -> Option<CheckResult> {
    let overview = section.get(item)?;

    let status = if overview.status == "OK" {
        Status::Ok
    } else {
        Status::Warning
    };
    let mut result = CheckResult::new(status, format!("Status: {}", overview.status));

    if let Some(expiration) = overview.expiration_date {
        let remaining = (expiration - today).num_days() as f64;
        let expiry = if remaining < 0.0 {
            CheckResult::crit(format!("Licenses expired {} ago", render::days(-remaining)))
        } else {
            check_levels(
                remaining,
                "Remaining time",
                &None,
                &Some(params.remaining_days),
                render::days,
            )
        };
        result.append(expiry);
    }

    if !overview.licensed_device_counts.is_empty() {
        let total: u64 = overview.licensed_device_counts.values().sum();
        result.append(CheckResult::ok(format!("Number of licensed devices: {}", total)));
    }

    Some(result)
}

pub struct MerakiLicenses;

impl AgentPlugin for MerakiLicenses {
    fn name(&self) -> &'static str {
        "meraki_licenses"
    }

    fn section(&self) -> &'static str {
        "meraki_org_licenses_overview"
    }

    fn run(&self, section: &StringTable, ctx: &mut CheckContext) -> Vec<ServiceReport> {
        let section = parse_meraki_licenses(section);
        let params = LicenseParams::default();
        let today = chrono::DateTime::from_timestamp(ctx.now as i64, 0)
            .map(|dt| dt.date_naive())
            .unwrap_or_default();
        discover_meraki_licenses(&section)
            .into_iter()
            .filter_map(|item| {
                check_meraki_licenses(&item, &params, &section, today)
                    .map(|result| ServiceReport::new(format!("Licenses {}", item), result))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section() -> Section {
        let rows = vec![vec![concat!(
            r#"{"id": "123", "name": "Acme", "status": "OK", "#,
            r#""expirationDate": "Mar 16, 2024 UTC", "#,
            r#""licensedDeviceCounts": {"MS": 5, "MR": 12}}"#
        )
        .to_string()]];
        parse_meraki_licenses(&rows)
    }

    #[test]
    fn parse_names_items_and_dates() {
        let section = section();
        assert_eq!(discover_meraki_licenses(&section), vec!["Acme/123"]);
        let overview = &section["Acme/123"];
        assert_eq!(
            overview.expiration_date,
            NaiveDate::from_ymd_opt(2024, 3, 16)
        );
    }

    #[test]
    fn plenty_of_runway_is_ok() {
        let today = NaiveDate::from_ymd_opt(2023, 3, 16).unwrap();
        let r = check_meraki_licenses("Acme/123", &LicenseParams::default(), &section(), today)
            .unwrap();
        assert_eq!(r.status, Status::Ok);
        assert_eq!(
            r.text,
            "Status: OK, Remaining time: 366 days, Number of licensed devices: 17"
        );
    }

    #[test]
    fn imminent_expiry_fires_lower_levels() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap();
        let r = check_meraki_licenses("Acme/123", &LicenseParams::default(), &section(), today)
            .unwrap();
        assert_eq!(r.status, Status::Critical);
        assert!(r
            .text
            .contains("Remaining time: 10 days (warn/crit below 30 days/15 days)"));
    }

    #[test]
    fn expired_is_critical() {
        let today = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let r = check_meraki_licenses("Acme/123", &LicenseParams::default(), &section(), today)
            .unwrap();
        assert_eq!(r.status, Status::Critical);
        assert!(r.text.contains("Licenses expired 16 days ago"));
    }

    #[test]
    fn non_ok_status_warns() {
        let rows = vec![vec![r#"{"id": "9", "status": "License Required"}"#.to_string()]];
        let section = parse_meraki_licenses(&rows);
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let r = check_meraki_licenses("9", &LicenseParams::default(), &section, today).unwrap();
        assert_eq!(r.status, Status::Warning);
        assert_eq!(r.text, "Status: License Required");
    }

    #[test]
    fn garbage_lines_are_skipped() {
        let rows = vec![vec!["not json".to_string()]];
        assert!(parse_meraki_licenses(&rows).is_empty());
    }
}
