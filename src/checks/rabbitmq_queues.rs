//! RabbitMQ queue depth and consumers
//!
//! The agent dumps one JSON object per queue. Message depth is checked
//! against upper levels, consumer count against a lower bound; a queue in
//! any state other than `running` or `idle` warns.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::check::{CheckResult, Metric, ServiceReport};
use crate::levels::{check_levels, LowerLevels, UpperLevels};
use crate::plugin::{AgentPlugin, CheckContext};
use crate::snmp::StringTable;

#[derive(Debug, Deserialize)]
pub struct Queue {
    pub name: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub messages: Option<u64>,
    #[serde(default)]
    pub consumers: Option<u64>,
}

pub type Section = BTreeMap<String, Queue>;

pub fn parse_rabbitmq_queues(section: &StringTable) -> Section {
    section
        .iter()
        .filter_map(|row| row.first())
        .filter_map(|line| serde_json::from_str::<Queue>(line).ok())
        .map(|queue| (queue.name.clone(), queue))
        .collect()
}

pub fn discover_rabbitmq_queues(section: &Section) -> Vec<String> {
    section.keys().cloned().collect()
}

#[derive(Debug, Clone, Default)]
pub struct QueueParams {
    pub messages: Option<UpperLevels<f64>>,
    pub consumers: Option<LowerLevels<f64>>,
}

pub fn check_rabbitmq_queue(
    item: &str,
    params: &QueueParams,
    section: &Section,
) -> Option<CheckResult> {
    let queue = section.get(item)?;

    let mut result = match queue.state.as_deref() {
        Some("running") | Some("idle") => {
            CheckResult::ok(format!("State: {}", queue.state.as_deref().unwrap_or("")))
        }
        Some(state) => CheckResult::warn(format!("State: {}", state)),
        None => CheckResult::unknown("State not reported"),
    };

    if let Some(messages) = queue.messages {
        let depth = messages as f64;
        result.append(
            check_levels(depth, "Total number of messages", &params.messages, &None, |v| {
                format!("{}", v as u64)
            })
            .metric(Metric::new("messages", depth).levels(&params.messages)),
        );
    }

    if let Some(consumers) = queue.consumers {
        result.append(check_levels(
            consumers as f64,
            "Consumers",
            &None,
            &params.consumers,
            |v| format!("{}", v as u64),
        ));
    }

    Some(result)
}

pub struct RabbitmqQueues;

impl AgentPlugin for RabbitmqQueues {
    fn name(&self) -> &'static str {
        "rabbitmq_queues"
    }

    fn section(&self) -> &'static str {
        "rabbitmq_queues"
    }

    fn run(&self, section: &StringTable, _ctx: &mut CheckContext) -> Vec<ServiceReport> {
        let section = parse_rabbitmq_queues(section);
        let params = QueueParams::default();
        discover_rabbitmq_queues(&section)
            .into_iter()
            .filter_map(|item| {
                check_rabbitmq_queue(&item, &params, &section)
                    .map(|result| ServiceReport::new(format!("Queue {}", item), result))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Status;

    fn section() -> Section {
        let rows = vec![
            vec![r#"{"name": "events", "state": "running", "messages": 42, "consumers": 3}"#
                .to_string()],
            vec![r#"{"name": "dead-letter", "state": "flow", "messages": 12000}"#.to_string()],
        ];
        parse_rabbitmq_queues(&rows)
    }

    #[test]
    fn discovery_lists_queues() {
        assert_eq!(
            discover_rabbitmq_queues(&section()),
            vec!["dead-letter", "events"]
        );
    }

    #[test]
    fn running_queue_under_levels_is_ok() {
        let params = QueueParams {
            messages: Some(UpperLevels::warn_crit(1000.0, 5000.0)),
            consumers: Some(LowerLevels::warn(1.0)),
        };
        let r = check_rabbitmq_queue("events", &params, &section()).unwrap();
        assert_eq!(r.status, Status::Ok);
        assert_eq!(
            r.text,
            "State: running, Total number of messages: 42, Consumers: 3"
        );
    }

    #[test]
    fn deep_queue_in_odd_state() {
        let params = QueueParams {
            messages: Some(UpperLevels::warn_crit(1000.0, 5000.0)),
            consumers: None,
        };
        let r = check_rabbitmq_queue("dead-letter", &params, &section()).unwrap();
        assert_eq!(r.status, Status::Critical);
        assert!(r.text.starts_with("State: flow"));
        assert!(r
            .text
            .contains("Total number of messages: 12000 (warn/crit at 1000/5000)"));
    }

    #[test]
    fn no_levels_means_metrics_only() {
        let r = check_rabbitmq_queue("dead-letter", &QueueParams::default(), &section()).unwrap();
        assert_eq!(r.status, Status::Warning);
        assert_eq!(r.metrics[0].to_string(), "messages=12000;;;;");
    }
}
