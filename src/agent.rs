//! Monitoring agent output
//!
//! Agents report plain text split into sections by `<<<name>>>` headers:
//!
//! ```plain
//! <<<systemtime>>>
//! 1593509184
//! <<<rabbitmq_queues:sep(0)>>>
//! {"name": "events", "messages": 42, ...}
//! ```
//!
//! Fields within a line are whitespace-separated unless the header carries a
//! `sep(N)` option naming the separator byte (`sep(0)` means "whole line is
//! one field", which JSON sections use).

use std::collections::HashMap;

use crate::snmp::StringTable;

/// Parsed agent output: section name → rows of fields.
#[derive(Debug, Default)]
pub struct AgentOutput {
    sections: HashMap<String, StringTable>,
}

impl AgentOutput {
    pub fn parse(text: &str) -> AgentOutput {
        let mut output = AgentOutput::default();
        let mut current: Option<(String, Separator)> = None;

        for line in text.lines() {
            if let Some(header) = parse_header(line) {
                output.sections.entry(header.0.clone()).or_default();
                current = Some(header);
                continue;
            }
            let (name, sep) = match &current {
                Some(section) => section,
                // Leading garbage before the first header.
                None => continue,
            };
            let row = match sep {
                Separator::Whitespace => {
                    line.split_whitespace().map(str::to_string).collect()
                }
                Separator::Byte(0) => vec![line.to_string()],
                Separator::Byte(b) => line.split(*b as char).map(str::to_string).collect(),
            };
            if let Some(rows) = output.sections.get_mut(name) {
                rows.push(row);
            }
        }
        output
    }

    pub fn section(&self, name: &str) -> Option<&StringTable> {
        self.sections.get(name)
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy)]
enum Separator {
    Whitespace,
    Byte(u8),
}

fn parse_header(line: &str) -> Option<(String, Separator)> {
    let inner = line.trim().strip_prefix("<<<")?.strip_suffix(">>>")?;
    if inner.is_empty() || inner.contains('<') {
        return None;
    }
    let mut parts = inner.split(':');
    let name = parts.next()?.to_string();
    let mut sep = Separator::Whitespace;
    for option in parts {
        if let Some(byte) = option.strip_prefix("sep(").and_then(|o| o.strip_suffix(")")) {
            sep = Separator::Byte(byte.parse().ok()?);
        }
    }
    Some((name, sep))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_sections_and_fields() {
        let output = AgentOutput::parse(
            "<<<systemtime>>>\n1593509184\n<<<df>>>\n/dev/sda1  1024  512\n",
        );
        assert_eq!(
            output.section("systemtime"),
            Some(&vec![vec!["1593509184".to_string()]])
        );
        assert_eq!(
            output.section("df"),
            Some(&vec![vec![
                "/dev/sda1".to_string(),
                "1024".into(),
                "512".into()
            ]])
        );
        assert!(output.section("mem").is_none());
    }

    #[test]
    fn sep_zero_keeps_whole_lines() {
        let output = AgentOutput::parse(
            "<<<rabbitmq_queues:sep(0)>>>\n{\"name\": \"events queue\"}\n",
        );
        assert_eq!(
            output.section("rabbitmq_queues"),
            Some(&vec![vec!["{\"name\": \"events queue\"}".to_string()]])
        );
    }

    #[test]
    fn sep_byte_splits_on_it() {
        let output = AgentOutput::parse("<<<w:sep(59)>>>\na;b c;d\n");
        assert_eq!(
            output.section("w"),
            Some(&vec![vec!["a".to_string(), "b c".into(), "d".into()]])
        );
    }

    #[test]
    fn leading_garbage_is_ignored() {
        let output = AgentOutput::parse("motd noise\n<<<a>>>\nx\n");
        assert_eq!(output.section("a"), Some(&vec![vec!["x".to_string()]]));
    }
}
