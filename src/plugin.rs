//! The plugin table
//!
//! Every check plugin registers itself in [`Registry::builtin`] under a
//! unique name. SNMP plugins declare a detection predicate and the table
//! trees they need fetched; agent plugins declare the section name they
//! consume. The runner binaries iterate the registry, feed each applicable
//! plugin its data, and print the resulting [`ServiceReport`]s.

use std::collections::HashSet;

use crate::agent::AgentOutput;
use crate::check::ServiceReport;
use crate::checks;
use crate::rate::ValueStore;
use crate::snmp::{Detect, SnmpTree, SnmpWalk, StringTable};

/// Shared run context: the wall clock and the counter store.
pub struct CheckContext<'a> {
    /// Seconds since the epoch at the start of the run. Taken once so every
    /// rate key in one run shares a timestamp.
    pub now: f64,
    pub store: &'a mut ValueStore,
}

impl<'a> CheckContext<'a> {
    pub fn new(now: f64, store: &'a mut ValueStore) -> CheckContext<'a> {
        CheckContext { now, store }
    }
}

/// A plugin over a device's SNMP walk.
pub trait SnmpPlugin: Sync {
    /// Unique registry key, e.g. `hwg_temp`.
    fn name(&self) -> &'static str;

    /// When does this plugin apply to a device?
    fn detect(&self) -> Detect;

    /// The tables to fetch from the walk, in the order `run` expects them.
    fn trees(&self) -> &'static [SnmpTree];

    /// Parse, discover, check. `tables` has one entry per tree from
    /// [`trees`](Self::trees).
    fn run(&self, tables: &[StringTable], ctx: &mut CheckContext) -> Vec<ServiceReport>;
}

/// A plugin over one section of agent output.
pub trait AgentPlugin: Sync {
    /// Unique registry key, e.g. `systemtime`.
    fn name(&self) -> &'static str;

    /// The `<<<section>>>` this plugin consumes. Presence of the section is
    /// the detection predicate.
    fn section(&self) -> &'static str;

    fn run(&self, section: &StringTable, ctx: &mut CheckContext) -> Vec<ServiceReport>;
}

/// The shared plugin table.
pub struct Registry {
    snmp: Vec<Box<dyn SnmpPlugin>>,
    agent: Vec<Box<dyn AgentPlugin>>,
}

impl Registry {
    /// Every compiled-in plugin. Panics on duplicate names, which would be a
    /// bug in this crate, not in input data.
    pub fn builtin() -> Registry {
        let registry = Registry {
            snmp: checks::snmp_plugins(),
            agent: checks::agent_plugins(),
        };
        let mut seen = HashSet::new();
        for name in registry.names() {
            assert!(seen.insert(name), "duplicate plugin name: {}", name);
        }
        registry
    }

    pub fn snmp_plugins(&self) -> impl Iterator<Item = &dyn SnmpPlugin> {
        self.snmp.iter().map(Box::as_ref)
    }

    pub fn agent_plugins(&self) -> impl Iterator<Item = &dyn AgentPlugin> {
        self.agent.iter().map(Box::as_ref)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.snmp
            .iter()
            .map(|p| p.name())
            .chain(self.agent.iter().map(|p| p.name()))
    }

    pub fn has(&self, name: &str) -> bool {
        self.names().any(|known| known == name)
    }

    /// Run every applicable SNMP plugin over a walk.
    pub fn run_snmp(
        &self,
        walk: &SnmpWalk,
        ctx: &mut CheckContext,
        filter: &dyn Fn(&str) -> bool,
    ) -> Vec<ServiceReport> {
        let mut reports = Vec::new();
        for plugin in self.snmp_plugins() {
            if !filter(plugin.name()) || !plugin.detect().matches(walk) {
                continue;
            }
            let tables: Vec<StringTable> =
                plugin.trees().iter().map(|tree| walk.table(tree)).collect();
            reports.extend(plugin.run(&tables, ctx));
        }
        reports
    }

    /// Run every plugin whose section appears in the agent output.
    pub fn run_agent(
        &self,
        output: &AgentOutput,
        ctx: &mut CheckContext,
        filter: &dyn Fn(&str) -> bool,
    ) -> Vec<ServiceReport> {
        let mut reports = Vec::new();
        for plugin in self.agent_plugins() {
            if !filter(plugin.name()) {
                continue;
            }
            if let Some(section) = output.section(plugin.section()) {
                reports.extend(plugin.run(section, ctx));
            }
        }
        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate::ValueStore;

    #[test]
    fn builtin_names_are_unique_and_nonempty() {
        let registry = Registry::builtin();
        let names: Vec<_> = registry.names().collect();
        assert!(names.len() > 10, "expected a plugin catalogue, got {:?}", names);
        assert!(registry.has("hwg_temp"));
        assert!(registry.has("systemtime"));
        assert!(!registry.has("no_such_plugin"));
    }

    #[test]
    fn detection_gates_snmp_plugins() {
        let registry = Registry::builtin();
        let walk = SnmpWalk::new();
        let mut store = ValueStore::new();
        let mut ctx = CheckContext::new(0.0, &mut store);
        let reports = registry.run_snmp(&walk, &mut ctx, &|_| true);
        assert!(reports.is_empty());
    }
}
