//! # Device Registry
//!
//! Concurrent upsert-only store of the latest state per agent.
//!
//! ## Design
//!
//! - Records are `Arc<Agent>`: fully built before insertion, never mutated after
//! - Write lock held only for the map insert/clear itself
//! - Snapshots clone the `Arc`s under a short read lock, so callers iterate
//!   without blocking concurrent upserts
//! - No eviction: the map grows with distinct ids until `remove_all`

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;

use crate::agent::{Agent, AgentReport};
use crate::error::ValidationError;

/// Source of `last_update_time` stamps, in milliseconds.
pub type Clock = fn() -> u64;

/// Wall-clock milliseconds since the Unix epoch.
#[must_use]
pub fn system_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// Latest reported state of every tracked agent, keyed by id.
pub struct DeviceRegistry {
    agents: RwLock<HashMap<String, Arc<Agent>>>,
    clock: Clock,
}

impl DeviceRegistry {
    /// Creates an empty registry stamping with the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(system_clock)
    }

    /// Creates an empty registry with a custom clock.
    #[must_use]
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            agents: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Validates a report and stores it, replacing any previous entry.
    ///
    /// The stored record is stamped with the registry's clock. Last writer
    /// wins on identical ids.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] for an incomplete report; the
    /// registry is unchanged in that case.
    pub fn upsert(&self, report: AgentReport) -> Result<Arc<Agent>, ValidationError> {
        let agent = Arc::new(self.prepare(report)?);
        self.agents
            .write()
            .insert(agent.id.clone(), Arc::clone(&agent));
        Ok(agent)
    }

    /// Validates a report and stamps it with the registry's clock without
    /// storing it.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] for an incomplete report.
    pub fn prepare(&self, report: AgentReport) -> Result<Agent, ValidationError> {
        report.into_agent((self.clock)())
    }

    /// Swaps the whole contents for `agents` under a single write lock and
    /// returns the new agent count. Later duplicates of an id win.
    pub fn replace_all(&self, agents: Vec<Agent>) -> usize {
        let mut map = self.agents.write();
        map.clear();
        for agent in agents {
            map.insert(agent.id.clone(), Arc::new(agent));
        }
        map.len()
    }

    /// Returns the current record for `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<Agent>> {
        self.agents.read().get(id).cloned()
    }

    /// Point-in-time snapshot of every stored agent, in no particular order.
    #[must_use]
    pub fn all_agents(&self) -> Vec<Arc<Agent>> {
        self.agents.read().values().cloned().collect()
    }

    /// Drops every stored agent.
    pub fn remove_all(&self) {
        self.agents.write().clear();
    }

    /// Number of stored agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.read().len()
    }

    /// Returns true if no agent is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.read().is_empty()
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_clock() -> u64 {
        1_700_000_000_000
    }

    #[test]
    fn test_upsert_and_get() {
        let registry = DeviceRegistry::with_clock(fixed_clock);
        registry
            .upsert(AgentReport::planar("a", "CAR", 10.0, 0.0, 0.0))
            .unwrap();

        let agent = registry.get("a").unwrap();
        assert_eq!(agent.velocity, 10.0);
        assert_eq!(agent.last_update_time, fixed_clock());
        assert!(registry.get("b").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_upsert_replaces_whole_record() {
        let registry = DeviceRegistry::new();
        registry
            .upsert(AgentReport::planar("a", "CAR", 10.0, 0.0, 0.0).with_geo(12.9, 77.5))
            .unwrap();
        registry
            .upsert(AgentReport::planar("a", "BIKE", 3.0, 5.0, 5.0))
            .unwrap();

        let agent = registry.get("a").unwrap();
        assert_eq!(registry.len(), 1);
        assert!(agent.vehicle_type.is_bike());
        // No field-level merge: the geo pair from the first report is gone.
        assert!(agent.geo.is_none());
    }

    #[test]
    fn test_rejected_report_leaves_registry_unchanged() {
        let registry = DeviceRegistry::new();
        registry
            .upsert(AgentReport::planar("a", "CAR", 10.0, 0.0, 0.0))
            .unwrap();

        let mut bad = AgentReport::planar("a", "CAR", 99.0, 0.0, 0.0);
        bad.vehicle_type = None;
        assert!(registry.upsert(bad).is_err());

        assert_eq!(registry.get("a").unwrap().velocity, 10.0);
    }

    #[test]
    fn test_replace_all_swaps_contents() {
        let registry = DeviceRegistry::with_clock(fixed_clock);
        registry
            .upsert(AgentReport::planar("old", "CAR", 10.0, 0.0, 0.0))
            .unwrap();

        let agents = vec![
            registry.prepare(AgentReport::planar("a", "CAR", 1.0, 0.0, 0.0)).unwrap(),
            registry.prepare(AgentReport::planar("b", "BIKE", 2.0, 1.0, 0.0)).unwrap(),
            registry.prepare(AgentReport::planar("a", "CAR", 3.0, 0.0, 0.0)).unwrap(),
        ];
        assert_eq!(registry.replace_all(agents), 2);

        assert!(registry.get("old").is_none());
        assert_eq!(registry.get("a").unwrap().velocity, 3.0);
        assert_eq!(registry.get("b").unwrap().last_update_time, fixed_clock());
    }

    #[test]
    fn test_prepare_does_not_store() {
        let registry = DeviceRegistry::new();
        assert!(registry.prepare(AgentReport::planar("a", "CAR", 1.0, 0.0, 0.0)).is_ok());
        assert!(registry.prepare(AgentReport::default()).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let registry = DeviceRegistry::new();
        registry
            .upsert(AgentReport::planar("a", "CAR", 10.0, 0.0, 0.0))
            .unwrap();

        let snapshot = registry.all_agents();
        registry
            .upsert(AgentReport::planar("b", "CAR", 10.0, 0.0, 0.0))
            .unwrap();
        registry.remove_all();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, "a");
        assert!(registry.is_empty());
    }
}
