//! # Collision Tracker
//!
//! The context object that ties the registry, modes, engine and publisher
//! together. Every mutating operation ends with a recompute:
//!
//! ```text
//! mutate ──► bump epoch ──► snapshot(registry, modes) ──► detect ──► publish_at(epoch)
//! ```
//!
//! Readers only ever see the publisher's current snapshot; they never
//! trigger detection.
//!
//! ## Consistency
//!
//! Mutations do not hold a lock across the recompute, so two racing
//! requests may each publish a snapshot that includes the other's change.
//! The epoch check in the publisher keeps the published view monotonic:
//! once every in-flight mutation returns, the published warnings reflect
//! all of them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::agent::{Agent, AgentReport};
use crate::detection::{DetectionEngine, PhysicsConfig, Warning, WarningsSet};
use crate::error::{DetectionError, VigilResult};
use crate::modes::{ControlMode, ModeController, SystemMode};
use crate::publisher::WarningsPublisher;
use crate::registry::DeviceRegistry;

/// Result of a successful ingestion.
#[derive(Clone, Debug)]
pub struct IngestOutcome {
    /// The stored record.
    pub agent: Arc<Agent>,
    /// The published warning for this agent after the recompute, if any.
    pub warning: Option<Warning>,
}

/// Mode settings in effect after a mode change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AppliedModes {
    /// Active distance metric.
    pub system_mode: SystemMode,
    /// Active control mode.
    pub control_mode: ControlMode,
}

/// Published warnings with their count.
#[derive(Clone, Debug)]
pub struct WarningsView {
    /// The current snapshot.
    pub warnings: Arc<WarningsSet>,
    /// Number of agents with an active warning.
    pub count: usize,
}

/// Summary for health/status readers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    /// Active distance metric.
    pub system_mode: SystemMode,
    /// Active control mode.
    pub control_mode: ControlMode,
    /// Number of stored agents.
    pub agent_count: usize,
    /// Number of agents with an active warning.
    pub active_warning_count: usize,
}

/// Owner of all collision-tracking state.
pub struct CollisionTracker {
    registry: DeviceRegistry,
    modes: ModeController,
    engine: DetectionEngine,
    publisher: WarningsPublisher,
    epoch: AtomicU64,
}

impl CollisionTracker {
    /// Creates a tracker with default physics and modes.
    #[must_use]
    pub fn new() -> Self {
        Self::with_parts(
            DeviceRegistry::new(),
            ModeController::default(),
            DetectionEngine::default(),
        )
    }

    /// Creates a tracker with the given physics and initial modes.
    #[must_use]
    pub fn with_config(
        physics: PhysicsConfig,
        system_mode: SystemMode,
        control_mode: ControlMode,
    ) -> Self {
        Self::with_parts(
            DeviceRegistry::new(),
            ModeController::new(system_mode, control_mode),
            DetectionEngine::new(physics),
        )
    }

    /// Creates a tracker from pre-built components.
    #[must_use]
    pub fn with_parts(
        registry: DeviceRegistry,
        modes: ModeController,
        engine: DetectionEngine,
    ) -> Self {
        Self {
            registry,
            modes,
            engine,
            publisher: WarningsPublisher::new(),
            epoch: AtomicU64::new(0),
        }
    }

    /// Validates and stores a report, then recomputes warnings.
    ///
    /// # Errors
    ///
    /// - [`crate::TrackerError::Validation`]: nothing was stored.
    /// - [`crate::TrackerError::Detection`]: the agent was stored but the
    ///   previous warnings stay published.
    pub fn ingest_agent(&self, report: AgentReport) -> VigilResult<IngestOutcome> {
        let agent = self.registry.upsert(report)?;
        tracing::debug!(
            agent_id = %agent.id,
            vehicle = %agent.vehicle_type,
            velocity = agent.velocity,
            "agent updated"
        );

        self.recompute()?;
        let warning = self.warning_for(&agent.id);
        if let Some(w) = &warning {
            tracing::info!(
                agent_id = %agent.id,
                with = %w.peer,
                distance = w.distance,
                safe_distance = w.safe_distance,
                "collision risk"
            );
        }
        Ok(IngestOutcome { agent, warning })
    }

    /// Point-in-time list of stored agents.
    #[must_use]
    pub fn list_agents(&self) -> Vec<Arc<Agent>> {
        self.registry.all_agents()
    }

    /// Current record for `id`.
    #[must_use]
    pub fn agent(&self, id: &str) -> Option<Arc<Agent>> {
        self.registry.get(id)
    }

    /// Currently published warnings.
    #[must_use]
    pub fn current_warnings(&self) -> WarningsView {
        let warnings = self.publisher.current();
        let count = warnings.len();
        WarningsView { warnings, count }
    }

    /// Published warning for a single agent.
    #[must_use]
    pub fn warning_for(&self, id: &str) -> Option<Warning> {
        self.publisher.current().get(id).cloned()
    }

    /// Applies whichever modes are given and recognized, then recomputes.
    ///
    /// Unrecognized values are ignored. The returned modes are the ones in
    /// effect after the change.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TrackerError::Detection`] if a stored agent lacks
    /// the coordinates of the (new) system mode. The modes stay applied.
    pub fn set_modes(
        &self,
        system_mode: Option<&str>,
        control_mode: Option<&str>,
    ) -> VigilResult<AppliedModes> {
        if let Some(value) = system_mode {
            self.modes.set_system_mode(value);
        }
        if let Some(value) = control_mode {
            self.modes.set_control_mode(value);
        }

        let applied = AppliedModes {
            system_mode: self.modes.current_system_mode(),
            control_mode: self.modes.current_control_mode(),
        };
        tracing::info!(
            system_mode = %applied.system_mode,
            control_mode = %applied.control_mode,
            "modes updated"
        );

        self.recompute()?;
        Ok(applied)
    }

    /// Clears every agent and all warnings.
    ///
    /// Ends with a detection pass like every other mutation, so agents
    /// stored by a racing ingest are evaluated rather than masked.
    pub fn reset_all(&self) {
        self.registry.remove_all();
        tracing::info!("registry cleared");

        if let Err(err) = self.recompute() {
            // Only reachable if a racing ingest stored an agent the active
            // mode cannot evaluate; recompute already logged it.
            tracing::warn!(error = %err, "warnings not refreshed after reset");
        }
    }

    /// Replaces the registry contents with `reports` and recomputes once.
    ///
    /// Reports are validated up front; if any is invalid nothing changes.
    ///
    /// # Errors
    ///
    /// Returns the first validation error, or a detection error after the
    /// new agents were stored.
    pub fn replace_all(&self, reports: Vec<AgentReport>) -> VigilResult<usize> {
        let agents = reports
            .into_iter()
            .map(|report| self.registry.prepare(report))
            .collect::<Result<Vec<_>, _>>()?;

        let count = self.registry.replace_all(agents);
        tracing::info!(agents = count, "registry replaced");

        self.recompute()?;
        Ok(count)
    }

    /// Health/status summary.
    #[must_use]
    pub fn status_snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            system_mode: self.modes.current_system_mode(),
            control_mode: self.modes.current_control_mode(),
            agent_count: self.registry.len(),
            active_warning_count: self.publisher.current().len(),
        }
    }

    /// Mode controller.
    #[must_use]
    pub const fn modes(&self) -> &ModeController {
        &self.modes
    }

    /// Detection engine.
    #[must_use]
    pub const fn engine(&self) -> &DetectionEngine {
        &self.engine
    }

    /// Runs detection over the current registry and modes and publishes
    /// the result.
    ///
    /// # Errors
    ///
    /// Returns the engine's error; nothing is published in that case.
    pub fn recompute(&self) -> Result<(), DetectionError> {
        let epoch = self.bump_epoch();
        let agents = self.registry.all_agents();
        let system_mode = self.modes.current_system_mode();
        let multiplier = self.modes.reaction_time_multiplier();

        match self.engine.detect(&agents, system_mode, multiplier) {
            Ok(warnings) => {
                let count = warnings.len();
                if self.publisher.publish_at(epoch, warnings) {
                    tracing::debug!(epoch, agents = agents.len(), warnings = count, "warnings published");
                }
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, epoch, "detection pass failed, keeping previous warnings");
                Err(err)
            }
        }
    }

    /// Advances the state epoch; must be called after the mutation it
    /// covers has been applied.
    fn bump_epoch(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::AcqRel) + 1
    }
}

impl Default for CollisionTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackerError;

    #[test]
    fn test_ingest_publishes_symmetric_warnings() {
        let tracker = CollisionTracker::new();
        let first = tracker
            .ingest_agent(AgentReport::planar("A", "CAR", 20.0, 0.0, 0.0))
            .unwrap();
        assert!(first.warning.is_none());

        let second = tracker
            .ingest_agent(AgentReport::planar("B", "CAR", 0.0, 10.0, 0.0))
            .unwrap();
        let warning = second.warning.unwrap();
        assert_eq!(warning.peer, "A");
        assert_eq!(warning.distance, 10.0);
        assert_eq!(warning.safe_distance, 48.57);

        let view = tracker.current_warnings();
        assert_eq!(view.count, 2);
        assert_eq!(view.warnings["A"].peer, "B");
        assert_eq!(view.warnings["A"].distance, view.warnings["B"].distance);
        assert_eq!(view.warnings["A"].safe_distance, view.warnings["B"].safe_distance);
    }

    #[test]
    fn test_invalid_report_changes_nothing() {
        let tracker = CollisionTracker::new();
        let mut report = AgentReport::planar("A", "CAR", 20.0, 0.0, 0.0);
        report.velocity = None;

        let err = tracker.ingest_agent(report).unwrap_err();
        assert!(matches!(err, TrackerError::Validation(_)));
        assert!(tracker.list_agents().is_empty());
    }

    #[test]
    fn test_mode_change_recomputes() {
        let tracker = CollisionTracker::new();
        tracker
            .ingest_agent(AgentReport::planar("A", "CAR", 20.0, 0.0, 0.0))
            .unwrap();
        tracker
            .ingest_agent(AgentReport::planar("B", "CAR", 0.0, 40.0, 0.0))
            .unwrap();
        assert_eq!(tracker.current_warnings().count, 2);

        let applied = tracker.set_modes(None, Some("autonomous")).unwrap();
        assert_eq!(applied.control_mode, ControlMode::Autonomous);
        assert_eq!(applied.system_mode, SystemMode::Indoor);
        assert_eq!(tracker.current_warnings().count, 0);
    }

    #[test]
    fn test_unknown_modes_ignored() {
        let tracker = CollisionTracker::new();
        let applied = tracker.set_modes(Some("sideways"), Some("psychic")).unwrap();
        assert_eq!(
            applied,
            AppliedModes {
                system_mode: SystemMode::Indoor,
                control_mode: ControlMode::Human,
            }
        );
    }

    #[test]
    fn test_mode_switch_to_missing_metric_keeps_old_warnings() {
        let tracker = CollisionTracker::new();
        tracker
            .ingest_agent(AgentReport::planar("A", "CAR", 20.0, 0.0, 0.0))
            .unwrap();
        tracker
            .ingest_agent(AgentReport::planar("B", "CAR", 0.0, 10.0, 0.0))
            .unwrap();

        let err = tracker.set_modes(Some("OUTDOOR"), None).unwrap_err();
        assert!(matches!(err, TrackerError::Detection(_)));

        // Mode stays applied; the last good snapshot stays published.
        assert_eq!(tracker.modes().current_system_mode(), SystemMode::Outdoor);
        assert_eq!(tracker.current_warnings().count, 2);
    }

    #[test]
    fn test_reset_all() {
        let tracker = CollisionTracker::new();
        tracker
            .ingest_agent(AgentReport::planar("A", "CAR", 20.0, 0.0, 0.0))
            .unwrap();
        tracker
            .ingest_agent(AgentReport::planar("B", "CAR", 0.0, 10.0, 0.0))
            .unwrap();

        tracker.reset_all();
        assert!(tracker.list_agents().is_empty());
        assert_eq!(tracker.current_warnings().count, 0);

        tracker.reset_all();
        assert!(tracker.list_agents().is_empty());
        assert!(tracker.current_warnings().warnings.is_empty());
    }

    #[test]
    fn test_replace_all_is_all_or_nothing() {
        let tracker = CollisionTracker::new();
        tracker
            .ingest_agent(AgentReport::planar("keep", "CAR", 1.0, 0.0, 0.0))
            .unwrap();

        let mut bad = AgentReport::planar("x", "CAR", 1.0, 0.0, 0.0);
        bad.x = None;
        let result = tracker.replace_all(vec![AgentReport::planar("y", "CAR", 1.0, 0.0, 0.0), bad]);
        assert!(result.is_err());
        assert!(tracker.agent("keep").is_some());

        let count = tracker
            .replace_all(vec![
                AgentReport::planar("y", "CAR", 30.0, 0.0, 0.0),
                AgentReport::planar("z", "BIKE", 0.0, 1.0, 0.0),
            ])
            .unwrap();
        assert_eq!(count, 2);
        assert!(tracker.agent("keep").is_none());
        assert_eq!(tracker.current_warnings().count, 2);
    }

    #[test]
    fn test_status_snapshot() {
        let tracker = CollisionTracker::with_config(
            PhysicsConfig::default(),
            SystemMode::Outdoor,
            ControlMode::Adas,
        );
        tracker
            .ingest_agent(AgentReport::geo("A", "CAR", 40.0, 12.9, 77.5))
            .unwrap();
        tracker
            .ingest_agent(AgentReport::geo("B", "CAR", 10.0, 12.9, 77.5))
            .unwrap();

        let status = tracker.status_snapshot();
        assert_eq!(status.system_mode, SystemMode::Outdoor);
        assert_eq!(status.control_mode, ControlMode::Adas);
        assert_eq!(status.agent_count, 2);
        assert_eq!(status.active_warning_count, 2);
    }
}
