//! # Collision Detection Engine
//!
//! Pairwise stopping-distance check over a registry snapshot.
//!
//! ## Algorithm
//!
//! ```text
//! for each unordered pair (A, B), ordered by id:
//!     d      = separation(A, B)            // mode-dependent metric
//!     v_rel  = |v_A - v_B|
//!     skip if v_A < threshold && v_B < threshold
//!     stop_X = v_rel * t_react + v_rel^2 / (2 * decel_X)
//!     safe   = max(stop_A, stop_B)
//!     risk   = d < safe
//! ```
//!
//! O(n^2) with no spatial index. Values are kept at full precision and
//! rounded to 2 decimals only when a [`Warning`] is emitted.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::error::DetectionError;
use crate::modes::SystemMode;

/// Physics constants used by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Reaction time in seconds before the control-mode multiplier.
    pub base_reaction_time: f64,
    /// Pairs where both speeds are below this are never flagged.
    pub low_speed_threshold: f64,
    /// Linear meters-per-degree factor for OUTDOOR separation.
    pub meters_per_degree: f64,
    /// Deceleration for `BIKE` agents.
    pub bike_deceleration: f64,
    /// Deceleration for every other vehicle tag.
    pub car_deceleration: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            base_reaction_time: 1.0,
            low_speed_threshold: 5.0,
            meters_per_degree: 111_000.0,
            bike_deceleration: 6.0,
            car_deceleration: 7.0,
        }
    }
}

impl PhysicsConfig {
    /// Checks that the constants describe a usable model.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid constant.
    pub fn validate(&self) -> Result<(), String> {
        let checks = [
            ("base_reaction_time", self.base_reaction_time, false),
            ("low_speed_threshold", self.low_speed_threshold, false),
            ("meters_per_degree", self.meters_per_degree, true),
            ("bike_deceleration", self.bike_deceleration, true),
            ("car_deceleration", self.car_deceleration, true),
        ];
        for (name, value, strictly_positive) in checks {
            let ok = value.is_finite() && if strictly_positive { value > 0.0 } else { value >= 0.0 };
            if !ok {
                let bound = if strictly_positive { "> 0" } else { ">= 0" };
                return Err(format!("physics.{name} must be finite and {bound}, got {value}"));
            }
        }
        Ok(())
    }
}

/// Risk classification carried by a warning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskStatus {
    /// The pair is closer than its safe stopping distance.
    Risk,
}

/// One agent's active risk against a specific peer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Warning {
    /// Always [`RiskStatus::Risk`].
    pub status: RiskStatus,
    /// Id of the peer this agent is too close to.
    #[serde(rename = "with")]
    pub peer: String,
    /// Separation distance, rounded to 2 decimals.
    pub distance: f64,
    /// Safe stopping distance, rounded to 2 decimals.
    pub safe_distance: f64,
}

/// Agent id to its (single) active warning. Sorted for stable output.
pub type WarningsSet = BTreeMap<String, Warning>;

/// Full-precision evaluation of one pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PairAssessment {
    /// Separation distance in the active metric.
    pub distance: f64,
    /// Absolute speed difference.
    pub relative_velocity: f64,
    /// Larger of the two stopping distances.
    pub safe_distance: f64,
    /// Both agents were under the low-speed threshold.
    pub low_speed: bool,
}

impl PairAssessment {
    /// Whether this pair produces warnings.
    #[inline]
    #[must_use]
    pub fn at_risk(&self) -> bool {
        !self.low_speed && self.distance < self.safe_distance
    }
}

/// Stateless detector parameterized by [`PhysicsConfig`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DetectionEngine {
    physics: PhysicsConfig,
}

impl DetectionEngine {
    /// Creates an engine with the given constants.
    #[must_use]
    pub const fn new(physics: PhysicsConfig) -> Self {
        Self { physics }
    }

    /// Returns the engine's constants.
    #[must_use]
    pub const fn physics(&self) -> &PhysicsConfig {
        &self.physics
    }

    /// Runs a full pass over `agents`.
    ///
    /// The snapshot is ordered by id first, so the output depends only on
    /// its contents. An agent at risk with several peers keeps the warning
    /// of the last flagged pair in that order.
    ///
    /// # Errors
    ///
    /// Fails the whole pass if any agent taking part in a pair lacks the
    /// coordinates `system_mode` reads.
    pub fn detect(
        &self,
        agents: &[Arc<Agent>],
        system_mode: SystemMode,
        reaction_multiplier: f64,
    ) -> Result<WarningsSet, DetectionError> {
        let mut ordered: Vec<&Agent> = agents.iter().map(AsRef::as_ref).collect();
        ordered.sort_by(|a, b| a.id.cmp(&b.id));

        let mut warnings = WarningsSet::new();
        for (i, a) in ordered.iter().enumerate() {
            for b in &ordered[i + 1..] {
                let assessment = self.assess(a, b, system_mode, reaction_multiplier)?;
                if !assessment.at_risk() {
                    continue;
                }

                let distance = round2(assessment.distance);
                let safe_distance = round2(assessment.safe_distance);
                warnings.insert(a.id.clone(), warning(&b.id, distance, safe_distance));
                warnings.insert(b.id.clone(), warning(&a.id, distance, safe_distance));
            }
        }

        tracing::trace!(
            agents = ordered.len(),
            warnings = warnings.len(),
            mode = %system_mode,
            "detection pass complete"
        );
        Ok(warnings)
    }

    /// Evaluates a single pair at full precision.
    ///
    /// Separation is computed before the low-speed check, so an incomplete
    /// agent is reported even when the pair would be skipped.
    ///
    /// # Errors
    ///
    /// Returns [`DetectionError::MissingCoordinates`] for an agent lacking
    /// the active mode's coordinates.
    pub fn assess(
        &self,
        a: &Agent,
        b: &Agent,
        system_mode: SystemMode,
        reaction_multiplier: f64,
    ) -> Result<PairAssessment, DetectionError> {
        let distance = self.separation(a, b, system_mode)?;
        let relative_velocity = (a.velocity - b.velocity).abs();
        let low_speed = a.velocity < self.physics.low_speed_threshold
            && b.velocity < self.physics.low_speed_threshold;

        let reaction_time = self.physics.base_reaction_time * reaction_multiplier;
        let safe_distance = self
            .stopping_distance(relative_velocity, reaction_time, a)
            .max(self.stopping_distance(relative_velocity, reaction_time, b));

        Ok(PairAssessment {
            distance,
            relative_velocity,
            safe_distance,
            low_speed,
        })
    }

    /// Distance between two agents under `system_mode`.
    ///
    /// OUTDOOR uses a flat small-angle approximation: degree deltas scaled
    /// linearly by `meters_per_degree`. Only valid at local scale.
    ///
    /// # Errors
    ///
    /// Returns [`DetectionError::MissingCoordinates`] if either agent lacks
    /// the pair the mode reads.
    pub fn separation(
        &self,
        a: &Agent,
        b: &Agent,
        system_mode: SystemMode,
    ) -> Result<f64, DetectionError> {
        match system_mode {
            SystemMode::Indoor => {
                let pa = a.planar.ok_or_else(|| missing(a, system_mode))?;
                let pb = b.planar.ok_or_else(|| missing(b, system_mode))?;
                Ok(planar_distance(pa.x - pb.x, pa.y - pb.y))
            }
            SystemMode::Outdoor => {
                let ga = a.geo.ok_or_else(|| missing(a, system_mode))?;
                let gb = b.geo.ok_or_else(|| missing(b, system_mode))?;
                Ok(planar_distance(ga.lat - gb.lat, ga.lng - gb.lng) * self.physics.meters_per_degree)
            }
        }
    }

    /// Reaction distance plus braking distance for `agent`'s vehicle type.
    fn stopping_distance(&self, relative_velocity: f64, reaction_time: f64, agent: &Agent) -> f64 {
        let deceleration = if agent.vehicle_type.is_bike() {
            self.physics.bike_deceleration
        } else {
            self.physics.car_deceleration
        };
        relative_velocity * reaction_time
            + relative_velocity * relative_velocity / (2.0 * deceleration)
    }
}

fn missing(agent: &Agent, mode: SystemMode) -> DetectionError {
    DetectionError::MissingCoordinates {
        agent_id: agent.id.clone(),
        mode,
    }
}

fn warning(peer: &str, distance: f64, safe_distance: f64) -> Warning {
    Warning {
        status: RiskStatus::Risk,
        peer: peer.to_owned(),
        distance,
        safe_distance,
    }
}

/// Plain `sqrt(dx² + dy²)`, not `hypot`: the two can differ in the last
/// bit, which matters for `distance < safe` at the boundary.
#[inline]
fn planar_distance(dx: f64, dy: f64) -> f64 {
    (dx * dx + dy * dy).sqrt()
}

/// Rounds half away from zero to 2 decimals.
#[inline]
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
