//! # Demo Fleet
//!
//! Random agents for demos and dashboard smoke tests. Every generated agent
//! carries both coordinate pairs, so the fleet works in either system mode.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use vigil_core::AgentReport;

const VEHICLE_TYPES: [&str; 2] = ["CAR", "BIKE"];

/// `[simulation]` section.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Agents created per injection.
    pub device_count: usize,
    /// Fixed RNG seed; entropy-seeded when absent.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            device_count: 5,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Builds the RNG described by this configuration.
    #[must_use]
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Generates `count` demo agents named `device_1..=count`.
///
/// Speeds are whole numbers in `10..70`, planar coordinates whole numbers
/// in `0..200`, geographic coordinates within 0.01° of (12.9, 77.5).
pub fn demo_fleet<R: Rng>(count: usize, rng: &mut R) -> Vec<AgentReport> {
    (1..=count)
        .map(|i| {
            let vehicle_type = VEHICLE_TYPES[rng.gen_range(0..VEHICLE_TYPES.len())];
            let velocity = f64::from(rng.gen_range(10u32..70));
            let x = f64::from(rng.gen_range(0u32..200));
            let y = f64::from(rng.gen_range(0u32..200));
            let lat = 12.9 + rng.gen::<f64>() * 0.01;
            let lng = 77.5 + rng.gen::<f64>() * 0.01;

            AgentReport::planar(&format!("device_{i}"), vehicle_type, velocity, x, y)
                .with_geo(lat, lng)
        })
        .collect()
}
