//! Shared state handed to every handler.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use vigil_core::{AgentReport, CollisionTracker};

use crate::simulation::{demo_fleet, SimulationConfig};

/// Cheaply clonable handle to the tracker and demo generator.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    tracker: CollisionTracker,
    simulation: SimulationConfig,
    rng: Mutex<StdRng>,
}

impl AppState {
    /// Wraps a tracker with the given demo settings.
    #[must_use]
    pub fn new(tracker: CollisionTracker, simulation: SimulationConfig) -> Self {
        let rng = Mutex::new(simulation.rng());
        Self {
            inner: Arc::new(AppStateInner {
                tracker,
                simulation,
                rng,
            }),
        }
    }

    /// The collision tracker.
    #[must_use]
    pub fn tracker(&self) -> &CollisionTracker {
        &self.inner.tracker
    }

    /// Draws a fresh demo fleet of the configured size.
    #[must_use]
    pub fn demo_fleet(&self) -> Vec<AgentReport> {
        demo_fleet(self.inner.simulation.device_count, &mut *self.inner.rng.lock())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(CollisionTracker::new(), SimulationConfig::default())
    }
}
