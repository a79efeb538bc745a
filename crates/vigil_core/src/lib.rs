//! # VIGIL Core
//!
//! State registry and collision-detection engine for mobile agents that
//! report position and speed.
//!
//! ## Architecture
//!
//! ```text
//!  ┌────────────────┐   ┌────────────────┐
//!  │ DeviceRegistry │   │ ModeController │
//!  └───────┬────────┘   └───────┬────────┘
//!          │ snapshot           │ system mode, reaction multiplier
//!          └─────────┬──────────┘
//!                    ▼
//!          ┌───────────────────┐
//!          │  DetectionEngine  │  O(n²) stopping-distance check
//!          └─────────┬─────────┘
//!                    ▼
//!          ┌───────────────────┐
//!          │ WarningsPublisher │  atomic Arc swap, readers never block writers
//!          └───────────────────┘
//! ```
//!
//! [`CollisionTracker`] owns all four and re-runs detection after every
//! mutation (agent update, mode change, reset).
//!
//! ## Example
//!
//! ```rust
//! use vigil_core::{AgentReport, CollisionTracker};
//!
//! let tracker = CollisionTracker::new();
//! tracker.ingest_agent(AgentReport::planar("A", "CAR", 20.0, 0.0, 0.0)).unwrap();
//! tracker.ingest_agent(AgentReport::planar("B", "CAR", 0.0, 10.0, 0.0)).unwrap();
//!
//! let view = tracker.current_warnings();
//! assert_eq!(view.count, 2);
//! assert_eq!(view.warnings["A"].safe_distance, 48.57);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod agent;
pub mod detection;
pub mod error;
pub mod modes;
pub mod publisher;
pub mod registry;
pub mod tracker;

pub use agent::{Agent, AgentReport, GeoPosition, PlanarPosition, VehicleType};
pub use detection::{DetectionEngine, PairAssessment, PhysicsConfig, RiskStatus, Warning, WarningsSet};
pub use error::{DetectionError, TrackerError, ValidationError, VigilResult};
pub use modes::{ControlMode, ModeController, SystemMode};
pub use publisher::WarningsPublisher;
pub use registry::DeviceRegistry;
pub use tracker::{AppliedModes, CollisionTracker, IngestOutcome, StatusSnapshot, WarningsView};
