//! # Core Error Types
//!
//! All errors that can occur in the registry, engine, and tracker.

use thiserror::Error;

use crate::modes::SystemMode;

/// A submitted agent record was rejected at ingestion.
///
/// The registry is left unchanged when this is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A required field was absent.
    #[error("missing required field: {field}")]
    MissingField {
        /// Wire name of the field.
        field: &'static str,
    },

    /// The agent id was present but empty.
    #[error("agent id must not be empty")]
    EmptyId,

    /// A numeric field was NaN or infinite.
    #[error("field {field} must be a finite number, got {value}")]
    InvalidNumber {
        /// Wire name of the field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// Speed must be non-negative.
    #[error("velocity must be non-negative, got {value}")]
    NegativeVelocity {
        /// The rejected value.
        value: f64,
    },

    /// Only one half of a coordinate pair was supplied.
    #[error("incomplete coordinates: {present} given without {missing}")]
    IncompleteCoordinates {
        /// The field that was supplied.
        present: &'static str,
        /// Its missing partner.
        missing: &'static str,
    },

    /// Neither `x`/`y` nor `lat`/`lng` was supplied.
    #[error("agent must carry x/y or lat/lng coordinates")]
    NoPosition,
}

/// The engine could not evaluate the current snapshot.
///
/// Indicates a stored agent is incomplete for the active system mode.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectionError {
    /// A stored agent lacks the coordinate pair the active mode reads.
    #[error("agent {agent_id} has no {mode} coordinates")]
    MissingCoordinates {
        /// The incomplete agent.
        agent_id: String,
        /// The mode that was active during the pass.
        mode: SystemMode,
    },
}

/// Errors surfaced by [`crate::CollisionTracker`] operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackerError {
    /// Ingestion rejected the record.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The recompute after a mutation failed; the mutation stays applied.
    #[error(transparent)]
    Detection(#[from] DetectionError),
}

/// Result type for tracker operations.
pub type VigilResult<T> = Result<T, TrackerError>;
