//! # Agent Records
//!
//! [`AgentReport`] is what a client submits; [`Agent`] is what the registry
//! stores. Conversion validates the report, so every stored agent carries an
//! id, a speed, a vehicle type, and at least one complete coordinate pair.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;
use crate::modes::SystemMode;

/// Planar coordinates, used in [`SystemMode::Indoor`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanarPosition {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

/// Geographic coordinates in degrees, used in [`SystemMode::Outdoor`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPosition {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

/// Categorical vehicle tag.
///
/// Only `"BIKE"` (exact match) changes the physics. Every other tag,
/// including unknown ones, brakes like a car. The raw tag is kept so it
/// round-trips to readers unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum VehicleType {
    /// Two-wheeler; lower deceleration.
    Bike,
    /// Passenger car.
    Car,
    /// Any other tag.
    Other(String),
}

impl VehicleType {
    /// Wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Bike => "BIKE",
            Self::Car => "CAR",
            Self::Other(tag) => tag,
        }
    }

    /// Whether this tag selects the bike deceleration constant.
    #[inline]
    #[must_use]
    pub fn is_bike(&self) -> bool {
        matches!(self, Self::Bike)
    }
}

impl From<&str> for VehicleType {
    fn from(tag: &str) -> Self {
        match tag {
            "BIKE" => Self::Bike,
            "CAR" => Self::Car,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for VehicleType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for VehicleType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::from(tag.as_str()))
    }
}

/// Raw telemetry report as submitted by a client.
///
/// Every field is optional here so that ingestion can name exactly which
/// one is missing. Unknown fields (including a client `timestamp`) are
/// ignored.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct AgentReport {
    /// Client-chosen unique key.
    pub id: Option<String>,
    /// Vehicle tag.
    pub vehicle_type: Option<String>,
    /// Scalar speed.
    pub velocity: Option<f64>,
    /// Planar X.
    pub x: Option<f64>,
    /// Planar Y.
    pub y: Option<f64>,
    /// Latitude.
    pub lat: Option<f64>,
    /// Longitude.
    pub lng: Option<f64>,
}

impl AgentReport {
    /// Report with planar coordinates only.
    #[must_use]
    pub fn planar(id: &str, vehicle_type: &str, velocity: f64, x: f64, y: f64) -> Self {
        Self {
            id: Some(id.to_owned()),
            vehicle_type: Some(vehicle_type.to_owned()),
            velocity: Some(velocity),
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Report with geographic coordinates only.
    #[must_use]
    pub fn geo(id: &str, vehicle_type: &str, velocity: f64, lat: f64, lng: f64) -> Self {
        Self {
            id: Some(id.to_owned()),
            vehicle_type: Some(vehicle_type.to_owned()),
            velocity: Some(velocity),
            lat: Some(lat),
            lng: Some(lng),
            ..Self::default()
        }
    }

    /// Adds geographic coordinates to a report.
    #[must_use]
    pub fn with_geo(mut self, lat: f64, lng: f64) -> Self {
        self.lat = Some(lat);
        self.lng = Some(lng);
        self
    }

    /// Validates the report and stamps it with `last_update_time`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the first offending field.
    pub fn into_agent(self, last_update_time: u64) -> Result<Agent, ValidationError> {
        let id = self.id.ok_or(ValidationError::MissingField { field: "id" })?;
        if id.is_empty() {
            return Err(ValidationError::EmptyId);
        }

        let vehicle_type = self
            .vehicle_type
            .ok_or(ValidationError::MissingField { field: "vehicle_type" })?;

        let velocity = finite(
            "velocity",
            self.velocity.ok_or(ValidationError::MissingField { field: "velocity" })?,
        )?;
        if velocity < 0.0 {
            return Err(ValidationError::NegativeVelocity { value: velocity });
        }

        let planar = pair(("x", self.x), ("y", self.y))?
            .map(|(x, y)| PlanarPosition { x, y });
        let geo = pair(("lat", self.lat), ("lng", self.lng))?
            .map(|(lat, lng)| GeoPosition { lat, lng });

        if planar.is_none() && geo.is_none() {
            return Err(ValidationError::NoPosition);
        }

        Ok(Agent {
            id,
            vehicle_type: VehicleType::from(vehicle_type.as_str()),
            velocity,
            planar,
            geo,
            last_update_time,
        })
    }
}

fn finite(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::InvalidNumber { field, value })
    }
}

fn pair(
    (first_name, first): (&'static str, Option<f64>),
    (second_name, second): (&'static str, Option<f64>),
) -> Result<Option<(f64, f64)>, ValidationError> {
    match (first, second) {
        (Some(a), Some(b)) => Ok(Some((finite(first_name, a)?, finite(second_name, b)?))),
        (None, None) => Ok(None),
        (Some(_), None) => Err(ValidationError::IncompleteCoordinates {
            present: first_name,
            missing: second_name,
        }),
        (None, Some(_)) => Err(ValidationError::IncompleteCoordinates {
            present: second_name,
            missing: first_name,
        }),
    }
}

/// Latest known state of one tracked device.
///
/// Immutable once stored; a new report replaces the whole record.
#[derive(Clone, Debug, PartialEq)]
pub struct Agent {
    /// Unique key.
    pub id: String,
    /// Vehicle tag.
    pub vehicle_type: VehicleType,
    /// Non-negative scalar speed.
    pub velocity: f64,
    /// Planar coordinates, if reported.
    pub planar: Option<PlanarPosition>,
    /// Geographic coordinates, if reported.
    pub geo: Option<GeoPosition>,
    /// Registry acceptance time, milliseconds since the Unix epoch.
    pub last_update_time: u64,
}

impl Agent {
    /// Whether the agent carries the coordinates `mode` reads.
    #[must_use]
    pub fn has_position_for(&self, mode: SystemMode) -> bool {
        match mode {
            SystemMode::Indoor => self.planar.is_some(),
            SystemMode::Outdoor => self.geo.is_some(),
        }
    }
}

/// Flat wire shape of a stored agent.
#[derive(Serialize)]
struct AgentWire<'a> {
    id: &'a str,
    vehicle_type: &'a VehicleType,
    velocity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lng: Option<f64>,
    timestamp: u64,
}

impl Serialize for Agent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        AgentWire {
            id: &self.id,
            vehicle_type: &self.vehicle_type,
            velocity: self.velocity,
            x: self.planar.map(|p| p.x),
            y: self.planar.map(|p| p.y),
            lat: self.geo.map(|g| g.lat),
            lng: self.geo.map(|g| g.lng),
            timestamp: self.last_update_time,
        }
        .serialize(serializer)
    }
}
