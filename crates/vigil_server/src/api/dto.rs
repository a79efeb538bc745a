//! Request and response bodies.
//!
//! Field names are part of the dashboard contract and must not change.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use vigil_core::{Agent, ControlMode, SystemMode, Warning, WarningsSet};

/// `POST /api/mode` body. Both fields optional, case-insensitive.
#[derive(Debug, Default, Deserialize)]
pub struct ModeRequest {
    /// `INDOOR` or `OUTDOOR`.
    pub system_mode: Option<String>,
    /// `HUMAN`, `ADAS` or `AUTONOMOUS`.
    pub control_mode: Option<String>,
}

/// `POST /api/update` response.
#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    /// Always `"ok"`.
    pub status: &'static str,
    /// This agent's active warning, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<Warning>,
}

/// `GET /api/devices` response.
#[derive(Debug, Serialize)]
pub struct DevicesResponse {
    /// Every stored agent.
    pub devices: Vec<Arc<Agent>>,
    /// Number of stored agents.
    pub count: usize,
}

/// `GET /api/warnings` response.
#[derive(Debug, Serialize)]
pub struct WarningsResponse {
    /// Agent id to warning.
    pub warnings: Arc<WarningsSet>,
    /// Number of agents at risk.
    pub risk_count: usize,
}

/// `POST /api/mode` response.
#[derive(Debug, Serialize)]
pub struct ModeResponse {
    /// Distance metric now in effect.
    pub system_mode: SystemMode,
    /// Control mode now in effect.
    pub control_mode: ControlMode,
}

/// `GET /api/status` response.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Always `"running"`.
    pub server: &'static str,
    /// Active distance metric.
    pub system_mode: SystemMode,
    /// Active control mode.
    pub control_mode: ControlMode,
    /// Number of stored agents.
    pub device_count: usize,
    /// Number of agents at risk.
    pub active_warnings: usize,
}

/// `POST /api/simulate` response.
#[derive(Debug, Serialize)]
pub struct SimulateResponse {
    /// Always `"simulated"`.
    pub status: &'static str,
    /// Number of agents now stored.
    pub devices_created: usize,
    /// Warnings after the injection.
    pub warnings: Arc<WarningsSet>,
}

/// `/api/clear` response.
#[derive(Debug, Serialize)]
pub struct ClearResponse {
    /// Always `"cleared"`.
    pub status: &'static str,
}
