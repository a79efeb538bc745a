//! Axum request handlers.
//!
//! Handlers are thin: decode, call one tracker operation, encode. Bodies are
//! read as raw bytes and decoded with `serde_json`, so reporters that omit
//! the `Content-Type` header are still accepted.

use axum::{body::Bytes, extract::State, Json};
use vigil_core::AgentReport;

use super::dto::{
    ClearResponse, DevicesResponse, ModeRequest, ModeResponse, SimulateResponse, StatusResponse,
    UpdateResponse, WarningsResponse,
};
use super::error::ApiResult;
use super::state::AppState;

/// `POST /api/update` - store one agent report and return its warning.
#[tracing::instrument(skip(state, body))]
pub async fn update_agent(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<UpdateResponse>> {
    let report: AgentReport = serde_json::from_slice(&body)?;
    let outcome = state.tracker().ingest_agent(report)?;

    Ok(Json(UpdateResponse {
        status: "ok",
        warning: outcome.warning,
    }))
}

/// `GET /api/devices` - every stored agent.
#[tracing::instrument(skip(state))]
pub async fn list_devices(State(state): State<AppState>) -> Json<DevicesResponse> {
    let devices = state.tracker().list_agents();
    let count = devices.len();
    Json(DevicesResponse { devices, count })
}

/// `GET /api/warnings` - the published warnings snapshot.
#[tracing::instrument(skip(state))]
pub async fn list_warnings(State(state): State<AppState>) -> Json<WarningsResponse> {
    let view = state.tracker().current_warnings();
    Json(WarningsResponse {
        warnings: view.warnings,
        risk_count: view.count,
    })
}

/// `POST /api/mode` - change system and/or control mode.
#[tracing::instrument(skip(state, body))]
pub async fn set_mode(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<ModeResponse>> {
    let request: ModeRequest = serde_json::from_slice(&body)?;
    let applied = state
        .tracker()
        .set_modes(request.system_mode.as_deref(), request.control_mode.as_deref())?;

    Ok(Json(ModeResponse {
        system_mode: applied.system_mode,
        control_mode: applied.control_mode,
    }))
}

/// `GET /api/status` - health and counters.
#[tracing::instrument(skip(state))]
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let snapshot = state.tracker().status_snapshot();
    Json(StatusResponse {
        server: "running",
        system_mode: snapshot.system_mode,
        control_mode: snapshot.control_mode,
        device_count: snapshot.agent_count,
        active_warnings: snapshot.active_warning_count,
    })
}

/// `POST /api/simulate` - replace all agents with a random demo fleet.
#[tracing::instrument(skip(state))]
pub async fn simulate(State(state): State<AppState>) -> ApiResult<Json<SimulateResponse>> {
    let fleet = state.demo_fleet();
    let devices_created = state.tracker().replace_all(fleet)?;

    Ok(Json(SimulateResponse {
        status: "simulated",
        devices_created,
        warnings: state.tracker().current_warnings().warnings,
    }))
}

/// `POST|DELETE /api/clear` - drop all agents and warnings.
#[tracing::instrument(skip(state))]
pub async fn clear(State(state): State<AppState>) -> Json<ClearResponse> {
    state.tracker().reset_all();
    Json(ClearResponse { status: "cleared" })
}
