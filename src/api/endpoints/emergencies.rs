//! Emergency dashboards and staff assignment.
//!
//! - `GET  /api/emergencies[?doctorId=]`: newest first
//! - `POST /api/emergencies/assign`: manual override
//! - `POST /api/emergencies/route-pending`: sweep unassigned emergencies

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::dashboard;
use crate::models::Emergency;
use crate::routing::SweepEntry;

#[derive(Deserialize)]
pub struct EmergencyListQuery {
    #[serde(rename = "doctorId")]
    pub doctor_id: Option<String>,
}

pub async fn list(
    State(ctx): State<ApiContext>,
    query: Result<Query<EmergencyListQuery>, QueryRejection>,
) -> Result<Json<Vec<Emergency>>, ApiError> {
    let Query(query) = query?;
    let doctor_id = query
        .doctor_id
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_id(&s, "doctorId"))
        .transpose()?;

    let emergencies = ctx
        .with_db(move |_, conn| Ok(dashboard::list_emergencies(conn, doctor_id.as_ref())?))
        .await?;
    Ok(Json(emergencies))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualAssignRequest {
    pub emergency_id: Option<String>,
    pub doctor_id: Option<String>,
}

#[derive(Serialize)]
pub struct ManualAssignResponse {
    pub success: bool,
    pub emergency: Emergency,
}

pub async fn assign(
    State(ctx): State<ApiContext>,
    payload: Result<Json<ManualAssignRequest>, JsonRejection>,
) -> Result<Json<ManualAssignResponse>, ApiError> {
    let Json(request) = payload?;
    let emergency_id = required_id(request.emergency_id, "emergencyId")?;
    let doctor_id = required_id(request.doctor_id, "doctorId")?;

    let emergency = ctx
        .with_db(move |_, conn| Ok(dashboard::manual_assign(conn, &emergency_id, &doctor_id)?))
        .await?;
    Ok(Json(ManualAssignResponse {
        success: true,
        emergency,
    }))
}

#[derive(Serialize)]
pub struct SweepResponse {
    pub processed: usize,
    pub results: Vec<SweepEntry>,
}

pub async fn route_pending(State(ctx): State<ApiContext>) -> Result<Json<SweepResponse>, ApiError> {
    let results = ctx
        .with_db(|ctx, conn| Ok(ctx.route_pending(conn)?))
        .await?;
    Ok(Json(SweepResponse {
        processed: results.len(),
        results,
    }))
}

pub(crate) fn parse_id(raw: &str, field: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::BadRequest(format!("Invalid {field}")))
}

pub(crate) fn required_id(raw: Option<String>, field: &str) -> Result<Uuid, ApiError> {
    match raw.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => parse_id(s, field),
        _ => Err(ApiError::BadRequest(format!("Missing {field}"))),
    }
}
