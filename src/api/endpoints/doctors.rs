//! Doctor listing and availability.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use super::emergencies::parse_id;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::dashboard;
use crate::models::Doctor;

/// `GET /api/doctors`
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<Doctor>>, ApiError> {
    let doctors = ctx
        .with_db(|_, conn| Ok(dashboard::list_doctors(conn)?))
        .await?;
    Ok(Json(doctors))
}

#[derive(Deserialize)]
pub struct AvailabilityRequest {
    pub online: bool,
}

/// `PUT /api/doctors/:id/availability`
pub async fn set_availability(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    payload: Result<Json<AvailabilityRequest>, JsonRejection>,
) -> Result<Json<Doctor>, ApiError> {
    let doctor_id = parse_id(&id, "doctor id")?;
    let Json(request) = payload?;

    let doctor = ctx
        .with_db(move |_, conn| Ok(dashboard::set_availability(conn, &doctor_id, request.online)?))
        .await?;
    Ok(Json(doctor))
}
