//! `POST /api/activate`: bind a device to an ambulance.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::activation::activate_device;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Deserialize)]
pub struct ActivateRequest {
    #[serde(default)]
    pub ambulance_number: Option<String>,
}

#[derive(Serialize)]
pub struct ActivateResponse {
    pub device_token: String,
}

pub async fn activate(
    State(ctx): State<ApiContext>,
    payload: Result<Json<ActivateRequest>, JsonRejection>,
) -> Result<Json<ActivateResponse>, ApiError> {
    let Json(request) = payload?;
    let number = request.ambulance_number.unwrap_or_default();

    let device_token = ctx
        .with_db(move |_, conn| Ok(activate_device(conn, &number)?))
        .await?;

    Ok(Json(ActivateResponse { device_token }))
}
