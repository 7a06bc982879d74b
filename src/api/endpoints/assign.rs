//! `POST /api/assign-doctor`: route one emergency.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::emergencies::required_id;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::routing::{DecisionSource, RoutingOutcome};

/// Accepts `emergency_id`, `emergencyId` or `id`.
#[derive(Deserialize)]
pub struct AssignDoctorRequest {
    #[serde(alias = "emergencyId", alias = "id")]
    pub emergency_id: Option<String>,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum AssignDoctorResponse {
    Assigned {
        success: bool,
        assigned_doctor_id: Uuid,
        reasoning: String,
        source: DecisionSource,
    },
    AlreadyAssigned {
        message: &'static str,
        doctor_id: Uuid,
    },
}

impl From<RoutingOutcome> for AssignDoctorResponse {
    fn from(outcome: RoutingOutcome) -> Self {
        match outcome {
            RoutingOutcome::Assigned(decision) => Self::Assigned {
                success: true,
                assigned_doctor_id: decision.doctor_id,
                reasoning: decision.reasoning,
                source: decision.source,
            },
            RoutingOutcome::AlreadyAssigned { doctor_id } => Self::AlreadyAssigned {
                message: "Doctor already assigned",
                doctor_id,
            },
        }
    }
}

pub async fn assign_doctor(
    State(ctx): State<ApiContext>,
    payload: Result<Json<AssignDoctorRequest>, JsonRejection>,
) -> Result<Json<AssignDoctorResponse>, ApiError> {
    let Json(request) = payload?;
    let emergency_id = required_id(request.emergency_id, "emergency_id")?;

    let outcome = ctx
        .with_db(move |ctx, conn| Ok(ctx.route(conn, &emergency_id)?))
        .await?;
    Ok(Json(outcome.into()))
}
