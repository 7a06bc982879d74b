//! `POST /api/triage`: ambulance intake.
//!
//! Stores the report as a new emergency, then routes it right away. A
//! routing failure does not fail the intake: the emergency stays
//! unassigned and the dashboard sweep picks it up later.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{AmbulanceContext, ApiContext};
use crate::intake::{record_intake, TriageReport};
use crate::routing::RoutingOutcome;

#[derive(Serialize)]
pub struct TriageResponse {
    pub emergency_id: Uuid,
    pub triage: TriageReport,
    pub doctor_id: Option<Uuid>,
    pub assignment: Option<RoutingOutcome>,
}

pub async fn submit(
    State(ctx): State<ApiContext>,
    Extension(device): Extension<AmbulanceContext>,
    payload: Result<Json<TriageReport>, JsonRejection>,
) -> Result<Json<TriageResponse>, ApiError> {
    let Json(report) = payload?;

    let response = ctx
        .with_db(move |ctx, conn| {
            let emergency = record_intake(conn, &device.ambulance, &report)?;
            let assignment = match ctx.route(conn, &emergency.id) {
                Ok(outcome) => Some(outcome),
                Err(e) => {
                    tracing::warn!(
                        emergency_id = %emergency.id,
                        error = %e,
                        "Routing after intake failed; left for the pending sweep"
                    );
                    None
                }
            };
            Ok(TriageResponse {
                emergency_id: emergency.id,
                triage: report,
                doctor_id: assignment.as_ref().map(RoutingOutcome::doctor_id),
                assignment,
            })
        })
        .await?;

    Ok(Json(response))
}
