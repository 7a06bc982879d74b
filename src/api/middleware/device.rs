//! Ambulance device-token check for intake routes.
//!
//! Reads the `device_token` header, resolves the ambulance it was issued
//! to, and injects `AmbulanceContext` into request extensions.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{AmbulanceContext, ApiContext};
use crate::db;

pub const DEVICE_TOKEN_HEADER: &str = "device_token";

/// Require a `device_token` header issued by `/api/activate`.
///
/// Accesses `ApiContext` from request extensions (injected by Extension layer).
pub async fn require_device(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_device_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_device_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let token = req
        .headers()
        .get(DEVICE_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::Unauthorized)?
        .to_string();

    let ambulance = ctx
        .with_db(move |_, conn| Ok(db::get_ambulance_by_token(conn, &token)?))
        .await?
        .ok_or_else(|| {
            tracing::warn!("Rejected intake with unknown device token");
            ApiError::Forbidden
        })?;

    req.extensions_mut().insert(AmbulanceContext { ambulance });
    Ok(next.run(req).await)
}
