//! API router.
//!
//! Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
//! Endpoint handlers use `State<ApiContext>` (provided via `with_state`).

use axum::http::Method;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the full router with every route under `/api/`.
pub fn api_router(ctx: ApiContext) -> Router {
    // Ambulance routes: device token required.
    let device = Router::new()
        .route("/triage", post(endpoints::triage::submit))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::device::require_device))
        // Extension must be outermost so middleware can extract ApiContext
        .layer(axum::Extension(ctx.clone()));

    // Hospital and doctor dashboards.
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let open = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/activate", post(endpoints::activate::activate))
        .route("/emergencies", get(endpoints::emergencies::list))
        .route("/emergencies/assign", post(endpoints::emergencies::assign))
        .route(
            "/emergencies/route-pending",
            post(endpoints::emergencies::route_pending),
        )
        .route("/doctors", get(endpoints::doctors::list))
        .route(
            "/doctors/:id/availability",
            put(endpoints::doctors::set_availability),
        )
        .route("/assign-doctor", post(endpoints::assign::assign_doctor))
        .with_state(ctx);

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .nest("/api", device)
        .nest("/api", open)
        .layer(cors)
}
