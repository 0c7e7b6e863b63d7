// routes.rs
use std::sync::Arc;

use axum::{middleware, routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{
        applications::applications_handler,
        auth::auth_handler,
        contracts::contracts_handler,
        gigs::gigs_handler,
    },
    middleware::auth,
    AppState,
};

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_route = Router::new()
        .route("/healthcheck", get(health_check))
        .nest("/auth", auth_handler())
        .nest(
            "/gigs",
            gigs_handler().layer(middleware::from_fn(auth)),
        )
        .nest(
            "/marketplace",
            applications_handler().layer(middleware::from_fn(auth)),
        )
        .nest(
            "/contracts",
            contracts_handler().layer(middleware::from_fn(auth)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state));

    Router::new().nest("/api", api_route)
}
