// handlers/gigs.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::gigdb::GigExt,
    dtos::gigdtos::{ApiResponse, CreateGigDto, GigListQueryDto},
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn gigs_handler() -> Router {
    Router::new()
        .route("/", post(create_gig).get(list_open_gigs))
        .route("/:gig_id", get(get_gig))
        .route("/:gig_id/applications", get(list_gig_applications))
}

// Widen before multiplying so an enormous page number cannot overflow u32.
fn page_offset(page: u32, limit: u32) -> i64 {
    (i64::from(page) - 1).max(0) * i64::from(limit)
}

pub async fn create_gig(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateGigDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let gig = app_state.db_client
        .create_gig(
            auth.user.id,
            body.title,
            body.description,
            body.amount_minor,
            body.currency.to_uppercase(),
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Gig created successfully", gig)))
}

pub async fn list_open_gigs(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<GigListQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let offset = page_offset(page, limit);

    let gigs = app_state.db_client
        .get_open_gigs(limit as i64, offset)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Open gigs retrieved", gigs)))
}

pub async fn get_gig(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(gig_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let gig = app_state.db_client
        .get_gig_by_id(gig_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(format!("Gig {} not found", gig_id)))?;

    Ok(Json(ApiResponse::success("Gig retrieved", gig)))
}

pub async fn list_gig_applications(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(gig_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let gig = app_state.db_client
        .get_gig_by_id(gig_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(format!("Gig {} not found", gig_id)))?;

    if gig.provider_id != auth.user.id {
        return Err(HttpError::unauthorized(
            "Only the gig's provider can view its applications",
        ));
    }

    let applications = app_state.db_client
        .get_applications_for_gig(gig_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Applications retrieved", applications)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offset_basic() {
        assert_eq!(page_offset(1, 20), 0);
        assert_eq!(page_offset(4, 100), 300);
    }

    #[test]
    fn test_page_offset_max_page_does_not_overflow() {
        assert_eq!(
            page_offset(u32::MAX, 100),
            (i64::from(u32::MAX) - 1) * 100
        );
    }
}
