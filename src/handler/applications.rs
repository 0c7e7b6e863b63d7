// handlers/applications.rs
use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::gigdtos::{ApiResponse, ApplyToGigDto, MakeOfferDto, RespondToOfferDto},
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn applications_handler() -> Router {
    Router::new()
        .route("/gigs/:gig_id/apply", post(apply_to_gig))
        .route("/applications/:application_id/withdraw", put(withdraw_application))
        .route("/applications/:application_id/cancel", put(cancel_application))
        .route("/applications/:application_id/reject", put(reject_application))
        .route("/applications/:application_id/accept", post(accept_application))
        .route("/offers", post(make_offer))
        .route("/offers/:offer_id/respond", put(respond_to_offer))
        .route("/offers/:offer_id/withdraw", put(withdraw_offer))
}

pub async fn apply_to_gig(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(gig_id): Path<Uuid>,
    Json(body): Json<ApplyToGigDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let application = app_state.application_service
        .apply_to_gig(&auth.user, gig_id, body.cover_note)
        .await?;

    Ok(Json(ApiResponse::success("Application submitted", application)))
}

pub async fn withdraw_application(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(application_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let application = app_state.application_service
        .withdraw_application(&auth.user, application_id)
        .await?;

    Ok(Json(ApiResponse::success("Application withdrawn", application)))
}

pub async fn cancel_application(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(application_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let application = app_state.application_service
        .cancel_application(&auth.user, application_id)
        .await?;

    Ok(Json(ApiResponse::success("Application cancelled", application)))
}

pub async fn reject_application(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(application_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let application = app_state.application_service
        .reject_application(&auth.user, application_id)
        .await?;

    Ok(Json(ApiResponse::success("Application rejected", application)))
}

pub async fn accept_application(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(application_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let result = app_state.application_service
        .accept_application(&auth.user, application_id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Application accepted; contract awaiting payment",
        result,
    )))
}

pub async fn make_offer(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<MakeOfferDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let offer = app_state.application_service
        .make_offer(&auth.user, body.application_id, body.amount_minor, body.message)
        .await?;

    Ok(Json(ApiResponse::success("Offer made", offer)))
}

pub async fn respond_to_offer(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(offer_id): Path<Uuid>,
    Json(body): Json<RespondToOfferDto>,
) -> Result<impl IntoResponse, HttpError> {
    let offer = app_state.application_service
        .respond_to_offer(&auth.user, offer_id, body.accept)
        .await?;

    let message = if body.accept { "Offer accepted" } else { "Offer rejected" };
    Ok(Json(ApiResponse::success(message, offer)))
}

pub async fn withdraw_offer(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(offer_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let offer = app_state.application_service
        .withdraw_offer(&auth.user, offer_id)
        .await?;

    Ok(Json(ApiResponse::success("Offer withdrawn", offer)))
}
