// handlers/contracts.rs
use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::gigdb::GigExt,
    dtos::gigdtos::{ApiResponse, CancelContractDto, RequestRevisionDto},
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn contracts_handler() -> Router {
    Router::new()
        .route("/", get(list_my_contracts))
        .route("/:contract_id", get(get_contract).delete(delete_contract))
        .route("/:contract_id/fund", post(fund_contract))
        .route("/:contract_id/payment", get(get_payment))
        .route("/:contract_id/payment/settle", post(settle_payment))
        .route("/:contract_id/submit", put(submit_work))
        .route("/:contract_id/approve", put(approve_completion))
        .route("/:contract_id/revision", put(request_revision))
        .route("/:contract_id/cancel", put(cancel_contract))
}

pub async fn list_my_contracts(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let contracts = app_state.db_client
        .get_contracts_for_user(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Contracts retrieved", contracts)))
}

pub async fn get_contract(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(contract_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let contract = app_state.contract_service
        .get_contract(&auth.user, contract_id)
        .await?;

    Ok(Json(ApiResponse::success("Contract retrieved", contract)))
}

pub async fn fund_contract(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(contract_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let result = app_state.contract_service
        .fund_contract(&auth.user, contract_id, &app_state.env.fee_config)
        .await?;

    Ok(Json(ApiResponse::success("Contract funded", result)))
}

pub async fn get_payment(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(contract_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let payment = app_state.contract_service
        .get_payment(&auth.user, contract_id)
        .await?;

    Ok(Json(ApiResponse::success("Payment retrieved", payment)))
}

pub async fn settle_payment(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(contract_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let payment = app_state.contract_service
        .settle_payment(&auth.user, contract_id)
        .await?;

    Ok(Json(ApiResponse::success("Payment settled", payment)))
}

pub async fn submit_work(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(contract_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let contract = app_state.contract_service
        .submit_work(&auth.user, contract_id)
        .await?;

    Ok(Json(ApiResponse::success("Work submitted for review", contract)))
}

pub async fn approve_completion(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(contract_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let contract = app_state.contract_service
        .approve_completion(&auth.user, contract_id)
        .await?;

    Ok(Json(ApiResponse::success("Contract completed", contract)))
}

pub async fn request_revision(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(contract_id): Path<Uuid>,
    Json(body): Json<RequestRevisionDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let contract = app_state.contract_service
        .request_revision(&auth.user, contract_id, body.reason)
        .await?;

    Ok(Json(ApiResponse::success("Revision requested", contract)))
}

pub async fn cancel_contract(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(contract_id): Path<Uuid>,
    Json(body): Json<CancelContractDto>,
) -> Result<impl IntoResponse, HttpError> {
    let contract = app_state.contract_service
        .cancel_contract(&auth.user, contract_id, body.reason.unwrap_or_default())
        .await?;

    Ok(Json(ApiResponse::success("Contract cancelled", contract)))
}

pub async fn delete_contract(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(contract_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    app_state.contract_service
        .delete_contract(&auth.user, contract_id)
        .await?;

    Ok(Json(ApiResponse::success("Contract deleted", ())))
}
