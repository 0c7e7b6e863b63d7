use thiserror::Error;
use uuid::Uuid;
use crate::{
    models::gigmodel::ContractStatus,
    error::HttpError,
};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Gig {0} not found")]
    GigNotFound(Uuid),

    #[error("Application {0} not found")]
    ApplicationNotFound(Uuid),

    #[error("Offer {0} not found")]
    OfferNotFound(Uuid),

    #[error("Contract {0} not found")]
    ContractNotFound(Uuid),

    #[error("No payment found for contract {0}")]
    PaymentNotFound(Uuid),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("User {0} is not authorized to perform this action on contract {1}")]
    UnauthorizedContractAccess(Uuid, Uuid),

    #[error("User {0} is not authorized to perform this action on gig {1}")]
    UnauthorizedGigAccess(Uuid, Uuid),

    #[error("Contract {contract_id} cannot {event} while in status {current:?}")]
    InvalidContractStatus {
        contract_id: Uuid,
        event: String,
        current: ContractStatus,
    },

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::GigNotFound(_)
            | ServiceError::ApplicationNotFound(_)
            | ServiceError::OfferNotFound(_)
            | ServiceError::ContractNotFound(_)
            | ServiceError::PaymentNotFound(_) => HttpError::not_found(error.to_string()),

            ServiceError::Validation(_)
            | ServiceError::InvalidContractStatus { .. } => HttpError::bad_request(error.to_string()),

            ServiceError::UnauthorizedContractAccess(_, _)
            | ServiceError::UnauthorizedGigAccess(_, _) => HttpError::unauthorized(error.to_string()),

            ServiceError::Precondition(_) => HttpError::payment_required(error.to_string()),

            ServiceError::Conflict(_) => HttpError::conflict(error.to_string()),

            _ => HttpError::server_error(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_service_error_maps_to_http_status() {
        let id = Uuid::new_v4();

        assert_eq!(HttpError::from(ServiceError::ContractNotFound(id)).status, StatusCode::NOT_FOUND);
        assert_eq!(
            HttpError::from(ServiceError::Precondition("payment".to_string())).status,
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            HttpError::from(ServiceError::Conflict("status changed".to_string())).status,
            StatusCode::CONFLICT
        );
        assert_eq!(
            HttpError::from(ServiceError::UnauthorizedContractAccess(id, id)).status,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            HttpError::from(ServiceError::Configuration("bad rate".to_string())).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
