use serde::{Deserialize, Serialize};
use validator::Validate;

//Gig DTOs
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateGigDto {
    #[validate(length(min = 1, max = 100, message = "Title must be between 1 and 100 characters"))]
    pub title: String,

    #[validate(length(min = 20, max = 2000, message = "Description must be between 20 and 2000 characters"))]
    pub description: String,

    #[validate(range(min = 1, message = "Amount must be a positive integer in minor units"))]
    pub amount_minor: i64,

    #[validate(length(equal = 3, message = "Currency must be a 3-letter code"))]
    pub currency: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GigListQueryDto {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

//Application DTOs
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ApplyToGigDto {
    #[validate(length(min = 1, max = 1000, message = "Cover note must be between 1 and 1000 characters"))]
    pub cover_note: String,
}

//Offer DTOs
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct MakeOfferDto {
    pub application_id: uuid::Uuid,

    #[validate(range(min = 1, message = "Offer amount must be a positive integer in minor units"))]
    pub amount_minor: i64,

    #[validate(length(max = 1000, message = "Message must be at most 1000 characters"))]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RespondToOfferDto {
    pub accept: bool,
}

//Contract DTOs
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RequestRevisionDto {
    #[validate(length(min = 1, max = 1000, message = "Reason is required"))]
    pub reason: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CancelContractDto {
    pub reason: Option<String>,
}

//Response wrappers
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: &str, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
            data: Some(data),
        }
    }
}
