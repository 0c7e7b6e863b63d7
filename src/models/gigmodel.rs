use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "gig_status", rename_all = "snake_case")]
pub enum GigStatus {
    Unassigned,
    Assigned,
}

impl GigStatus {
    pub fn to_str(&self) -> &str {
        match self {
            GigStatus::Unassigned => "unassigned",
            GigStatus::Assigned => "assigned",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "application_status", rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
    Withdrawn,
    Cancelled,
}

impl ApplicationStatus {
    pub fn to_str(&self) -> &str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
            ApplicationStatus::Cancelled => "cancelled",
        }
    }

    /// Pending and accepted applications block a duplicate apply.
    pub fn is_open(&self) -> bool {
        matches!(self, ApplicationStatus::Pending | ApplicationStatus::Accepted)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "offer_status", rename_all = "snake_case")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
    Withdrawn,
}

impl OfferStatus {
    pub fn to_str(&self) -> &str {
        match self {
            OfferStatus::Pending => "pending",
            OfferStatus::Accepted => "accepted",
            OfferStatus::Rejected => "rejected",
            OfferStatus::Withdrawn => "withdrawn",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "contract_status", rename_all = "snake_case")]
pub enum ContractStatus {
    PendingPayment,
    Active,
    Submitted,
    Completed,
    Cancelled,
}

impl ContractStatus {
    pub fn to_str(&self) -> &str {
        match self {
            ContractStatus::PendingPayment => "pending_payment",
            ContractStatus::Active => "active",
            ContractStatus::Submitted => "submitted",
            ContractStatus::Completed => "completed",
            ContractStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Succeeded,
    Failed,
    EscrowFunded,
    Refunded,
}

impl PaymentStatus {
    pub fn to_str(&self) -> &str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Succeeded => "succeeded",
            PaymentStatus::Failed => "failed",
            PaymentStatus::EscrowFunded => "escrow_funded",
            PaymentStatus::Refunded => "refunded",
        }
    }

    /// A payment holding real money; cancelling over one only warns.
    pub fn is_funded(&self) -> bool {
        matches!(self, PaymentStatus::Succeeded | PaymentStatus::EscrowFunded)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Gig {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub assigned_tasker_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub amount_minor: i64,
    pub currency: String,
    pub status: Option<GigStatus>,         // Database has DEFAULT 'unassigned', can be NULL
    pub created_at: Option<DateTime<Utc>>, // Database has DEFAULT NOW(), can be NULL
    pub updated_at: Option<DateTime<Utc>>, // Database has DEFAULT NOW(), can be NULL
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Application {
    pub id: Uuid,
    pub gig_id: Uuid,
    pub tasker_id: Uuid,
    pub cover_note: String,
    pub status: Option<ApplicationStatus>, // Database has DEFAULT 'pending', can be NULL
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Offer {
    pub id: Uuid,
    pub application_id: Uuid,
    pub gig_id: Uuid,
    pub provider_id: Uuid,
    pub tasker_id: Uuid,
    pub amount_minor: i64,
    pub message: String,
    pub status: Option<OfferStatus>,       // Database has DEFAULT 'pending', can be NULL
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Contract {
    pub id: Uuid,
    pub gig_id: Uuid,
    pub provider_id: Uuid,
    pub tasker_id: Uuid,
    pub agreed_amount_minor: i64,
    pub currency: String,
    pub status: Option<ContractStatus>,    // Database has DEFAULT 'pending_payment', can be NULL
    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Contract {
    pub fn current_status(&self) -> ContractStatus {
        self.status.unwrap_or(ContractStatus::PendingPayment)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub contract_id: Uuid,
    pub payer_id: Uuid,
    pub payee_id: Uuid,
    pub service_amount_minor: i64,
    pub currency: String,
    pub platform_fee_minor: i64,
    pub provider_tax_minor: i64,
    pub tasker_tax_minor: i64,
    pub total_tax_minor: i64,
    pub total_provider_payment_minor: i64,
    pub amount_received_minor: i64,
    pub status: Option<PaymentStatus>,     // Database has DEFAULT 'pending', can be NULL
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
