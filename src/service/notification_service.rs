// services/notification_service.rs
//
// Event-emission hook for the surrounding delivery layer. Events are logged
// and stored; actual delivery (email, push) lives outside this service.
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::db::DBClient,
    models::gigmodel::{Application, Contract, Gig, Offer, Payment},
    service::error::ServiceError,
    utils::currency::format_minor,
};

#[derive(Debug, Clone)]
pub struct NotificationService {
    db_client: Arc<DBClient>,
}

impl NotificationService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn notify_new_application(
        &self,
        provider_id: Uuid,
        application: &Application,
    ) -> Result<(), ServiceError> {
        tracing::info!(
            provider_id = %provider_id,
            application_id = %application.id,
            gig_id = %application.gig_id,
            "new application received"
        );

        self.store_notification(
            provider_id,
            "application_received".to_string(),
            Some(application.gig_id),
            Some(serde_json::json!({
                "application_id": application.id,
                "tasker_id": application.tasker_id,
            })),
            "A tasker applied to your gig".to_string(),
        )
        .await
    }

    pub async fn notify_offer_made(
        &self,
        tasker_id: Uuid,
        offer: &Offer,
    ) -> Result<(), ServiceError> {
        tracing::info!(
            tasker_id = %tasker_id,
            offer_id = %offer.id,
            gig_id = %offer.gig_id,
            "offer made"
        );

        self.store_notification(
            tasker_id,
            "offer_made".to_string(),
            Some(offer.gig_id),
            Some(serde_json::json!({
                "offer_id": offer.id,
                "amount_minor": offer.amount_minor,
            })),
            "You received an offer on your application".to_string(),
        )
        .await
    }

    pub async fn notify_contract_created(
        &self,
        contract: &Contract,
        gig: &Gig,
    ) -> Result<(), ServiceError> {
        tracing::info!(
            contract_id = %contract.id,
            gig_id = %gig.id,
            provider_id = %contract.provider_id,
            tasker_id = %contract.tasker_id,
            "contract created, awaiting payment"
        );

        self.store_notification(
            contract.tasker_id,
            "contract_created".to_string(),
            Some(gig.id),
            Some(serde_json::json!({
                "contract_id": contract.id,
                "agreed_amount_minor": contract.agreed_amount_minor,
            })),
            format!(
                "Your application for \"{}\" was accepted at {}",
                gig.title,
                format_minor(contract.agreed_amount_minor, &contract.currency),
            ),
        )
        .await
    }

    pub async fn notify_contract_funded(
        &self,
        contract: &Contract,
        payment: &Payment,
    ) -> Result<(), ServiceError> {
        tracing::info!(
            contract_id = %contract.id,
            payment_id = %payment.id,
            total_minor = payment.total_provider_payment_minor,
            "contract funded"
        );

        self.store_notification(
            contract.tasker_id,
            "contract_funded".to_string(),
            Some(contract.gig_id),
            Some(serde_json::json!({
                "contract_id": contract.id,
                "payment_id": payment.id,
            })),
            format!(
                "The contract is funded; {} is due to you on completion",
                format_minor(payment.amount_received_minor, &payment.currency),
            ),
        )
        .await
    }

    pub async fn notify_contract_status_changed(
        &self,
        contract: &Contract,
        event: &str,
    ) -> Result<(), ServiceError> {
        tracing::info!(
            contract_id = %contract.id,
            event = event,
            status = ?contract.status,
            "contract status changed"
        );

        // Both parties hear about lifecycle changes.
        for user_id in [contract.provider_id, contract.tasker_id] {
            self.store_notification(
                user_id,
                event.to_string(),
                Some(contract.gig_id),
                Some(serde_json::json!({
                    "contract_id": contract.id,
                    "status": contract.status,
                })),
                format!("Contract update: {}", event),
            )
            .await?;
        }

        Ok(())
    }

    async fn store_notification(
        &self,
        user_id: Uuid,
        notification_type: String,
        gig_id: Option<Uuid>,
        metadata: Option<serde_json::Value>,
        message: String,
    ) -> Result<(), ServiceError> {
        sqlx::query(
            r#"
            INSERT INTO notifications
            (user_id, type, gig_id, metadata, message, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            "#,
        )
        .bind(user_id)
        .bind(notification_type)
        .bind(gig_id)
        .bind(metadata)
        .bind(message)
        .execute(&self.db_client.pool)
        .await?;

        Ok(())
    }
}
