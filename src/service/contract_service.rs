// services/contract_service.rs
//
// Orchestrates contract lifecycle transitions: fetch the snapshot, run the
// pure evaluator, persist the outcome with a conditional update so racing
// requests fail with a conflict instead of overwriting each other.
use std::sync::Arc;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::{db::DBClient, gigdb::GigExt},
    models::{
        gigmodel::*,
        usermodel::{User, UserRole},
    },
    service::{
        contract_state::{
            authorize_delete, evaluate_transition, resolve_contract_actor, ContractEvent,
            TransitionEffect,
        },
        error::ServiceError,
        fees::{compute_fee_breakdown, FeeConfig},
        notification_service::NotificationService,
    },
};

#[derive(Debug, Clone)]
pub struct ContractService {
    db_client: Arc<DBClient>,
    notification_service: Arc<NotificationService>,
}

#[derive(Debug, Serialize)]
pub struct FundingResult {
    pub contract: Contract,
    pub payment: Payment,
}

impl ContractService {
    pub fn new(
        db_client: Arc<DBClient>,
        notification_service: Arc<NotificationService>,
    ) -> Self {
        Self {
            db_client,
            notification_service,
        }
    }

    async fn load_contract(&self, contract_id: Uuid) -> Result<Contract, ServiceError> {
        self.db_client
            .get_contract_by_id(contract_id)
            .await?
            .ok_or(ServiceError::ContractNotFound(contract_id))
    }

    /// Contracts are visible to their parties and to platform admins.
    pub async fn get_contract(
        &self,
        user: &User,
        contract_id: Uuid,
    ) -> Result<Contract, ServiceError> {
        let contract = self.load_contract(contract_id).await?;

        let is_party = contract.provider_id == user.id || contract.tasker_id == user.id;
        if !is_party && user.role != UserRole::Admin {
            return Err(ServiceError::UnauthorizedContractAccess(user.id, contract_id));
        }

        Ok(contract)
    }

    /// Fund a contract: compute the itemized breakdown from the agreed cost,
    /// insert the payment in escrow, and activate the contract atomically.
    pub async fn fund_contract(
        &self,
        user: &User,
        contract_id: Uuid,
        fee_config: &FeeConfig,
    ) -> Result<FundingResult, ServiceError> {
        let contract = self.load_contract(contract_id).await?;

        if contract.provider_id != user.id {
            return Err(ServiceError::UnauthorizedContractAccess(user.id, contract_id));
        }

        if contract.current_status() != ContractStatus::PendingPayment {
            return Err(ServiceError::InvalidContractStatus {
                contract_id,
                event: "fund".to_string(),
                current: contract.current_status(),
            });
        }

        let breakdown = compute_fee_breakdown(contract.agreed_amount_minor, fee_config)?;

        let result = self.db_client
            .fund_contract_tx(
                contract_id,
                contract.provider_id,
                contract.tasker_id,
                contract.currency.clone(),
                &breakdown,
            )
            .await?;

        let (contract, payment) = result.ok_or_else(|| {
            ServiceError::Conflict("Contract is no longer awaiting payment".to_string())
        })?;

        self.notification_service
            .notify_contract_funded(&contract, &payment)
            .await?;

        Ok(FundingResult { contract, payment })
    }

    /// Mark the escrowed payment as succeeded (the charge cleared).
    pub async fn settle_payment(
        &self,
        user: &User,
        contract_id: Uuid,
    ) -> Result<Payment, ServiceError> {
        let contract = self.load_contract(contract_id).await?;

        if contract.provider_id != user.id {
            return Err(ServiceError::UnauthorizedContractAccess(user.id, contract_id));
        }

        self.db_client
            .get_payment_by_contract(contract_id)
            .await?
            .ok_or(ServiceError::PaymentNotFound(contract_id))?;

        self.db_client
            .settle_payment(contract_id)
            .await?
            .ok_or_else(|| ServiceError::Conflict(
                "Payment is not in escrow; nothing to settle".to_string(),
            ))
    }

    pub async fn get_payment(
        &self,
        user: &User,
        contract_id: Uuid,
    ) -> Result<Payment, ServiceError> {
        let contract = self.get_contract(user, contract_id).await?;

        self.db_client
            .get_payment_by_contract(contract.id)
            .await?
            .ok_or(ServiceError::PaymentNotFound(contract_id))
    }

    pub async fn submit_work(
        &self,
        user: &User,
        contract_id: Uuid,
    ) -> Result<Contract, ServiceError> {
        self.apply_status_transition(user, contract_id, ContractEvent::SubmitWork)
            .await
    }

    pub async fn approve_completion(
        &self,
        user: &User,
        contract_id: Uuid,
    ) -> Result<Contract, ServiceError> {
        self.apply_status_transition(user, contract_id, ContractEvent::ApproveCompletion)
            .await
    }

    pub async fn request_revision(
        &self,
        user: &User,
        contract_id: Uuid,
        reason: String,
    ) -> Result<Contract, ServiceError> {
        self.apply_status_transition(user, contract_id, ContractEvent::RequestRevision { reason })
            .await
    }

    pub async fn cancel_contract(
        &self,
        user: &User,
        contract_id: Uuid,
        reason: String,
    ) -> Result<Contract, ServiceError> {
        self.apply_status_transition(user, contract_id, ContractEvent::Cancel { reason })
            .await
    }

    async fn apply_status_transition(
        &self,
        user: &User,
        contract_id: Uuid,
        event: ContractEvent,
    ) -> Result<Contract, ServiceError> {
        let contract = self.load_contract(contract_id).await?;
        let actor = resolve_contract_actor(&contract, user);

        let payment = self.db_client.get_payment_by_contract(contract_id).await?;
        let payment_status = payment.as_ref().and_then(|p| p.status);

        let outcome = evaluate_transition(&contract, &event, actor, user.id, payment_status)?;

        let expected = [contract.current_status()];

        let updated = match &event {
            ContractEvent::Cancel { .. } => {
                // Cancellation over a funded payment is permitted; the refund
                // is a follow-up action outside this flow.
                if payment_status.map(|s| s.is_funded()).unwrap_or(false) {
                    tracing::warn!(
                        contract_id = %contract_id,
                        payment_status = ?payment_status,
                        "cancelling a contract with a funded payment; refund required separately"
                    );
                }

                let (reason, cancelled_at) = outcome
                    .effects
                    .iter()
                    .find_map(|e| match e {
                        TransitionEffect::RecordCancellation { reason, cancelled_at } => {
                            Some((reason.clone(), *cancelled_at))
                        }
                        _ => None,
                    })
                    .ok_or_else(|| ServiceError::Configuration(
                        "cancel transition produced no cancellation record".to_string(),
                    ))?;

                self.db_client
                    .cancel_contract_tx(contract_id, contract.gig_id, &expected, reason, cancelled_at)
                    .await?
            }
            _ => {
                self.db_client
                    .update_contract_status_checked(contract_id, &expected, outcome.next_status)
                    .await?
            }
        };

        let updated = updated.ok_or_else(|| {
            ServiceError::Conflict(format!(
                "Contract {} changed concurrently, please retry",
                contract_id
            ))
        })?;

        self.notification_service
            .notify_contract_status_changed(&updated, event.name())
            .await?;

        Ok(updated)
    }

    /// Remove a contract entirely. Provider-only; the gig goes back to
    /// unassigned with its tasker cleared and the accepted application
    /// returns to pending.
    pub async fn delete_contract(
        &self,
        user: &User,
        contract_id: Uuid,
    ) -> Result<(), ServiceError> {
        let contract = self.load_contract(contract_id).await?;
        let actor = resolve_contract_actor(&contract, user);

        authorize_delete(&contract, actor, user.id)?;

        self.db_client
            .delete_contract_cascade(contract_id, contract.gig_id, contract.tasker_id)
            .await?;

        tracing::info!(
            contract_id = %contract_id,
            gig_id = %contract.gig_id,
            "contract deleted; gig reset to unassigned"
        );

        Ok(())
    }
}
