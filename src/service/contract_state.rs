// services/contract_state.rs
//
// Pure transition evaluator for the contract lifecycle. It never touches the
// database: the caller hands in the current contract snapshot (and the payment
// status where the event needs it) and gets back the next status plus the
// effects to persist, or a typed rejection.
//
// Happy path is monotonic: pending_payment -> active -> submitted -> completed.
// The only backward move is submitted -> active (revision request).
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    models::{
        gigmodel::{Contract, ContractStatus, PaymentStatus},
        usermodel::{User, UserRole},
    },
    service::error::ServiceError,
};

/// The acting identity's relationship to a contract, resolved before any
/// state check so a wrong actor never learns which states are valid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContractActor {
    Provider,
    Tasker,
    Admin,
    Stranger,
}

pub fn resolve_contract_actor(contract: &Contract, user: &User) -> ContractActor {
    if user.id == contract.provider_id {
        ContractActor::Provider
    } else if user.id == contract.tasker_id {
        ContractActor::Tasker
    } else if user.role == UserRole::Admin {
        ContractActor::Admin
    } else {
        ContractActor::Stranger
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContractEvent {
    SubmitWork,
    ApproveCompletion,
    RequestRevision { reason: String },
    Cancel { reason: String },
}

impl ContractEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ContractEvent::SubmitWork => "submit_work",
            ContractEvent::ApproveCompletion => "approve_completion",
            ContractEvent::RequestRevision { .. } => "request_revision",
            ContractEvent::Cancel { .. } => "cancel",
        }
    }

    fn allowed_actors(&self) -> &'static [ContractActor] {
        match self {
            ContractEvent::SubmitWork => &[ContractActor::Tasker],
            ContractEvent::ApproveCompletion => &[ContractActor::Provider],
            ContractEvent::RequestRevision { .. } => &[ContractActor::Provider],
            ContractEvent::Cancel { .. } => &[ContractActor::Provider, ContractActor::Tasker],
        }
    }

    fn legal_source_states(&self) -> &'static [ContractStatus] {
        match self {
            ContractEvent::SubmitWork => &[ContractStatus::Active],
            ContractEvent::ApproveCompletion => &[ContractStatus::Submitted, ContractStatus::Active],
            ContractEvent::RequestRevision { .. } => &[ContractStatus::Submitted],
            ContractEvent::Cancel { .. } => &[
                ContractStatus::PendingPayment,
                ContractStatus::Active,
                ContractStatus::Submitted,
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransitionEffect {
    /// All offers referencing the contract's gig are removed on cancellation.
    PurgeOffersForGig(Uuid),
    RecordCancellation {
        reason: String,
        cancelled_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionOutcome {
    pub next_status: ContractStatus,
    pub effects: Vec<TransitionEffect>,
}

/// Evaluate one lifecycle event against a contract snapshot.
///
/// Check order: authorization, then state legality, then auxiliary
/// preconditions. `payment_status` is consulted only by approve_completion.
pub fn evaluate_transition(
    contract: &Contract,
    event: &ContractEvent,
    actor: ContractActor,
    actor_id: Uuid,
    payment_status: Option<PaymentStatus>,
) -> Result<TransitionOutcome, ServiceError> {
    if !event.allowed_actors().contains(&actor) {
        return Err(ServiceError::UnauthorizedContractAccess(actor_id, contract.id));
    }

    let current = contract.current_status();
    if !event.legal_source_states().contains(&current) {
        return Err(ServiceError::InvalidContractStatus {
            contract_id: contract.id,
            event: event.name().to_string(),
            current,
        });
    }

    match event {
        ContractEvent::SubmitWork => Ok(TransitionOutcome {
            next_status: ContractStatus::Submitted,
            effects: vec![],
        }),

        ContractEvent::ApproveCompletion => {
            match payment_status {
                Some(PaymentStatus::Succeeded) => Ok(TransitionOutcome {
                    next_status: ContractStatus::Completed,
                    effects: vec![],
                }),
                Some(status) => Err(ServiceError::Precondition(format!(
                    "contract {} payment is {} but must be succeeded before completion",
                    contract.id,
                    status.to_str()
                ))),
                None => Err(ServiceError::Precondition(format!(
                    "contract {} has no payment record; completion requires a succeeded payment",
                    contract.id
                ))),
            }
        }

        ContractEvent::RequestRevision { reason } => {
            if reason.trim().is_empty() {
                return Err(ServiceError::Validation(
                    "a revision request must include a reason".to_string(),
                ));
            }
            Ok(TransitionOutcome {
                next_status: ContractStatus::Active,
                effects: vec![],
            })
        }

        ContractEvent::Cancel { reason } => Ok(TransitionOutcome {
            next_status: ContractStatus::Cancelled,
            effects: vec![
                TransitionEffect::PurgeOffersForGig(contract.gig_id),
                TransitionEffect::RecordCancellation {
                    reason: reason.clone(),
                    cancelled_at: Utc::now(),
                },
            ],
        }),
    }
}

/// Deleting a contract is provider-only, regardless of status. Cancellation
/// is bilateral but deletion is not; the asymmetry is intentional.
pub fn authorize_delete(
    contract: &Contract,
    actor: ContractActor,
    actor_id: Uuid,
) -> Result<(), ServiceError> {
    if actor != ContractActor::Provider {
        return Err(ServiceError::UnauthorizedContractAccess(actor_id, contract.id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn contract_in(status: ContractStatus) -> Contract {
        Contract {
            id: Uuid::new_v4(),
            gig_id: Uuid::new_v4(),
            provider_id: Uuid::new_v4(),
            tasker_id: Uuid::new_v4(),
            agreed_amount_minor: 10_000,
            currency: "USD".to_string(),
            status: Some(status),
            cancellation_reason: None,
            cancelled_at: None,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        }
    }

    fn user_with(id: Uuid, role: UserRole) -> User {
        User {
            id,
            name: "test".to_string(),
            email: "test@example.com".to_string(),
            password: String::new(),
            role,
            created_at: None,
            updated_at: None,
        }
    }

    const ALL_STATUSES: [ContractStatus; 5] = [
        ContractStatus::PendingPayment,
        ContractStatus::Active,
        ContractStatus::Submitted,
        ContractStatus::Completed,
        ContractStatus::Cancelled,
    ];

    #[test]
    fn test_submit_work_from_active() {
        let contract = contract_in(ContractStatus::Active);
        let outcome = evaluate_transition(
            &contract,
            &ContractEvent::SubmitWork,
            ContractActor::Tasker,
            contract.tasker_id,
            None,
        )
        .unwrap();
        assert_eq!(outcome.next_status, ContractStatus::Submitted);
        assert!(outcome.effects.is_empty());
    }

    #[test]
    fn test_submit_work_by_non_tasker_is_rejected_even_when_active() {
        let contract = contract_in(ContractStatus::Active);
        for actor in [ContractActor::Provider, ContractActor::Admin, ContractActor::Stranger] {
            let result = evaluate_transition(
                &contract,
                &ContractEvent::SubmitWork,
                actor,
                Uuid::new_v4(),
                None,
            );
            assert!(matches!(
                result,
                Err(ServiceError::UnauthorizedContractAccess(_, _))
            ));
        }
    }

    #[test]
    fn test_illegal_state_event_pairs_return_state_error() {
        let table: [(ContractEvent, ContractActor, &[ContractStatus]); 4] = [
            (ContractEvent::SubmitWork, ContractActor::Tasker, &[ContractStatus::Active]),
            (
                ContractEvent::ApproveCompletion,
                ContractActor::Provider,
                &[ContractStatus::Submitted, ContractStatus::Active],
            ),
            (
                ContractEvent::RequestRevision { reason: "redo".to_string() },
                ContractActor::Provider,
                &[ContractStatus::Submitted],
            ),
            (
                ContractEvent::Cancel { reason: "done with this".to_string() },
                ContractActor::Provider,
                &[
                    ContractStatus::PendingPayment,
                    ContractStatus::Active,
                    ContractStatus::Submitted,
                ],
            ),
        ];

        for (event, actor, legal) in &table {
            for status in ALL_STATUSES {
                if legal.contains(&status) {
                    continue;
                }
                let contract = contract_in(status);
                let result = evaluate_transition(
                    &contract,
                    event,
                    *actor,
                    contract.provider_id,
                    Some(PaymentStatus::Succeeded),
                );
                assert!(
                    matches!(result, Err(ServiceError::InvalidContractStatus { .. })),
                    "expected state error for {:?} in {:?}",
                    event,
                    status
                );
                // The snapshot is untouched; the caller persists nothing.
                assert_eq!(contract.current_status(), status);
            }
        }
    }

    #[test]
    fn test_approval_requires_succeeded_payment() {
        let contract = contract_in(ContractStatus::Submitted);

        let missing = evaluate_transition(
            &contract,
            &ContractEvent::ApproveCompletion,
            ContractActor::Provider,
            contract.provider_id,
            None,
        );
        assert!(matches!(missing, Err(ServiceError::Precondition(_))));

        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Failed,
            PaymentStatus::EscrowFunded,
            PaymentStatus::Refunded,
        ] {
            let result = evaluate_transition(
                &contract,
                &ContractEvent::ApproveCompletion,
                ContractActor::Provider,
                contract.provider_id,
                Some(status),
            );
            assert!(matches!(result, Err(ServiceError::Precondition(_))));
        }

        let outcome = evaluate_transition(
            &contract,
            &ContractEvent::ApproveCompletion,
            ContractActor::Provider,
            contract.provider_id,
            Some(PaymentStatus::Succeeded),
        )
        .unwrap();
        assert_eq!(outcome.next_status, ContractStatus::Completed);
    }

    #[test]
    fn test_approval_also_accepted_from_active() {
        let contract = contract_in(ContractStatus::Active);
        let outcome = evaluate_transition(
            &contract,
            &ContractEvent::ApproveCompletion,
            ContractActor::Provider,
            contract.provider_id,
            Some(PaymentStatus::Succeeded),
        )
        .unwrap();
        assert_eq!(outcome.next_status, ContractStatus::Completed);
    }

    #[test]
    fn test_revision_needs_a_reason() {
        let contract = contract_in(ContractStatus::Submitted);
        let result = evaluate_transition(
            &contract,
            &ContractEvent::RequestRevision { reason: "  ".to_string() },
            ContractActor::Provider,
            contract.provider_id,
            None,
        );
        assert!(matches!(result, Err(ServiceError::Validation(_))));

        let outcome = evaluate_transition(
            &contract,
            &ContractEvent::RequestRevision { reason: "tiles are crooked".to_string() },
            ContractActor::Provider,
            contract.provider_id,
            None,
        )
        .unwrap();
        assert_eq!(outcome.next_status, ContractStatus::Active);
    }

    #[test]
    fn test_cancel_in_submitted_by_tasker_records_reason_and_purges_offers() {
        let contract = contract_in(ContractStatus::Submitted);
        let outcome = evaluate_transition(
            &contract,
            &ContractEvent::Cancel { reason: "client unresponsive".to_string() },
            ContractActor::Tasker,
            contract.tasker_id,
            None,
        )
        .unwrap();

        assert_eq!(outcome.next_status, ContractStatus::Cancelled);
        assert!(outcome
            .effects
            .contains(&TransitionEffect::PurgeOffersForGig(contract.gig_id)));
        assert!(outcome.effects.iter().any(|e| matches!(
            e,
            TransitionEffect::RecordCancellation { reason, .. } if reason == "client unresponsive"
        )));
    }

    #[test]
    fn test_cancel_by_stranger_is_rejected() {
        let contract = contract_in(ContractStatus::Active);
        let result = evaluate_transition(
            &contract,
            &ContractEvent::Cancel { reason: "nope".to_string() },
            ContractActor::Stranger,
            Uuid::new_v4(),
            None,
        );
        assert!(matches!(
            result,
            Err(ServiceError::UnauthorizedContractAccess(_, _))
        ));
    }

    #[test]
    fn test_delete_is_provider_only() {
        let contract = contract_in(ContractStatus::Completed);
        assert!(authorize_delete(&contract, ContractActor::Provider, contract.provider_id).is_ok());
        for actor in [ContractActor::Tasker, ContractActor::Admin, ContractActor::Stranger] {
            assert!(matches!(
                authorize_delete(&contract, actor, Uuid::new_v4()),
                Err(ServiceError::UnauthorizedContractAccess(_, _))
            ));
        }
    }

    #[test]
    fn test_actor_resolution() {
        let contract = contract_in(ContractStatus::Active);

        let provider = user_with(contract.provider_id, UserRole::Provider);
        let tasker = user_with(contract.tasker_id, UserRole::Tasker);
        let admin = user_with(Uuid::new_v4(), UserRole::Admin);
        let stranger = user_with(Uuid::new_v4(), UserRole::Tasker);

        assert_eq!(resolve_contract_actor(&contract, &provider), ContractActor::Provider);
        assert_eq!(resolve_contract_actor(&contract, &tasker), ContractActor::Tasker);
        assert_eq!(resolve_contract_actor(&contract, &admin), ContractActor::Admin);
        assert_eq!(resolve_contract_actor(&contract, &stranger), ContractActor::Stranger);
    }
}
