// services/application_service.rs
use std::sync::Arc;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::{db::DBClient, gigdb::GigExt},
    models::{
        gigmodel::*,
        usermodel::User,
    },
    service::{
        error::ServiceError,
        notification_service::NotificationService,
    },
};

#[derive(Debug, Clone)]
pub struct ApplicationService {
    db_client: Arc<DBClient>,
    notification_service: Arc<NotificationService>,
}

#[derive(Debug, Serialize)]
pub struct AcceptanceResult {
    pub contract: Contract,
    pub application: Application,
    pub gig: Gig,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ReapplyAction {
    /// An open (pending/accepted) application already exists.
    Reject,
    /// A cancelled application is reopened to pending on the same row.
    ReopenExisting,
    /// Rejected and withdrawn applications are terminal; a fresh row keeps
    /// their history.
    CreateNew,
}

fn reapply_action(existing: ApplicationStatus) -> ReapplyAction {
    if existing.is_open() {
        ReapplyAction::Reject
    } else if existing == ApplicationStatus::Cancelled {
        ReapplyAction::ReopenExisting
    } else {
        ReapplyAction::CreateNew
    }
}

impl ApplicationService {
    pub fn new(
        db_client: Arc<DBClient>,
        notification_service: Arc<NotificationService>,
    ) -> Self {
        Self {
            db_client,
            notification_service,
        }
    }

    /// Apply to a gig. A prior cancelled application by the same tasker is
    /// reopened to pending instead of inserting a duplicate row.
    pub async fn apply_to_gig(
        &self,
        tasker: &User,
        gig_id: Uuid,
        cover_note: String,
    ) -> Result<Application, ServiceError> {
        let gig = self.db_client.get_gig_by_id(gig_id)
            .await?
            .ok_or(ServiceError::GigNotFound(gig_id))?;

        if gig.provider_id == tasker.id {
            return Err(ServiceError::Validation(
                "You cannot apply to your own gig".to_string(),
            ));
        }

        if gig.status != Some(GigStatus::Unassigned) {
            return Err(ServiceError::Validation(
                "This gig is no longer open for applications".to_string(),
            ));
        }

        if let Some(existing) = self.db_client.get_application_for_gig(gig_id, tasker.id).await? {
            match reapply_action(existing.status.unwrap_or(ApplicationStatus::Pending)) {
                ReapplyAction::Reject => {
                    return Err(ServiceError::Conflict(
                        "You already have an open application for this gig".to_string(),
                    ));
                }
                ReapplyAction::ReopenExisting => {
                    let reopened = self.db_client.reopen_application(existing.id)
                        .await?
                        .ok_or_else(|| ServiceError::Conflict(
                            "Application changed while reopening, please retry".to_string(),
                        ))?;

                    self.notification_service
                        .notify_new_application(gig.provider_id, &reopened)
                        .await?;

                    return Ok(reopened);
                }
                ReapplyAction::CreateNew => {}
            }
        }

        let application = self.db_client
            .create_application(gig_id, tasker.id, cover_note)
            .await?;

        self.notification_service
            .notify_new_application(gig.provider_id, &application)
            .await?;

        Ok(application)
    }

    pub async fn withdraw_application(
        &self,
        tasker: &User,
        application_id: Uuid,
    ) -> Result<Application, ServiceError> {
        self.close_own_application(tasker, application_id, ApplicationStatus::Withdrawn)
            .await
    }

    pub async fn cancel_application(
        &self,
        tasker: &User,
        application_id: Uuid,
    ) -> Result<Application, ServiceError> {
        self.close_own_application(tasker, application_id, ApplicationStatus::Cancelled)
            .await
    }

    async fn close_own_application(
        &self,
        tasker: &User,
        application_id: Uuid,
        next: ApplicationStatus,
    ) -> Result<Application, ServiceError> {
        let application = self.db_client.get_application_by_id(application_id)
            .await?
            .ok_or(ServiceError::ApplicationNotFound(application_id))?;

        if application.tasker_id != tasker.id {
            return Err(ServiceError::UnauthorizedGigAccess(tasker.id, application.gig_id));
        }

        if application.status != Some(ApplicationStatus::Pending) {
            return Err(ServiceError::Validation(format!(
                "Only pending applications can be {}",
                next.to_str()
            )));
        }

        Ok(self.db_client.update_application_status(application_id, next).await?)
    }

    pub async fn reject_application(
        &self,
        provider: &User,
        application_id: Uuid,
    ) -> Result<Application, ServiceError> {
        let application = self.db_client.get_application_by_id(application_id)
            .await?
            .ok_or(ServiceError::ApplicationNotFound(application_id))?;

        let gig = self.db_client.get_gig_by_id(application.gig_id)
            .await?
            .ok_or(ServiceError::GigNotFound(application.gig_id))?;

        if gig.provider_id != provider.id {
            return Err(ServiceError::UnauthorizedGigAccess(provider.id, gig.id));
        }

        if application.status != Some(ApplicationStatus::Pending) {
            return Err(ServiceError::Validation(
                "Only pending applications can be rejected".to_string(),
            ));
        }

        Ok(self.db_client
            .update_application_status(application_id, ApplicationStatus::Rejected)
            .await?)
    }

    /// Accept an application: the gig is assigned, the application marked
    /// accepted, and the contract created at pending_payment, atomically.
    pub async fn accept_application(
        &self,
        provider: &User,
        application_id: Uuid,
    ) -> Result<AcceptanceResult, ServiceError> {
        let application = self.db_client.get_application_by_id(application_id)
            .await?
            .ok_or(ServiceError::ApplicationNotFound(application_id))?;

        let gig = self.db_client.get_gig_by_id(application.gig_id)
            .await?
            .ok_or(ServiceError::GigNotFound(application.gig_id))?;

        if gig.provider_id != provider.id {
            return Err(ServiceError::UnauthorizedGigAccess(provider.id, gig.id));
        }

        if application.status == Some(ApplicationStatus::Accepted) {
            return Err(ServiceError::Validation(
                "Application is already accepted".to_string(),
            ));
        }

        if gig.status == Some(GigStatus::Assigned) {
            return Err(ServiceError::Validation(
                "Gig already has an assigned tasker".to_string(),
            ));
        }

        // An accepted offer may carry a negotiated amount; otherwise the
        // gig's listed amount is the agreed cost.
        let agreed_amount_minor = match self.db_client.get_offer_by_application(application_id).await? {
            Some(offer) if offer.status == Some(OfferStatus::Accepted) => offer.amount_minor,
            _ => gig.amount_minor,
        };

        let result = self.db_client
            .accept_application_tx(
                application_id,
                gig.id,
                gig.provider_id,
                application.tasker_id,
                agreed_amount_minor,
                gig.currency.clone(),
            )
            .await?;

        let (contract, application, gig) = result.ok_or_else(|| {
            ServiceError::Conflict("Gig was assigned concurrently, please refresh".to_string())
        })?;

        self.notification_service
            .notify_contract_created(&contract, &gig)
            .await?;

        Ok(AcceptanceResult {
            contract,
            application,
            gig,
        })
    }

    /// Make an offer on an application. Offers are 1:1 with applications.
    pub async fn make_offer(
        &self,
        provider: &User,
        application_id: Uuid,
        amount_minor: i64,
        message: String,
    ) -> Result<Offer, ServiceError> {
        if amount_minor <= 0 {
            return Err(ServiceError::Validation(
                "Offer amount must be positive".to_string(),
            ));
        }

        let application = self.db_client.get_application_by_id(application_id)
            .await?
            .ok_or(ServiceError::ApplicationNotFound(application_id))?;

        let gig = self.db_client.get_gig_by_id(application.gig_id)
            .await?
            .ok_or(ServiceError::GigNotFound(application.gig_id))?;

        if gig.provider_id != provider.id {
            return Err(ServiceError::UnauthorizedGigAccess(provider.id, gig.id));
        }

        if application.status != Some(ApplicationStatus::Pending) {
            return Err(ServiceError::Validation(
                "Offers can only be made on pending applications".to_string(),
            ));
        }

        if self.db_client.get_offer_by_application(application_id).await?.is_some() {
            return Err(ServiceError::Conflict(
                "An offer already exists for this application".to_string(),
            ));
        }

        let offer = self.db_client
            .create_offer(
                application_id,
                gig.id,
                provider.id,
                application.tasker_id,
                amount_minor,
                message,
            )
            .await?;

        self.notification_service
            .notify_offer_made(application.tasker_id, &offer)
            .await?;

        Ok(offer)
    }

    pub async fn respond_to_offer(
        &self,
        tasker: &User,
        offer_id: Uuid,
        accept: bool,
    ) -> Result<Offer, ServiceError> {
        let offer = self.db_client.get_offer_by_id(offer_id)
            .await?
            .ok_or(ServiceError::OfferNotFound(offer_id))?;

        if offer.tasker_id != tasker.id {
            return Err(ServiceError::UnauthorizedGigAccess(tasker.id, offer.gig_id));
        }

        if offer.status != Some(OfferStatus::Pending) {
            return Err(ServiceError::Validation(
                "Offer has already been responded to".to_string(),
            ));
        }

        let next = if accept { OfferStatus::Accepted } else { OfferStatus::Rejected };
        Ok(self.db_client.update_offer_status(offer_id, next).await?)
    }

    pub async fn withdraw_offer(
        &self,
        provider: &User,
        offer_id: Uuid,
    ) -> Result<Offer, ServiceError> {
        let offer = self.db_client.get_offer_by_id(offer_id)
            .await?
            .ok_or(ServiceError::OfferNotFound(offer_id))?;

        if offer.provider_id != provider.id {
            return Err(ServiceError::UnauthorizedGigAccess(provider.id, offer.gig_id));
        }

        if offer.status != Some(OfferStatus::Pending) {
            return Err(ServiceError::Validation(
                "Only pending offers can be withdrawn".to_string(),
            ));
        }

        Ok(self.db_client
            .update_offer_status(offer_id, OfferStatus::Withdrawn)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reapply_reopens_cancelled_without_duplicate() {
        assert_eq!(
            reapply_action(ApplicationStatus::Cancelled),
            ReapplyAction::ReopenExisting
        );
    }

    #[test]
    fn test_reapply_rejects_open_applications() {
        assert_eq!(reapply_action(ApplicationStatus::Pending), ReapplyAction::Reject);
        assert_eq!(reapply_action(ApplicationStatus::Accepted), ReapplyAction::Reject);
    }

    #[test]
    fn test_reapply_after_terminal_status_creates_fresh_row() {
        assert_eq!(reapply_action(ApplicationStatus::Rejected), ReapplyAction::CreateNew);
        assert_eq!(reapply_action(ApplicationStatus::Withdrawn), ReapplyAction::CreateNew);
    }
}
