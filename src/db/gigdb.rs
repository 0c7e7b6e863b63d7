// db/gigdb.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::gigmodel::*;
use crate::service::fees::FeeBreakdown;

#[async_trait]
pub trait GigExt {
    //Gig management
    async fn create_gig(
        &self,
        provider_id: Uuid,
        title: String,
        description: String,
        amount_minor: i64,
        currency: String,
    ) -> Result<Gig, Error>;

    async fn get_gig_by_id(&self, gig_id: Uuid) -> Result<Option<Gig>, Error>;

    async fn get_open_gigs(&self, limit: i64, offset: i64) -> Result<Vec<Gig>, Error>;

    //Applications
    async fn create_application(
        &self,
        gig_id: Uuid,
        tasker_id: Uuid,
        cover_note: String,
    ) -> Result<Application, Error>;

    async fn get_application_by_id(
        &self,
        application_id: Uuid,
    ) -> Result<Option<Application>, Error>;

    /// Latest application by this tasker for this gig, any status.
    async fn get_application_for_gig(
        &self,
        gig_id: Uuid,
        tasker_id: Uuid,
    ) -> Result<Option<Application>, Error>;

    async fn get_applications_for_gig(&self, gig_id: Uuid) -> Result<Vec<Application>, Error>;

    /// Flip a cancelled application back to pending. Returns None when the
    /// row is no longer cancelled (lost a race or was never cancelled).
    async fn reopen_application(&self, application_id: Uuid) -> Result<Option<Application>, Error>;

    async fn update_application_status(
        &self,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Application, Error>;

    //Offers
    async fn create_offer(
        &self,
        application_id: Uuid,
        gig_id: Uuid,
        provider_id: Uuid,
        tasker_id: Uuid,
        amount_minor: i64,
        message: String,
    ) -> Result<Offer, Error>;

    async fn get_offer_by_id(&self, offer_id: Uuid) -> Result<Option<Offer>, Error>;

    async fn get_offer_by_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<Offer>, Error>;

    async fn update_offer_status(
        &self,
        offer_id: Uuid,
        status: OfferStatus,
    ) -> Result<Offer, Error>;

    //Contracts
    /// Accept an application: mark it accepted, assign the gig, and create
    /// the contract at pending_payment, all in one transaction. The gig
    /// update is conditional on it still being unassigned; None means the
    /// gig was taken concurrently.
    async fn accept_application_tx(
        &self,
        application_id: Uuid,
        gig_id: Uuid,
        provider_id: Uuid,
        tasker_id: Uuid,
        agreed_amount_minor: i64,
        currency: String,
    ) -> Result<Option<(Contract, Application, Gig)>, Error>;

    async fn get_contract_by_id(&self, contract_id: Uuid) -> Result<Option<Contract>, Error>;

    async fn get_contracts_for_user(&self, user_id: Uuid) -> Result<Vec<Contract>, Error>;

    /// Compare-and-swap on the status column; None means the contract was
    /// not in any of the expected states.
    async fn update_contract_status_checked(
        &self,
        contract_id: Uuid,
        expected: &[ContractStatus],
        next: ContractStatus,
    ) -> Result<Option<Contract>, Error>;

    /// Cancel a contract and purge all offers for its gig in one
    /// transaction. None means the status CAS missed.
    async fn cancel_contract_tx(
        &self,
        contract_id: Uuid,
        gig_id: Uuid,
        expected: &[ContractStatus],
        reason: String,
        cancelled_at: DateTime<Utc>,
    ) -> Result<Option<Contract>, Error>;

    /// Remove a contract and reset its gig to unassigned and its accepted
    /// application back to pending, in one transaction.
    async fn delete_contract_cascade(
        &self,
        contract_id: Uuid,
        gig_id: Uuid,
        tasker_id: Uuid,
    ) -> Result<(), Error>;

    //Payments
    /// Insert the itemized payment as escrow_funded and move the contract
    /// pending_payment -> active in one transaction. None means the
    /// contract was not awaiting payment.
    async fn fund_contract_tx(
        &self,
        contract_id: Uuid,
        payer_id: Uuid,
        payee_id: Uuid,
        currency: String,
        breakdown: &FeeBreakdown,
    ) -> Result<Option<(Contract, Payment)>, Error>;

    async fn get_payment_by_contract(&self, contract_id: Uuid) -> Result<Option<Payment>, Error>;

    /// escrow_funded -> succeeded CAS; None when the payment is not in
    /// escrow_funded.
    async fn settle_payment(&self, contract_id: Uuid) -> Result<Option<Payment>, Error>;
}

fn status_texts(expected: &[ContractStatus]) -> Vec<String> {
    expected.iter().map(|s| s.to_str().to_string()).collect()
}

#[async_trait]
impl GigExt for DBClient {
    async fn create_gig(
        &self,
        provider_id: Uuid,
        title: String,
        description: String,
        amount_minor: i64,
        currency: String,
    ) -> Result<Gig, Error> {
        sqlx::query_as::<_, Gig>(
            r#"
            INSERT INTO gigs (provider_id, title, description, amount_minor, currency)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING
                id, provider_id, assigned_tasker_id,
                title, description,
                amount_minor, currency,
                status, created_at, updated_at
            "#,
        )
        .bind(provider_id)
        .bind(title)
        .bind(description)
        .bind(amount_minor)
        .bind(currency)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_gig_by_id(&self, gig_id: Uuid) -> Result<Option<Gig>, Error> {
        sqlx::query_as::<_, Gig>(
            r#"
            SELECT
                id, provider_id, assigned_tasker_id,
                title, description,
                amount_minor, currency,
                status, created_at, updated_at
            FROM gigs
            WHERE id = $1
            "#,
        )
        .bind(gig_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_open_gigs(&self, limit: i64, offset: i64) -> Result<Vec<Gig>, Error> {
        sqlx::query_as::<_, Gig>(
            r#"
            SELECT
                id, provider_id, assigned_tasker_id,
                title, description,
                amount_minor, currency,
                status, created_at, updated_at
            FROM gigs
            WHERE status = 'unassigned'
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn create_application(
        &self,
        gig_id: Uuid,
        tasker_id: Uuid,
        cover_note: String,
    ) -> Result<Application, Error> {
        sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications (gig_id, tasker_id, cover_note)
            VALUES ($1, $2, $3)
            RETURNING id, gig_id, tasker_id, cover_note, status, created_at, updated_at
            "#,
        )
        .bind(gig_id)
        .bind(tasker_id)
        .bind(cover_note)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_application_by_id(
        &self,
        application_id: Uuid,
    ) -> Result<Option<Application>, Error> {
        sqlx::query_as::<_, Application>(
            r#"
            SELECT id, gig_id, tasker_id, cover_note, status, created_at, updated_at
            FROM applications
            WHERE id = $1
            "#,
        )
        .bind(application_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_application_for_gig(
        &self,
        gig_id: Uuid,
        tasker_id: Uuid,
    ) -> Result<Option<Application>, Error> {
        sqlx::query_as::<_, Application>(
            r#"
            SELECT id, gig_id, tasker_id, cover_note, status, created_at, updated_at
            FROM applications
            WHERE gig_id = $1 AND tasker_id = $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(gig_id)
        .bind(tasker_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_applications_for_gig(&self, gig_id: Uuid) -> Result<Vec<Application>, Error> {
        sqlx::query_as::<_, Application>(
            r#"
            SELECT id, gig_id, tasker_id, cover_note, status, created_at, updated_at
            FROM applications
            WHERE gig_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(gig_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn reopen_application(&self, application_id: Uuid) -> Result<Option<Application>, Error> {
        sqlx::query_as::<_, Application>(
            r#"
            UPDATE applications
            SET status = 'pending', updated_at = NOW()
            WHERE id = $1 AND status = 'cancelled'
            RETURNING id, gig_id, tasker_id, cover_note, status, created_at, updated_at
            "#,
        )
        .bind(application_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_application_status(
        &self,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Application, Error> {
        sqlx::query_as::<_, Application>(
            r#"
            UPDATE applications
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, gig_id, tasker_id, cover_note, status, created_at, updated_at
            "#,
        )
        .bind(application_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
    }

    async fn create_offer(
        &self,
        application_id: Uuid,
        gig_id: Uuid,
        provider_id: Uuid,
        tasker_id: Uuid,
        amount_minor: i64,
        message: String,
    ) -> Result<Offer, Error> {
        sqlx::query_as::<_, Offer>(
            r#"
            INSERT INTO offers (application_id, gig_id, provider_id, tasker_id, amount_minor, message)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, application_id, gig_id, provider_id, tasker_id,
                      amount_minor, message, status, created_at
            "#,
        )
        .bind(application_id)
        .bind(gig_id)
        .bind(provider_id)
        .bind(tasker_id)
        .bind(amount_minor)
        .bind(message)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_offer_by_id(&self, offer_id: Uuid) -> Result<Option<Offer>, Error> {
        sqlx::query_as::<_, Offer>(
            r#"
            SELECT id, application_id, gig_id, provider_id, tasker_id,
                   amount_minor, message, status, created_at
            FROM offers
            WHERE id = $1
            "#,
        )
        .bind(offer_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_offer_by_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<Offer>, Error> {
        sqlx::query_as::<_, Offer>(
            r#"
            SELECT id, application_id, gig_id, provider_id, tasker_id,
                   amount_minor, message, status, created_at
            FROM offers
            WHERE application_id = $1
            "#,
        )
        .bind(application_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_offer_status(
        &self,
        offer_id: Uuid,
        status: OfferStatus,
    ) -> Result<Offer, Error> {
        sqlx::query_as::<_, Offer>(
            r#"
            UPDATE offers
            SET status = $2
            WHERE id = $1
            RETURNING id, application_id, gig_id, provider_id, tasker_id,
                      amount_minor, message, status, created_at
            "#,
        )
        .bind(offer_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
    }

    async fn accept_application_tx(
        &self,
        application_id: Uuid,
        gig_id: Uuid,
        provider_id: Uuid,
        tasker_id: Uuid,
        agreed_amount_minor: i64,
        currency: String,
    ) -> Result<Option<(Contract, Application, Gig)>, Error> {
        let mut tx = self.pool.begin().await?;

        // Conditional assignment guards against two accepts racing.
        let gig = sqlx::query_as::<_, Gig>(
            r#"
            UPDATE gigs
            SET status = 'assigned', assigned_tasker_id = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'unassigned'
            RETURNING
                id, provider_id, assigned_tasker_id,
                title, description,
                amount_minor, currency,
                status, created_at, updated_at
            "#,
        )
        .bind(gig_id)
        .bind(tasker_id)
        .fetch_optional(&mut *tx)
        .await?;

        let gig = match gig {
            Some(gig) => gig,
            None => {
                tx.rollback().await?;
                return Ok(None);
            }
        };

        let application = sqlx::query_as::<_, Application>(
            r#"
            UPDATE applications
            SET status = 'accepted', updated_at = NOW()
            WHERE id = $1
            RETURNING id, gig_id, tasker_id, cover_note, status, created_at, updated_at
            "#,
        )
        .bind(application_id)
        .fetch_one(&mut *tx)
        .await?;

        let contract = sqlx::query_as::<_, Contract>(
            r#"
            INSERT INTO contracts (gig_id, provider_id, tasker_id, agreed_amount_minor, currency)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, gig_id, provider_id, tasker_id,
                      agreed_amount_minor, currency, status,
                      cancellation_reason, cancelled_at,
                      created_at, updated_at
            "#,
        )
        .bind(gig_id)
        .bind(provider_id)
        .bind(tasker_id)
        .bind(agreed_amount_minor)
        .bind(currency)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some((contract, application, gig)))
    }

    async fn get_contract_by_id(&self, contract_id: Uuid) -> Result<Option<Contract>, Error> {
        sqlx::query_as::<_, Contract>(
            r#"
            SELECT id, gig_id, provider_id, tasker_id,
                   agreed_amount_minor, currency, status,
                   cancellation_reason, cancelled_at,
                   created_at, updated_at
            FROM contracts
            WHERE id = $1
            "#,
        )
        .bind(contract_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_contracts_for_user(&self, user_id: Uuid) -> Result<Vec<Contract>, Error> {
        sqlx::query_as::<_, Contract>(
            r#"
            SELECT id, gig_id, provider_id, tasker_id,
                   agreed_amount_minor, currency, status,
                   cancellation_reason, cancelled_at,
                   created_at, updated_at
            FROM contracts
            WHERE provider_id = $1 OR tasker_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn update_contract_status_checked(
        &self,
        contract_id: Uuid,
        expected: &[ContractStatus],
        next: ContractStatus,
    ) -> Result<Option<Contract>, Error> {
        sqlx::query_as::<_, Contract>(
            r#"
            UPDATE contracts
            SET status = $2, updated_at = NOW()
            WHERE id = $1 AND status::text = ANY($3)
            RETURNING id, gig_id, provider_id, tasker_id,
                      agreed_amount_minor, currency, status,
                      cancellation_reason, cancelled_at,
                      created_at, updated_at
            "#,
        )
        .bind(contract_id)
        .bind(next)
        .bind(status_texts(expected))
        .fetch_optional(&self.pool)
        .await
    }

    async fn cancel_contract_tx(
        &self,
        contract_id: Uuid,
        gig_id: Uuid,
        expected: &[ContractStatus],
        reason: String,
        cancelled_at: DateTime<Utc>,
    ) -> Result<Option<Contract>, Error> {
        let mut tx = self.pool.begin().await?;

        let contract = sqlx::query_as::<_, Contract>(
            r#"
            UPDATE contracts
            SET status = 'cancelled',
                cancellation_reason = $2,
                cancelled_at = $3,
                updated_at = NOW()
            WHERE id = $1 AND status::text = ANY($4)
            RETURNING id, gig_id, provider_id, tasker_id,
                      agreed_amount_minor, currency, status,
                      cancellation_reason, cancelled_at,
                      created_at, updated_at
            "#,
        )
        .bind(contract_id)
        .bind(reason)
        .bind(cancelled_at)
        .bind(status_texts(expected))
        .fetch_optional(&mut *tx)
        .await?;

        let contract = match contract {
            Some(contract) => contract,
            None => {
                tx.rollback().await?;
                return Ok(None);
            }
        };

        sqlx::query("DELETE FROM offers WHERE gig_id = $1")
            .bind(gig_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(contract))
    }

    async fn delete_contract_cascade(
        &self,
        contract_id: Uuid,
        gig_id: Uuid,
        tasker_id: Uuid,
    ) -> Result<(), Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM contracts WHERE id = $1")
            .bind(contract_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE gigs
            SET status = 'unassigned', assigned_tasker_id = NULL, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(gig_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE applications
            SET status = 'pending', updated_at = NOW()
            WHERE gig_id = $1 AND tasker_id = $2 AND status = 'accepted'
            "#,
        )
        .bind(gig_id)
        .bind(tasker_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn fund_contract_tx(
        &self,
        contract_id: Uuid,
        payer_id: Uuid,
        payee_id: Uuid,
        currency: String,
        breakdown: &FeeBreakdown,
    ) -> Result<Option<(Contract, Payment)>, Error> {
        let mut tx = self.pool.begin().await?;

        let contract = sqlx::query_as::<_, Contract>(
            r#"
            UPDATE contracts
            SET status = 'active', updated_at = NOW()
            WHERE id = $1 AND status = 'pending_payment'
            RETURNING id, gig_id, provider_id, tasker_id,
                      agreed_amount_minor, currency, status,
                      cancellation_reason, cancelled_at,
                      created_at, updated_at
            "#,
        )
        .bind(contract_id)
        .fetch_optional(&mut *tx)
        .await?;

        let contract = match contract {
            Some(contract) => contract,
            None => {
                tx.rollback().await?;
                return Ok(None);
            }
        };

        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments
            (contract_id, payer_id, payee_id, service_amount_minor, currency,
             platform_fee_minor, provider_tax_minor, tasker_tax_minor, total_tax_minor,
             total_provider_payment_minor, amount_received_minor, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'escrow_funded')
            RETURNING id, contract_id, payer_id, payee_id,
                      service_amount_minor, currency,
                      platform_fee_minor, provider_tax_minor, tasker_tax_minor,
                      total_tax_minor, total_provider_payment_minor, amount_received_minor,
                      status, created_at, updated_at
            "#,
        )
        .bind(contract_id)
        .bind(payer_id)
        .bind(payee_id)
        .bind(breakdown.service_amount_minor)
        .bind(currency)
        .bind(breakdown.platform_fee_minor)
        .bind(breakdown.provider_tax_minor)
        .bind(breakdown.tasker_tax_minor)
        .bind(breakdown.total_tax_minor)
        .bind(breakdown.total_provider_payment_minor)
        .bind(breakdown.amount_received_minor)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some((contract, payment)))
    }

    async fn get_payment_by_contract(&self, contract_id: Uuid) -> Result<Option<Payment>, Error> {
        sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, contract_id, payer_id, payee_id,
                   service_amount_minor, currency,
                   platform_fee_minor, provider_tax_minor, tasker_tax_minor,
                   total_tax_minor, total_provider_payment_minor, amount_received_minor,
                   status, created_at, updated_at
            FROM payments
            WHERE contract_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(contract_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn settle_payment(&self, contract_id: Uuid) -> Result<Option<Payment>, Error> {
        sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments
            SET status = 'succeeded', updated_at = NOW()
            WHERE contract_id = $1 AND status = 'escrow_funded'
            RETURNING id, contract_id, payer_id, payee_id,
                      service_amount_minor, currency,
                      platform_fee_minor, provider_tax_minor, tasker_tax_minor,
                      total_tax_minor, total_provider_payment_minor, amount_received_minor,
                      status, created_at, updated_at
            "#,
        )
        .bind(contract_id)
        .fetch_optional(&self.pool)
        .await
    }
}
