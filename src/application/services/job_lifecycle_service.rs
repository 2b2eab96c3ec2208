use std::sync::Arc;

use tracing::instrument;

use crate::application::ports::{
    CheckoutRequest, CheckoutSession, CheckoutSessionStatus, JobRepository, PaymentGateway,
};
use crate::domain::{
    BookingDraft, Job, JobId, JobStatus, NewJob, PaymentConfirmation, PaymentReturn,
    TransitionError, User, UserId, UserRole,
};

use super::LifecycleError;

/// Drives a job from posting through payment. Every call names its actor;
/// there is no ambient current user.
pub struct JobLifecycleService {
    jobs: Arc<dyn JobRepository>,
    payments: Arc<dyn PaymentGateway>,
}

impl JobLifecycleService {
    pub fn new(jobs: Arc<dyn JobRepository>, payments: Arc<dyn PaymentGateway>) -> Self {
        Self { jobs, payments }
    }

    #[instrument(skip(self, actor, new_job), fields(client_id = %actor.id))]
    pub async fn create(&self, actor: &User, new_job: NewJob) -> Result<Job, LifecycleError> {
        require_role(actor, UserRole::Client)?;
        if new_job.client_id != actor.id {
            return Err(LifecycleError::Forbidden(
                "jobs can only be posted for your own account".to_string(),
            ));
        }
        new_job.validate()?;

        let job = self.jobs.insert(&new_job).await?;
        tracing::info!(
            job_id = %job.id,
            category = %job.category,
            price = %job.price,
            "Job posted"
        );
        Ok(job)
    }

    pub async fn book(&self, actor: &User, draft: BookingDraft) -> Result<Job, LifecycleError> {
        let new_job = draft.submit(actor.id)?;
        self.create(actor, new_job).await
    }

    #[instrument(skip(self, actor), fields(provider_id = %actor.id))]
    pub async fn accept(&self, actor: &User, id: JobId) -> Result<Job, LifecycleError> {
        require_role(actor, UserRole::Provider)?;

        let job = self.load(id).await?;
        if !job.is_available() {
            return Err(LifecycleError::JobUnavailable(id));
        }

        match self.jobs.assign_if_open(id, actor.id).await? {
            Some(job) => {
                tracing::info!(from = %JobStatus::Open, to = %job.status, "Job accepted");
                Ok(job)
            }
            None => {
                tracing::warn!("Accept lost to a concurrent writer");
                Err(LifecycleError::JobUnavailable(id))
            }
        }
    }

    #[instrument(skip(self, actor), fields(provider_id = %actor.id))]
    pub async fn start(&self, actor: &User, id: JobId) -> Result<Job, LifecycleError> {
        require_role(actor, UserRole::Provider)?;
        let provider = actor.id;
        self.advance(id, JobStatus::InProgress, Some(provider), |job| {
            job.start(provider)
        })
        .await
    }

    #[instrument(skip(self, actor), fields(provider_id = %actor.id))]
    pub async fn complete(&self, actor: &User, id: JobId) -> Result<Job, LifecycleError> {
        require_role(actor, UserRole::Provider)?;
        let provider = actor.id;
        self.advance(id, JobStatus::Completed, Some(provider), |job| {
            job.complete(provider)
        })
        .await
    }

    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn cancel(&self, actor: &User, id: JobId) -> Result<Job, LifecycleError> {
        let job = self.load(id).await?;
        let is_owner = actor.role == UserRole::Client && job.client_id == actor.id;
        if !is_owner && !actor.is_admin() {
            return Err(LifecycleError::Forbidden(
                "only the posting client or an admin may cancel".to_string(),
            ));
        }
        self.advance(id, JobStatus::Cancelled, None, Job::cancel).await
    }

    /// Opens a processor-hosted checkout for a finished, unpaid job. The
    /// caller redirects the browser to the returned URL.
    #[instrument(skip(self, actor, success_url, cancel_url), fields(client_id = %actor.id))]
    pub async fn initiate_payment(
        &self,
        actor: &User,
        id: JobId,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession, LifecycleError> {
        let job = self.load(id).await?;
        require_owner(actor, &job)?;

        if job.status != JobStatus::Completed {
            return Err(LifecycleError::PaymentNotAllowed(format!(
                "job is {}",
                job.status
            )));
        }
        if job.is_paid() {
            return Err(LifecycleError::PaymentNotAllowed(
                "job is already paid".to_string(),
            ));
        }
        if success_url.trim().is_empty() || cancel_url.trim().is_empty() {
            return Err(LifecycleError::InvalidRequest(
                "success and cancel URLs are required".to_string(),
            ));
        }

        let request = CheckoutRequest {
            job_id: job.id,
            amount: job.price,
            service_name: job.service_type.clone(),
            success_url: success_url.to_string(),
            cancel_url: cancel_url.to_string(),
        };

        let session = self.payments.create_checkout_session(&request).await?;

        if self
            .jobs
            .attach_checkout_session(id, &session.id)
            .await?
            .is_none()
        {
            return Err(LifecycleError::PaymentNotAllowed(
                "job changed while checkout was being created".to_string(),
            ));
        }

        tracing::info!(checkout_session_id = %session.id, amount = %job.price, "Checkout session created");
        Ok(session)
    }

    /// The only writer of `payment_status`. Fed by processor-verified
    /// confirmations; replays are harmless.
    #[instrument(skip(self, confirmation), fields(job_id = %confirmation.job_id, checkout_session_id = %confirmation.checkout_session_id))]
    pub async fn confirm_payment(
        &self,
        confirmation: &PaymentConfirmation,
    ) -> Result<Job, LifecycleError> {
        let job = self.load(confirmation.job_id).await?;

        if let Some(amount) = confirmation.amount_cents {
            if amount != job.price.cents() {
                tracing::warn!(
                    expected = job.price.cents(),
                    received = amount,
                    "Payment amount does not match job price"
                );
                return Err(LifecycleError::PaymentUnverified(job.id));
            }
        }

        if job.is_paid() {
            tracing::debug!("Payment already recorded");
            return Ok(job);
        }

        match self.jobs.mark_paid(job.id).await? {
            Some(paid) => {
                tracing::info!("Payment recorded");
                Ok(paid)
            }
            None => {
                let fresh = self.load(job.id).await?;
                Err(TransitionError::PaymentRequiresCompletion(fresh.status).into())
            }
        }
    }

    /// Handles the browser coming back from checkout. The return URL only says
    /// which job to look at; the processor is asked whether it was paid.
    #[instrument(skip(self, actor), fields(client_id = %actor.id, job_id = %payment_return.job_id))]
    pub async fn reconcile_payment_return(
        &self,
        actor: &User,
        payment_return: PaymentReturn,
    ) -> Result<Job, LifecycleError> {
        let job = self.load(payment_return.job_id).await?;
        require_owner(actor, &job)?;

        if job.is_paid() {
            return Ok(job);
        }

        let Some(session_id) = job.checkout_session_id.clone() else {
            tracing::warn!("Payment return for a job without a checkout session");
            return Err(LifecycleError::PaymentUnverified(job.id));
        };

        let state = self.payments.retrieve_checkout_session(&session_id).await?;
        let same_job = state.job_id.is_none_or(|paid_for| paid_for == job.id);

        if state.status != CheckoutSessionStatus::Paid || !same_job {
            tracing::warn!(status = ?state.status, "Processor does not confirm payment");
            return Err(LifecycleError::PaymentUnverified(job.id));
        }

        self.confirm_payment(&PaymentConfirmation {
            job_id: job.id,
            checkout_session_id: state.id,
            amount_cents: state.amount_cents,
        })
        .await
    }

    pub async fn get(&self, actor: &User, id: JobId) -> Result<Job, LifecycleError> {
        let job = self.load(id).await?;
        let visible = actor.is_admin()
            || job.client_id == actor.id
            || job.provider_id == Some(actor.id)
            || (actor.role == UserRole::Provider && job.is_available());
        if !visible {
            return Err(LifecycleError::NotFound(id));
        }
        Ok(job)
    }

    /// A client's own jobs, newest first.
    pub async fn list_for_client(
        &self,
        actor: &User,
        client_id: UserId,
    ) -> Result<Vec<Job>, LifecycleError> {
        if actor.id != client_id && !actor.is_admin() {
            return Err(LifecycleError::Forbidden(
                "cannot list another client's jobs".to_string(),
            ));
        }
        Ok(self.jobs.list_for_client(client_id).await?)
    }

    /// The market feed: open, unassigned jobs, newest first.
    pub async fn list_market(
        &self,
        actor: &User,
        address_filter: Option<&str>,
    ) -> Result<Vec<Job>, LifecycleError> {
        if !actor.is_admin() {
            require_role(actor, UserRole::Provider)?;
        }
        let filter = address_filter.map(str::trim).filter(|f| !f.is_empty());
        Ok(self.jobs.list_open(filter).await?)
    }

    /// A provider's schedule, newest first.
    pub async fn list_schedule(&self, actor: &User) -> Result<Vec<Job>, LifecycleError> {
        require_role(actor, UserRole::Provider)?;
        Ok(self.jobs.list_for_provider(actor.id).await?)
    }

    async fn load(&self, id: JobId) -> Result<Job, LifecycleError> {
        self.jobs
            .get_by_id(id)
            .await?
            .ok_or(LifecycleError::NotFound(id))
    }

    /// Checks the move against the current row, then applies it as a
    /// compare-and-swap on that row's status. On a lost race the move is
    /// re-checked against the fresh row so the caller sees why it failed.
    async fn advance<F>(
        &self,
        id: JobId,
        to: JobStatus,
        provider_guard: Option<UserId>,
        apply: F,
    ) -> Result<Job, LifecycleError>
    where
        F: Fn(&mut Job) -> Result<(), TransitionError>,
    {
        let job = self.load(id).await?;
        let from = job.status;
        apply(&mut job.clone())?;

        match self
            .jobs
            .transition_status(id, from, to, provider_guard)
            .await?
        {
            Some(updated) => {
                tracing::info!(job_id = %id, from = %from, to = %to, "Job status transition");
                Ok(updated)
            }
            None => {
                let fresh = self.load(id).await?;
                apply(&mut fresh.clone())?;
                Err(TransitionError::InvalidTransition {
                    from: fresh.status,
                    to,
                }
                .into())
            }
        }
    }
}

fn require_role(actor: &User, required: UserRole) -> Result<(), LifecycleError> {
    if actor.role != required {
        return Err(LifecycleError::WrongRole {
            required,
            actual: actor.role,
        });
    }
    Ok(())
}

fn require_owner(actor: &User, job: &Job) -> Result<(), LifecycleError> {
    if job.client_id != actor.id {
        return Err(LifecycleError::Forbidden(
            "only the client who posted the job may pay for it".to_string(),
        ));
    }
    Ok(())
}
