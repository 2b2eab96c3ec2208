use chrono::{DateTime, NaiveDate, Utc};

use super::{JobId, JobStatus, PaymentStatus, Price, ServiceCategory, UserId};

#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: JobId,
    pub client_id: UserId,
    pub provider_id: Option<UserId>,
    pub category: ServiceCategory,
    pub service_type: String,
    pub description: Option<String>,
    pub address: String,
    pub price: Price,
    pub scheduled_date: Option<NaiveDate>,
    pub status: JobStatus,
    pub payment_status: PaymentStatus,
    pub checkout_session_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Inputs for a job a client is posting. The store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJob {
    pub client_id: UserId,
    pub category: ServiceCategory,
    pub service_type: String,
    pub price: Price,
    pub address: String,
    pub description: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum JobValidationError {
    #[error("service type is required")]
    MissingServiceType,
    #[error("address is required")]
    MissingAddress,
    #[error("unknown service option: {0}")]
    UnknownServiceOption(String),
    #[error("invalid price: {0}")]
    Price(#[from] super::PriceError),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransitionError {
    #[error("cannot move job from {from} to {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },
    #[error("job is already assigned")]
    AlreadyAssigned,
    #[error("only the assigned provider may update this job")]
    NotAssignedProvider,
    #[error("payment requires a completed job, status is {0}")]
    PaymentRequiresCompletion(JobStatus),
}

impl NewJob {
    pub fn validate(&self) -> Result<(), JobValidationError> {
        if self.service_type.trim().is_empty() {
            return Err(JobValidationError::MissingServiceType);
        }
        if self.address.trim().is_empty() {
            return Err(JobValidationError::MissingAddress);
        }
        Ok(())
    }
}

impl Job {
    pub fn open(id: JobId, new_job: NewJob, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            client_id: new_job.client_id,
            provider_id: None,
            category: new_job.category,
            service_type: new_job.service_type,
            description: new_job.description,
            address: new_job.address,
            price: new_job.price,
            scheduled_date: new_job.scheduled_date,
            status: JobStatus::Open,
            payment_status: PaymentStatus::Unpaid,
            checkout_session_id: None,
            created_at,
            updated_at: created_at,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    /// Visible on the market feed: open and nobody bound to it yet.
    pub fn is_available(&self) -> bool {
        self.status == JobStatus::Open && self.provider_id.is_none()
    }

    pub fn address_contains(&self, needle: &str) -> bool {
        let needle = needle.trim();
        needle.is_empty() || self.address.to_lowercase().contains(&needle.to_lowercase())
    }

    pub fn accept(&mut self, provider_id: UserId) -> Result<(), TransitionError> {
        if self.provider_id.is_some() {
            return Err(TransitionError::AlreadyAssigned);
        }
        self.transition(JobStatus::Assigned)?;
        self.provider_id = Some(provider_id);
        Ok(())
    }

    pub fn start(&mut self, actor: UserId) -> Result<(), TransitionError> {
        self.ensure_assigned_to(actor)?;
        self.transition(JobStatus::InProgress)
    }

    pub fn complete(&mut self, actor: UserId) -> Result<(), TransitionError> {
        self.ensure_assigned_to(actor)?;
        self.transition(JobStatus::Completed)
    }

    pub fn cancel(&mut self) -> Result<(), TransitionError> {
        self.transition(JobStatus::Cancelled)
    }

    /// Returns `false` when the job was already paid; the flag never reverts.
    pub fn mark_paid(&mut self) -> Result<bool, TransitionError> {
        if self.status != JobStatus::Completed {
            return Err(TransitionError::PaymentRequiresCompletion(self.status));
        }
        if self.is_paid() {
            return Ok(false);
        }
        self.payment_status = PaymentStatus::Paid;
        self.updated_at = Utc::now();
        Ok(true)
    }

    fn ensure_assigned_to(&self, actor: UserId) -> Result<(), TransitionError> {
        match self.provider_id {
            Some(provider) if provider == actor => Ok(()),
            _ => Err(TransitionError::NotAssignedProvider),
        }
    }

    fn transition(&mut self, next: JobStatus) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(TransitionError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}
