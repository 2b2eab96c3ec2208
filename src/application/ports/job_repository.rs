use crate::domain::{Job, JobId, JobStatus, NewJob, UserId};
use async_trait::async_trait;

use super::RepositoryError;

/// Row storage for jobs.
///
/// Every mutating method is a conditional write: it only touches the row when
/// the stated precondition still holds in the store, and returns `Ok(None)`
/// when nothing matched. Callers never read-then-write.
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn insert(&self, job: &NewJob) -> Result<Job, RepositoryError>;

    async fn get_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError>;

    /// `status = ASSIGNED, provider_id = provider` where the job is still
    /// `OPEN` with no provider.
    async fn assign_if_open(
        &self,
        id: JobId,
        provider_id: UserId,
    ) -> Result<Option<Job>, RepositoryError>;

    /// Moves `from -> to`. When `provider_id` is given the row must also be
    /// bound to that provider.
    async fn transition_status(
        &self,
        id: JobId,
        from: JobStatus,
        to: JobStatus,
        provider_id: Option<UserId>,
    ) -> Result<Option<Job>, RepositoryError>;

    /// Records the checkout session for an unpaid completed job.
    async fn attach_checkout_session(
        &self,
        id: JobId,
        checkout_session_id: &str,
    ) -> Result<Option<Job>, RepositoryError>;

    /// `payment_status = PAID` where the job is `COMPLETED`. Matching an
    /// already paid row is a success, not a second write.
    async fn mark_paid(&self, id: JobId) -> Result<Option<Job>, RepositoryError>;

    async fn list_for_client(&self, client_id: UserId) -> Result<Vec<Job>, RepositoryError>;

    /// Open, unassigned jobs whose address contains `address_filter`,
    /// case-insensitively.
    async fn list_open(&self, address_filter: Option<&str>) -> Result<Vec<Job>, RepositoryError>;

    /// Jobs bound to a provider, excluding `OPEN`.
    async fn list_for_provider(&self, provider_id: UserId) -> Result<Vec<Job>, RepositoryError>;
}
