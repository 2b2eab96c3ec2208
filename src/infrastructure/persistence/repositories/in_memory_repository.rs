use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::application::ports::{JobRepository, Profile, ProfileRepository, RepositoryError};
use crate::domain::{Job, JobChange, JobId, JobStatus, NewJob, UserId};
use crate::infrastructure::realtime::JobChangeBus;

struct StoredJob {
    seq: u64,
    job: Job,
}

#[derive(Default)]
struct JobTable {
    next_seq: u64,
    rows: HashMap<JobId, StoredJob>,
}

/// Process-local job store for scaffold mode and tests. Conditional writes
/// hold the table lock across check and write, so they are atomic here just as
/// a filtered `UPDATE` is in Postgres.
pub struct InMemoryJobRepository {
    table: Mutex<JobTable>,
    changes: Option<Arc<JobChangeBus>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(JobTable::default()),
            changes: None,
        }
    }

    /// Publishes a change event for every successful write.
    pub fn with_change_bus(changes: Arc<JobChangeBus>) -> Self {
        Self {
            table: Mutex::new(JobTable::default()),
            changes: Some(changes),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, JobTable>, RepositoryError> {
        self.table
            .lock()
            .map_err(|_| RepositoryError::QueryFailed("job table lock poisoned".to_string()))
    }

    fn publish(&self, change: JobChange) {
        if let Some(bus) = &self.changes {
            bus.publish(change);
        }
    }

    /// Applies `f` to the row; `f` returning `false` means the precondition
    /// failed and nothing is written.
    fn update_where<F>(&self, id: JobId, f: F) -> Result<Option<Job>, RepositoryError>
    where
        F: FnOnce(&mut Job) -> bool,
    {
        let updated = {
            let mut table = self.lock()?;
            let Some(stored) = table.rows.get_mut(&id) else {
                return Ok(None);
            };
            let mut candidate = stored.job.clone();
            if !f(&mut candidate) {
                return Ok(None);
            }
            if candidate == stored.job {
                return Ok(Some(candidate));
            }
            candidate.updated_at = Utc::now();
            stored.job = candidate.clone();
            candidate
        };
        self.publish(JobChange::updated(&updated));
        Ok(Some(updated))
    }

    fn select<P>(&self, predicate: P) -> Result<Vec<Job>, RepositoryError>
    where
        P: Fn(&Job) -> bool,
    {
        let table = self.lock()?;
        let mut matches: Vec<&StoredJob> =
            table.rows.values().filter(|s| predicate(&s.job)).collect();
        matches.sort_by(|a, b| {
            b.job
                .created_at
                .cmp(&a.job.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        Ok(matches.into_iter().map(|s| s.job.clone()).collect())
    }
}

impl Default for InMemoryJobRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn insert(&self, new_job: &NewJob) -> Result<Job, RepositoryError> {
        let job = {
            let mut table = self.lock()?;
            let job = Job::open(JobId::new(), new_job.clone(), Utc::now());
            let seq = table.next_seq;
            table.next_seq += 1;
            table.rows.insert(
                job.id,
                StoredJob {
                    seq,
                    job: job.clone(),
                },
            );
            job
        };
        self.publish(JobChange::inserted(&job));
        Ok(job)
    }

    async fn get_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(self.lock()?.rows.get(&id).map(|s| s.job.clone()))
    }

    async fn assign_if_open(
        &self,
        id: JobId,
        provider_id: UserId,
    ) -> Result<Option<Job>, RepositoryError> {
        self.update_where(id, |job| job.accept(provider_id).is_ok())
    }

    async fn transition_status(
        &self,
        id: JobId,
        from: JobStatus,
        to: JobStatus,
        provider_id: Option<UserId>,
    ) -> Result<Option<Job>, RepositoryError> {
        self.update_where(id, |job| {
            let provider_matches = provider_id.is_none_or(|p| job.provider_id == Some(p));
            if job.status != from || !provider_matches || !from.can_transition_to(to) {
                return false;
            }
            job.status = to;
            true
        })
    }

    async fn attach_checkout_session(
        &self,
        id: JobId,
        checkout_session_id: &str,
    ) -> Result<Option<Job>, RepositoryError> {
        self.update_where(id, |job| {
            if job.status != JobStatus::Completed || job.is_paid() {
                return false;
            }
            job.checkout_session_id = Some(checkout_session_id.to_string());
            true
        })
    }

    async fn mark_paid(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        self.update_where(id, |job| job.mark_paid().is_ok())
    }

    async fn list_for_client(&self, client_id: UserId) -> Result<Vec<Job>, RepositoryError> {
        self.select(|job| job.client_id == client_id)
    }

    async fn list_open(&self, address_filter: Option<&str>) -> Result<Vec<Job>, RepositoryError> {
        self.select(|job| job.is_available() && address_filter.is_none_or(|f| job.address_contains(f)))
    }

    async fn list_for_provider(&self, provider_id: UserId) -> Result<Vec<Job>, RepositoryError> {
        self.select(|job| job.provider_id == Some(provider_id) && job.status != JobStatus::Open)
    }
}

#[derive(Default)]
pub struct InMemoryProfileRepository {
    profiles: Mutex<HashMap<UserId, Profile>>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<UserId, Profile>>, RepositoryError> {
        self.profiles
            .lock()
            .map_err(|_| RepositoryError::QueryFailed("profile table lock poisoned".to_string()))
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn get(&self, id: UserId) -> Result<Option<Profile>, RepositoryError> {
        Ok(self.lock()?.get(&id).cloned())
    }

    async fn upsert(&self, profile: &Profile) -> Result<(), RepositoryError> {
        let mut profiles = self.lock()?;
        match profiles.get_mut(&profile.id) {
            Some(existing) => {
                existing.email = profile.email.clone();
                if profile.full_name.is_some() {
                    existing.full_name = profile.full_name.clone();
                }
                if profile.role.is_some() {
                    existing.role = profile.role;
                }
            }
            None => {
                profiles.insert(profile.id, profile.clone());
            }
        }
        Ok(())
    }
}
