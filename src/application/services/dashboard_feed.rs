use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::{Job, JobChange, JobId, User};

use super::{JobLifecycleService, LifecycleError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardView {
    ClientJobs,
    MarketFeed { filter: Option<String> },
    ProviderSchedule,
}

impl DashboardView {
    pub fn name(&self) -> &'static str {
        match self {
            DashboardView::ClientJobs => "client",
            DashboardView::MarketFeed { .. } => "market",
            DashboardView::ProviderSchedule => "schedule",
        }
    }
}

/// Locally held list for one dashboard. It is only ever replaced by a whole
/// authoritative snapshot, never patched.
#[derive(Debug, Clone, Default)]
pub struct ListState {
    jobs: Vec<Job>,
    revision: u64,
}

impl ListState {
    /// Returns whether the snapshot differed from what was held.
    pub fn replace(&mut self, snapshot: Vec<Job>) -> bool {
        if self.revision > 0 && self.jobs == snapshot {
            return false;
        }
        self.jobs = snapshot;
        self.revision += 1;
        true
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewJobNotice {
    pub job_id: JobId,
    pub service_type: String,
    pub address: String,
}

/// Keeps one viewer's dashboard in line with the store.
pub struct DashboardFeed {
    lifecycle: Arc<JobLifecycleService>,
    viewer: User,
    view: DashboardView,
    state: ListState,
    notified: HashSet<JobId>,
}

impl DashboardFeed {
    pub fn new(lifecycle: Arc<JobLifecycleService>, viewer: User, view: DashboardView) -> Self {
        Self {
            lifecycle,
            viewer,
            view,
            state: ListState::default(),
            notified: HashSet::new(),
        }
    }

    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    pub fn viewer(&self) -> &User {
        &self.viewer
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    /// Re-runs the view's query and replaces the held list. Returns whether it
    /// changed.
    pub async fn refresh(&mut self) -> Result<bool, LifecycleError> {
        let snapshot = match &self.view {
            DashboardView::ClientJobs => {
                self.lifecycle
                    .list_for_client(&self.viewer, self.viewer.id)
                    .await?
            }
            DashboardView::MarketFeed { filter } => {
                self.lifecycle
                    .list_market(&self.viewer, filter.as_deref())
                    .await?
            }
            DashboardView::ProviderSchedule => self.lifecycle.list_schedule(&self.viewer).await?,
        };
        Ok(self.state.replace(snapshot))
    }

    /// One notice per newly posted job, market feed only. Duplicate deliveries
    /// of the same insert stay silent.
    pub fn notice_for(&mut self, change: &JobChange) -> Option<NewJobNotice> {
        if !matches!(self.view, DashboardView::MarketFeed { .. }) || !change.is_new_open_job() {
            return None;
        }
        if !self.notified.insert(change.job_id) {
            return None;
        }
        change.record.as_ref().map(|job| NewJobNotice {
            job_id: job.id,
            service_type: job.service_type.clone(),
            address: job.address.clone(),
        })
    }
}
