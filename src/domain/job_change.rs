use std::fmt;
use std::str::FromStr;

use super::{Job, JobId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Insert => "INSERT",
            ChangeKind::Update => "UPDATE",
            ChangeKind::Delete => "DELETE",
        }
    }
}

impl FromStr for ChangeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "INSERT" => Ok(ChangeKind::Insert),
            "UPDATE" => Ok(ChangeKind::Update),
            "DELETE" => Ok(ChangeKind::Delete),
            _ => Err(format!("Invalid change kind: {}", s)),
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A row-level change notification from the job store. `record` carries the
/// new row when the source has it; consumers must not rely on it being fresh.
#[derive(Debug, Clone, PartialEq)]
pub struct JobChange {
    pub kind: ChangeKind,
    pub job_id: JobId,
    pub record: Option<Job>,
}

impl JobChange {
    pub fn inserted(job: &Job) -> Self {
        Self {
            kind: ChangeKind::Insert,
            job_id: job.id,
            record: Some(job.clone()),
        }
    }

    pub fn updated(job: &Job) -> Self {
        Self {
            kind: ChangeKind::Update,
            job_id: job.id,
            record: Some(job.clone()),
        }
    }

    /// An insert of a job nobody has picked up yet.
    pub fn is_new_open_job(&self) -> bool {
        self.kind == ChangeKind::Insert && self.record.as_ref().is_some_and(Job::is_available)
    }
}
