use std::sync::Arc;

use futures::StreamExt;
use serde::Deserialize;
use sqlx::{PgPool, postgres::PgListener};
use tracing::{Level, error, span, warn};
use uuid::Uuid;

use crate::application::ports::{JobRepository, RepositoryError};
use crate::domain::{ChangeKind, JobChange, JobId};
use crate::infrastructure::persistence::pg_pool::map_sqlx_error;
use crate::infrastructure::realtime::JobChangeBus;

pub const JOB_CHANGES_CHANNEL: &str = "job_changes";

/// Shape written by the `notify_job_change` trigger.
#[derive(Debug, Deserialize)]
struct NotifyPayload {
    kind: String,
    job_id: Uuid,
}

fn decode_payload(payload: &str) -> Result<(ChangeKind, JobId), String> {
    let raw: NotifyPayload = serde_json::from_str(payload).map_err(|e| e.to_string())?;
    Ok((raw.kind.parse()?, JobId::from_uuid(raw.job_id)))
}

/// Bridges Postgres `NOTIFY job_changes` into the in-process change bus.
pub struct PgJobChangeListener;

impl PgJobChangeListener {
    /// Starts listening and forwards every notification until the connection
    /// stream ends. Rows are re-read so subscribers get the current record.
    pub async fn spawn(
        pool: &PgPool,
        jobs: Arc<dyn JobRepository>,
        bus: Arc<JobChangeBus>,
    ) -> Result<tokio::task::JoinHandle<()>, RepositoryError> {
        let mut listener = PgListener::connect_with(pool)
            .await
            .map_err(map_sqlx_error)?;
        listener
            .listen(JOB_CHANGES_CHANNEL)
            .await
            .map_err(map_sqlx_error)?;

        let listener_span = span!(Level::INFO, "pg_listener", channel = JOB_CHANGES_CHANNEL);

        let handle = tokio::spawn(async move {
            let mut stream = Box::pin(listener.into_stream());
            while let Some(message) = stream.next().await {
                let notification = match message {
                    Ok(n) => n,
                    Err(e) => {
                        error!(parent: &listener_span, error = %e, "Error receiving notification");
                        continue;
                    }
                };

                let (kind, job_id) = match decode_payload(notification.payload()) {
                    Ok(decoded) => decoded,
                    Err(e) => {
                        error!(parent: &listener_span, error = %e, "Undecodable job notification");
                        continue;
                    }
                };

                let record = if kind == ChangeKind::Delete {
                    None
                } else {
                    match jobs.get_by_id(job_id).await {
                        Ok(record) => record,
                        Err(e) => {
                            warn!(parent: &listener_span, error = %e, job_id = %job_id, "Could not load changed job");
                            None
                        }
                    }
                };

                bus.publish(JobChange {
                    kind,
                    job_id,
                    record,
                });
            }
            warn!(parent: &listener_span, "Job change stream ended");
        });

        Ok(handle)
    }
}
