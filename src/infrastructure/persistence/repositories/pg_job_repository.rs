use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{JobRepository, RepositoryError};
use crate::domain::{Job, JobId, JobStatus, NewJob, Price, UserId};
use crate::infrastructure::persistence::pg_pool::map_sqlx_error;

const JOB_COLUMNS: &str = "id, client_id, provider_id, category, service_type, description, \
     address, price_cents, scheduled_date, status, payment_status, checkout_session_id, \
     created_at, updated_at";

#[derive(sqlx::FromRow)]
struct JobRow {
    id: Uuid,
    client_id: Uuid,
    provider_id: Option<Uuid>,
    category: String,
    service_type: String,
    description: Option<String>,
    address: String,
    price_cents: i64,
    scheduled_date: Option<NaiveDate>,
    status: String,
    payment_status: String,
    checkout_session_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for Job {
    type Error = RepositoryError;

    fn try_from(r: JobRow) -> Result<Self, Self::Error> {
        Ok(Job {
            id: JobId::from_uuid(r.id),
            client_id: UserId::from_uuid(r.client_id),
            provider_id: r.provider_id.map(UserId::from_uuid),
            category: r.category.parse().map_err(RepositoryError::CorruptRow)?,
            service_type: r.service_type,
            description: r.description,
            address: r.address,
            price: Price::from_cents(r.price_cents)
                .map_err(|e| RepositoryError::CorruptRow(e.to_string()))?,
            scheduled_date: r.scheduled_date,
            status: r.status.parse::<JobStatus>().map_err(RepositoryError::CorruptRow)?,
            payment_status: r.payment_status.parse().map_err(RepositoryError::CorruptRow)?,
            checkout_session_id: r.checkout_session_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

fn into_jobs(rows: Vec<JobRow>) -> Result<Vec<Job>, RepositoryError> {
    rows.into_iter().map(Job::try_from).collect()
}

fn into_job(row: Option<JobRow>) -> Result<Option<Job>, RepositoryError> {
    row.map(Job::try_from).transpose()
}

pub struct PgJobRepository {
    pool: PgPool,
}

impl PgJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobRepository for PgJobRepository {
    #[instrument(skip(self, job), fields(client_id = %job.client_id))]
    async fn insert(&self, job: &NewJob) -> Result<Job, RepositoryError> {
        let sql = format!(
            r#"
            INSERT INTO jobs (client_id, category, service_type, description, address,
                              price_cents, scheduled_date, status, payment_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'OPEN', 'UNPAID')
            RETURNING {JOB_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, JobRow>(&sql)
            .bind(job.client_id.as_uuid())
            .bind(job.category.as_str())
            .bind(&job.service_type)
            .bind(&job.description)
            .bind(&job.address)
            .bind(job.price.cents())
            .bind(job.scheduled_date)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Job::try_from(row)
    }

    #[instrument(skip(self), fields(job_id = %id))]
    async fn get_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1");

        let row = sqlx::query_as::<_, JobRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        into_job(row)
    }

    #[instrument(skip(self), fields(job_id = %id, provider_id = %provider_id))]
    async fn assign_if_open(
        &self,
        id: JobId,
        provider_id: UserId,
    ) -> Result<Option<Job>, RepositoryError> {
        let sql = format!(
            r#"
            UPDATE jobs
            SET status = 'ASSIGNED', provider_id = $2, updated_at = now()
            WHERE id = $1 AND status = 'OPEN' AND provider_id IS NULL
            RETURNING {JOB_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, JobRow>(&sql)
            .bind(id.as_uuid())
            .bind(provider_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        into_job(row)
    }

    #[instrument(skip(self), fields(job_id = %id, from = %from, to = %to))]
    async fn transition_status(
        &self,
        id: JobId,
        from: JobStatus,
        to: JobStatus,
        provider_id: Option<UserId>,
    ) -> Result<Option<Job>, RepositoryError> {
        if !from.can_transition_to(to) {
            return Ok(None);
        }

        let sql = format!(
            r#"
            UPDATE jobs
            SET status = $3, updated_at = now()
            WHERE id = $1 AND status = $2 AND ($4::uuid IS NULL OR provider_id = $4)
            RETURNING {JOB_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, JobRow>(&sql)
            .bind(id.as_uuid())
            .bind(from.as_str())
            .bind(to.as_str())
            .bind(provider_id.map(|p| p.as_uuid()))
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        into_job(row)
    }

    #[instrument(skip(self), fields(job_id = %id))]
    async fn attach_checkout_session(
        &self,
        id: JobId,
        checkout_session_id: &str,
    ) -> Result<Option<Job>, RepositoryError> {
        let sql = format!(
            r#"
            UPDATE jobs
            SET checkout_session_id = $2, updated_at = now()
            WHERE id = $1 AND status = 'COMPLETED' AND payment_status = 'UNPAID'
            RETURNING {JOB_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, JobRow>(&sql)
            .bind(id.as_uuid())
            .bind(checkout_session_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        into_job(row)
    }

    #[instrument(skip(self), fields(job_id = %id))]
    async fn mark_paid(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        let sql = format!(
            r#"
            UPDATE jobs
            SET payment_status = 'PAID', updated_at = now()
            WHERE id = $1 AND status = 'COMPLETED' AND payment_status = 'UNPAID'
            RETURNING {JOB_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, JobRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if row.is_some() {
            return into_job(row);
        }

        let already_paid = self
            .get_by_id(id)
            .await?
            .filter(|job| job.status == JobStatus::Completed && job.is_paid());
        Ok(already_paid)
    }

    #[instrument(skip(self), fields(client_id = %client_id))]
    async fn list_for_client(&self, client_id: UserId) -> Result<Vec<Job>, RepositoryError> {
        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE client_id = $1 ORDER BY created_at DESC"
        );

        let rows = sqlx::query_as::<_, JobRow>(&sql)
            .bind(client_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        into_jobs(rows)
    }

    #[instrument(skip(self))]
    async fn list_open(&self, address_filter: Option<&str>) -> Result<Vec<Job>, RepositoryError> {
        // strpos keeps the filter literal; LIKE would treat % and _ as wildcards.
        let sql = format!(
            r#"
            SELECT {JOB_COLUMNS}
            FROM jobs
            WHERE status = 'OPEN' AND provider_id IS NULL
              AND ($1::text IS NULL OR strpos(lower(address), lower($1)) > 0)
            ORDER BY created_at DESC
            "#
        );

        let rows = sqlx::query_as::<_, JobRow>(&sql)
            .bind(address_filter)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        into_jobs(rows)
    }

    #[instrument(skip(self), fields(provider_id = %provider_id))]
    async fn list_for_provider(&self, provider_id: UserId) -> Result<Vec<Job>, RepositoryError> {
        let sql = format!(
            r#"
            SELECT {JOB_COLUMNS}
            FROM jobs
            WHERE provider_id = $1 AND status <> 'OPEN'
            ORDER BY created_at DESC
            "#
        );

        let rows = sqlx::query_as::<_, JobRow>(&sql)
            .bind(provider_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        into_jobs(rows)
    }
}
