use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{Profile, ProfileRepository, RepositoryError};
use crate::domain::UserId;
use crate::infrastructure::persistence::pg_pool::map_sqlx_error;

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    email: String,
    full_name: Option<String>,
    user_type: Option<String>,
    rating: Option<f32>,
    completed_jobs: Option<i32>,
}

pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    #[instrument(skip(self), fields(user_id = %id))]
    async fn get(&self, id: UserId) -> Result<Option<Profile>, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, email, full_name, user_type, rating, completed_jobs
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(|r| Profile {
            id: UserId::from_uuid(r.id),
            email: r.email,
            full_name: r.full_name,
            // Unknown role strings fall through to identity metadata.
            role: r.user_type.and_then(|t| t.parse().ok()),
            rating: r.rating,
            completed_jobs: r.completed_jobs.and_then(|n| u32::try_from(n).ok()),
        }))
    }

    #[instrument(skip(self, profile), fields(user_id = %profile.id))]
    async fn upsert(&self, profile: &Profile) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO profiles (id, email, full_name, user_type)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET email = EXCLUDED.email,
                full_name = COALESCE(EXCLUDED.full_name, profiles.full_name),
                user_type = COALESCE(EXCLUDED.user_type, profiles.user_type)
            "#,
        )
        .bind(profile.id.as_uuid())
        .bind(&profile.email)
        .bind(&profile.full_name)
        .bind(profile.role.map(|r| r.as_str()))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }
}
