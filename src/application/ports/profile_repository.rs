use crate::domain::{UserId, UserRole};
use async_trait::async_trait;

use super::RepositoryError;

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub id: UserId,
    pub email: String,
    pub full_name: Option<String>,
    pub role: Option<UserRole>,
    pub rating: Option<f32>,
    pub completed_jobs: Option<u32>,
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get(&self, id: UserId) -> Result<Option<Profile>, RepositoryError>;

    async fn upsert(&self, profile: &Profile) -> Result<(), RepositoryError>;
}
