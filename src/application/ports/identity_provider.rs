use async_trait::async_trait;

use crate::domain::UserId;

/// What the identity service knows about an account, before profile data is
/// merged in.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub id: UserId,
    pub email: String,
    pub full_name: Option<String>,
    pub user_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignUpMetadata {
    pub full_name: String,
    pub user_type: String,
}

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub access_token: String,
    pub identity: Identity,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_identity(&self, access_token: &str)
    -> Result<Option<Identity>, IdentityError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, IdentityError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<Identity, IdentityError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError>;
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("account already exists: {0}")]
    AlreadyRegistered(String),
    #[error("identity request failed: {0}")]
    RequestFailed(String),
    #[error("invalid identity response: {0}")]
    InvalidResponse(String),
}
