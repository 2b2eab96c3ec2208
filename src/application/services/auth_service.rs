use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::instrument;

use crate::application::ports::{
    Identity, IdentityError, IdentityProvider, Profile, ProfileRepository, RepositoryError,
    SignUpMetadata,
};
use crate::domain::{User, UserId, UserRole};

const AUTH_EVENT_CAPACITY: usize = 64;
const MIN_PASSWORD_LENGTH: usize = 6;
const DEFAULT_DISPLAY_NAME: &str = "User";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(UserId),
    SignedOut(UserId),
}

#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub user: User,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("identity: {0}")]
    Identity(#[from] IdentityError),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}

/// Resolves bearer tokens to users and fronts the identity provider.
///
/// A session lookup that does not finish within `session_timeout` counts as
/// logged out.
pub struct AuthService {
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileRepository>,
    session_timeout: Duration,
    events: broadcast::Sender<AuthEvent>,
}

impl AuthService {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileRepository>,
        session_timeout: Duration,
    ) -> Self {
        let (events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);
        Self {
            identity,
            profiles,
            session_timeout,
            events,
        }
    }

    /// Auth state changes, for anything that must react to sign-out.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    pub async fn current_user(&self, access_token: &str) -> Option<User> {
        let lookup = async {
            match self.identity.current_identity(access_token).await {
                Ok(Some(identity)) => Some(self.resolve_user(identity).await),
                Ok(None) => None,
                Err(e) => {
                    tracing::warn!(error = %e, "Session lookup failed");
                    None
                }
            }
        };

        match tokio::time::timeout(self.session_timeout, lookup).await {
            Ok(user) => user,
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.session_timeout.as_millis() as u64,
                    "Session lookup timed out, treating as signed out"
                );
                None
            }
        }
    }

    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::InvalidRequest(
                "email and password are required".to_string(),
            ));
        }

        let session = self.identity.sign_in(email.trim(), password).await?;
        let user = self.resolve_user(session.identity).await;
        self.publish(AuthEvent::SignedIn(user.id));

        tracing::info!(user_id = %user.id, role = %user.role, "User signed in");
        Ok(Session {
            access_token: session.access_token,
            user,
        })
    }

    #[instrument(skip(self, password))]
    pub async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<User, AuthError> {
        if name.trim().is_empty() || email.trim().is_empty() {
            return Err(AuthError::InvalidRequest(
                "name and email are required".to_string(),
            ));
        }
        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::InvalidRequest(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        let metadata = SignUpMetadata {
            full_name: name.trim().to_string(),
            user_type: role.as_str().to_string(),
        };
        let identity = self
            .identity
            .sign_up(email.trim(), password, &metadata)
            .await?;

        let profile = Profile {
            id: identity.id,
            email: identity.email.clone(),
            full_name: Some(metadata.full_name.clone()),
            role: Some(role),
            rating: None,
            completed_jobs: None,
        };
        // Registration stands even if the profile write fails.
        if let Err(e) = self.profiles.upsert(&profile).await {
            tracing::error!(error = %e, user_id = %identity.id, "Profile save failed");
        }

        tracing::info!(user_id = %identity.id, role = %role, "User registered");
        Ok(self.resolve_user(identity).await)
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let identity = self.identity.current_identity(access_token).await.ok().flatten();
        self.identity.sign_out(access_token).await?;

        if let Some(identity) = identity {
            tracing::info!(user_id = %identity.id, "User signed out");
            self.publish(AuthEvent::SignedOut(identity.id));
        }
        Ok(())
    }

    /// Profile row first, then identity metadata, then defaults. Admin only comes from the profile row.
    async fn resolve_user(&self, identity: Identity) -> User {
        let profile = match self.profiles.get(identity.id).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(error = %e, user_id = %identity.id, "Profile lookup failed");
                None
            }
        };

        let name = profile
            .as_ref()
            .and_then(|p| p.full_name.clone())
            .or(identity.full_name)
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string());

        let role = profile
            .as_ref()
            .and_then(|p| p.role)
            .or_else(|| {
                identity
                    .user_type
                    .as_deref()
                    .and_then(|t| t.parse().ok())
                    .filter(|role| *role != UserRole::Admin)
            })
            .unwrap_or_default();

        User {
            id: identity.id,
            name,
            email: identity.email,
            role,
            rating: profile.as_ref().and_then(|p| p.rating),
            completed_jobs: profile.as_ref().and_then(|p| p.completed_jobs),
        }
    }

    fn publish(&self, event: AuthEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}
