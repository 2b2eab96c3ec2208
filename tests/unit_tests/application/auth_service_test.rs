use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use snowmow::application::ports::{
    AuthSession, Identity, IdentityError, IdentityProvider, Profile, ProfileRepository,
    SignUpMetadata,
};
use snowmow::application::services::{AuthError, AuthEvent, AuthService};
use snowmow::domain::{UserId, UserRole};
use snowmow::infrastructure::identity::InMemoryIdentityProvider;
use snowmow::infrastructure::persistence::InMemoryProfileRepository;

fn service(identity: Arc<dyn IdentityProvider>) -> (AuthService, Arc<InMemoryProfileRepository>) {
    let profiles = Arc::new(InMemoryProfileRepository::new());
    let service = AuthService::new(identity, profiles.clone(), Duration::from_millis(200));
    (service, profiles)
}

/// Answers every token with a fixed identity, after a delay.
struct SlowIdentityProvider {
    delay: Duration,
    identity: Identity,
}

#[async_trait]
impl IdentityProvider for SlowIdentityProvider {
    async fn current_identity(
        &self,
        _access_token: &str,
    ) -> Result<Option<Identity>, IdentityError> {
        tokio::time::sleep(self.delay).await;
        Ok(Some(self.identity.clone()))
    }

    async fn sign_in(&self, _email: &str, _password: &str) -> Result<AuthSession, IdentityError> {
        Err(IdentityError::InvalidCredentials)
    }

    async fn sign_up(
        &self,
        _email: &str,
        _password: &str,
        _metadata: &SignUpMetadata,
    ) -> Result<Identity, IdentityError> {
        Err(IdentityError::RequestFailed("read only".to_string()))
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), IdentityError> {
        Ok(())
    }
}

fn bare_identity() -> Identity {
    Identity {
        id: UserId::new(),
        email: "nobody@example.com".to_string(),
        full_name: None,
        user_type: None,
    }
}

#[tokio::test]
async fn given_slow_identity_provider_when_resolving_session_then_signed_out() {
    let identity = Arc::new(SlowIdentityProvider {
        delay: Duration::from_secs(5),
        identity: bare_identity(),
    });
    let profiles = Arc::new(InMemoryProfileRepository::new());
    let service = AuthService::new(identity, profiles, Duration::from_millis(50));

    let user = service.current_user("any-token").await;

    assert!(user.is_none());
}

#[tokio::test]
async fn given_identity_without_metadata_when_resolving_then_defaults_apply() {
    let identity = Arc::new(SlowIdentityProvider {
        delay: Duration::ZERO,
        identity: bare_identity(),
    });
    let (service, _) = service(identity);

    let user = service.current_user("any-token").await.unwrap();

    assert_eq!(user.name, "User");
    assert_eq!(user.role, UserRole::Client);
    assert_eq!(user.email, "nobody@example.com");
}

#[tokio::test]
async fn given_profile_row_when_resolving_then_profile_wins_over_metadata() {
    let mut identity = bare_identity();
    identity.full_name = Some("Metadata Name".to_string());
    identity.user_type = Some("CLIENT".to_string());
    let id = identity.id;
    let (service, profiles) = service(Arc::new(SlowIdentityProvider {
        delay: Duration::ZERO,
        identity,
    }));
    profiles
        .upsert(&Profile {
            id,
            email: "nobody@example.com".to_string(),
            full_name: Some("Profile Name".to_string()),
            role: Some(UserRole::Provider),
            rating: Some(4.5),
            completed_jobs: Some(12),
        })
        .await
        .unwrap();

    let user = service.current_user("any-token").await.unwrap();

    assert_eq!(user.name, "Profile Name");
    assert_eq!(user.role, UserRole::Provider);
    assert_eq!(user.rating, Some(4.5));
    assert_eq!(user.completed_jobs, Some(12));
}

#[tokio::test]
async fn given_new_account_when_signing_up_then_profile_is_saved() {
    let (service, profiles) = service(Arc::new(InMemoryIdentityProvider::new()));

    let user = service
        .sign_up("Pat Plow", "pat@example.com", "hunter22", UserRole::Provider)
        .await
        .unwrap();

    let profile = profiles.get(user.id).await.unwrap().unwrap();
    assert_eq!(profile.full_name.as_deref(), Some("Pat Plow"));
    assert_eq!(profile.role, Some(UserRole::Provider));
    assert_eq!(user.role, UserRole::Provider);
}

#[tokio::test]
async fn given_short_password_when_signing_up_then_rejected() {
    let (service, _) = service(Arc::new(InMemoryIdentityProvider::new()));

    let result = service
        .sign_up("Pat", "pat@example.com", "abc", UserRole::Client)
        .await;

    assert!(matches!(result, Err(AuthError::InvalidRequest(_))));
}

#[tokio::test]
async fn given_existing_email_when_signing_up_then_already_registered() {
    let (service, _) = service(Arc::new(InMemoryIdentityProvider::new()));
    service
        .sign_up("Pat", "pat@example.com", "hunter22", UserRole::Client)
        .await
        .unwrap();

    let result = service
        .sign_up("Pat Again", "PAT@example.com", "hunter22", UserRole::Client)
        .await;

    assert!(matches!(
        result,
        Err(AuthError::Identity(IdentityError::AlreadyRegistered(_)))
    ));
}

#[tokio::test]
async fn given_session_when_signing_out_then_event_is_broadcast_and_token_dies() {
    let (service, _) = service(Arc::new(InMemoryIdentityProvider::new()));
    service
        .sign_up("Sam", "sam@example.com", "hunter22", UserRole::Client)
        .await
        .unwrap();
    let session = service.sign_in("sam@example.com", "hunter22").await.unwrap();
    let mut events = service.subscribe();

    service.sign_out(&session.access_token).await.unwrap();

    assert_eq!(events.recv().await.unwrap(), AuthEvent::SignedOut(session.user.id));
    assert!(service.current_user(&session.access_token).await.is_none());
}

#[tokio::test]
async fn given_wrong_password_when_signing_in_then_invalid_credentials() {
    let (service, _) = service(Arc::new(InMemoryIdentityProvider::new()));
    service
        .sign_up("Sam", "sam@example.com", "hunter22", UserRole::Client)
        .await
        .unwrap();

    let result = service.sign_in("sam@example.com", "hunter23").await;

    assert!(matches!(
        result,
        Err(AuthError::Identity(IdentityError::InvalidCredentials))
    ));
}

#[tokio::test]
async fn given_admin_user_type_in_identity_metadata_when_signing_in_then_role_is_client() {
    let identity = Arc::new(InMemoryIdentityProvider::new());
    let (service, _) = service(identity.clone());
    identity
        .sign_up(
            "mallory@example.com",
            "hunter22",
            &SignUpMetadata {
                full_name: "Mallory".to_string(),
                user_type: "ADMIN".to_string(),
            },
        )
        .await
        .unwrap();

    let session = service.sign_in("mallory@example.com", "hunter22").await.unwrap();

    assert_eq!(session.user.role, UserRole::Client);
}

#[tokio::test]
async fn given_admin_profile_row_when_signing_in_then_role_is_admin() {
    let identity = Arc::new(InMemoryIdentityProvider::new());
    let (service, profiles) = service(identity.clone());
    let created = identity
        .sign_up(
            "ops@example.com",
            "hunter22",
            &SignUpMetadata {
                full_name: "Ops".to_string(),
                user_type: "CLIENT".to_string(),
            },
        )
        .await
        .unwrap();
    profiles
        .upsert(&Profile {
            id: created.id,
            email: created.email.clone(),
            full_name: Some("Ops".to_string()),
            role: Some(UserRole::Admin),
            rating: None,
            completed_jobs: None,
        })
        .await
        .unwrap();

    let session = service.sign_in("ops@example.com", "hunter22").await.unwrap();

    assert_eq!(session.user.role, UserRole::Admin);
}
