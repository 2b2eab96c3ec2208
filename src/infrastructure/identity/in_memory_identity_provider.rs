use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::application::ports::{
    AuthSession, Identity, IdentityError, IdentityProvider, SignUpMetadata,
};
use crate::domain::UserId;

struct Account {
    identity: Identity,
    password_digest: String,
}

#[derive(Default)]
struct Directory {
    accounts: HashMap<String, Account>,
    tokens: HashMap<String, UserId>,
}

/// Identity provider kept in process memory, for scaffold mode and tests.
/// Passwords are held only as salted SHA-256 digests.
#[derive(Default)]
pub struct InMemoryIdentityProvider {
    directory: Mutex<Directory>,
}

fn digest(email: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.as_bytes());
    hasher.update([0u8]);
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Directory>, IdentityError> {
        self.directory
            .lock()
            .map_err(|_| IdentityError::RequestFailed("identity directory poisoned".to_string()))
    }

    /// Issues a token for an existing account without a password, for tests.
    pub fn issue_token(&self, id: UserId) -> Result<String, IdentityError> {
        let mut directory = self.lock()?;
        let token = Uuid::new_v4().simple().to_string();
        directory.tokens.insert(token.clone(), id);
        Ok(token)
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn current_identity(
        &self,
        access_token: &str,
    ) -> Result<Option<Identity>, IdentityError> {
        let directory = self.lock()?;
        let Some(id) = directory.tokens.get(access_token) else {
            return Ok(None);
        };
        Ok(directory
            .accounts
            .values()
            .find(|a| a.identity.id == *id)
            .map(|a| a.identity.clone()))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, IdentityError> {
        let email = normalize(email);
        let mut directory = self.lock()?;

        let identity = match directory.accounts.get(&email) {
            Some(account) if account.password_digest == digest(&email, password) => {
                account.identity.clone()
            }
            _ => return Err(IdentityError::InvalidCredentials),
        };

        let access_token = Uuid::new_v4().simple().to_string();
        directory.tokens.insert(access_token.clone(), identity.id);
        Ok(AuthSession {
            access_token,
            identity,
        })
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<Identity, IdentityError> {
        let email = normalize(email);
        let mut directory = self.lock()?;

        if directory.accounts.contains_key(&email) {
            return Err(IdentityError::AlreadyRegistered(email));
        }

        let identity = Identity {
            id: UserId::new(),
            email: email.clone(),
            full_name: Some(metadata.full_name.clone()),
            user_type: Some(metadata.user_type.clone()),
        };
        directory.accounts.insert(
            email.clone(),
            Account {
                identity: identity.clone(),
                password_digest: digest(&email, password),
            },
        );
        Ok(identity)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        self.lock()?.tokens.remove(access_token);
        Ok(())
    }
}
