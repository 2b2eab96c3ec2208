use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::application::ports::{
    AuthSession, Identity, IdentityError, IdentityProvider, SignUpMetadata,
};
use crate::domain::UserId;

/// REST client for a GoTrue-compatible auth service (`/auth/v1/*`).
pub struct GoTrueClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    data: &'a SignUpData<'a>,
}

#[derive(Serialize)]
struct SignUpData<'a> {
    full_name: &'a str,
    user_type: &'a str,
}

#[derive(Deserialize, Default)]
struct UserMetadata {
    full_name: Option<String>,
    user_type: Option<String>,
}

#[derive(Deserialize)]
struct GoTrueUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: UserMetadata,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    user: GoTrueUser,
}

/// Sign-up answers with a session when auto-confirm is on, a bare user
/// otherwise.
#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session { user: GoTrueUser },
    User(GoTrueUser),
}

#[derive(Deserialize, Default)]
struct GoTrueErrorBody {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl GoTrueErrorBody {
    fn into_message(self) -> String {
        self.msg
            .or(self.error_description)
            .or(self.message)
            .unwrap_or_else(|| "unknown error".to_string())
    }
}

impl TryFrom<GoTrueUser> for Identity {
    type Error = IdentityError;

    fn try_from(user: GoTrueUser) -> Result<Self, Self::Error> {
        Ok(Identity {
            id: user.id.parse::<UserId>().map_err(IdentityError::InvalidResponse)?,
            email: user.email.unwrap_or_default(),
            full_name: user.user_metadata.full_name,
            user_type: user.user_metadata.user_type,
        })
    }
}

impl GoTrueClient {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        let body = response
            .json::<GoTrueErrorBody>()
            .await
            .unwrap_or_default()
            .into_message();
        format!("HTTP {}: {}", status, body)
    }
}

#[async_trait]
impl IdentityProvider for GoTrueClient {
    async fn current_identity(
        &self,
        access_token: &str,
    ) -> Result<Option<Identity>, IdentityError> {
        let response = self
            .client
            .get(self.url("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| IdentityError::RequestFailed(e.to_string()))?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND
        ) {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(IdentityError::RequestFailed(
                Self::error_message(response).await,
            ));
        }

        let user: GoTrueUser = response
            .json()
            .await
            .map_err(|e| IdentityError::InvalidResponse(e.to_string()))?;
        Ok(Some(user.try_into()?))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, IdentityError> {
        let response = self
            .client
            .post(self.url("token?grant_type=password"))
            .header("apikey", &self.anon_key)
            .json(&Credentials { email, password })
            .send()
            .await
            .map_err(|e| IdentityError::RequestFailed(e.to_string()))?;

        if matches!(
            response.status(),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED
        ) {
            return Err(IdentityError::InvalidCredentials);
        }
        if !response.status().is_success() {
            return Err(IdentityError::RequestFailed(
                Self::error_message(response).await,
            ));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::InvalidResponse(e.to_string()))?;

        Ok(AuthSession {
            access_token: token.access_token,
            identity: token.user.try_into()?,
        })
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<Identity, IdentityError> {
        let data = SignUpData {
            full_name: &metadata.full_name,
            user_type: &metadata.user_type,
        };

        let response = self
            .client
            .post(self.url("signup"))
            .header("apikey", &self.anon_key)
            .json(&SignUpRequest {
                email,
                password,
                data: &data,
            })
            .send()
            .await
            .map_err(|e| IdentityError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNPROCESSABLE_ENTITY || status == StatusCode::BAD_REQUEST {
            let message = Self::error_message(response).await;
            if message.to_lowercase().contains("already registered") {
                return Err(IdentityError::AlreadyRegistered(email.to_string()));
            }
            return Err(IdentityError::RequestFailed(message));
        }
        if !status.is_success() {
            return Err(IdentityError::RequestFailed(
                Self::error_message(response).await,
            ));
        }

        let user = match response
            .json::<SignUpResponse>()
            .await
            .map_err(|e| IdentityError::InvalidResponse(e.to_string()))?
        {
            SignUpResponse::Session { user } | SignUpResponse::User(user) => user,
        };
        user.try_into()
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        let response = self
            .client
            .post(self.url("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| IdentityError::RequestFailed(e.to_string()))?;

        // An already dead token is as signed out as it gets.
        if response.status().is_success() || response.status() == StatusCode::UNAUTHORIZED {
            return Ok(());
        }
        Err(IdentityError::RequestFailed(
            Self::error_message(response).await,
        ))
    }
}
