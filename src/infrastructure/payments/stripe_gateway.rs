use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::application::ports::{
    CheckoutRequest, CheckoutSession, CheckoutSessionState, CheckoutSessionStatus,
    PaymentGateway, PaymentGatewayError,
};
use crate::domain::{JobId, success_redirect_url};

pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";

pub struct StripeGateway {
    client: Client,
    api_base: String,
    secret_key: String,
    currency: String,
}

#[derive(Deserialize)]
struct SessionResponse {
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    payment_status: Option<String>,
    #[serde(default)]
    client_reference_id: Option<String>,
    #[serde(default)]
    amount_total: Option<i64>,
    #[serde(default)]
    metadata: Option<SessionMetadata>,
}

#[derive(Deserialize)]
struct SessionMetadata {
    #[serde(default)]
    job_id: Option<String>,
}

#[derive(Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorBody,
}

#[derive(Deserialize)]
struct StripeErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl SessionResponse {
    fn job_id(&self) -> Option<JobId> {
        self.client_reference_id
            .as_deref()
            .or_else(|| self.metadata.as_ref().and_then(|m| m.job_id.as_deref()))
            .and_then(|raw| raw.parse().ok())
    }

    fn session_status(&self) -> CheckoutSessionStatus {
        match (self.payment_status.as_deref(), self.status.as_deref()) {
            (Some("paid"), _) => CheckoutSessionStatus::Paid,
            (_, Some("expired")) => CheckoutSessionStatus::Expired,
            _ => CheckoutSessionStatus::Unpaid,
        }
    }
}

impl StripeGateway {
    pub fn new(
        secret_key: impl Into<String>,
        currency: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
            currency: currency.into().to_lowercase(),
        }
    }

    fn sessions_url(&self) -> String {
        format!("{}/v1/checkout/sessions", self.api_base)
    }

    async fn read_session(
        response: reqwest::Response,
    ) -> Result<SessionResponse, PaymentGatewayError> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<StripeErrorEnvelope>()
                .await
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or_else(|| "no error message".to_string());
            return Err(PaymentGatewayError::ApiRequestFailed(format!(
                "HTTP {}: {}",
                status, message
            )));
        }

        response
            .json()
            .await
            .map_err(|e| PaymentGatewayError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    #[instrument(skip(self, request), fields(job_id = %request.job_id, amount = %request.amount))]
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentGatewayError> {
        let job_id = request.job_id.to_string();
        let unit_amount = request.amount.cents().to_string();
        let success_url = success_redirect_url(&request.success_url, request.job_id);

        let form = [
            ("payment_method_types[0]", "card"),
            ("mode", "payment"),
            ("line_items[0][price_data][currency]", self.currency.as_str()),
            (
                "line_items[0][price_data][product_data][name]",
                request.service_name.as_str(),
            ),
            ("line_items[0][price_data][unit_amount]", unit_amount.as_str()),
            ("line_items[0][quantity]", "1"),
            ("success_url", success_url.as_str()),
            ("cancel_url", request.cancel_url.as_str()),
            ("client_reference_id", job_id.as_str()),
            ("metadata[job_id]", job_id.as_str()),
        ];

        let response = self
            .client
            .post(self.sessions_url())
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(|e| PaymentGatewayError::ApiRequestFailed(e.to_string()))?;

        let session = Self::read_session(response).await?;
        let url = session.url.ok_or_else(|| {
            PaymentGatewayError::InvalidResponse("checkout session has no url".to_string())
        })?;

        tracing::info!(session_id = %session.id, "Created checkout session");
        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }

    #[instrument(skip(self))]
    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSessionState, PaymentGatewayError> {
        let response = self
            .client
            .get(format!("{}/{}", self.sessions_url(), session_id))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| PaymentGatewayError::ApiRequestFailed(e.to_string()))?;

        let session = Self::read_session(response).await?;
        Ok(CheckoutSessionState {
            job_id: session.job_id(),
            status: session.session_status(),
            amount_cents: session.amount_total,
            id: session.id,
        })
    }
}
