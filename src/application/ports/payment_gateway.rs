use async_trait::async_trait;

use crate::domain::{JobId, PaymentConfirmation, Price};

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    pub job_id: JobId,
    pub amount: Price,
    pub service_name: String,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutSessionStatus {
    Paid,
    Unpaid,
    Expired,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSessionState {
    pub id: String,
    pub job_id: Option<JobId>,
    pub status: CheckoutSessionStatus,
    pub amount_cents: Option<i64>,
}

/// The card processor's hosted checkout.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentGatewayError>;

    /// Asks the processor, server to server, what happened to a session.
    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSessionState, PaymentGatewayError>;
}

/// Authenticates processor callbacks. Returns `Ok(None)` for well-signed events
/// that do not confirm a payment.
pub trait PaymentWebhookVerifier: Send + Sync {
    fn verify(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<Option<PaymentConfirmation>, PaymentGatewayError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentGatewayError {
    #[error("payment api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("invalid payment response: {0}")]
    InvalidResponse(String),
    #[error("webhook signature rejected: {0}")]
    InvalidSignature(String),
    #[error("malformed webhook payload: {0}")]
    MalformedEvent(String),
}
