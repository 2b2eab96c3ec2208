use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use crate::application::ports::{
    CheckoutRequest, CheckoutSession, CheckoutSessionState, CheckoutSessionStatus,
    PaymentGateway, PaymentGatewayError,
};
use crate::domain::success_redirect_url;

/// Checkout stand-in for scaffold mode and tests. Sessions start unpaid and
/// only become paid through `mark_session_paid`.
#[derive(Default)]
pub struct InMemoryPaymentGateway {
    sessions: Mutex<HashMap<String, CheckoutSessionState>>,
    unavailable: AtomicBool,
}

impl InMemoryPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<String, CheckoutSessionState>>, PaymentGatewayError> {
        self.sessions
            .lock()
            .map_err(|_| PaymentGatewayError::ApiRequestFailed("session store poisoned".into()))
    }

    /// Simulates the customer finishing payment on the hosted page.
    pub fn mark_session_paid(&self, session_id: &str) -> bool {
        match self.lock() {
            Ok(mut sessions) => match sessions.get_mut(session_id) {
                Some(session) => {
                    session.status = CheckoutSessionStatus::Paid;
                    true
                }
                None => false,
            },
            Err(_) => false,
        }
    }

    /// Makes every call fail as if the processor could not be reached.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), PaymentGatewayError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(PaymentGatewayError::ApiRequestFailed(
                "payment processor unreachable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentGateway for InMemoryPaymentGateway {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentGatewayError> {
        self.ensure_available()?;

        let id = format!("cs_test_{}", Uuid::new_v4().simple());
        self.lock()?.insert(
            id.clone(),
            CheckoutSessionState {
                id: id.clone(),
                job_id: Some(request.job_id),
                status: CheckoutSessionStatus::Unpaid,
                amount_cents: Some(request.amount.cents()),
            },
        );

        // The hosted page is skipped; the url is where the processor would
        // send the browser once the card clears.
        Ok(CheckoutSession {
            url: success_redirect_url(&request.success_url, request.job_id),
            id,
        })
    }

    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSessionState, PaymentGatewayError> {
        self.ensure_available()?;

        self.lock()?
            .get(session_id)
            .cloned()
            .ok_or_else(|| PaymentGatewayError::InvalidResponse(format!(
                "no such checkout session: {}",
                session_id
            )))
    }
}
