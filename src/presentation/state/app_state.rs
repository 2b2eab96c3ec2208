use std::sync::Arc;

use crate::application::ports::{JobChangeFeed, PaymentWebhookVerifier};
use crate::application::services::{AuthService, JobLifecycleService, SupportService};
use crate::presentation::config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub lifecycle: Arc<JobLifecycleService>,
    pub auth: Arc<AuthService>,
    pub support: Arc<SupportService>,
    pub job_changes: Arc<dyn JobChangeFeed>,
    pub webhook_verifier: Arc<dyn PaymentWebhookVerifier>,
    pub settings: Arc<Settings>,
}
