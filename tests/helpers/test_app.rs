use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use snowmow::application::ports::JobChangeFeed;
use snowmow::application::services::{AuthService, JobLifecycleService, SupportService};
use snowmow::domain::{User, UserRole};
use snowmow::infrastructure::identity::InMemoryIdentityProvider;
use snowmow::infrastructure::payments::{InMemoryPaymentGateway, StripeWebhookVerifier};
use snowmow::infrastructure::persistence::{InMemoryJobRepository, InMemoryProfileRepository};
use snowmow::infrastructure::realtime::JobChangeBus;
use snowmow::presentation::{AppState, Settings, create_router};

pub const WEBHOOK_SECRET: &str = "whsec_test_secret";
pub const PASSWORD: &str = "hunter22";

/// The whole service wired to in-memory adapters.
pub struct TestApp {
    pub state: AppState,
    pub jobs: Arc<InMemoryJobRepository>,
    pub payments: Arc<InMemoryPaymentGateway>,
    pub change_bus: Arc<JobChangeBus>,
}

impl TestApp {
    pub fn new() -> Self {
        let change_bus = Arc::new(JobChangeBus::new());
        let jobs = Arc::new(InMemoryJobRepository::with_change_bus(change_bus.clone()));
        let payments = Arc::new(InMemoryPaymentGateway::new());

        let lifecycle = Arc::new(JobLifecycleService::new(jobs.clone(), payments.clone()));
        let auth = Arc::new(AuthService::new(
            Arc::new(InMemoryIdentityProvider::new()),
            Arc::new(InMemoryProfileRepository::new()),
            Duration::from_millis(500),
        ));

        let mut settings = Settings::default();
        settings.server.sse_keep_alive_seconds = 60;

        let state = AppState {
            lifecycle,
            auth,
            support: Arc::new(SupportService::new(None)),
            job_changes: change_bus.clone() as Arc<dyn JobChangeFeed>,
            webhook_verifier: Arc::new(StripeWebhookVerifier::new(WEBHOOK_SECRET, 300)),
            settings: Arc::new(settings),
        };

        Self {
            state,
            jobs,
            payments,
            change_bus,
        }
    }

    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    /// Registers an account and signs it in, returning the user and a token.
    pub async fn register(&self, name: &str, role: UserRole) -> (User, String) {
        let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
        self.state
            .auth
            .sign_up(name, &email, PASSWORD, role)
            .await
            .expect("sign up");
        let session = self
            .state
            .auth
            .sign_in(&email, PASSWORD)
            .await
            .expect("sign in");
        (session.user, session.access_token)
    }
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, body)
}
