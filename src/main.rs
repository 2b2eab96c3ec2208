use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use snowmow::application::ports::{
    IdentityProvider, JobChangeFeed, JobRepository, PaymentGateway, ProfileRepository,
    SupportAssistant,
};
use snowmow::application::services::{AuthService, JobLifecycleService, SupportService};
use snowmow::domain::UserRole;
use snowmow::infrastructure::assistant::GeminiAssistant;
use snowmow::infrastructure::identity::{GoTrueClient, InMemoryIdentityProvider};
use snowmow::infrastructure::observability::{TracingConfig, init_tracing};
use snowmow::infrastructure::payments::{
    InMemoryPaymentGateway, StripeGateway, StripeWebhookVerifier,
};
use snowmow::infrastructure::persistence::{
    InMemoryJobRepository, InMemoryProfileRepository, PgJobChangeListener, PgJobRepository,
    PgProfileRepository, create_pool, run_migrations,
};
use snowmow::infrastructure::realtime::JobChangeBus;
use snowmow::presentation::{AppState, Environment, Settings, create_router};

struct Adapters {
    jobs: Arc<dyn JobRepository>,
    profiles: Arc<dyn ProfileRepository>,
    identity: Arc<dyn IdentityProvider>,
    payments: Arc<dyn PaymentGateway>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load configuration")?;

    let json_format = settings.logging.enable_json
        || std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    init_tracing(
        &TracingConfig::new(environment.as_str(), json_format)
            .with_filter(settings.logging.level.clone()),
        settings.server.port,
    );

    let change_bus = Arc::new(JobChangeBus::new());

    let adapters = if settings.scaffold.enabled {
        tracing::warn!("Scaffold mode: all adapters are in memory");
        scaffold_adapters(change_bus.clone())
    } else {
        live_adapters(&settings, change_bus.clone()).await?
    };

    let lifecycle = Arc::new(JobLifecycleService::new(adapters.jobs, adapters.payments));
    let auth = Arc::new(AuthService::new(
        adapters.identity,
        adapters.profiles,
        settings.auth.session_timeout(),
    ));

    let assistant = settings.assistant.api_key().map(|key| {
        Arc::new(GeminiAssistant::new(
            key.to_string(),
            settings.assistant.model.clone(),
            settings.assistant.api_base.clone(),
        )) as Arc<dyn SupportAssistant>
    });
    if assistant.is_none() {
        tracing::info!("No assistant API key configured, support replies are canned");
    }

    if settings.scaffold.enabled {
        if let Some(password) = settings.scaffold.seed_password.as_deref() {
            seed_accounts(&auth, password).await;
        }
    }

    if settings.payments.webhook_secret.is_empty() {
        tracing::warn!("No webhook secret configured, every payment webhook will be rejected");
    }

    let state = AppState {
        lifecycle,
        auth,
        support: Arc::new(SupportService::new(assistant)),
        job_changes: change_bus as Arc<dyn JobChangeFeed>,
        webhook_verifier: Arc::new(StripeWebhookVerifier::new(
            settings.payments.webhook_secret.clone(),
            settings.payments.signature_tolerance_secs,
        )),
        settings: Arc::new(settings.clone()),
    };

    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

async fn live_adapters(
    settings: &Settings,
    change_bus: Arc<JobChangeBus>,
) -> anyhow::Result<Adapters> {
    let pool = create_pool(&settings.database.url, settings.database.max_connections).await?;
    run_migrations(&pool).await?;

    let jobs: Arc<dyn JobRepository> = Arc::new(PgJobRepository::new(pool.clone()));
    PgJobChangeListener::spawn(&pool, jobs.clone(), change_bus).await?;

    if settings.payments.secret_key.is_empty() {
        anyhow::bail!("payments.secret_key is required outside scaffold mode");
    }
    if settings.payments.webhook_secret.is_empty() {
        anyhow::bail!("payments.webhook_secret is required outside scaffold mode");
    }

    Ok(Adapters {
        jobs,
        profiles: Arc::new(PgProfileRepository::new(pool)),
        identity: Arc::new(GoTrueClient::new(
            settings.auth.url.clone(),
            settings.auth.anon_key.clone(),
        )),
        payments: Arc::new(StripeGateway::new(
            settings.payments.secret_key.clone(),
            settings.payments.currency.clone(),
            settings.payments.api_base.clone(),
        )),
    })
}

fn scaffold_adapters(change_bus: Arc<JobChangeBus>) -> Adapters {
    Adapters {
        jobs: Arc::new(InMemoryJobRepository::with_change_bus(change_bus)),
        profiles: Arc::new(InMemoryProfileRepository::new()),
        identity: Arc::new(InMemoryIdentityProvider::new()),
        payments: Arc::new(InMemoryPaymentGateway::new()),
    }
}

async fn seed_accounts(auth: &AuthService, password: &str) {
    let accounts = [
        ("Casey Client", "client@snowmow.local", UserRole::Client),
        ("Parker Provider", "provider@snowmow.local", UserRole::Provider),
    ];
    for (name, email, role) in accounts {
        match auth.sign_up(name, email, password, role).await {
            Ok(user) => tracing::info!(user_id = %user.id, email, role = %role, "Seeded account"),
            Err(e) => tracing::warn!(error = %e, email, "Could not seed account"),
        }
    }
}
