use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    accept_job_handler, book_job_handler, cancel_job_handler, checkout_job_handler,
    complete_job_handler, create_checkout_handler, create_checkout_preflight_handler,
    create_job_handler, dashboard_stream_handler, get_job_handler, health_handler,
    list_market_handler, list_my_jobs_handler, list_schedule_handler, me_handler,
    payment_return_handler, payment_webhook_handler, service_catalog_handler, sign_in_handler,
    sign_out_handler, sign_up_handler, start_job_handler, support_handler,
};
use crate::presentation::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let auth_routes = Router::new()
        .route("/sign-up", post(sign_up_handler))
        .route("/sign-in", post(sign_in_handler))
        .route("/sign-out", post(sign_out_handler))
        .route("/me", get(me_handler));

    let job_routes = Router::new()
        .route("/", post(create_job_handler))
        .route("/mine", get(list_my_jobs_handler))
        .route("/market", get(list_market_handler))
        .route("/schedule", get(list_schedule_handler))
        .route("/{job_id}", get(get_job_handler))
        .route("/{job_id}/accept", post(accept_job_handler))
        .route("/{job_id}/start", post(start_job_handler))
        .route("/{job_id}/complete", post(complete_job_handler))
        .route("/{job_id}/cancel", post(cancel_job_handler))
        .route("/{job_id}/checkout", post(checkout_job_handler));

    // The checkout function answers its own preflight with fixed headers, so it
    // sits outside the blanket CORS layer.
    let function_routes = Router::new().route(
        "/functions/v1/create-checkout",
        post(create_checkout_handler).options(create_checkout_preflight_handler),
    );

    let api_routes = Router::new()
        .route("/health", get(health_handler))
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/jobs", job_routes)
        .route("/api/v1/bookings", post(book_job_handler))
        .route("/api/v1/services", get(service_catalog_handler))
        .route("/api/v1/payments/return", post(payment_return_handler))
        .route("/api/v1/payments/webhook", post(payment_webhook_handler))
        .route("/api/v1/dashboard/stream", get(dashboard_stream_handler))
        .route("/api/v1/support", post(support_handler))
        .layer(cors);

    api_routes
        .merge(function_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .with_state(state)
}
