mod auth;
mod catalog;
mod checkout_function;
mod dashboard;
pub mod dto;
mod health;
mod jobs;
mod payments;
mod support;

pub use auth::{me_handler, sign_in_handler, sign_out_handler, sign_up_handler};
pub use catalog::service_catalog_handler;
pub use checkout_function::{create_checkout_handler, create_checkout_preflight_handler};
pub use dashboard::dashboard_stream_handler;
pub use health::health_handler;
pub use jobs::{
    accept_job_handler, book_job_handler, cancel_job_handler, checkout_job_handler,
    complete_job_handler, create_job_handler, get_job_handler, list_market_handler,
    list_my_jobs_handler, list_schedule_handler, start_job_handler,
};
pub use payments::{SIGNATURE_HEADER, payment_return_handler, payment_webhook_handler};
pub use support::support_handler;
