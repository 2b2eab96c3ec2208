mod auth_service;
mod dashboard_feed;
mod job_lifecycle_service;
mod lifecycle_error;
mod support_service;

pub use auth_service::{AuthError, AuthEvent, AuthService, Session};
pub use dashboard_feed::{DashboardFeed, DashboardView, ListState, NewJobNotice};
pub use job_lifecycle_service::JobLifecycleService;
pub use lifecycle_error::LifecycleError;
pub use support_service::{CANNED_REPLY, OFFLINE_REPLY, SupportService};
