mod address;
mod booking_draft;
mod job;
mod job_change;
mod job_id;
mod job_status;
mod payment;
mod payment_status;
mod price;
mod service_catalog;
mod service_category;
mod user;

pub use address::{Address, AddressKind};
pub use booking_draft::BookingDraft;
pub use job::{Job, JobValidationError, NewJob, TransitionError};
pub use job_change::{ChangeKind, JobChange};
pub use job_id::JobId;
pub use job_status::JobStatus;
pub use payment::{
    PaymentConfirmation, PaymentReturn, RETURN_JOB_ID_PARAM, RETURN_SUCCESS_PARAM,
    success_redirect_url,
};
pub use payment_status::PaymentStatus;
pub use price::{Price, PriceError};
pub use service_catalog::{ServiceOption, find_service_option, service_options};
pub use service_category::ServiceCategory;
pub use user::{User, UserId, UserRole};
