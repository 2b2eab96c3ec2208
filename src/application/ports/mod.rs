mod identity_provider;
mod job_change_feed;
mod job_repository;
mod payment_gateway;
mod profile_repository;
mod repository_error;
mod support_assistant;

pub use identity_provider::{AuthSession, Identity, IdentityError, IdentityProvider, SignUpMetadata};
pub use job_change_feed::JobChangeFeed;
pub use job_repository::JobRepository;
pub use payment_gateway::{
    CheckoutRequest, CheckoutSession, CheckoutSessionState, CheckoutSessionStatus,
    PaymentGateway, PaymentGatewayError, PaymentWebhookVerifier,
};
pub use profile_repository::{Profile, ProfileRepository};
pub use repository_error::RepositoryError;
pub use support_assistant::{SupportAssistant, SupportAssistantError};
