mod in_memory_payment_gateway;
mod stripe_gateway;
mod stripe_webhook;

pub use in_memory_payment_gateway::InMemoryPaymentGateway;
pub use stripe_gateway::{DEFAULT_STRIPE_API_BASE, StripeGateway};
pub use stripe_webhook::{
    DEFAULT_SIGNATURE_TOLERANCE_SECS, StripeWebhookVerifier, signature_header,
};
