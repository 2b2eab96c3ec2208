mod gotrue_client;
mod in_memory_identity_provider;

pub use gotrue_client::GoTrueClient;
pub use in_memory_identity_provider::InMemoryIdentityProvider;
