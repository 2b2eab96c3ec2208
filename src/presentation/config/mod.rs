mod environment;
mod scaffold_config;
mod settings;

pub use environment::{ENVIRONMENT_VAR, Environment};
pub use scaffold_config::ScaffoldConfig;
pub use settings::{
    AssistantSettings, AuthSettings, DatabaseSettings, LoggingSettings, PaymentsSettings,
    ServerSettings, Settings,
};
