use std::sync::Arc;

use crate::application::ports::SupportAssistant;
use crate::infrastructure::observability::redact_for_log;

pub const CANNED_REPLY: &str = "I am a simulated AI assistant. To enable real intelligence, please configure the assistant API key in the environment.";
pub const OFFLINE_REPLY: &str = "Sorry, I am currently offline. Please try again later.";

/// Customer support answers. Works without an assistant configured.
pub struct SupportService {
    assistant: Option<Arc<dyn SupportAssistant>>,
}

impl SupportService {
    pub fn new(assistant: Option<Arc<dyn SupportAssistant>>) -> Self {
        Self { assistant }
    }

    pub async fn reply(&self, message: &str) -> String {
        let Some(assistant) = &self.assistant else {
            return CANNED_REPLY.to_string();
        };

        tracing::debug!(prompt = %redact_for_log(message), "Support request");

        match assistant.reply(message).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(error = %e, "Support assistant failed");
                OFFLINE_REPLY.to_string()
            }
        }
    }
}
