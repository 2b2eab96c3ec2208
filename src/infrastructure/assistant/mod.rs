mod gemini_assistant;

pub use gemini_assistant::{DEFAULT_GEMINI_API_BASE, GeminiAssistant};
