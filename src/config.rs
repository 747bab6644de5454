//! Runtime configuration from environment variables.

use crate::llm::ChatConfig;

pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Port the persistence service listens on.
    pub port: u16,
    /// Base URL the assistant uses to reach the persistence service.
    pub todo_url: String,
    pub chat: ChatConfig,
}

impl AppConfig {
    /// Load configuration from the environment, after reading `.env` if present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Unparseable numbers
    /// fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = ChatConfig::default();

        let port = lookup("MCP_SERVER_PORT")
            .and_then(|s| s.trim().parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let todo_url = lookup("TODO_MCP_URL")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| format!("http://localhost:{}", port));

        let chat = ChatConfig {
            endpoint: lookup("AZURE_OPENAI_ENDPOINT").filter(|s| !s.trim().is_empty()),
            api_key: lookup("AZURE_OPENAI_API_KEY").filter(|s| !s.trim().is_empty()),
            timeout_secs: lookup("TODO_CHAT_TIMEOUT_SECS")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.timeout_secs),
            max_tokens: lookup("TODO_CHAT_MAX_TOKENS")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.max_tokens),
            temperature: lookup("TODO_CHAT_TEMPERATURE")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.temperature),
        };

        Self {
            port,
            todo_url,
            chat,
        }
    }
}
