pub mod domain;
pub mod ingest;
pub mod notify;
pub mod report;
pub mod time;

pub mod config {
    use anyhow::Context;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub telegram_bot_token: Option<String>,
        pub telegram_chat_id: Option<String>,
        pub symbol_source_url: Option<String>,
        pub history_provider_base_url: Option<String>,
        pub history_provider_api_key: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                telegram_bot_token: std::env::var("TELEGRAM_BOT_TOKEN").ok(),
                telegram_chat_id: std::env::var("TELEGRAM_CHAT_ID").ok(),
                symbol_source_url: std::env::var("SYMBOL_SOURCE_URL").ok(),
                history_provider_base_url: std::env::var("HISTORY_PROVIDER_BASE_URL").ok(),
                history_provider_api_key: std::env::var("HISTORY_PROVIDER_API_KEY").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        pub fn require_telegram_bot_token(&self) -> anyhow::Result<&str> {
            self.telegram_bot_token
                .as_deref()
                .context("TELEGRAM_BOT_TOKEN is required")
        }

        pub fn require_telegram_chat_id(&self) -> anyhow::Result<&str> {
            self.telegram_chat_id
                .as_deref()
                .context("TELEGRAM_CHAT_ID is required")
        }

        pub fn require_symbol_source_url(&self) -> anyhow::Result<&str> {
            self.symbol_source_url
                .as_deref()
                .context("SYMBOL_SOURCE_URL is required")
        }

        pub fn require_history_provider_base_url(&self) -> anyhow::Result<&str> {
            self.history_provider_base_url
                .as_deref()
                .context("HISTORY_PROVIDER_BASE_URL is required")
        }
    }
}
