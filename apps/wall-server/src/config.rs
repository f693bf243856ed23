//! Application configuration loaded from environment variables.

use std::env;

use wishwall_infra::InMemoryStoreConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Insert a handful of demo wishes at startup.
    pub seed_demo: bool,
    pub store: InMemoryStoreConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            seed_demo: env::var("SEED_DEMO")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            store: InMemoryStoreConfig::from_env(),
        }
    }
}
