//! Configuration loading from environment.

use std::env;

use anyhow::Context;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    /// `memory://` or a `sqlite:` URL
    pub database_url: String,
    pub rate_limit_per_minute: u32,
    pub notify_webhook_url: Option<String>,
    pub notify_webhook_secret: Option<String>,
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = optional("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .context("PORT must be a port number")?;

        let database_url = optional("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let rate_limit_per_minute = optional("RATE_LIMIT_PER_MINUTE")
            .unwrap_or_else(|| "100".to_string())
            .parse()
            .context("RATE_LIMIT_PER_MINUTE must be a positive integer")?;
        if rate_limit_per_minute == 0 {
            anyhow::bail!("RATE_LIMIT_PER_MINUTE must be a positive integer");
        }

        Ok(Self {
            port,
            database_url,
            rate_limit_per_minute,
            notify_webhook_url: optional("NOTIFY_WEBHOOK_URL"),
            notify_webhook_secret: optional("NOTIFY_WEBHOOK_SECRET"),
            otlp_endpoint: optional("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }
}
