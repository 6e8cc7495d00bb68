use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Maximum concurrent card detail requests during a scrape.
    pub scrape_concurrency: usize,
    /// Hard cap on listing pages per scrape run.
    pub scrape_max_pages: u32,
    /// Politeness delay between detail requests, in milliseconds.
    pub scrape_request_delay_ms: u64,
    /// CORS origins; empty means allow any (development).
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            scrape_concurrency: env::var("SCRAPE_CONCURRENCY")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("SCRAPE_CONCURRENCY must be a valid number")?,
            scrape_max_pages: env::var("SCRAPE_MAX_PAGES")
                .unwrap_or_else(|_| "50".to_string())
                .parse()
                .context("SCRAPE_MAX_PAGES must be a valid number")?,
            scrape_request_delay_ms: env::var("SCRAPE_REQUEST_DELAY_MS")
                .unwrap_or_else(|_| "0".to_string())
                .parse()
                .context("SCRAPE_REQUEST_DELAY_MS must be a valid number")?,
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}
