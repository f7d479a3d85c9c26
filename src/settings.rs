//! Environment-derived settings, read once at startup.

use std::env;

#[derive(Clone, Debug)]
pub struct Settings {
    pub port: u16,
    pub database_url: String,
    /// Token for the bearer gate; absent means the gate admits everything.
    pub api_token: Option<String>,
    pub max_page_size: u32,
}

impl Settings {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/resource_kit".into());
        let api_token = env::var("API_TOKEN").ok().filter(|t| !t.is_empty());
        let max_page_size = env::var("MAX_PAGE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(100);
        Self {
            port,
            database_url,
            api_token,
            max_page_size,
        }
    }
}
