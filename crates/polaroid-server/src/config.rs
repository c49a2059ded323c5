use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, bail};
use polaroid_core::{MAX_FEED_PAGE, Settings};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub settings: Settings,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let jwt_secret = var("POLAROID_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("POLAROID_JWT_SECRET is unset or still a placeholder; set it in your .env file");
        }

        let port = match var("POLAROID_PORT") {
            Some(v) => v.parse().with_context(|| format!("POLAROID_PORT is not a port: {:?}", v))?,
            None => 3000,
        };

        let defaults = Settings::default();
        let settings = Settings {
            swipe_write_attempts: var("POLAROID_SWIPE_WRITE_ATTEMPTS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.swipe_write_attempts)
                .max(1),
            feed_page_limit: var("POLAROID_FEED_PAGE_LIMIT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.feed_page_limit)
                .clamp(1, MAX_FEED_PAGE),
        };

        Ok(Self {
            host: var("POLAROID_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            db_path: var("POLAROID_DB_PATH").unwrap_or_else(|| "polaroid.db".into()).into(),
            jwt_secret,
            settings,
        })
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}
