use std::env;

use chrono_tz::Tz;

pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Seoul;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Business time zone used for "today", slot expiry and cancellation windows.
    pub timezone: Tz,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let timezone = match env::var("BUSINESS_TIMEZONE") {
            Ok(name) => name
                .parse::<Tz>()
                .map_err(|e| anyhow::anyhow!("invalid BUSINESS_TIMEZONE {name:?}: {e}"))?,
            Err(_) => DEFAULT_TIMEZONE,
        };
        Ok(Self {
            port,
            database_url,
            host,
            timezone,
        })
    }
}
