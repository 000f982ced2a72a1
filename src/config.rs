use std::env;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    /// Marks the session cookie `Secure`. Turn off only for plain-http local setups.
    pub cookie_secure: bool,
    pub token_ttl_hours: i64,
    pub verification_ttl_minutes: i64,
    pub mail_from: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_or("APP_PORT", 3000);
        let cookie_secure = parse_or("COOKIE_SECURE", true);
        let token_ttl_hours = parse_or("TOKEN_TTL_HOURS", 24);
        let verification_ttl_minutes = parse_or("VERIFICATION_TTL_MINUTES", 30);
        let mail_from =
            env::var("MAIL_FROM").unwrap_or_else(|_| "no-reply@warehouse.local".to_string());
        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            cookie_secure,
            token_ttl_hours,
            verification_ttl_minutes,
            mail_from,
        })
    }

    /// Config for tests and tooling that only need a database.
    pub fn for_database(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            host: "127.0.0.1".to_string(),
            port: 0,
            jwt_secret: "test-secret".to_string(),
            cookie_secure: false,
            token_ttl_hours: 24,
            verification_ttl_minutes: 30,
            mail_from: "no-reply@warehouse.local".to_string(),
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
