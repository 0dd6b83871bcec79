use anyhow::{Context, Result};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_WEEKLY_GOAL: u32 = 5;
const DEFAULT_TREND_WINDOW: usize = 12;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    /// Enables `/api/v1/market-intel` when set.
    pub anthropic_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    /// Weekly application goal used when a request doesn't supply one.
    pub default_weekly_goal: u32,
    /// Trailing periods in trend charts when a request doesn't supply a window.
    pub default_trend_window: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?,
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            port: parse_env("PORT", DEFAULT_PORT)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            default_weekly_goal: parse_env("DEFAULT_WEEKLY_GOAL", DEFAULT_WEEKLY_GOAL)?,
            default_trend_window: parse_env("DEFAULT_TREND_WINDOW", DEFAULT_TREND_WINDOW)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value: u32 = parse_env("JOBTRACK_TEST_UNSET_GOAL", 7).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_parse_env_reads_value() {
        std::env::set_var("JOBTRACK_TEST_WINDOW", " 24 ");
        let value: usize = parse_env("JOBTRACK_TEST_WINDOW", 12).unwrap();
        assert_eq!(value, 24);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("JOBTRACK_TEST_PORT", "eighty");
        let result: Result<u16> = parse_env("JOBTRACK_TEST_PORT", 8080);
        assert!(result.is_err());
    }
}
