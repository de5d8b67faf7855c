use std::env;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            database_url: required_env("DATABASE_URL"),
            host: env::var("BANDIT_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("BANDIT_PORT")
                .unwrap_or_else(|_| "4444".to_string())
                .parse()
                .expect("BANDIT_PORT must be a number"),
            db_max_connections: env::var("BANDIT_DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .expect("BANDIT_DB_MAX_CONNECTIONS must be a number"),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
