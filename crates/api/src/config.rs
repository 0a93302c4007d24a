use std::env;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("{0} must be set together with {1}")]
    Incomplete(&'static str, &'static str),
}

/// Object-storage credentials.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub service_role_key: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server host to bind to.
    pub host: String,
    /// Server port to bind to.
    pub port: u16,
    /// PostgreSQL connection URL. Without it the server runs read-only with
    /// empty content.
    pub database_url: Option<String>,
    /// Maximum database connections in the pool.
    pub db_max_connections: u32,
    /// Minimum database connections in the pool.
    pub db_min_connections: u32,
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Session lifetime in hours.
    pub session_ttl_hours: i64,
    /// Identity promoted to admin on sign-in.
    pub owner_open_id: String,
    /// argon2 PHC string of the admin password. Password login is off
    /// without it.
    pub admin_password_hash: Option<String>,
    pub supabase: Option<SupabaseConfig>,
    /// Event bus channel capacity.
    pub event_bus_capacity: usize,
    /// Request body limit in bytes.
    pub max_body_bytes: usize,
    /// Insert demo content into an empty database at startup.
    pub seed_demo_content: bool,
    /// Log level (e.g., "info", "debug", "trace").
    pub log_level: String,
}

impl AppConfig {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let supabase = match (get("SUPABASE_URL"), get("SUPABASE_SERVICE_ROLE_KEY")) {
            (Some(url), Some(service_role_key)) => Some(SupabaseConfig {
                url,
                service_role_key,
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::Incomplete("SUPABASE_URL", "SUPABASE_SERVICE_ROLE_KEY"))
            }
            (None, Some(_)) => {
                return Err(ConfigError::Incomplete("SUPABASE_SERVICE_ROLE_KEY", "SUPABASE_URL"))
            }
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse(&get, "PORT", 3030)?,
            database_url: get("DATABASE_URL"),
            db_max_connections: parse(&get, "DB_MAX_CONNECTIONS", 20)?,
            db_min_connections: parse(&get, "DB_MIN_CONNECTIONS", 1)?,
            jwt_secret: get("JWT_SECRET")
                .unwrap_or_else(|| "dev-secret-change-me-in-production".to_string()),
            session_ttl_hours: parse(&get, "SESSION_TTL_HOURS", 24)?,
            owner_open_id: get("OWNER_OPEN_ID").unwrap_or_else(|| "owner".to_string()),
            admin_password_hash: get("ADMIN_PASSWORD_HASH"),
            supabase,
            event_bus_capacity: parse(&get, "EVENT_BUS_CAPACITY", 1024)?,
            max_body_bytes: parse(&get, "MAX_BODY_BYTES", 8 * 1024 * 1024)?,
            seed_demo_content: parse(&get, "SEED_DEMO_CONTENT", false)?,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Build the socket address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
