//! Application configuration loaded from environment variables.

use std::env;
use std::fmt;
use std::str::FromStr;

use todolist_infra::{DatabaseConfig, DatabaseDriver, JwtConfig};

/// Configuration errors. Any of these aborts startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Which check guards the `/api` routes.
#[derive(Clone, PartialEq, Eq)]
pub enum GateMode {
    /// `Authorization: Bearer <jwt>`.
    Jwt,
    /// `Authorization: <shared secret>`.
    StaticKey(String),
}

impl fmt::Debug for GateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateMode::Jwt => f.write_str("Jwt"),
            GateMode::StaticKey(_) => f.write_str("StaticKey(***)"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub gate: GateMode,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `get`, which maps a variable name to its value.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&get, "PORT", 1234)?,
            database: Self::database(&get)?,
            jwt: Self::jwt(&get)?,
            gate: Self::gate(&get)?,
        })
    }

    /// Build the database config from `DB_*` variables; `DATABASE_URL` wins when set.
    fn database(get: &impl Fn(&str) -> Option<String>) -> Result<DatabaseConfig, ConfigError> {
        let driver: DatabaseDriver = parse_or(get, "DB_DRIVER", DatabaseDriver::MySql)?;

        let url = match get("DATABASE_URL") {
            Some(url) => url,
            None if driver == DatabaseDriver::Memory => String::new(),
            None => {
                let password = get("DB_PASSWORD").ok_or(ConfigError::Missing("DB_PASSWORD"))?;
                let host = get("DB_HOST").unwrap_or_else(|| "localhost".to_string());
                DatabaseConfig::build_url(
                    driver,
                    &get("DB_USER").unwrap_or_else(|| "root".to_string()),
                    &password,
                    &host,
                    parse_or(get, "DB_PORT", driver.default_port())?,
                    &get("DB_NAME").unwrap_or_else(|| "todolist".to_string()),
                )
                .map_err(|e| ConfigError::Invalid {
                    name: "DB_HOST",
                    reason: e.to_string(),
                })?
            }
        };

        Ok(DatabaseConfig {
            driver,
            url,
            max_connections: parse_or(get, "DB_MAX_CONNECTIONS", 10)?,
            min_connections: parse_or(get, "DB_MIN_CONNECTIONS", 1)?,
        })
    }

    /// `JWT_EXPIRATION_HOURS` must be between 1 and one year.
    fn jwt(get: &impl Fn(&str) -> Option<String>) -> Result<JwtConfig, ConfigError> {
        let mut jwt = JwtConfig::from_lookup(get);
        let hours: i64 = parse_or(get, "JWT_EXPIRATION_HOURS", jwt.expiration_hours)?;

        if !(1..=JwtConfig::MAX_EXPIRATION_HOURS).contains(&hours) {
            return Err(ConfigError::Invalid {
                name: "JWT_EXPIRATION_HOURS",
                reason: format!(
                    "expected 1 to {} hours, got {hours}",
                    JwtConfig::MAX_EXPIRATION_HOURS
                ),
            });
        }

        jwt.expiration_hours = hours;
        Ok(jwt)
    }

    fn gate(get: &impl Fn(&str) -> Option<String>) -> Result<GateMode, ConfigError> {
        match get("AUTH_MODE").as_deref() {
            None | Some("jwt") => Ok(GateMode::Jwt),
            Some("static") => Ok(GateMode::StaticKey(
                get("API_KEY").unwrap_or_else(|| "secret_lock".to_string()),
            )),
            Some(other) => Err(ConfigError::Invalid {
                name: "AUTH_MODE",
                reason: format!("expected 'jwt' or 'static', got '{other}'"),
            }),
        }
    }
}

/// Parse `name` if set, otherwise fall back to `default`.
fn parse_or<T>(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match get(name) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
