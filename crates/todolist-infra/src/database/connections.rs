use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

#[cfg(feature = "database")]
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DbConn, DbErr};

/// Timeout applied to the startup health check only. Request queries run without one.
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Storage backend selected by `DB_DRIVER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseDriver {
    MySql,
    Postgres,
    /// Process-local storage, lost on restart.
    Memory,
}

impl DatabaseDriver {
    pub fn default_port(&self) -> u16 {
        match self {
            DatabaseDriver::MySql => 3306,
            DatabaseDriver::Postgres => 5432,
            DatabaseDriver::Memory => 0,
        }
    }

    fn scheme(&self) -> &'static str {
        match self {
            DatabaseDriver::MySql => "mysql",
            DatabaseDriver::Postgres => "postgres",
            DatabaseDriver::Memory => "memory",
        }
    }
}

impl fmt::Display for DatabaseDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme())
    }
}

/// Error for a `DB_DRIVER` value that names no supported backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported database driver '{0}'")]
pub struct UnknownDriver(pub String);

impl FromStr for DatabaseDriver {
    type Err = UnknownDriver;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" => Ok(DatabaseDriver::MySql),
            "postgres" | "postgresql" => Ok(DatabaseDriver::Postgres),
            "memory" => Ok(DatabaseDriver::Memory),
            _ => Err(UnknownDriver(s.to_string())),
        }
    }
}

/// Configuration for the database connection pool.
#[derive(Clone)]
pub struct DatabaseConfig {
    pub driver: DatabaseDriver,
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

// The URL embeds the password.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("driver", &self.driver)
            .field("url", &"***")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .finish()
    }
}

impl DatabaseConfig {
    /// Assemble a connection URL from its parts. User and password are
    /// percent-encoded.
    pub fn build_url(
        driver: DatabaseDriver,
        user: &str,
        password: &str,
        host: &str,
        port: u16,
        name: &str,
    ) -> Result<String, url::ParseError> {
        let mut url = Url::parse(&format!("{}://{}:{}/{}", driver.scheme(), host, port, name))?;

        // Only fails for URLs without a host, which the parse above rules out.
        url.set_username(user)
            .and_then(|()| url.set_password(Some(password)))
            .map_err(|()| url::ParseError::EmptyHost)?;

        Ok(url.into())
    }
}

/// Open the connection pool and verify it answers within [`HEALTH_CHECK_TIMEOUT`].
#[cfg(feature = "database")]
pub async fn connect(config: &DatabaseConfig) -> Result<DbConn, DbErr> {
    tracing::info!(driver = %config.driver, "Connecting to database...");

    let opts = ConnectOptions::new(&config.url)
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(true)
        .to_owned();

    let db = Database::connect(opts).await?;

    tokio::time::timeout(HEALTH_CHECK_TIMEOUT, db.ping())
        .await
        .map_err(|_| DbErr::Custom("database health check timed out".to_string()))??;

    tracing::info!(
        backend = ?db.get_database_backend(),
        pool = config.max_connections,
        "Database connected"
    );

    Ok(db)
}
