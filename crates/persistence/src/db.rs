//! Database connection management.
//!
//! One pool per process, opened for the selected [`Environment`]. Failures are
//! returned to the caller; the binary decides whether they are fatal.

use serde::Deserialize;
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::metrics::record_pool_metrics;

/// Embedded SQL migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./src/migrations");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
        }
    }
}

impl FromStr for Environment {
    type Err = ConnectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            _ => Err(ConnectionError::UnknownEnvironment(s.to_string())),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("No database URL configured for the {0} environment")]
    MissingUrl(Environment),

    #[error("Unknown environment: {0}")]
    UnknownEnvironment(String),

    #[error("Failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("Failed to run migrations: {0}")]
    Migrate(#[from] MigrateError),
}

/// Connection options for one environment.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    #[serde(default = "default_health_check_interval")]
    pub health_check_interval_secs: u64,
}

fn default_health_check_interval() -> u64 {
    30
}

/// Connection options keyed by environment.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseEnvironments {
    pub development: DatabaseConfig,
    pub production: DatabaseConfig,
    pub test: DatabaseConfig,
}

impl DatabaseEnvironments {
    pub fn get(&self, env: Environment) -> &DatabaseConfig {
        match env {
            Environment::Development => &self.development,
            Environment::Production => &self.production,
            Environment::Test => &self.test,
        }
    }

    /// Picks the options for `env`, failing when its URL is unset.
    pub fn resolve(&self, env: Environment) -> Result<DatabaseConfig, ConnectionError> {
        let config = self.get(env);
        if config.url.trim().is_empty() {
            return Err(ConnectionError::MissingUrl(env));
        }
        Ok(config.clone())
    }
}

/// Creates a PostgreSQL connection pool with the given configuration.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .after_connect(|_conn, _meta| {
            Box::pin(async move {
                debug!("Database connection opened");
                Ok(())
            })
        })
        .connect(&config.url)
        .await
}

/// Owner of the process-wide pool.
#[derive(Debug, Clone)]
pub struct ConnectionManager {
    environment: Environment,
    pool: PgPool,
    health_check_interval: Duration,
    healthy: Arc<AtomicBool>,
}

impl ConnectionManager {
    pub async fn connect(
        environment: Environment,
        environments: &DatabaseEnvironments,
    ) -> Result<Self, ConnectionError> {
        let config = environments.resolve(environment)?;

        let pool = create_pool(&config).await.map_err(|e| {
            error!(environment = %environment, error = %e, "Database connection failed");
            ConnectionError::Connect(e)
        })?;

        record_pool_metrics(&pool);
        info!(
            environment = %environment,
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Database connected"
        );

        Ok(Self {
            environment,
            pool,
            health_check_interval: Duration::from_secs(config.health_check_interval_secs),
            healthy: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Wraps an existing pool, e.g. one opened by a test harness.
    pub fn from_pool(environment: Environment, pool: PgPool) -> Self {
        Self {
            environment,
            pool,
            health_check_interval: Duration::from_secs(default_health_check_interval()),
            healthy: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Shared handle; clones are cheap.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> Result<(), ConnectionError> {
        info!("Running database migrations");
        MIGRATOR.run(&self.pool).await?;
        info!("Migrations completed");
        Ok(())
    }

    /// How often the binary should call [`Self::health_check`].
    pub fn health_check_interval(&self) -> Duration {
        self.health_check_interval
    }

    /// Whether the last health check succeeded.
    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }

    /// Pings the database. Losing and regaining the connection is logged
    /// once per transition.
    pub async fn health_check(&self) -> Result<(), ConnectionError> {
        let result = sqlx::query("SELECT 1").execute(&self.pool).await;
        record_pool_metrics(&self.pool);

        match result {
            Ok(_) => {
                if !self.healthy.swap(true, Ordering::Relaxed) {
                    info!(environment = %self.environment, "Database connection restored");
                }
                Ok(())
            }
            Err(e) => {
                if self.healthy.swap(false, Ordering::Relaxed) {
                    error!(environment = %self.environment, error = %e, "Database connection lost");
                } else {
                    warn!(environment = %self.environment, error = %e, "Database still unreachable");
                }
                Err(ConnectionError::Connect(e))
            }
        }
    }

    pub async fn disconnect(self) {
        self.pool.close().await;
        info!(environment = %self.environment, "Database disconnected");
    }
}
