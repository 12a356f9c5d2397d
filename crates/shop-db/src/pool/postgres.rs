//! PostgreSQL connection pool and migrations

use std::path::PathBuf;
use std::time::Duration;

use shop_common::DatabaseConfig;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

pub use sqlx::postgres::PgPool;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);
const IDLE_TIMEOUT: Duration = Duration::from_secs(300);
const MAX_LIFETIME: Duration = Duration::from_secs(1800);

/// Which service's schema to migrate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationSet {
    /// `users` table (user-service)
    Users,
    /// `refresh_tokens` table (auth-service)
    Auth,
}

impl MigrationSet {
    fn directory(self) -> PathBuf {
        let name = match self {
            Self::Users => "users",
            Self::Auth => "auth",
        };
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("migrations")
            .join(name)
    }
}

/// Pool and migration errors
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("Database connection failed: {0}")]
    Connect(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Create a new PostgreSQL connection pool
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, PoolError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .idle_timeout(IDLE_TIMEOUT)
        .max_lifetime(MAX_LIFETIME)
        .connect(&config.url)
        .await?;

    Ok(pool)
}

/// Apply the SQL migrations of one service
///
/// Both sets may share one database (tests, single-node setups); versions are
/// distinct across sets and rows applied by the other set are ignored.
pub async fn run_migrations(pool: &PgPool, set: MigrationSet) -> Result<(), PoolError> {
    let mut migrator = Migrator::new(set.directory()).await?;
    migrator.set_ignore_missing(true);
    migrator.run(pool).await?;
    tracing::info!(?set, "Database migrations applied");
    Ok(())
}
