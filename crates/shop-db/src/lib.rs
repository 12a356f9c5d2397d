//! # shop-db
//!
//! Database layer implementing the `shop-core` repository traits.
//!
//! ## Overview
//!
//! - Connection pool management and SQL migrations (one database per service)
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - PostgreSQL repository implementations
//! - In-memory repositories with the same semantics, for tests and local runs
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shop_db::{create_pool, run_migrations, MigrationSet, PgRefreshTokenRepository};
//!
//! async fn example(config: &shop_common::DatabaseConfig) -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(config).await?;
//!     run_migrations(&pool, MigrationSet::Auth).await?;
//!     let tokens = PgRefreshTokenRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::{MemoryRefreshTokenRepository, MemoryUserRepository};
pub use pool::{create_pool, run_migrations, MigrationSet, PgPool, PoolError};
pub use repositories::{PgRefreshTokenRepository, PgUserRepository};
