//! Database initialization and cleanup utilities for cache invalidation notifications
//!
//! Installs the `notify_cache_invalidation(pool, tags, keys)` PostgreSQL
//! function. Calling it from SQL (a trigger, a migration, another service)
//! publishes a payload that [`crate::InvalidationListener`] understands.

use sqlx::PgPool;

/// Initialize the cache invalidation function in the database
///
/// # Example
///
/// ```rust,no_run
/// use sqlx::PgPool;
/// use transactional_tag_cache::init_invalidation_functions;
///
/// # async fn example(pool: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// init_invalidation_functions(pool).await?;
/// # Ok(())
/// # }
/// ```
pub async fn init_invalidation_functions(pool: &PgPool) -> Result<(), sqlx::Error> {
    const SQL: &str = include_str!("../sql/cache_invalidation_functions.sql");
    sqlx::raw_sql(SQL).execute(pool).await?;
    Ok(())
}

/// Remove the cache invalidation function from the database
///
/// # Example
///
/// ```rust,no_run
/// use sqlx::PgPool;
/// use transactional_tag_cache::cleanup_invalidation_functions;
///
/// # async fn example(pool: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// cleanup_invalidation_functions(pool).await?;
/// # Ok(())
/// # }
/// ```
pub async fn cleanup_invalidation_functions(pool: &PgPool) -> Result<(), sqlx::Error> {
    const SQL: &str = include_str!("../cleanup/cleanup_cache_invalidation_functions.sql");
    sqlx::raw_sql(SQL).execute(pool).await?;
    Ok(())
}
