//! Database initialization and migration runner.
//!
//! SYSTEM CONTEXT
//! ==============
//! Startup uses this module to create the shared SQLx pool and enforce schema
//! migrations before accepting API traffic.

use sqlx::postgres::PgPoolOptions;
use sqlx::{PgConnection, PgPool};

use crate::models::slug_candidate;

const MAX_SLUG_ATTEMPTS: u32 = 50;

/// Initialize the `PostgreSQL` connection pool and run migrations.
///
/// # Errors
///
/// Returns an error if the connection or migrations fail.
pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    sqlx::migrate!("src/db/migrations").run(&pool).await?;

    Ok(pool)
}

/// Postgres `unique_violation`.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}


/// Tables whose rows are addressed by a unique `slug`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlugTable {
    Photos,
    Albums,
    Categories,
}

impl SlugTable {
    fn exists_sql(self) -> &'static str {
        match self {
            Self::Photos => "SELECT EXISTS (SELECT 1 FROM photos WHERE slug = $1)",
            Self::Albums => "SELECT EXISTS (SELECT 1 FROM albums WHERE slug = $1)",
            Self::Categories => "SELECT EXISTS (SELECT 1 FROM categories WHERE slug = $1)",
        }
    }
}

pub(crate) async fn slug_taken(conn: &mut PgConnection, table: SlugTable, slug: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(table.exists_sql())
        .bind(slug)
        .fetch_one(&mut *conn)
        .await
}

/// First free slug among `base`, `base-2`, `base-3`, ... within `max_len`.
/// `None` once every attempt is taken.
pub(crate) async fn free_slug(
    conn: &mut PgConnection,
    table: SlugTable,
    base: &str,
    max_len: usize,
) -> Result<Option<String>, sqlx::Error> {
    for attempt in 1..=MAX_SLUG_ATTEMPTS {
        let candidate = slug_candidate(base, attempt, max_len);
        if !slug_taken(conn, table, &candidate).await? {
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}
