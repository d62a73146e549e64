use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Tables created by the baseline migration.
pub const BASELINE_TABLES: &[&str] = &["customer", "product", "submission"];

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

/// Counts how many of the baseline tables exist in the connected database.
pub async fn baseline_table_count(pool: &DbPool) -> Result<i64, sqlx::Error> {
    let quoted =
        BASELINE_TABLES.iter().map(|table| format!("'{table}'")).collect::<Vec<_>>().join(",");
    sqlx::query_scalar(&format!(
        "SELECT COUNT(1) FROM sqlite_master WHERE type = 'table' AND name IN ({quoted})"
    ))
    .fetch_one(pool)
    .await
}
