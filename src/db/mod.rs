use std::path::Path;
use std::time::Duration;

use once_cell::sync::OnceCell;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};
use tracing::info;

static DB_POOL: OnceCell<SqlitePool> = OnceCell::new();

pub async fn init_global() -> Result<(), String> {
    if DB_POOL.get().is_some() {
        return Ok(());
    }

    let db_path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| "data/mail_app.db".to_string());
    let pool = init_sqlite(&db_path).await?;
    DB_POOL
        .set(pool)
        .map_err(|_| "database already initialized".to_string())?;
    Ok(())
}

pub fn pool() -> &'static SqlitePool {
    DB_POOL.get().expect("database not initialized")
}

async fn init_sqlite(db_path: &str) -> Result<SqlitePool, String> {
    let path = Path::new(db_path);
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| format!("create sqlite dir failed: {e}"))?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(30_000));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(|e| format!("sqlite connect failed: {e}"))?;

    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await
        .ok();

    create_tables(&pool).await?;

    info!("[SQLite] database initialized: {}", db_path);
    Ok(pool)
}

async fn create_tables(pool: &SqlitePool) -> Result<(), String> {
    let statements = vec![
        r#"CREATE TABLE IF NOT EXISTS message_summaries (
            id TEXT PRIMARY KEY,
            account_id TEXT NOT NULL,
            message_id TEXT NOT NULL,
            summary_text TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (account_id, message_id)
        )"#,
        r#"CREATE INDEX IF NOT EXISTS idx_message_summaries_account
            ON message_summaries (account_id)"#,
    ];

    for statement in statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| format!("create table failed: {e}"))?;
    }

    Ok(())
}
