use std::collections::HashMap;

use sqlx::Row;

use crate::db;
use crate::models::summary::{SummaryRecord, SummaryRecordRow};

/// Idempotent upsert keyed by (account_id, message_id). A replayed write for
/// the same fingerprint keeps the original row id and refreshes the text.
pub async fn upsert_summary(record: &SummaryRecord) -> Result<(), String> {
    sqlx::query(
        "INSERT INTO message_summaries (id, account_id, message_id, summary_text, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?) \
         ON CONFLICT (account_id, message_id) DO UPDATE SET \
         summary_text = excluded.summary_text, updated_at = excluded.updated_at",
    )
    .bind(&record.id)
    .bind(&record.account_id)
    .bind(&record.message_id)
    .bind(&record.summary_text)
    .bind(&record.created_at)
    .bind(&record.updated_at)
    .execute(db::pool())
    .await
    .map_err(|e| e.to_string())?;
    Ok(())
}

pub async fn get_cached_map(
    account_id: &str,
    message_ids: &[String],
) -> Result<HashMap<String, String>, String> {
    if message_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let placeholders = vec!["?"; message_ids.len()].join(", ");
    let sql = format!(
        "SELECT * FROM message_summaries WHERE account_id = ? AND message_id IN ({})",
        placeholders
    );

    let mut query = sqlx::query_as::<_, SummaryRecordRow>(&sql).bind(account_id);
    for message_id in message_ids {
        query = query.bind(message_id);
    }

    let rows = query
        .fetch_all(db::pool())
        .await
        .map_err(|e| e.to_string())?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let record = row.to_record();
            (record.message_id, record.summary_text)
        })
        .collect())
}

pub async fn exists(account_id: &str, message_id: &str) -> Result<bool, String> {
    let row =
        sqlx::query("SELECT 1 AS present FROM message_summaries WHERE account_id = ? AND message_id = ? LIMIT 1")
            .bind(account_id)
            .bind(message_id)
            .fetch_optional(db::pool())
            .await
            .map_err(|e| e.to_string())?;
    Ok(row.map(|r| r.get::<i64, _>("present") == 1).unwrap_or(false))
}
