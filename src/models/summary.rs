use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::repositories::summaries as repo;

/// Persisted summary for one (account, message) pair. Upserted only by a
/// pipeline worker; readers treat an existing row as authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub id: String,
    pub account_id: String,
    pub message_id: String,
    pub summary_text: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, FromRow)]
pub struct SummaryRecordRow {
    pub id: String,
    pub account_id: String,
    pub message_id: String,
    pub summary_text: String,
    pub created_at: String,
    pub updated_at: String,
}

impl SummaryRecordRow {
    pub fn to_record(self) -> SummaryRecord {
        SummaryRecord {
            id: self.id,
            account_id: self.account_id,
            message_id: self.message_id,
            summary_text: self.summary_text,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl SummaryRecord {
    pub fn new(account_id: String, message_id: String, summary_text: String) -> SummaryRecord {
        let now = crate::utils::time::now_rfc3339();
        SummaryRecord {
            id: Uuid::new_v4().to_string(),
            account_id,
            message_id,
            summary_text,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

pub struct SummaryRecordService;

impl SummaryRecordService {
    pub async fn upsert(record: &SummaryRecord) -> Result<(), String> {
        repo::upsert_summary(record).await
    }

    pub async fn get_cached_map(
        account_id: &str,
        message_ids: &[String],
    ) -> Result<HashMap<String, String>, String> {
        repo::get_cached_map(account_id, message_ids).await
    }

    pub async fn exists(account_id: &str, message_id: &str) -> Result<bool, String> {
        repo::exists(account_id, message_id).await
    }
}
