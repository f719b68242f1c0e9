use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::models::summary::{SummaryRecord, SummaryRecordService};
use crate::services::notify_hub;

pub type SinkBoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Durable summary store consumed by the pipeline. `put` must be an
/// idempotent upsert; a cached entry is authoritative until invalidated by
/// something outside this core.
pub trait SummaryStore: Send + Sync {
    fn get_cached<'a>(
        &'a self,
        account_id: &'a str,
        message_ids: &'a [String],
    ) -> SinkBoxFuture<'a, Result<HashMap<String, String>, String>>;

    fn put<'a>(
        &'a self,
        account_id: &'a str,
        message_id: &'a str,
        summary_text: &'a str,
    ) -> SinkBoxFuture<'a, Result<(), String>>;

    fn contains<'a>(
        &'a self,
        account_id: &'a str,
        message_id: &'a str,
    ) -> SinkBoxFuture<'a, Result<bool, String>>;
}

/// Best-effort push channel to one account's open sessions. Returns
/// immediately regardless of delivery outcome.
pub trait Notifier: Send + Sync {
    fn notify(&self, account_id: &str, event: &Value);
}

pub struct SqliteSummaryStore;

impl SummaryStore for SqliteSummaryStore {
    fn get_cached<'a>(
        &'a self,
        account_id: &'a str,
        message_ids: &'a [String],
    ) -> SinkBoxFuture<'a, Result<HashMap<String, String>, String>> {
        Box::pin(async move { SummaryRecordService::get_cached_map(account_id, message_ids).await })
    }

    fn put<'a>(
        &'a self,
        account_id: &'a str,
        message_id: &'a str,
        summary_text: &'a str,
    ) -> SinkBoxFuture<'a, Result<(), String>> {
        Box::pin(async move {
            let record = SummaryRecord::new(
                account_id.to_string(),
                message_id.to_string(),
                summary_text.to_string(),
            );
            SummaryRecordService::upsert(&record).await
        })
    }

    fn contains<'a>(
        &'a self,
        account_id: &'a str,
        message_id: &'a str,
    ) -> SinkBoxFuture<'a, Result<bool, String>> {
        Box::pin(async move { SummaryRecordService::exists(account_id, message_id).await })
    }
}

pub struct SessionNotifier;

impl Notifier for SessionNotifier {
    fn notify(&self, account_id: &str, event: &Value) {
        notify_hub::get().notify(account_id, event);
    }
}
