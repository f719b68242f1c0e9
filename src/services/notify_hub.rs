use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use serde_json::Value;
use tracing::debug;

use crate::utils::sse::SseSender;

/// Registry of each account's open delivery sessions. Pushes are
/// fire-and-forget; a session whose client went away is pruned on the next
/// send attempt.
pub struct NotifyHub {
    sessions: DashMap<String, Vec<SseSender>>,
}

static HUB: OnceCell<Arc<NotifyHub>> = OnceCell::new();

impl NotifyHub {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn attach(&self, account_id: &str, sender: SseSender) {
        let mut entry = self.sessions.entry(account_id.to_string()).or_default();
        entry.retain(|session| !session.is_closed());
        entry.push(sender);
    }

    /// Best-effort broadcast to every open session of one account.
    pub fn notify(&self, account_id: &str, event: &Value) {
        let Some(mut entry) = self.sessions.get_mut(account_id) else {
            debug!(account_id = %account_id, "notify skipped, no open sessions");
            return;
        };

        let before = entry.len();
        entry.retain(|session| session.send_json(event));
        let delivered = entry.len();
        debug!(
            account_id = %account_id,
            delivered = delivered,
            pruned = before - delivered,
            "notify dispatched"
        );
    }

    pub fn session_count(&self, account_id: &str) -> usize {
        self.sessions
            .get(account_id)
            .map(|entry| entry.iter().filter(|session| !session.is_closed()).count())
            .unwrap_or(0)
    }
}

impl Default for NotifyHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Explicit one-time setup invoked from startup. Idempotent: calling it
/// twice keeps the first hub.
pub fn init_global() -> Arc<NotifyHub> {
    HUB.get_or_init(|| Arc::new(NotifyHub::new())).clone()
}

pub fn get() -> Arc<NotifyHub> {
    HUB.get_or_init(|| Arc::new(NotifyHub::new())).clone()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::utils::sse::sse_channel;

    #[tokio::test]
    async fn notify_reaches_attached_sessions_and_prunes_closed_ones() {
        let hub = NotifyHub::new();

        let (open_stream, open_sender) = sse_channel();
        let (closed_stream, closed_sender) = sse_channel();
        hub.attach("acct-1", open_sender);
        hub.attach("acct-1", closed_sender);
        assert_eq!(hub.session_count("acct-1"), 2);

        drop(closed_stream);
        hub.notify("acct-1", &json!({"type": "summary_ready"}));
        assert_eq!(hub.session_count("acct-1"), 1);

        drop(open_stream);
    }

    #[tokio::test]
    async fn notify_without_sessions_is_a_no_op() {
        let hub = NotifyHub::new();
        hub.notify("nobody", &json!({"type": "summary_ready"}));
        assert_eq!(hub.session_count("nobody"), 0);
    }

    #[test]
    fn init_global_is_idempotent() {
        let first = init_global();
        let second = init_global();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
