use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::timeout;
use tracing::{info, warn};

use super::classify::{classify, FailureClass};
use super::{AiProvider, OperationKind, ProviderFuture, TaskSuggestion};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider connection failure: {0}")]
    Connection(String),
    #[error("provider quota failure: {0}")]
    Quota(String),
    #[error("provider failure: {0}")]
    Other(String),
    #[error("no provider available: {0}")]
    NoProviderAvailable(String),
}

impl ProviderError {
    fn from_classified(message: String) -> Self {
        match classify(&message) {
            FailureClass::Connection => ProviderError::Connection(message),
            FailureClass::Quota => ProviderError::Quota(message),
            FailureClass::Other => ProviderError::Other(message),
        }
    }
}

/// Failover router over the two configured providers. Summaries prefer the
/// fast local endpoint; task extraction and term suggestion prefer the
/// hosted endpoint, where quality matters more than latency.
pub struct ProviderRouter {
    fast: Arc<dyn AiProvider>,
    quality: Option<Arc<dyn AiProvider>>,
    call_deadline: Duration,
}

impl ProviderRouter {
    pub fn new(
        fast: Arc<dyn AiProvider>,
        quality: Option<Arc<dyn AiProvider>>,
        call_deadline: Duration,
    ) -> Self {
        Self {
            fast,
            quality,
            call_deadline,
        }
    }

    pub async fn summarize(&self, text: &str) -> Result<String, ProviderError> {
        self.route(OperationKind::Summarize, move |provider| provider.summarize(text))
            .await
    }

    pub async fn extract_tasks(&self, text: &str) -> Result<Vec<TaskSuggestion>, ProviderError> {
        self.route(OperationKind::ExtractTasks, move |provider| provider.extract_tasks(text))
            .await
    }

    pub async fn suggest_related_terms(&self, term: &str) -> Result<Vec<String>, ProviderError> {
        self.route(OperationKind::SuggestTerms, move |provider| {
            provider.suggest_related_terms(term)
        })
        .await
    }

    fn order_for(&self, kind: OperationKind) -> (&dyn AiProvider, Option<&dyn AiProvider>) {
        match kind {
            OperationKind::Summarize => {
                (self.fast.as_ref(), self.quality.as_deref())
            }
            OperationKind::ExtractTasks | OperationKind::SuggestTerms => match self.quality.as_deref() {
                Some(quality) => (quality, Some(self.fast.as_ref())),
                None => (self.fast.as_ref(), None),
            },
        }
    }

    /// One routed call: primary, then secondary, then only on a productive
    /// class mismatch (connection vs quota) one extra primary attempt. Every
    /// provider call is bounded by the per-call deadline; expiry counts as a
    /// connection failure.
    async fn route<'r, T, F>(&'r self, kind: OperationKind, call: F) -> Result<T, ProviderError>
    where
        F: Fn(&'r dyn AiProvider) -> ProviderFuture<'r, Result<T, String>>,
    {
        let (primary, secondary) = self.order_for(kind);

        let primary_err = match self.attempt(call(primary)).await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        let primary_class = classify(&primary_err);
        warn!(
            "[PROVIDER-ROUTER] primary failed: operation={} provider={} class={:?} error={}",
            kind.as_str(),
            primary.name(),
            primary_class,
            primary_err
        );

        let Some(secondary) = secondary else {
            return Err(ProviderError::from_classified(primary_err));
        };

        let secondary_err = match self.attempt(call(secondary)).await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        let secondary_class = classify(&secondary_err);
        warn!(
            "[PROVIDER-ROUTER] secondary failed: operation={} provider={} class={:?} error={}",
            kind.as_str(),
            secondary.name(),
            secondary_class,
            secondary_err
        );

        if productive_mismatch(primary_class, secondary_class) {
            info!(
                "[PROVIDER-ROUTER] class mismatch, retrying primary once: operation={} provider={}",
                kind.as_str(),
                primary.name()
            );
            return self
                .attempt(call(primary))
                .await
                .map_err(ProviderError::from_classified);
        }

        Err(ProviderError::NoProviderAvailable(format!(
            "{} failed on primary ({}: {}) and secondary ({}: {})",
            kind.as_str(),
            primary.name(),
            primary_err,
            secondary.name(),
            secondary_err
        )))
    }

    async fn attempt<T>(
        &self,
        future: ProviderFuture<'_, Result<T, String>>,
    ) -> Result<T, String> {
        match timeout(self.call_deadline, future).await {
            Ok(result) => result,
            Err(_) => Err(format!(
                "provider call timeout after {}s",
                self.call_deadline.as_secs()
            )),
        }
    }
}

/// A connection/quota split in either order means the primary might be
/// reachable again or was never quota-limited. `Other` never qualifies.
fn productive_mismatch(primary: FailureClass, secondary: FailureClass) -> bool {
    matches!(
        (primary, secondary),
        (FailureClass::Connection, FailureClass::Quota)
            | (FailureClass::Quota, FailureClass::Connection)
    )
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use super::*;

    /// Replays a scripted sequence of summarize results; the last entry
    /// repeats once the script is exhausted.
    struct ScriptedProvider {
        name: &'static str,
        script: Mutex<VecDeque<Result<String, String>>>,
        last: Result<String, String>,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(name: &'static str, script: Vec<Result<String, String>>) -> Arc<Self> {
            let last = script
                .last()
                .cloned()
                .unwrap_or_else(|| Err("script empty".to_string()));
            Arc::new(Self {
                name,
                script: Mutex::new(script.into_iter().collect()),
                last,
                calls: AtomicUsize::new(0),
            })
        }

        fn always_ok(name: &'static str, text: &str) -> Arc<Self> {
            Self::new(name, vec![Ok(text.to_string())])
        }

        fn always_err(name: &'static str, error: &str) -> Arc<Self> {
            Self::new(name, vec![Err(error.to_string())])
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn next_result(&self) -> Result<String, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script.lock().pop_front().unwrap_or_else(|| self.last.clone())
        }
    }

    fn router_under_test(
        fast: Arc<dyn AiProvider>,
        quality: Option<Arc<dyn AiProvider>>,
    ) -> ProviderRouter {
        ProviderRouter::new(fast, quality, Duration::from_secs(5))
    }

    impl AiProvider for ScriptedProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        fn summarize<'a>(&'a self, _text: &'a str) -> ProviderFuture<'a, Result<String, String>> {
            Box::pin(async move { self.next_result() })
        }

        fn extract_tasks<'a>(
            &'a self,
            _text: &'a str,
        ) -> ProviderFuture<'a, Result<Vec<TaskSuggestion>, String>> {
            Box::pin(async move {
                self.next_result().map(|title| {
                    vec![TaskSuggestion {
                        title,
                        description: None,
                        due_date: None,
                        priority: "normal".to_string(),
                    }]
                })
            })
        }

        fn suggest_related_terms<'a>(
            &'a self,
            _term: &'a str,
        ) -> ProviderFuture<'a, Result<Vec<String>, String>> {
            Box::pin(async move { self.next_result().map(|term| vec![term]) })
        }
    }

    #[tokio::test]
    async fn summarize_prefers_fast_provider() {
        let fast = ScriptedProvider::always_ok("fast", "fast summary");
        let quality = ScriptedProvider::always_ok("quality", "quality summary");
        let router = router_under_test(fast.clone(), Some(quality.clone()));

        let text = router.summarize("hello").await.expect("summarize");
        assert_eq!(text, "fast summary");
        assert_eq!(fast.calls(), 1);
        assert_eq!(quality.calls(), 0);
    }

    #[tokio::test]
    async fn extract_tasks_prefers_quality_provider() {
        let fast = ScriptedProvider::always_ok("fast", "fast task");
        let quality = ScriptedProvider::always_ok("quality", "quality task");
        let router = router_under_test(fast.clone(), Some(quality.clone()));

        let tasks = router.extract_tasks("email").await.expect("extract");
        assert_eq!(tasks[0].title, "quality task");
        assert_eq!(quality.calls(), 1);
        assert_eq!(fast.calls(), 0);
    }

    #[tokio::test]
    async fn falls_back_to_secondary_on_connection_failure() {
        let fast = ScriptedProvider::always_err("fast", "connection refused");
        let quality = ScriptedProvider::always_ok("quality", "rescued");
        let router = router_under_test(fast.clone(), Some(quality.clone()));

        let text = router.summarize("hello").await.expect("summarize");
        assert_eq!(text, "rescued");
        assert_eq!(fast.calls(), 1);
        assert_eq!(quality.calls(), 1);
    }

    #[tokio::test]
    async fn class_mismatch_retries_primary_exactly_once() {
        // Primary: connection failure, then success on the extra attempt.
        let fast = ScriptedProvider::new(
            "fast",
            vec![Err("connection reset".to_string()), Ok("recovered".to_string())],
        );
        let quality = ScriptedProvider::always_err("quality", "status 429: rate limit");
        let router = router_under_test(fast.clone(), Some(quality.clone()));

        let text = router.summarize("hello").await.expect("summarize");
        assert_eq!(text, "recovered");
        assert_eq!(fast.calls(), 2);
        assert_eq!(quality.calls(), 1);
    }

    #[tokio::test]
    async fn class_mismatch_retry_error_is_returned_classified() {
        let fast = ScriptedProvider::always_err("fast", "quota exceeded");
        let quality = ScriptedProvider::always_err("quality", "connection refused");
        let router = router_under_test(fast.clone(), Some(quality.clone()));

        let err = router.summarize("hello").await.unwrap_err();
        // Quota primary + connection secondary mismatches productively, so the
        // primary is tried once more and its (quota) error comes back.
        assert!(matches!(err, ProviderError::Quota(_)));
        assert_eq!(fast.calls(), 2);
        assert_eq!(quality.calls(), 1);
    }

    #[tokio::test]
    async fn same_class_failures_do_not_retry_primary() {
        let fast = ScriptedProvider::always_err("fast", "connection refused");
        let quality = ScriptedProvider::always_err("quality", "timeout talking upstream");
        let router = router_under_test(fast.clone(), Some(quality.clone()));

        let err = router.summarize("hello").await.unwrap_err();
        assert!(matches!(err, ProviderError::NoProviderAvailable(_)));
        assert_eq!(fast.calls(), 1);
        assert_eq!(quality.calls(), 1);
    }

    #[tokio::test]
    async fn other_class_never_triggers_the_extra_attempt() {
        let fast = ScriptedProvider::always_err("fast", "invalid api key");
        let quality = ScriptedProvider::always_err("quality", "connection refused");
        let router = router_under_test(fast.clone(), Some(quality.clone()));

        let err = router.summarize("hello").await.unwrap_err();
        assert!(matches!(err, ProviderError::NoProviderAvailable(_)));
        assert_eq!(fast.calls(), 1);
        assert_eq!(quality.calls(), 1);
    }

    #[tokio::test]
    async fn missing_secondary_returns_classified_primary_error() {
        let fast = ScriptedProvider::always_err("fast", "status 429: too many requests");
        let router = router_under_test(fast.clone(), None);

        let err = router.summarize("hello").await.unwrap_err();
        assert!(matches!(err, ProviderError::Quota(_)));
        assert_eq!(fast.calls(), 1);

        // Without a quality provider, extraction runs on the fast one.
        let err = router.extract_tasks("email").await.unwrap_err();
        assert!(matches!(err, ProviderError::Quota(_)));
        assert_eq!(fast.calls(), 2);
    }

    struct HangingProvider;

    impl AiProvider for HangingProvider {
        fn name(&self) -> &'static str {
            "hanging"
        }

        fn summarize<'a>(&'a self, _text: &'a str) -> ProviderFuture<'a, Result<String, String>> {
            Box::pin(std::future::pending())
        }

        fn extract_tasks<'a>(
            &'a self,
            _text: &'a str,
        ) -> ProviderFuture<'a, Result<Vec<TaskSuggestion>, String>> {
            Box::pin(std::future::pending())
        }

        fn suggest_related_terms<'a>(
            &'a self,
            _term: &'a str,
        ) -> ProviderFuture<'a, Result<Vec<String>, String>> {
            Box::pin(std::future::pending())
        }
    }

    #[tokio::test]
    async fn stuck_primary_hits_the_deadline_and_fails_over() {
        let quality = ScriptedProvider::always_ok("quality", "rescued");
        let router = ProviderRouter::new(
            Arc::new(HangingProvider),
            Some(quality.clone()),
            Duration::from_millis(50),
        );

        let text = router.summarize("hello").await.expect("summarize");
        assert_eq!(text, "rescued");
        assert_eq!(quality.calls(), 1);
    }
}
