use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use serde::Serialize;

use crate::config::Config;

/// Read-only view of the local provider's endpoint, resolved per call so the
/// values can change at runtime without rebuilding the provider.
pub trait LocalAiSettings: Send + Sync {
    fn base_url(&self) -> String;
    fn model(&self) -> String;
}

#[derive(Debug, Clone, Serialize)]
pub struct LocalAiSnapshot {
    pub base_url: String,
    pub model: String,
}

pub struct LocalAiSettingsStore {
    inner: RwLock<LocalAiSnapshot>,
}

static SETTINGS: OnceCell<Arc<LocalAiSettingsStore>> = OnceCell::new();

impl LocalAiSettingsStore {
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            inner: RwLock::new(LocalAiSnapshot { base_url, model }),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.local_ai_base_url.clone(), cfg.local_ai_model.clone())
    }

    pub fn snapshot(&self) -> LocalAiSnapshot {
        self.inner.read().clone()
    }

    pub fn update(&self, base_url: Option<String>, model: Option<String>) -> LocalAiSnapshot {
        let mut guard = self.inner.write();
        if let Some(value) = normalize(base_url) {
            guard.base_url = value;
        }
        if let Some(value) = normalize(model) {
            guard.model = value;
        }
        guard.clone()
    }
}

impl LocalAiSettings for LocalAiSettingsStore {
    fn base_url(&self) -> String {
        self.inner.read().base_url.clone()
    }

    fn model(&self) -> String {
        self.inner.read().model.clone()
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
}

/// Idempotent: repeated calls keep the first store.
pub fn init_global(store: Arc<LocalAiSettingsStore>) -> Arc<LocalAiSettingsStore> {
    SETTINGS.get_or_init(|| store).clone()
}

pub fn get() -> Arc<LocalAiSettingsStore> {
    SETTINGS
        .get()
        .expect("local provider settings not initialized")
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_trims_and_ignores_blank_values() {
        let store = LocalAiSettingsStore::new("http://a/v1".to_string(), "m1".to_string());
        let snap = store.update(Some(" http://b/v1/ ".to_string()), Some("   ".to_string()));
        assert_eq!(snap.base_url, "http://b/v1");
        assert_eq!(snap.model, "m1");
        assert_eq!(store.model(), "m1");
    }

    #[test]
    fn update_without_fields_keeps_snapshot() {
        let store = LocalAiSettingsStore::new("http://a/v1".to_string(), "m1".to_string());
        let snap = store.update(None, None);
        assert_eq!(snap.base_url, "http://a/v1");
        assert_eq!(snap.model, "m1");
    }
}
