use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// Dedup and cache key: one summarizable unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub account_id: String,
    pub message_id: String,
}

impl Fingerprint {
    pub fn new(account_id: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            message_id: message_id.into(),
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.account_id, self.message_id)
    }
}

/// Immutable unit of work. Created by intake, consumed exactly once by a
/// worker, never persisted.
#[derive(Debug, Clone)]
pub struct Job {
    pub fingerprint: Fingerprint,
    pub subject: String,
    pub body: String,
}

impl Job {
    pub fn provider_text(&self) -> String {
        if self.subject.trim().is_empty() {
            return self.body.clone();
        }
        format!("Subject: {}\n\n{}", self.subject, self.body)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitOutcome {
    Admitted,
    AlreadyCached,
    AlreadyInFlight,
    QueueFull,
}

/// Client-facing shape of a batch submission: what is known now plus how
/// much will arrive asynchronously.
#[derive(Debug, Serialize)]
pub struct BatchOutcome {
    pub cached: HashMap<String, String>,
    pub queued_count: usize,
    pub outcomes: HashMap<String, SubmitOutcome>,
}

#[derive(Debug, Clone)]
pub struct PipelineDefaults {
    pub workers: usize,
    pub queue_capacity: usize,
    pub call_timeout_seconds: u64,
    pub shutdown_grace_seconds: u64,
}

impl PipelineDefaults {
    pub fn from_env() -> Self {
        let workers = std::env::var("SUMMARY_PIPELINE_WORKERS")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .unwrap_or(3)
            .max(1);
        let queue_capacity = std::env::var("SUMMARY_PIPELINE_QUEUE_CAPACITY")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .unwrap_or(100)
            .max(1);
        let call_timeout_seconds = std::env::var("SUMMARY_PIPELINE_CALL_TIMEOUT_SECONDS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(60)
            .max(1);
        let shutdown_grace_seconds = std::env::var("SUMMARY_PIPELINE_SHUTDOWN_GRACE_SECONDS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(20);

        Self {
            workers,
            queue_capacity,
            call_timeout_seconds,
            shutdown_grace_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_text_includes_subject_when_present() {
        let job = Job {
            fingerprint: Fingerprint::new("acct", "msg"),
            subject: "Quarterly numbers".to_string(),
            body: "See attached.".to_string(),
        };
        assert_eq!(job.provider_text(), "Subject: Quarterly numbers\n\nSee attached.");

        let bare = Job {
            fingerprint: Fingerprint::new("acct", "msg"),
            subject: "  ".to_string(),
            body: "Body only.".to_string(),
        };
        assert_eq!(bare.provider_text(), "Body only.");
    }

    #[test]
    fn fingerprint_display_joins_account_and_message() {
        assert_eq!(Fingerprint::new("a1", "m9").to_string(), "a1/m9");
    }
}
