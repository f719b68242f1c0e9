use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::services::mailbox::MailboxClient;
use crate::services::providers::router::ProviderRouter;
use crate::services::sink::{Notifier, SummaryStore};

use super::inflight::InflightSet;
use super::types::{BatchOutcome, Fingerprint, Job, PipelineDefaults, SubmitOutcome};
use super::worker;

/// Everything the pipeline consumes from the outside world. Trait objects so
/// tests can swap in in-memory fakes.
#[derive(Clone)]
pub struct PipelineDeps {
    pub store: Arc<dyn SummaryStore>,
    pub notifier: Arc<dyn Notifier>,
    pub mailbox: Arc<dyn MailboxClient>,
    pub router: Arc<ProviderRouter>,
}

/// Background summarization pipeline: dedup gate, bounded queue, worker
/// pool. One instance per process.
pub struct SummaryPipeline {
    defaults: PipelineDefaults,
    deps: PipelineDeps,
    inflight: InflightSet,
    sender: RwLock<Option<mpsc::Sender<Job>>>,
    receiver: Mutex<Option<mpsc::Receiver<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    abandon: CancellationToken,
}

static PIPELINE: OnceCell<Arc<SummaryPipeline>> = OnceCell::new();

impl SummaryPipeline {
    pub fn new(defaults: PipelineDefaults, deps: PipelineDeps) -> Arc<Self> {
        let (sender, receiver) = mpsc::channel(defaults.queue_capacity);
        Arc::new(Self {
            defaults,
            deps,
            inflight: InflightSet::new(),
            sender: RwLock::new(Some(sender)),
            receiver: Mutex::new(Some(receiver)),
            workers: Mutex::new(Vec::new()),
            abandon: CancellationToken::new(),
        })
    }

    pub fn defaults(&self) -> &PipelineDefaults {
        &self.defaults
    }

    pub fn provider_router(&self) -> Arc<ProviderRouter> {
        self.deps.router.clone()
    }

    /// Spawns the worker pool. A second call is a no-op.
    pub fn start(self: Arc<Self>) {
        let Some(receiver) = self.receiver.lock().take() else {
            warn!("[SUMMARY-PIPELINE] start called twice, ignoring");
            return;
        };

        let shared = Arc::new(tokio::sync::Mutex::new(receiver));
        let mut workers = self.workers.lock();
        for worker_id in 0..self.defaults.workers {
            workers.push(tokio::spawn(worker::run_worker(
                self.clone(),
                worker_id,
                shared.clone(),
            )));
        }

        info!(
            "[SUMMARY-PIPELINE] started {} workers, queue capacity {}",
            self.defaults.workers, self.defaults.queue_capacity
        );
    }

    /// Dedup gate for one fingerprint. Errors mean the message itself could
    /// not be fetched; every other path maps to a `SubmitOutcome`.
    pub async fn submit(&self, account_id: &str, message_id: &str) -> Result<SubmitOutcome, String> {
        if self.deps.store.contains(account_id, message_id).await? {
            return Ok(SubmitOutcome::AlreadyCached);
        }
        self.admit(Fingerprint::new(account_id, message_id)).await
    }

    /// Batch intake: returns what is already cached for immediate display
    /// and admits the rest independently.
    pub async fn enqueue_batch(
        &self,
        account_id: &str,
        message_ids: &[String],
    ) -> Result<BatchOutcome, String> {
        let cached = self.deps.store.get_cached(account_id, message_ids).await?;

        let mut outcomes = HashMap::new();
        let mut queued_count = 0;
        for message_id in message_ids {
            if outcomes.contains_key(message_id) {
                continue;
            }
            if cached.contains_key(message_id) {
                outcomes.insert(message_id.clone(), SubmitOutcome::AlreadyCached);
                continue;
            }

            match self.admit(Fingerprint::new(account_id, message_id.clone())).await {
                Ok(outcome) => {
                    if outcome == SubmitOutcome::Admitted {
                        queued_count += 1;
                    }
                    outcomes.insert(message_id.clone(), outcome);
                }
                Err(err) => {
                    warn!(
                        "[SUMMARY-PIPELINE] skipping message {} for account {}: {}",
                        message_id, account_id, err
                    );
                }
            }
        }

        Ok(BatchOutcome {
            cached,
            queued_count,
            outcomes,
        })
    }

    async fn admit(&self, fingerprint: Fingerprint) -> Result<SubmitOutcome, String> {
        if !self.inflight.try_insert(fingerprint.clone()) {
            return Ok(SubmitOutcome::AlreadyInFlight);
        }

        let message = match self
            .deps
            .mailbox
            .get_message(&fingerprint.account_id, &fingerprint.message_id)
            .await
        {
            Ok(message) => message,
            Err(err) => {
                self.inflight.remove(&fingerprint);
                return Err(err);
            }
        };

        let job = Job {
            fingerprint: fingerprint.clone(),
            subject: message.subject,
            body: message.body,
        };

        // After shutdown the sender is gone; admission is closed.
        let Some(sender) = self.sender.read().clone() else {
            self.inflight.remove(&fingerprint);
            return Ok(SubmitOutcome::QueueFull);
        };

        match sender.try_send(job) {
            Ok(()) => Ok(SubmitOutcome::Admitted),
            Err(_) => {
                self.inflight.remove(&fingerprint);
                Ok(SubmitOutcome::QueueFull)
            }
        }
    }

    /// Stops admission, closes the queue so workers drain it, waits up to
    /// the grace period, then abandons whatever is still running.
    pub async fn shutdown(&self, grace: Duration) {
        drop(self.sender.write().take());

        let handles: Vec<JoinHandle<()>> = {
            let mut workers = self.workers.lock();
            std::mem::take(&mut *workers)
        };
        if handles.is_empty() {
            return;
        }

        match tokio::time::timeout(grace, futures::future::join_all(handles)).await {
            Ok(_) => info!("[SUMMARY-PIPELINE] drained and stopped"),
            Err(_) => {
                warn!(
                    "[SUMMARY-PIPELINE] grace period expired, abandoning {} in-flight jobs",
                    self.inflight.len()
                );
                self.abandon.cancel();
            }
        }
    }

    pub(super) fn abandon_signal(&self) -> &CancellationToken {
        &self.abandon
    }

    pub(super) fn router(&self) -> &ProviderRouter {
        self.deps.router.as_ref()
    }

    pub(super) fn store(&self) -> &dyn SummaryStore {
        self.deps.store.as_ref()
    }

    pub(super) fn notifier(&self) -> &dyn Notifier {
        self.deps.notifier.as_ref()
    }

    pub(super) fn release(&self, fingerprint: &Fingerprint) {
        self.inflight.remove(fingerprint);
    }
}

/// Wires the process-wide pipeline once at startup. Idempotent.
pub fn init_global(pipeline: Arc<SummaryPipeline>) -> Arc<SummaryPipeline> {
    PIPELINE.get_or_init(|| pipeline).clone()
}

pub fn get() -> Arc<SummaryPipeline> {
    PIPELINE
        .get()
        .expect("summary pipeline not initialized")
        .clone()
}
