use std::sync::Arc;

use serde_json::json;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use crate::utils::events::Events;
use crate::utils::time::now_rfc3339;

use super::pipeline::SummaryPipeline;
use super::types::Job;

/// One worker loop. Exits when the queue is closed and drained, or when the
/// pipeline abandons remaining work at shutdown.
pub(super) async fn run_worker(
    pipeline: Arc<SummaryPipeline>,
    worker_id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<Job>>>,
) {
    debug!("[SUMMARY-PIPELINE] worker {} started", worker_id);

    loop {
        let job = {
            let mut queue = receiver.lock().await;
            tokio::select! {
                _ = pipeline.abandon_signal().cancelled() => None,
                job = queue.recv() => job,
            }
        };

        let Some(job) = job else {
            break;
        };

        tokio::select! {
            _ = pipeline.abandon_signal().cancelled() => {
                // Fingerprint stays in flight; the set is rebuilt empty at
                // the next process start.
                warn!(
                    "[SUMMARY-PIPELINE] worker {} abandoning job {} at shutdown",
                    worker_id, job.fingerprint
                );
                break;
            }
            _ = process_job(&pipeline, worker_id, &job) => {}
        }
    }

    debug!("[SUMMARY-PIPELINE] worker {} stopped", worker_id);
}

async fn process_job(pipeline: &SummaryPipeline, worker_id: usize, job: &Job) {
    let text = job.provider_text();

    match pipeline.router().summarize(&text).await {
        Ok(summary) => {
            if let Err(err) = pipeline
                .store()
                .put(&job.fingerprint.account_id, &job.fingerprint.message_id, &summary)
                .await
            {
                pipeline.release(&job.fingerprint);
                warn!(
                    "[SUMMARY-PIPELINE] worker {} could not persist summary for {}: {}",
                    worker_id, job.fingerprint, err
                );
                return;
            }

            pipeline.release(&job.fingerprint);

            let event = json!({
                "type": Events::SUMMARY_READY,
                "account_id": job.fingerprint.account_id,
                "message_id": job.fingerprint.message_id,
                "summary": summary,
                "completed_at": now_rfc3339(),
            });
            pipeline.notifier().notify(&job.fingerprint.account_id, &event);

            info!(
                "[SUMMARY-PIPELINE] worker {} summarized {}",
                worker_id, job.fingerprint
            );
        }
        Err(err) => {
            // Both providers exhausted. The job vanishes; a new client
            // request re-admits the fingerprint from scratch.
            pipeline.release(&job.fingerprint);
            warn!(
                "[SUMMARY-PIPELINE] worker {} dropped job {}: {}",
                worker_id, job.fingerprint, err
            );
        }
    }
}
