mod inflight;
mod pipeline;
mod types;
mod worker;

pub use pipeline::{get, init_global, PipelineDeps, SummaryPipeline};
pub use types::{BatchOutcome, Fingerprint, Job, PipelineDefaults, SubmitOutcome};
