mod api;
mod config;
mod db;
mod logger;
mod models;
mod modules;
mod repositories;
mod services;
mod utils;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tracing::{error, info};

use crate::modules::summary_pipeline::{self, PipelineDefaults, PipelineDeps, SummaryPipeline};
use crate::services::mailbox::HttpMailboxClient;
use crate::services::providers::local::LocalAiProvider;
use crate::services::providers::openai::HostedAiProvider;
use crate::services::providers::router::ProviderRouter;
use crate::services::providers::settings::{self, LocalAiSettingsStore};
use crate::services::sink::{SessionNotifier, SqliteSummaryStore};
use crate::services::{notify_hub, sink};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cfg = match config::Config::init_global() {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("Failed to load config: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = logger::init_logger(cfg) {
        eprintln!("Failed to init logger: {err}");
        std::process::exit(1);
    }

    if let Err(err) = db::init_global().await {
        error!("Failed to init database: {err}");
        std::process::exit(1);
    }

    notify_hub::init_global();

    let pipeline = match build_pipeline(cfg) {
        Ok(pipeline) => summary_pipeline::init_global(pipeline),
        Err(err) => {
            error!("Failed to build summary pipeline: {err}");
            std::process::exit(1);
        }
    };
    pipeline.clone().start();

    cfg.print();

    let app = api::router();

    let addr = SocketAddr::new(
        cfg.host.parse().unwrap_or_else(|_| "0.0.0.0".parse().unwrap()),
        cfg.port,
    );
    info!("Server running on http://{}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(err) => {
            error!("Failed to bind: {err}");
            std::process::exit(1);
        }
    };

    let server = axum::serve(listener, app);

    if let Err(err) = server.with_graceful_shutdown(shutdown_signal()).await {
        error!("Server error: {err}");
    }

    let grace = Duration::from_secs(pipeline.defaults().shutdown_grace_seconds);
    pipeline.shutdown(grace).await;
    info!("Shutdown complete");
}

fn build_pipeline(cfg: &config::Config) -> Result<Arc<SummaryPipeline>, String> {
    let defaults = PipelineDefaults::from_env();

    let local_settings = settings::init_global(Arc::new(LocalAiSettingsStore::from_config(cfg)));
    let fast = Arc::new(LocalAiProvider::new(
        local_settings,
        cfg.local_ai_api_key.clone(),
    )?);

    let quality = if HostedAiProvider::is_configured(cfg) {
        Some(Arc::new(HostedAiProvider::from_config(cfg)?) as Arc<dyn services::providers::AiProvider>)
    } else {
        info!("Hosted provider not configured, running on the local provider only");
        None
    };

    let router = Arc::new(ProviderRouter::new(
        fast,
        quality,
        Duration::from_secs(defaults.call_timeout_seconds),
    ));

    let deps = PipelineDeps {
        store: Arc::new(SqliteSummaryStore) as Arc<dyn sink::SummaryStore>,
        notifier: Arc::new(SessionNotifier) as Arc<dyn sink::Notifier>,
        mailbox: Arc::new(HttpMailboxClient::from_config(cfg)?),
        router,
    };

    Ok(SummaryPipeline::new(defaults, deps))
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("Shutdown signal received");
}
