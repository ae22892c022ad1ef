//! Background Worker binary (spec §4.7). Composition root: load config, set
//! up logging, wire the Cache/DocumentStore/LLM connector/Orchestrator/DLQ,
//! and run the poll loop until SIGINT/SIGTERM. Grounded on
//! `examples/original_source/apps/worker/main.py`'s `main()` and
//! `kgctl/src/main.rs`'s verbosity-to-`tracing::Level` bootstrap.

mod config;
mod dlq;
mod document_store;
mod worker;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, Level};

use kgx_adapter_cache_memory::InMemoryCache;
use kgx_connector_llm_http::{HttpLlmConnector, NullLlmConnector};
use kgx_core::traits::LlmConnector;
use kgx_extraction::tier_a::patterns::EntityPatternMatcher;
use kgx_extraction::tier_b::window_selector::WindowSelector;
use kgx_extraction::tier_c::llm_client::TierCLlmClient;
use kgx_extraction::ExtractionOrchestrator;

use config::WorkerConfig;
use dlq::DeadLetterQueue;
use document_store::InMemoryDocumentStore;
use worker::ExtractionWorker;

#[derive(Parser, Debug)]
#[command(name = "kgx-worker", about = "Extraction queue worker")]
struct Cli {
    /// Path to a YAML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    let log_level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let config = match WorkerConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("failed to load configuration: {e}");
            process::exit(1);
        }
    };

    info!(
        poll_timeout_secs = config.poll_timeout_secs,
        max_retries = config.max_retries,
        "starting kgx-worker"
    );

    let cache = Arc::new(InMemoryCache::new());
    let document_store = Arc::new(InMemoryDocumentStore::new());

    let connector: Arc<dyn LlmConnector> = match &config.llm {
        Some(llm_config) => match HttpLlmConnector::new(llm_config.clone()) {
            Ok(connector) => {
                info!(api_base = %llm_config.api_base, model = %llm_config.model, "using HTTP LLM connector");
                Arc::new(connector)
            }
            Err(e) => {
                error!("failed to build HTTP LLM connector: {e}");
                process::exit(1);
            }
        },
        None => {
            info!("no LLM connector configured, Tier C will always return empty triples");
            Arc::new(NullLlmConnector)
        }
    };

    let patterns = EntityPatternMatcher::new();
    let window_selector = WindowSelector::default();
    let llm_client = TierCLlmClient::new(connector, cache.clone());
    let orchestrator = Arc::new(ExtractionOrchestrator::new(
        patterns,
        window_selector,
        llm_client,
        cache.clone(),
    ));

    let dlq = DeadLetterQueue::new(cache.clone(), config.max_retries, config.base_delay_secs);

    let worker = Arc::new(ExtractionWorker::new(
        cache,
        orchestrator,
        document_store,
        dlq,
        Duration::from_secs(config.poll_timeout_secs),
    ));

    let shutdown_worker = worker.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {e}");
            return;
        }
        shutdown_worker.signal_stop();
    });

    #[cfg(unix)]
    {
        let sigterm_worker = worker.clone();
        tokio::spawn(async move {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    sigterm_worker.signal_stop();
                }
                Err(e) => error!("failed to install SIGTERM handler: {e}"),
            }
        });
    }

    worker.run().await;
}
