mod cli;
pub mod collaborator;
pub mod config;
pub mod history;
pub mod models;
pub mod presentation;
pub mod session;
pub mod store;
mod utils;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use collaborator::{AnalysisService, GeminiClient, VocabularyService};
use config::AppConfig;
use history::HistoryManager;
use session::{AnalysisSession, VocabularySession};
use store::{FileStore, MemoryStore, PersistentStore};

/// Everything the front end talks to, built once at startup.
pub struct AppState {
    pub config: AppConfig,
    pub history: Arc<HistoryManager>,
    pub analysis: AnalysisSession,
    pub vocabulary: VocabularySession,
}

impl AppState {
    /// Wires the file-backed history and the HTTP collaborator. With
    /// `ephemeral`, history lives in memory only.
    pub fn new(config: AppConfig, ephemeral: bool) -> Result<Self> {
        let store: Box<dyn PersistentStore> = if ephemeral {
            Box::new(MemoryStore::new())
        } else {
            Box::new(FileStore::new(config.data_dir.clone()).with_context(|| {
                format!("Failed to open data directory {}", config.data_dir.display())
            })?)
        };

        let client = Arc::new(GeminiClient::new(&config).context("Failed to build HTTP client")?);
        Ok(Self::with_services(config, store, client.clone(), client))
    }

    pub fn with_services(
        config: AppConfig,
        store: Box<dyn PersistentStore>,
        analysis_service: Arc<dyn AnalysisService>,
        vocabulary_service: Arc<dyn VocabularyService>,
    ) -> Self {
        let history = Arc::new(HistoryManager::load(store));
        Self {
            analysis: AnalysisSession::new(analysis_service, history.clone()),
            vocabulary: VocabularySession::new(vocabulary_service),
            history,
            config,
        }
    }
}

pub fn run() -> Result<()> {
    // Warnings by default; RUST_LOG raises verbosity.
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let args = cli::Cli::parse();
    let config = AppConfig::from_env()?;
    log::info!("study-lens starting (data dir {})", config.data_dir.display());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(async move {
        let state = AppState::new(config, args.ephemeral)?;
        cli::dispatch(&state, args.command).await
    })
}
