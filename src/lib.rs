pub mod activation;
pub mod api;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod intake;
pub mod models;
pub mod routing;

use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::api::server::ServerError;
use crate::api::ApiContext;
use crate::config::ServiceConfig;
use crate::db::DatabaseError;
use crate::routing::{GeminiClient, LexiconError, LlmClient, RoutingLexicon};

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Routing lexicon: {0}")]
    Lexicon(#[from] LexiconError),

    #[error("Database: {0}")]
    Database(#[from] DatabaseError),

    #[error("Cannot start async runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error(transparent)]
    Server(#[from] ServerError),
}

pub fn run() -> Result<(), StartupError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = ServiceConfig::from_env();
    let lexicon = RoutingLexicon::load_or_default(config.lexicon_path.as_deref())?;

    // Migrate up front so a broken database fails startup, not the first request.
    db::open_database(&config.db_path)?;
    tracing::info!(path = %config.db_path.display(), "Database ready");

    // The blocking Gemini client owns its own runtime: it is built here,
    // outside tokio, and released only after the server runtime is gone.
    let advisor = build_advisor(&config);

    let mut ctx = ApiContext::new(config.db_path.clone(), lexicon);
    if let Some(advisor) = &advisor {
        ctx = ctx.with_advisor(Arc::clone(advisor));
    }

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(api::serve(ctx, &config.listen_addr));
    drop(runtime);
    drop(advisor);

    tracing::info!("{} stopped", config::APP_NAME);
    Ok(result?)
}

fn build_advisor(config: &ServiceConfig) -> Option<Arc<dyn LlmClient>> {
    match GeminiClient::from_config(config) {
        Ok(Some(client)) => {
            tracing::info!(
                model = %config.gemini_model,
                timeout_secs = config.ai_timeout.as_secs(),
                "AI routing suggestions enabled"
            );
            Some(Arc::new(client))
        }
        Ok(None) => {
            tracing::info!("GEMINI_API_KEY not set; deterministic routing only");
            None
        }
        Err(e) => {
            tracing::warn!("AI routing disabled: {e}");
            None
        }
    }
}
