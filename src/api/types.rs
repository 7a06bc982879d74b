//! Shared state for the HTTP layer.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusqlite::Connection;

use crate::api::error::ApiError;
use crate::db;
use crate::models::Ambulance;
use crate::routing::{
    DoctorRouter, LexiconScorer, LlmClient, RoutingError, RoutingLexicon, RoutingOutcome,
    SqliteStore, SweepEntry,
};

/// Shared context for all API routes and middleware.
///
/// Holds no connection: each request opens its own on a blocking thread.
#[derive(Clone)]
pub struct ApiContext {
    db_path: Arc<PathBuf>,
    lexicon: Arc<RoutingLexicon>,
    advisor: Option<Arc<dyn LlmClient>>,
}

impl ApiContext {
    pub fn new(db_path: PathBuf, lexicon: RoutingLexicon) -> Self {
        Self {
            db_path: Arc::new(db_path),
            lexicon: Arc::new(lexicon),
            advisor: None,
        }
    }

    pub fn with_advisor(mut self, advisor: Arc<dyn LlmClient>) -> Self {
        self.advisor = Some(advisor);
        self
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn ai_enabled(&self) -> bool {
        self.advisor.is_some()
    }

    pub fn open_db(&self) -> Result<Connection, ApiError> {
        Ok(db::open_database(&self.db_path)?)
    }

    /// Run `f` with a fresh connection on the blocking pool.
    pub async fn with_db<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&ApiContext, &Connection) -> Result<T, ApiError> + Send + 'static,
    {
        let ctx = self.clone();
        tokio::task::spawn_blocking(move || {
            let conn = ctx.open_db()?;
            f(&ctx, &conn)
        })
        .await?
    }

    /// Route one emergency with the configured lexicon and advisor.
    pub fn route(
        &self,
        conn: &Connection,
        emergency_id: &uuid::Uuid,
    ) -> Result<RoutingOutcome, RoutingError> {
        let store = SqliteStore::new(conn);
        let scorer = LexiconScorer::new(&self.lexicon);
        self.router(&store, &scorer).assign(emergency_id)
    }

    /// Route every unassigned emergency.
    pub fn route_pending(&self, conn: &Connection) -> Result<Vec<SweepEntry>, RoutingError> {
        let store = SqliteStore::new(conn);
        let scorer = LexiconScorer::new(&self.lexicon);
        self.router(&store, &scorer).route_pending()
    }

    fn router<'a>(
        &'a self,
        store: &'a SqliteStore<'a>,
        scorer: &'a LexiconScorer<'a>,
    ) -> DoctorRouter<'a> {
        let router = DoctorRouter::new(store, scorer);
        match self.advisor.as_deref() {
            Some(advisor) => router.with_advisor(advisor),
            None => router,
        }
    }
}

/// Ambulance resolved from the `device_token` header, injected into
/// request extensions by the device middleware.
#[derive(Debug, Clone)]
pub struct AmbulanceContext {
    pub ambulance: Ambulance,
}
