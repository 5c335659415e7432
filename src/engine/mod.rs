mod session_api;

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    api::API,
    config::Settings,
    error::{not_found_error, Error},
    external::DynProvider,
    map::HeadlessMap,
    navigation::Navigator,
};

/// Registry of live navigation sessions. Each session gets its own
/// navigator task and a headless map fed by its projections.
pub struct Engine {
    provider: DynProvider,
    settings: Settings,
    sessions: RwLock<HashMap<Uuid, Entry>>,
}

#[derive(Clone)]
struct Entry {
    navigator: Navigator,
    map: HeadlessMap,
    created_at: DateTime<Utc>,
}

impl Engine {
    #[tracing::instrument(name = "Engine::new", skip_all)]
    pub fn new(provider: DynProvider, settings: Settings) -> Self {
        tracing::info!(?settings, "engine ready");

        Self {
            provider,
            settings,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    async fn entry(&self, id: Uuid) -> Result<Entry, Error> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(not_found_error)
    }

    async fn discard(&self, id: Uuid) -> Option<Entry> {
        self.sessions.write().await.remove(&id)
    }
}

impl API for Engine {}
