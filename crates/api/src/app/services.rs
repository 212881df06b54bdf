//! Store selection and the shared application state handed to handlers.

use std::sync::Arc;

use larder_infra::action_dispatcher::ActionDispatcher;
use larder_infra::store::{InMemoryInventoryStore, InventoryStore, SqliteInventoryStore, StoreError};

use crate::config::StoreConfig;

/// Shared state behind every route.
pub struct AppServices {
    dispatcher: ActionDispatcher<Arc<dyn InventoryStore>>,
}

impl AppServices {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self {
            dispatcher: ActionDispatcher::new(store),
        }
    }

    /// Volatile state, for tests and local runs.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryInventoryStore::new()))
    }

    pub fn dispatcher(&self) -> &ActionDispatcher<Arc<dyn InventoryStore>> {
        &self.dispatcher
    }
}

/// Open the configured store (creating the SQLite schema if needed).
pub async fn build_services(store: &StoreConfig) -> Result<Arc<AppServices>, StoreError> {
    let store: Arc<dyn InventoryStore> = match store {
        StoreConfig::InMemory => {
            tracing::warn!("DATABASE_URL not set; using in-memory store (data is lost on restart)");
            Arc::new(InMemoryInventoryStore::new())
        }
        StoreConfig::Sqlite { url } => {
            tracing::info!(url = %url, "opening sqlite store");
            Arc::new(SqliteInventoryStore::connect(url).await?)
        }
    };
    Ok(Arc::new(AppServices::new(store)))
}
