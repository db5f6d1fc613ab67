use std::path::Path;
use std::sync::Arc;

use petadmin_core::Settings;
use petadmin_store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub async fn new(settings: Arc<Settings>) -> petadmin_core::Result<Self> {
        let store = Store::open(
            Path::new(&settings.database.path),
            settings.database.max_connections,
        )
        .await?;
        Ok(Self { store, settings })
    }

    /// Build state around an already-open store.
    pub fn with_store(store: Store, settings: Arc<Settings>) -> Self {
        Self { store, settings }
    }
}
