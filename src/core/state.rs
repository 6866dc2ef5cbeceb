use std::sync::Arc;

use crate::core::config::Settings;
use crate::db::LocalStore;
use crate::services::files::FileStore;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    store: Arc<LocalStore>,
    files: FileStore,
}

impl AppState {
    pub fn new(settings: Settings, store: Arc<LocalStore>) -> Self {
        let files = FileStore::from_settings(&settings, Arc::clone(&store));
        Self { inner: Arc::new(InnerState { settings, store, files }) }
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub fn store(&self) -> &LocalStore {
        &self.inner.store
    }

    pub fn files(&self) -> &FileStore {
        &self.inner.files
    }
}
