use std::sync::Arc;

use crate::{db::Store, services::metadata::MetadataProvider};

/// Shared application state, cheap to clone into handlers and tasks
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub metadata: Arc<dyn MetadataProvider>,
    /// Country whose subscription offers are mirrored on provider sync
    pub watch_region: String,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        metadata: Arc<dyn MetadataProvider>,
        watch_region: impl Into<String>,
    ) -> Self {
        Self {
            store,
            metadata,
            watch_region: watch_region.into(),
        }
    }
}
