use std::sync::Arc;

use robur_domain::Service;
use robur_storage::SqliteStorage;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<Service<SqliteStorage>>,
}

impl AppState {
    #[must_use]
    pub fn new(service: Service<SqliteStorage>) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}
