use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::QueryExecutor;

/// Shared, immutable per-process context handed to the gate and every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn QueryExecutor>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn QueryExecutor>) -> Self {
        Self { config: Arc::new(config), store }
    }
}
