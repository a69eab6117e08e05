use std::sync::Arc;

use crate::config::{AnalysisConfig, ServerConfig};
use crate::fetch::SnapshotStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SnapshotStore>,
    pub analysis: AnalysisConfig,
    pub server: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(store: Arc<SnapshotStore>, analysis: AnalysisConfig, server: ServerConfig) -> Self {
        Self {
            store,
            analysis,
            server: Arc::new(server),
        }
    }
}
