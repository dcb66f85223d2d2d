use std::sync::Arc;

use crate::config::Config;
use crate::matching::MatchingCoordinator;
use crate::observability::metrics::Metrics;

pub struct AppState {
    pub coordinator: Arc<MatchingCoordinator>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let metrics = Arc::new(Metrics::new());
        let coordinator = Arc::new(MatchingCoordinator::new(config, metrics.clone()));

        Self {
            coordinator,
            metrics,
        }
    }
}
