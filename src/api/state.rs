use std::sync::Arc;

use crate::config::Services;
use crate::reconcile::ReconciliationController;
use crate::tokens::TokenStrategyResolver;

#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<AppStateInner>,
}

pub struct AppStateInner {
    pub controller: ReconciliationController,
    pub resolver: TokenStrategyResolver,
    pub started_at: u64,
}

impl AppState {
    pub fn new(services: Services) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                controller: services.controller,
                resolver: services.resolver,
                started_at: chrono::Utc::now().timestamp() as u64,
            }),
        }
    }
}
