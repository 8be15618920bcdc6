use std::sync::Arc;

use crate::balance::BalanceUpdateService;
use crate::db::Database;

/// Gateway application state (shared)
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<BalanceUpdateService>,
    /// PostgreSQL database; `None` when running on in-memory storage
    pub db: Option<Arc<Database>>,
}

impl AppState {
    pub fn new(service: Arc<BalanceUpdateService>, db: Option<Arc<Database>>) -> Self {
        Self { service, db }
    }
}
