//! API module
//!
//! HTTP API endpoints, middleware and shared state.

pub mod extract;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use sqlx::PgPool;

use crate::content::ContentRenderer;
use crate::handlers::{CategoryHandler, EventHandler};
use crate::repository::{
    AccessRepository, CategoryRepository, EventRepository, MemoryStore, PgAccessRepository,
    PgCategoryRepository, PgEventRepository,
};

pub use routes::create_router;

/// State shared by every route
#[derive(Clone)]
pub struct AppState {
    pub categories: CategoryHandler,
    pub events: EventHandler,
    pub access: Arc<dyn AccessRepository>,
}

impl AppState {
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        events: Arc<dyn EventRepository>,
        access: Arc<dyn AccessRepository>,
        renderer: Arc<dyn ContentRenderer>,
    ) -> Self {
        Self {
            categories: CategoryHandler::new(categories, events.clone()),
            events: EventHandler::new(events, renderer),
            access,
        }
    }

    /// State backed by Postgres
    pub fn postgres(pool: PgPool, renderer: Arc<dyn ContentRenderer>) -> Self {
        Self::new(
            Arc::new(PgCategoryRepository::new(pool.clone())),
            Arc::new(PgEventRepository::new(pool.clone())),
            Arc::new(PgAccessRepository::new(pool)),
            renderer,
        )
    }

    /// State backed by a single in-memory store
    pub fn in_memory(store: Arc<MemoryStore>, renderer: Arc<dyn ContentRenderer>) -> Self {
        Self::new(store.clone(), store.clone(), store, renderer)
    }
}
