//! Repository module
//!
//! Persistence seams for calendar records and API keys. Handlers only see
//! the traits; `postgres` backs the server and `memory` backs tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Category, Event, EventFilter};

pub use memory::MemoryStore;
pub use postgres::{PgAccessRepository, PgCategoryRepository, PgEventRepository};

/// Repository errors
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Category persistence
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Every category with its author resolved
    async fn load_with_author(&self) -> Result<Vec<Category>, RepositoryError>;

    async fn find(&self, id: i64) -> Result<Option<Category>, RepositoryError>;

    /// Persist a new category and return it with its assigned id
    async fn insert(&self, category: &Category) -> Result<Category, RepositoryError>;

    /// Returns `false` when nothing was deleted
    async fn delete(&self, id: i64) -> Result<bool, RepositoryError>;
}

/// Event persistence
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Events matching `filter` with their author resolved
    async fn load_with_author(&self, filter: &EventFilter) -> Result<Vec<Event>, RepositoryError>;

    /// Events matching `filter`, author left unresolved
    async fn query(&self, filter: &EventFilter) -> Result<Vec<Event>, RepositoryError>;

    async fn find(&self, id: i64) -> Result<Option<Event>, RepositoryError>;

    /// Persist a new event and return it with its assigned id
    async fn insert(&self, event: &Event) -> Result<Event, RepositoryError>;

    /// Returns `false` when nothing was deleted
    async fn delete(&self, id: i64) -> Result<bool, RepositoryError>;
}

/// Stored API key joined with its owning user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKeyRecord {
    pub id: Uuid,
    pub user_id: i64,
    pub username: String,
    pub permissions: Vec<String>,
    pub csrf_token: String,
    pub is_active: bool,
}

/// API key lookup for the auth middleware
#[async_trait]
pub trait AccessRepository: Send + Sync {
    /// Resolve a raw key as presented in `X-API-Key`
    async fn find_api_key(&self, raw_key: &str) -> Result<Option<ApiKeyRecord>, RepositoryError>;
}
