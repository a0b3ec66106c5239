//! In-memory store
//!
//! Implements every repository trait over process memory. Used by the test
//! suites and handy for running the API without a database.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Author, Category, Event, EventFilter};

use super::{AccessRepository, ApiKeyRecord, CategoryRepository, EventRepository, RepositoryError};

#[derive(Debug, Default)]
struct Inner {
    categories: BTreeMap<i64, Category>,
    events: BTreeMap<i64, Event>,
    users: HashMap<i64, Author>,
    api_keys: HashMap<String, ApiKeyRecord>,
    next_category_id: i64,
    next_event_id: i64,
}

/// Shared in-memory calendar store
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, RepositoryError> {
        self.inner
            .lock()
            .map_err(|_| RepositoryError::Unavailable("memory store lock poisoned".to_string()))
    }

    /// Register a user so authors can be resolved
    pub fn add_user(&self, author: Author) -> Result<(), RepositoryError> {
        self.lock()?.users.insert(author.id, author);
        Ok(())
    }

    /// Register an API key under its raw value
    pub fn add_api_key(
        &self,
        raw_key: impl Into<String>,
        record: ApiKeyRecord,
    ) -> Result<(), RepositoryError> {
        self.lock()?.api_keys.insert(raw_key.into(), record);
        Ok(())
    }

    pub fn category_count(&self) -> Result<usize, RepositoryError> {
        Ok(self.lock()?.categories.len())
    }

    pub fn event_count(&self) -> Result<usize, RepositoryError> {
        Ok(self.lock()?.events.len())
    }
}

impl Inner {
    fn author(&self, author_id: Option<i64>) -> Option<Author> {
        author_id.and_then(|id| self.users.get(&id).cloned())
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn load_with_author(&self) -> Result<Vec<Category>, RepositoryError> {
        let inner = self.lock()?;
        Ok(inner
            .categories
            .values()
            .map(|category| Category {
                author: inner.author(category.author_id),
                ..category.clone()
            })
            .collect())
    }

    async fn find(&self, id: i64) -> Result<Option<Category>, RepositoryError> {
        Ok(self.lock()?.categories.get(&id).cloned())
    }

    async fn insert(&self, category: &Category) -> Result<Category, RepositoryError> {
        let mut inner = self.lock()?;
        inner.next_category_id += 1;
        let saved = Category {
            id: inner.next_category_id,
            author: None,
            ..category.clone()
        };
        inner.categories.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        Ok(self.lock()?.categories.remove(&id).is_some())
    }
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn load_with_author(&self, filter: &EventFilter) -> Result<Vec<Event>, RepositoryError> {
        let inner = self.lock()?;
        Ok(inner
            .events
            .values()
            .filter(|event| filter.matches(event))
            .map(|event| Event {
                author: inner.author(event.author_id),
                ..event.clone()
            })
            .collect())
    }

    async fn query(&self, filter: &EventFilter) -> Result<Vec<Event>, RepositoryError> {
        Ok(self
            .lock()?
            .events
            .values()
            .filter(|event| filter.matches(event))
            .cloned()
            .collect())
    }

    async fn find(&self, id: i64) -> Result<Option<Event>, RepositoryError> {
        Ok(self.lock()?.events.get(&id).cloned())
    }

    async fn insert(&self, event: &Event) -> Result<Event, RepositoryError> {
        let mut inner = self.lock()?;
        inner.next_event_id += 1;
        let saved = Event {
            id: inner.next_event_id,
            author: None,
            ..event.clone()
        };
        inner.events.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        Ok(self.lock()?.events.remove(&id).is_some())
    }
}

#[async_trait]
impl AccessRepository for MemoryStore {
    async fn find_api_key(&self, raw_key: &str) -> Result<Option<ApiKeyRecord>, RepositoryError> {
        Ok(self.lock()?.api_keys.get(raw_key).cloned())
    }
}

/// Build a key record for seeding the store
pub fn api_key_record(user_id: i64, username: &str, permissions: &[&str], csrf_token: &str) -> ApiKeyRecord {
    ApiKeyRecord {
        id: Uuid::new_v4(),
        user_id,
        username: username.to_string(),
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
        csrf_token: csrf_token.to_string(),
        is_active: true,
    }
}
