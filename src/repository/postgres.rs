//! Postgres repositories
//!
//! Backed by the `calendar_categories`, `calendar_events`, `users` and
//! `api_keys` tables (see `migrations/`).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Author, Category, Event, EventFilter};

use super::{AccessRepository, ApiKeyRecord, CategoryRepository, EventRepository, RepositoryError};

// =========================================================================
// Row mapping
// =========================================================================

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    color: Option<String>,
    author_id: Option<i64>,
    author_username: Option<String>,
    author_name: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: i64,
    category_id: i64,
    title: String,
    description: String,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    all_day: bool,
    author_id: Option<i64>,
    author_username: Option<String>,
    author_name: Option<String>,
}

fn author_from(
    author_id: Option<i64>,
    username: Option<String>,
    name: Option<String>,
) -> Option<Author> {
    match (author_id, username) {
        (Some(id), Some(username)) => Some(Author {
            id,
            name: name.unwrap_or_else(|| username.clone()),
            username,
        }),
        _ => None,
    }
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            color: row.color,
            author_id: row.author_id,
            author: author_from(row.author_id, row.author_username, row.author_name),
        }
    }
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Self {
            id: row.id,
            category_id: row.category_id,
            title: row.title,
            description: row.description,
            start: row.start_at,
            end: row.end_at,
            all_day: row.all_day,
            author_id: row.author_id,
            author: author_from(row.author_id, row.author_username, row.author_name),
        }
    }
}

// =========================================================================
// PgCategoryRepository
// =========================================================================

const CATEGORY_WITH_AUTHOR: &str = r#"
    SELECT c.id, c.name, c.color, c.author_id,
           u.username AS author_username, u.name AS author_name
    FROM calendar_categories c
    LEFT JOIN users u ON u.id = c.author_id
"#;

const CATEGORY_PLAIN: &str = r#"
    SELECT id, name, color, author_id,
           NULL::TEXT AS author_username, NULL::TEXT AS author_name
    FROM calendar_categories
"#;

/// Category repository over Postgres
#[derive(Debug, Clone)]
pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn load_with_author(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows: Vec<CategoryRow> =
            sqlx::query_as(&format!("{CATEGORY_WITH_AUTHOR} ORDER BY c.id"))
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn find(&self, id: i64) -> Result<Option<Category>, RepositoryError> {
        let row: Option<CategoryRow> = sqlx::query_as(&format!("{CATEGORY_PLAIN} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Category::from))
    }

    async fn insert(&self, category: &Category) -> Result<Category, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO calendar_categories (name, color, author_id)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&category.name)
        .bind(&category.color)
        .bind(category.author_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Category {
            id,
            ..category.clone()
        })
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM calendar_categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =========================================================================
// PgEventRepository
// =========================================================================

const EVENT_WITH_AUTHOR: &str = r#"
    SELECT e.id, e.category_id, e.title, e.description, e.start_at, e.end_at, e.all_day,
           e.author_id, u.username AS author_username, u.name AS author_name
    FROM calendar_events e
    LEFT JOIN users u ON u.id = e.author_id
"#;

const EVENT_PLAIN: &str = r#"
    SELECT e.id, e.category_id, e.title, e.description, e.start_at, e.end_at, e.all_day,
           e.author_id, NULL::TEXT AS author_username, NULL::TEXT AS author_name
    FROM calendar_events e
"#;

/// Event repository over Postgres
#[derive(Debug, Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run one of the four filter shapes against `select`
    async fn fetch_filtered(
        &self,
        select: &str,
        filter: &EventFilter,
    ) -> Result<Vec<Event>, RepositoryError> {
        let rows: Vec<EventRow> = match (filter.category_id, filter.range) {
            (None, None) => {
                sqlx::query_as(&format!("{select} ORDER BY e.id"))
                    .fetch_all(&self.pool)
                    .await?
            }
            (None, Some(range)) => {
                sqlx::query_as(&format!(
                    "{select} WHERE e.start_at >= $1 AND e.end_at <= $2 ORDER BY e.id"
                ))
                .bind(range.start)
                .bind(range.end)
                .fetch_all(&self.pool)
                .await?
            }
            (Some(category_id), None) => {
                sqlx::query_as(&format!("{select} WHERE e.category_id = $1 ORDER BY e.id"))
                    .bind(category_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            (Some(category_id), Some(range)) => {
                sqlx::query_as(&format!(
                    "{select} WHERE e.category_id = $1 AND e.start_at >= $2 AND e.end_at <= $3 ORDER BY e.id"
                ))
                .bind(category_id)
                .bind(range.start)
                .bind(range.end)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(Event::from).collect())
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn load_with_author(&self, filter: &EventFilter) -> Result<Vec<Event>, RepositoryError> {
        self.fetch_filtered(EVENT_WITH_AUTHOR, filter).await
    }

    async fn query(&self, filter: &EventFilter) -> Result<Vec<Event>, RepositoryError> {
        self.fetch_filtered(EVENT_PLAIN, filter).await
    }

    async fn find(&self, id: i64) -> Result<Option<Event>, RepositoryError> {
        let row: Option<EventRow> = sqlx::query_as(&format!("{EVENT_PLAIN} WHERE e.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Event::from))
    }

    async fn insert(&self, event: &Event) -> Result<Event, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO calendar_events
                (category_id, title, description, start_at, end_at, all_day, author_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(event.category_id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.start)
        .bind(event.end)
        .bind(event.all_day)
        .bind(event.author_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Event {
            id,
            ..event.clone()
        })
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM calendar_events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =========================================================================
// PgAccessRepository
// =========================================================================

/// API key lookup over Postgres. Keys are stored as hex sha256 digests.
#[derive(Debug, Clone)]
pub struct PgAccessRepository {
    pool: PgPool,
}

impl PgAccessRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessRepository for PgAccessRepository {
    async fn find_api_key(&self, raw_key: &str) -> Result<Option<ApiKeyRecord>, RepositoryError> {
        let record: Option<(Uuid, i64, String, Vec<String>, String, bool)> = sqlx::query_as(
            r#"
            SELECT k.id, k.user_id, u.username, k.permissions, k.csrf_token, k.is_active
            FROM api_keys k
            JOIN users u ON u.id = k.user_id
            WHERE k.key_hash = encode(sha256($1::bytea), 'hex')
            "#,
        )
        .bind(raw_key.as_bytes())
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(
            |(id, user_id, username, permissions, csrf_token, is_active)| ApiKeyRecord {
                id,
                user_id,
                username,
                permissions,
                csrf_token,
                is_active,
            },
        ))
    }
}
