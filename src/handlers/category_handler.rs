//! Category Handler
//!
//! Lists, probes, saves and removes event categories.

use std::sync::Arc;

use crate::domain::{Category, DomainError, EventFilter, OperationContext, Permission};
use crate::error::AppError;
use crate::repository::{CategoryRepository, EventRepository};

use super::{require_permission, BatchOutcome, CategoryList, SaveCategoryCommand};

/// Handler for category operations
#[derive(Clone)]
pub struct CategoryHandler {
    categories: Arc<dyn CategoryRepository>,
    events: Arc<dyn EventRepository>,
}

impl CategoryHandler {
    pub fn new(categories: Arc<dyn CategoryRepository>, events: Arc<dyn EventRepository>) -> Self {
        Self { categories, events }
    }

    /// All categories, authors resolved
    pub async fn list(&self) -> Result<CategoryList, AppError> {
        let categories = self.categories.load_with_author().await?;

        Ok(CategoryList {
            count: categories.len(),
            categories,
        })
    }

    /// True as soon as one of `category_ids` has an event. Ids are probed in
    /// order and the scan stops at the first hit.
    pub async fn has_events(&self, category_ids: &[i64]) -> Result<bool, AppError> {
        for &category_id in category_ids {
            let events = self.events.query(&EventFilter::by_category(category_id)).await?;
            if !events.is_empty() {
                tracing::debug!(category_id, "Category has events");
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Save a category.
    ///
    /// A nonzero id must exist, but the stored record is left untouched:
    /// every save inserts a fresh category built from the payload.
    pub async fn save(
        &self,
        command: SaveCategoryCommand,
        context: &OperationContext,
    ) -> Result<Category, AppError> {
        require_permission(context, Permission::ManageCategories)?;

        if command.id != 0 && self.categories.find(command.id).await?.is_none() {
            return Err(DomainError::CategoryNotFound(command.id).into());
        }

        let category = Category::create()
            .fill(command.data)
            .with_author_id(context.user_id);
        let saved = self.categories.insert(&category).await?;

        tracing::info!(
            category_id = saved.id,
            requested_id = command.id,
            user_id = ?context.user_id,
            correlation_id = ?context.correlation_id,
            "Category saved"
        );

        Ok(saved)
    }

    /// Delete categories by id. Zero ids are skipped; the first missing id
    /// aborts the batch.
    pub async fn remove(
        &self,
        ids: &[i64],
        context: &OperationContext,
    ) -> Result<BatchOutcome<Category>, AppError> {
        require_permission(context, Permission::ManageCategories)?;

        let mut outcome = BatchOutcome::new();
        for &id in ids {
            if id == 0 {
                outcome.skip();
                continue;
            }

            let category = self
                .categories
                .find(id)
                .await?
                .ok_or(DomainError::CategoryNotFound(id))?;
            if !self.categories.delete(id).await? {
                return Err(DomainError::CategoryNotFound(id).into());
            }
            outcome.record(id, category);
        }

        tracing::info!(
            removed = outcome.processed.len(),
            skipped = outcome.skipped,
            "Categories removed"
        );

        Ok(outcome)
    }
}
