//! Event Handler
//!
//! Lists, saves, removes and copies calendar events.

use std::sync::Arc;

use crate::content::{ContentRenderer, RenderContext};
use crate::domain::{parse_optional, DomainError, Event, EventFilter, OperationContext, Permission};
use crate::error::AppError;
use crate::repository::EventRepository;

use super::{require_permission, BatchOutcome, EventList, LoadEventsQuery, SaveEventCommand};

/// Handler for event operations
#[derive(Clone)]
pub struct EventHandler {
    events: Arc<dyn EventRepository>,
    renderer: Arc<dyn ContentRenderer>,
}

impl EventHandler {
    pub fn new(events: Arc<dyn EventRepository>, renderer: Arc<dyn ContentRenderer>) -> Self {
        Self { events, renderer }
    }

    /// List events, optionally by category and date range.
    ///
    /// Absent or blank bounds are echoed back as `None`. With `readonly`,
    /// descriptions go through the content renderer once each.
    pub async fn list(&self, query: LoadEventsQuery) -> Result<EventList, AppError> {
        let start = parse_optional(query.start.as_deref())?;
        let end = parse_optional(query.end.as_deref())?;
        let filter = EventFilter::new(query.category, start, end);

        let mut events = self.events.load_with_author(&filter).await?;

        if query.readonly {
            events = events
                .into_iter()
                .map(|event| self.render(event))
                .collect();
        }

        tracing::debug!(
            category = query.category,
            ranged = filter.range.is_some(),
            count = events.len(),
            "Events loaded"
        );

        Ok(EventList {
            count: events.len(),
            events,
            start,
            end,
        })
    }

    fn render(&self, mut event: Event) -> Event {
        let context = RenderContext {
            event: &event,
            markdown: true,
        };
        let description = self.renderer.apply_plugins(&event.description, &context);
        event.description = description;
        event
    }

    /// Save an event.
    ///
    /// A nonzero id must exist, but the stored record is left untouched:
    /// every save inserts a fresh event built from the payload.
    pub async fn save(
        &self,
        command: SaveEventCommand,
        context: &OperationContext,
    ) -> Result<Event, AppError> {
        require_permission(context, Permission::ManageEvents)?;

        if command.id != 0 && self.events.find(command.id).await?.is_none() {
            return Err(DomainError::EventNotFound(command.id).into());
        }

        let event = Event::create()
            .fill(command.data)
            .with_author_id(context.user_id);
        let saved = self.events.insert(&event).await?;

        tracing::info!(
            event_id = saved.id,
            requested_id = command.id,
            user_id = ?context.user_id,
            correlation_id = ?context.correlation_id,
            "Event saved"
        );

        Ok(saved)
    }

    /// Delete events by id. Zero ids are skipped; the first missing id aborts
    /// the batch.
    pub async fn remove(
        &self,
        ids: &[i64],
        context: &OperationContext,
    ) -> Result<BatchOutcome<Event>, AppError> {
        require_permission(context, Permission::ManageEvents)?;

        let mut outcome = BatchOutcome::new();
        for &id in ids {
            if id == 0 {
                outcome.skip();
                continue;
            }

            let event = self
                .events
                .find(id)
                .await?
                .ok_or(DomainError::EventNotFound(id))?;
            if !self.events.delete(id).await? {
                return Err(DomainError::EventNotFound(id).into());
            }
            outcome.record(id, event);
        }

        tracing::info!(
            removed = outcome.processed.len(),
            skipped = outcome.skipped,
            "Events removed"
        );

        Ok(outcome)
    }

    /// Duplicate events by id. Copies keep every field but get a new id.
    pub async fn copy(
        &self,
        ids: &[i64],
        context: &OperationContext,
    ) -> Result<BatchOutcome<Event>, AppError> {
        require_permission(context, Permission::ManageEvents)?;

        let mut outcome = BatchOutcome::new();
        for &id in ids {
            if id == 0 {
                outcome.skip();
                continue;
            }

            let event = self
                .events
                .find(id)
                .await?
                .ok_or(DomainError::EventNotFound(id))?;
            let copy = self.events.insert(&event.duplicate()).await?;

            tracing::debug!(source_id = id, copy_id = copy.id, "Event copied");
            outcome.record(id, copy);
        }

        tracing::info!(
            copied = outcome.processed.len(),
            skipped = outcome.skipped,
            "Events copied"
        );

        Ok(outcome)
    }
}
