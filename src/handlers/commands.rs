//! Command definitions
//!
//! Commands carry handler input; results carry what the routes serialize.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Category, CategoryData, Event, EventData};

// =========================================================================
// Save commands
// =========================================================================

/// Command to save a category. An `id` of `0` means "new".
#[derive(Debug, Clone)]
pub struct SaveCategoryCommand {
    pub id: i64,
    pub data: CategoryData,
}

impl SaveCategoryCommand {
    pub fn new(data: CategoryData) -> Self {
        Self { id: 0, data }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }
}

/// Command to save an event. An `id` of `0` means "new".
#[derive(Debug, Clone)]
pub struct SaveEventCommand {
    pub id: i64,
    pub data: EventData,
}

impl SaveEventCommand {
    pub fn new(data: EventData) -> Self {
        Self { id: 0, data }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }
}

// =========================================================================
// LoadEventsQuery
// =========================================================================

/// Raw event list parameters as received from the client
#[derive(Debug, Clone, Default)]
pub struct LoadEventsQuery {
    /// `0` lists every category
    pub category: i64,
    pub start: Option<String>,
    pub end: Option<String>,
    /// Render descriptions for display
    pub readonly: bool,
}

impl LoadEventsQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: i64) -> Self {
        self.category = category;
        self
    }

    pub fn with_range(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self.end = Some(end.into());
        self
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }
}

// =========================================================================
// Results
// =========================================================================

/// Every category with its count
#[derive(Debug, Clone, Serialize)]
pub struct CategoryList {
    pub categories: Vec<Category>,
    pub count: usize,
}

/// Filtered events with the echoed range bounds
#[derive(Debug, Clone, Serialize)]
pub struct EventList {
    pub events: Vec<Event>,
    pub count: usize,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Outcome of a batch that ran to completion
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome<T> {
    /// Ids acted on, in request order
    pub processed: Vec<i64>,
    /// Zero ids skipped
    pub skipped: usize,
    /// Record touched last
    pub last: Option<T>,
}

impl<T> BatchOutcome<T> {
    pub fn new() -> Self {
        Self {
            processed: Vec::new(),
            skipped: 0,
            last: None,
        }
    }

    pub(crate) fn record(&mut self, id: i64, item: T) {
        self.processed.push(id);
        self.last = Some(item);
    }

    pub(crate) fn skip(&mut self) {
        self.skipped += 1;
    }
}

impl<T> Default for BatchOutcome<T> {
    fn default() -> Self {
        Self::new()
    }
}
