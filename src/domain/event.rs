//! Event model and list filters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::category::Author;
use super::timestamp;

/// A calendar entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Store-assigned id, `0` until persisted
    pub id: i64,
    /// `0` means uncategorized
    pub category_id: i64,
    pub title: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub all_day: bool,
    pub author_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
}

/// Event fields accepted from clients
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventData {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub start: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub category_id: i64,
}

impl Event {
    /// Blank, unsaved event
    pub fn create() -> Self {
        Self {
            id: 0,
            category_id: 0,
            title: String::new(),
            description: String::new(),
            start: DateTime::<Utc>::default(),
            end: DateTime::<Utc>::default(),
            all_day: false,
            author_id: None,
            author: None,
        }
    }

    /// Populate from a client payload. `start <= end` is left to the caller.
    pub fn fill(mut self, data: EventData) -> Self {
        self.title = data.title;
        self.description = data.description;
        self.start = data.start;
        self.end = data.end;
        self.all_day = data.all_day;
        self.category_id = data.category_id;
        self
    }

    pub fn with_author_id(mut self, author_id: Option<i64>) -> Self {
        self.author_id = author_id;
        self
    }

    /// Unsaved duplicate carrying every field except the id
    pub fn duplicate(&self) -> Self {
        Self {
            id: 0,
            ..self.clone()
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }
}

/// Closed interval an event must fall inside
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Event starts at or after `start` and ends at or before `end`
    pub fn contains(&self, event: &Event) -> bool {
        event.start >= self.start && event.end <= self.end
    }
}

/// Event list filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// `None` lists every category
    pub category_id: Option<i64>,
    pub range: Option<DateRange>,
}

impl EventFilter {
    /// Build a filter from raw list parameters.
    ///
    /// A `category` of `0` disables the category predicate; the range applies
    /// only when both bounds are present.
    pub fn new(
        category: i64,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Self {
        let range = match (start, end) {
            (Some(start), Some(end)) => Some(DateRange { start, end }),
            _ => None,
        };

        Self {
            category_id: (category != 0).then_some(category),
            range,
        }
    }

    pub fn by_category(category_id: i64) -> Self {
        Self {
            category_id: Some(category_id),
            range: None,
        }
    }

    pub fn matches(&self, event: &Event) -> bool {
        let category_ok = self.category_id.map_or(true, |id| event.category_id == id);
        let range_ok = self.range.map_or(true, |range| range.contains(event));
        category_ok && range_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::timestamp::parse_timestamp;

    fn event(category_id: i64, start: &str, end: &str) -> Event {
        Event {
            category_id,
            start: parse_timestamp(start).unwrap(),
            end: parse_timestamp(end).unwrap(),
            ..Event::create()
        }
    }

    #[test]
    fn test_event_data_accepts_plain_dates() {
        let data: EventData = serde_json::from_str(
            r#"{"title": "Standup", "start": "2024-01-02 09:00:00", "end": "2024-01-02T09:15:00Z"}"#,
        )
        .unwrap();

        assert_eq!(data.category_id, 0);
        assert!(!data.all_day);
        assert_eq!(data.end.to_rfc3339(), "2024-01-02T09:15:00+00:00");
    }

    #[test]
    fn test_event_data_rejects_bad_date() {
        let result: Result<EventData, _> =
            serde_json::from_str(r#"{"start": "soon", "end": "2024-01-02"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_clears_id_only() {
        let original = Event {
            id: 12,
            title: "Review".to_string(),
            author_id: Some(4),
            ..event(5, "2024-01-01", "2024-01-02")
        };

        let copy = original.duplicate();

        assert!(!copy.is_persisted());
        assert_eq!(Event { id: 12, ..copy }, original);
    }

    #[test]
    fn test_filter_without_category_or_range() {
        let filter = EventFilter::new(0, None, None);

        assert_eq!(filter, EventFilter::default());
        assert!(filter.matches(&event(3, "1999-01-01", "2030-01-01")));
    }

    #[test]
    fn test_filter_needs_both_bounds_for_range() {
        let start = parse_timestamp("2024-01-01").ok();
        let filter = EventFilter::new(0, start, None);

        assert!(filter.range.is_none());
    }

    #[test]
    fn test_filter_category_and_range() {
        let filter = EventFilter::new(
            5,
            parse_timestamp("2024-01-01").ok(),
            parse_timestamp("2024-01-31").ok(),
        );

        assert!(filter.matches(&event(5, "2024-01-10", "2024-01-11")));
        assert!(!filter.matches(&event(4, "2024-01-10", "2024-01-11")));
        assert!(!filter.matches(&event(5, "2023-12-31", "2024-01-02")));
        // End bound is inclusive
        assert!(filter.matches(&event(5, "2024-01-30", "2024-01-31")));
        assert!(!filter.matches(&event(5, "2024-01-30", "2024-02-01")));
    }
}
