//! Domain module
//!
//! Core calendar types, filters and access rules.

pub mod category;
pub mod context;
pub mod error;
pub mod event;
pub mod permission;
pub mod timestamp;

pub use category::{Author, Category, CategoryData};
pub use context::OperationContext;
pub use error::DomainError;
pub use event::{DateRange, Event, EventData, EventFilter};
pub use permission::Permission;
pub use timestamp::{parse_optional, parse_timestamp, TimestampError};
