//! Calendar API Library
//!
//! Re-exports modules for integration testing and external use.

pub mod api;
pub mod content;
pub mod domain;
pub mod handlers;
pub mod repository;

pub mod config;
pub mod db;
mod error;

pub use config::Config;
pub use domain::{Category, DomainError, Event, OperationContext};
pub use error::AppError;
