//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Extension, State},
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::domain::{Category, CategoryData, Event, EventData, OperationContext};
use crate::error::AppError;
use crate::handlers::{CategoryList, EventList, LoadEventsQuery, SaveCategoryCommand, SaveEventCommand};

use super::extract::{deserialize_flag, deserialize_id, ApiJson, ApiQuery};
use super::middleware::{auth_middleware, csrf_middleware};
use super::AppState;

const SUCCESS: &str = "success";

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HasEventsRequest {
    #[serde(default)]
    pub categories: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct HasEventsResponse {
    #[serde(rename = "hasEvents")]
    pub has_events: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveCategoryRequest {
    pub category: CategoryData,
    #[serde(default)]
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub message: String,
    pub category: Option<Category>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IdsRequest {
    #[serde(default)]
    pub ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub category: i64,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub readonly: bool,
}

impl From<EventsQuery> for LoadEventsQuery {
    fn from(query: EventsQuery) -> Self {
        LoadEventsQuery {
            category: query.category,
            start: query.start,
            end: query.end,
            readonly: query.readonly,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SaveEventRequest {
    pub event: EventData,
    #[serde(default)]
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub message: String,
    pub event: Event,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn success() -> Self {
        Self {
            message: SUCCESS.to_string(),
        }
    }
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router. Mutating routes sit behind auth and CSRF checks.
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/categories/save", post(save_category))
        .route("/categories/remove", post(remove_categories))
        .route("/events/save", post(save_event))
        .route("/events/remove", post(remove_events))
        .route("/events/copy", post(copy_events))
        // Layers run last-added first: auth -> csrf -> handler
        .route_layer(middleware::from_fn(csrf_middleware))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/categories/load", get(load_categories))
        .route("/categories/has-events", post(has_events))
        .route("/events/load", get(load_events))
        .merge(protected)
        .with_state(state)
}

// =========================================================================
// Categories
// =========================================================================

/// List every category
async fn load_categories(State(state): State<AppState>) -> Result<Json<CategoryList>, AppError> {
    Ok(Json(state.categories.list().await?))
}

/// Check whether any of the given categories has events
async fn has_events(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<HasEventsRequest>,
) -> Result<Json<HasEventsResponse>, AppError> {
    let has_events = state.categories.has_events(&request.categories).await?;

    Ok(Json(HasEventsResponse { has_events }))
}

/// Save a category
async fn save_category(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    ApiJson(request): ApiJson<SaveCategoryRequest>,
) -> Result<Json<CategoryResponse>, AppError> {
    let command = SaveCategoryCommand::new(request.category).with_id(request.id);
    let category = state.categories.save(command, &context).await?;

    Ok(Json(CategoryResponse {
        message: SUCCESS.to_string(),
        category: Some(category),
    }))
}

/// Delete categories by id
async fn remove_categories(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    ApiJson(request): ApiJson<IdsRequest>,
) -> Result<Json<CategoryResponse>, AppError> {
    let outcome = state.categories.remove(&request.ids, &context).await?;

    Ok(Json(CategoryResponse {
        message: SUCCESS.to_string(),
        category: outcome.last,
    }))
}

// =========================================================================
// Events
// =========================================================================

/// List events
async fn load_events(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EventsQuery>,
) -> Result<Json<EventList>, AppError> {
    Ok(Json(state.events.list(query.into()).await?))
}

/// Save an event
async fn save_event(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    ApiJson(request): ApiJson<SaveEventRequest>,
) -> Result<Json<EventResponse>, AppError> {
    let command = SaveEventCommand::new(request.event).with_id(request.id);
    let event = state.events.save(command, &context).await?;

    Ok(Json(EventResponse {
        message: SUCCESS.to_string(),
        event,
    }))
}

/// Delete events by id
async fn remove_events(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    ApiJson(request): ApiJson<IdsRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state.events.remove(&request.ids, &context).await?;

    Ok(Json(MessageResponse::success()))
}

/// Duplicate events by id
async fn copy_events(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    ApiJson(request): ApiJson<IdsRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state.events.copy(&request.ids, &context).await?;

    Ok(Json(MessageResponse::success()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_category_request_defaults_id() {
        let request: SaveCategoryRequest =
            serde_json::from_str(r#"{"category": {"name": "Work"}}"#).unwrap();

        assert_eq!(request.id, 0);
        assert_eq!(request.category.name, "Work");
        assert!(request.category.color.is_none());
    }

    #[test]
    fn test_ids_request_defaults_empty() {
        let request: IdsRequest = serde_json::from_str("{}").unwrap();
        assert!(request.ids.is_empty());
    }

    #[test]
    fn test_events_query_defaults() {
        let query: EventsQuery = serde_json::from_str("{}").unwrap();
        let query = LoadEventsQuery::from(query);

        assert_eq!(query.category, 0);
        assert!(query.start.is_none());
        assert!(query.end.is_none());
        assert!(!query.readonly);
    }

    #[test]
    fn test_has_events_response_field_name() {
        let json = serde_json::to_value(HasEventsResponse { has_events: true }).unwrap();
        assert_eq!(json, serde_json::json!({ "hasEvents": true }));
    }
}
