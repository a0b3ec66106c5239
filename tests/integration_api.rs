//! API Integration Tests

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use calendar_api::api::routes::{HasEventsRequest, IdsRequest};
use serde_json::{json, Value};
use tower::util::ServiceExt;

mod common;

use common::{CSRF_TOKEN, DISABLED_KEY, EDITOR_KEY, READER_KEY};

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn post(
    app: &Router,
    uri: &str,
    api_key: Option<&str>,
    csrf: Option<&str>,
    body: Value,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(key) = api_key {
        builder = builder.header("X-API-Key", key);
    }
    if let Some(token) = csrf {
        builder = builder.header("X-CSRF-Token", token);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    send(app, request).await
}

async fn post_as_editor(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    post(app, uri, Some(EDITOR_KEY), Some(CSRF_TOKEN), body).await
}

async fn create_event(app: &Router, category_id: i64, start: &str, end: &str) -> i64 {
    let (status, json) = post_as_editor(
        app,
        "/events/save",
        json!({
            "event": {
                "title": "Planning",
                "description": "*notes*",
                "start": start,
                "end": end,
                "category_id": category_id
            }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "Event creation failed: {}", json);
    json["event"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_category_lifecycle() {
    let (app, store) = common::setup_test_app();

    // 1. Create two categories
    let (status, work) = post_as_editor(
        &app,
        "/categories/save",
        json!({ "category": { "name": "Work", "color": "#0000ff" } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(work["message"], "success");
    let work_id = work["category"]["id"].as_i64().unwrap();

    let (_, home) = post_as_editor(
        &app,
        "/categories/save",
        json!({ "category": { "name": "Home" }, "id": 0 }),
    )
    .await;
    let home_id = home["category"]["id"].as_i64().unwrap();

    // 2. List with authors
    let (status, list) = get(&app, "/categories/load").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["count"], 2);
    assert_eq!(list["categories"][0]["author"]["username"], "editor");

    // 3. No events yet
    let probe = serde_json::to_value(HasEventsRequest {
        categories: vec![home_id, work_id],
    })
    .unwrap();
    let (_, json) = post(&app, "/categories/has-events", None, None, probe.clone()).await;
    assert_eq!(json, json!({ "hasEvents": false }));

    // 4. One event in Work flips the answer
    create_event(&app, work_id, "2024-01-10", "2024-01-11").await;
    let (_, json) = post(&app, "/categories/has-events", None, None, probe).await;
    assert_eq!(json["hasEvents"], true);

    // 5. Remove Home, skipping the zero id
    let (status, json) = post_as_editor(
        &app,
        "/categories/remove",
        serde_json::to_value(IdsRequest { ids: vec![0, home_id] }).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["category"]["id"], home_id);
    assert_eq!(store.category_count().unwrap(), 1);

    // 6. Empty batch succeeds with no category
    let (status, json) = post_as_editor(&app, "/categories/remove", json!({ "ids": [] })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["category"], Value::Null);
}

#[tokio::test]
async fn test_unknown_ids_return_404() {
    let (app, _store) = common::setup_test_app();

    let (status, json) = post_as_editor(
        &app,
        "/categories/save",
        json!({ "category": { "name": "Ghost" }, "id": 999 }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Category not found.");
    assert_eq!(json["error_code"], "category_not_found");

    let (status, json) = post_as_editor(&app, "/categories/remove", json!({ "ids": [5] })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["details"], "5");

    let (status, json) = post_as_editor(&app, "/events/remove", json!({ "ids": [7] })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Event not found.");
}

#[tokio::test]
async fn test_event_filtering() {
    let (app, _store) = common::setup_test_app();

    let inside = create_event(&app, 5, "2024-01-10 09:00:00", "2024-01-10 10:00:00").await;
    create_event(&app, 4, "2024-01-10 09:00:00", "2024-01-10 10:00:00").await;
    create_event(&app, 5, "2024-02-10 09:00:00", "2024-02-10 10:00:00").await;

    // Unfiltered
    let (status, json) = get(&app, "/events/load").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 3);
    assert_eq!(json["start"], Value::Null);
    assert_eq!(json["end"], Value::Null);

    // Category only
    let (_, json) = get(&app, "/events/load?category=5").await;
    assert_eq!(json["count"], 2);

    // Category and range
    let (_, json) = get(&app, "/events/load?category=5&start=2024-01-01&end=2024-01-31").await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["events"][0]["id"], inside);
    assert_eq!(json["start"], "2024-01-01T00:00:00Z");
    assert_eq!(json["end"], "2024-01-31T00:00:00Z");

    // Range only
    let (_, json) = get(&app, "/events/load?start=2024-01-01&end=2024-01-31").await;
    assert_eq!(json["count"], 2);

    // Blank bounds behave like absent ones
    let (_, json) = get(&app, "/events/load?start=&end=").await;
    assert_eq!(json["count"], 3);
    assert_eq!(json["start"], Value::Null);
}

#[tokio::test]
async fn test_event_readonly_rendering() {
    let (app, _store) = common::setup_test_app();
    create_event(&app, 1, "2024-01-10", "2024-01-11").await;
    create_event(&app, 2, "2024-01-12", "2024-01-13").await;

    let (_, json) = get(&app, "/events/load?readonly=true").await;
    let events = json["events"].as_array().unwrap();

    assert_eq!(events.len(), 2);
    assert!(events
        .iter()
        .all(|event| event["description"] == "<p><em>notes</em></p>\n"));

    // Raw text when not readonly
    let (_, json) = get(&app, "/events/load").await;
    assert_eq!(json["events"][0]["description"], "*notes*");
}

#[tokio::test]
async fn test_invalid_range_is_rejected() {
    let (app, _store) = common::setup_test_app();

    let (status, json) = get(&app, "/events/load?start=someday&end=2024-01-31").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error_code"], "invalid_request");
}

#[tokio::test]
async fn test_copy_and_remove_events() {
    let (app, store) = common::setup_test_app();
    let id = create_event(&app, 3, "2024-01-10", "2024-01-11").await;

    // Copy, skipping zero
    let (status, json) = post_as_editor(&app, "/events/copy", json!({ "ids": [0, id] })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "message": "success" }));
    assert_eq!(store.event_count().unwrap(), 2);

    let (_, list) = get(&app, "/events/load?category=3").await;
    let events = list["events"].as_array().unwrap();
    assert_ne!(events[0]["id"], events[1]["id"]);
    assert_eq!(events[0]["title"], events[1]["title"]);
    assert_eq!(events[0]["start"], events[1]["start"]);

    // Copy aborts on a missing id
    let (status, _) = post_as_editor(&app, "/events/copy", json!({ "ids": [404] })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Remove
    let (status, json) = post_as_editor(&app, "/events/remove", json!({ "ids": [id] })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "success");
    assert_eq!(store.event_count().unwrap(), 1);
}

#[tokio::test]
async fn test_mutations_require_access() {
    let (app, store) = common::setup_test_app();
    let body = json!({ "category": { "name": "Blocked" } });

    // No API key
    let (status, json) = post(&app, "/categories/save", None, Some(CSRF_TOKEN), body.clone()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error_code"], "invalid_api_key");

    // Disabled key
    let (status, _) = post(&app, "/categories/save", Some(DISABLED_KEY), Some(CSRF_TOKEN), body.clone()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Missing CSRF token
    let (status, json) = post(&app, "/categories/save", Some(EDITOR_KEY), None, body.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error_code"], "invalid_csrf_token");

    // Wrong CSRF token
    let (status, _) = post(&app, "/categories/save", Some(EDITOR_KEY), Some("forged"), body.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Authenticated but lacking permission
    let (status, json) = post(&app, "/categories/save", Some(READER_KEY), Some(CSRF_TOKEN), body).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error_code"], "permission_denied");
    assert_eq!(json["details"], "category: manage categories");

    let (status, _) = post(&app, "/events/copy", Some(READER_KEY), Some(CSRF_TOKEN), json!({ "ids": [] })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    assert_eq!(store.category_count().unwrap(), 0);
}

#[tokio::test]
async fn test_malformed_bodies_get_json_errors() {
    let (app, store) = common::setup_test_app();

    // Missing required fields
    let (status, json) = post_as_editor(&app, "/events/save", json!({ "event": { "title": "x" } })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error_code"], "invalid_request");
    assert!(json["details"].as_str().unwrap().contains("start"));

    // Wrong type
    let (status, json) = post(&app, "/categories/has-events", None, None, json!({ "categories": "all" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error_code"], "invalid_request");

    // Not JSON at all
    let request = Request::builder()
        .method("POST")
        .uri("/categories/save")
        .header("content-type", "application/json")
        .header("X-API-Key", EDITOR_KEY)
        .header("X-CSRF-Token", CSRF_TOKEN)
        .body(Body::from("{not json"))
        .unwrap();
    let (status, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error_code"], "invalid_request");

    assert_eq!(store.event_count().unwrap(), 0);
    assert_eq!(store.category_count().unwrap(), 0);
}

#[tokio::test]
async fn test_events_query_accepts_form_values() {
    let (app, _store) = common::setup_test_app();
    create_event(&app, 2, "2024-01-10", "2024-01-11").await;

    let (status, json) = get(&app, "/events/load?readonly=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["events"][0]["description"], "<p><em>notes</em></p>\n");

    let (status, json) = get(&app, "/events/load?readonly=0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["events"][0]["description"], "*notes*");

    let (status, json) = get(&app, "/events/load?category=&readonly=").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 1);

    let (status, json) = get(&app, "/events/load?category=two").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error_code"], "invalid_request");
}

#[tokio::test]
async fn test_unencoded_offset_in_range() {
    let (app, _store) = common::setup_test_app();
    create_event(&app, 1, "2024-01-10", "2024-01-11").await;

    let (status, json) =
        get(&app, "/events/load?start=2024-01-01T00:00:00+02:00&end=2024-01-31T00:00:00+02:00").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 1);
    assert_eq!(json["start"], "2023-12-31T22:00:00Z");
}
