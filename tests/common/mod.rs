//! Common test utilities

use std::sync::Arc;

use axum::Router;
use calendar_api::api::{self, AppState};
use calendar_api::content::MarkdownRenderer;
use calendar_api::domain::Author;
use calendar_api::repository::memory::api_key_record;
use calendar_api::repository::MemoryStore;

pub const EDITOR_KEY: &str = "editor_key_123";
pub const READER_KEY: &str = "reader_key_456";
pub const DISABLED_KEY: &str = "disabled_key_789";
pub const CSRF_TOKEN: &str = "csrf-token-abc";

/// Build the API over a fresh in-memory store seeded with users and keys
pub fn setup_test_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());

    store
        .add_user(Author {
            id: 1,
            username: "editor".to_string(),
            name: "Calendar Editor".to_string(),
        })
        .expect("Failed to seed editor");
    store
        .add_user(Author {
            id: 2,
            username: "reader".to_string(),
            name: "Calendar Reader".to_string(),
        })
        .expect("Failed to seed reader");

    store
        .add_api_key(
            EDITOR_KEY,
            api_key_record(
                1,
                "editor",
                &["category: manage categories", "calendar: manage events"],
                CSRF_TOKEN,
            ),
        )
        .expect("Failed to seed editor key");
    store
        .add_api_key(READER_KEY, api_key_record(2, "reader", &[], CSRF_TOKEN))
        .expect("Failed to seed reader key");

    let mut disabled = api_key_record(1, "editor", &["admin"], CSRF_TOKEN);
    disabled.is_active = false;
    store
        .add_api_key(DISABLED_KEY, disabled)
        .expect("Failed to seed disabled key");

    let state = AppState::in_memory(store.clone(), Arc::new(MarkdownRenderer::default()));

    (api::create_router(state), store)
}
