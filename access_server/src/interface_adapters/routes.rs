use crate::interface_adapters::handlers::door::{check_and_open, open_door};
use crate::interface_adapters::handlers::reader::reader_token;
use crate::interface_adapters::handlers::scan::process_scan;
use crate::interface_adapters::handlers::status::{
    assistants_status, db_test, health, not_found, recent_events, version,
};
use crate::interface_adapters::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/version", get(version))
        .route("/api/qr/process", post(process_scan))
        .route("/api/qr/recent", get(recent_events))
        .route("/api/assistants/status", get(assistants_status))
        .route("/api/door/assistants-status", get(assistants_status))
        .route("/api/door/open", post(open_door))
        .route("/api/door/check-and-open", post(check_and_open))
        .route("/api/reader/token", get(reader_token))
        .route("/api/db/test", get(db_test))
        .fallback(not_found)
        .with_state(state)
}
