// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use quorumflow::config::Config;
use quorumflow::db::FirestoreDb;
use quorumflow::routes::create_router;
use quorumflow::services::{ImageFetcher, NoopPushSender, ReportService, TemplateStorage};
use quorumflow::AppState;
use std::sync::Arc;

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = test_db_offline();
    let storage = TemplateStorage::new(&config);
    let report = ReportService::new(db.clone(), storage, ImageFetcher::new());

    let state = Arc::new(AppState {
        config,
        db,
        report,
        push: Arc::new(NoopPushSender),
    });

    (create_router(state.clone()), state)
}

/// Create a session JWT signed with the test key.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    quorumflow::middleware::auth::create_jwt(user_id, signing_key).unwrap()
}
