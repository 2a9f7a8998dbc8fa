// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Task handler routes for scheduler callbacks.
//!
//! These endpoints are called by Cloud Scheduler, not directly by users.

use crate::services::NotificationJob;
use crate::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use std::sync::Arc;

/// Header Cloud Scheduler attaches to its HTTP target calls.
pub const SCHEDULER_HEADER: &str = "x-cloudscheduler";

/// Task handler routes (called by Cloud Scheduler).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/tasks/daily-notifications", post(daily_notifications))
}

/// Run the daily notification job.
///
/// Returns 500 on failure so the scheduler's retry policy applies.
async fn daily_notifications(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> StatusCode {
    // Security Check: Ensure request comes from Cloud Scheduler.
    // The platform strips this header from external requests, so its
    // presence guarantees internal origin.
    let scheduler_header = headers.get(SCHEDULER_HEADER);
    let is_scheduler = scheduler_header
        .and_then(|h| h.to_str().ok())
        .map(|value| value == "true")
        .unwrap_or(false);

    if !is_scheduler {
        tracing::warn!(
            header = ?scheduler_header,
            "Security Alert: Blocked unauthorized access to daily_notifications"
        );
        return StatusCode::FORBIDDEN;
    }

    tracing::info!("Running daily notification job");

    let job = NotificationJob::new(state.db.clone(), state.push.clone());

    match job.run().await {
        Ok(summary) => {
            tracing::info!(
                notifications = summary.notifications,
                subscriptions = summary.subscriptions,
                delivered = summary.pushes_delivered,
                push_failures = summary.push_failures,
                records_written = summary.records_written,
                record_failures = summary.record_failures,
                "Daily notification job complete"
            );
            StatusCode::OK
        }
        Err(e) => {
            tracing::error!(error = %e, "Daily notification job failed");
            // Return 500 to trigger a scheduler retry
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
