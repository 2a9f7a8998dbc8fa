// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{
    Activity, AnnualReportAnswers, AppNotification, Baptism, PushSubscriptionRecord,
    WebPushSubscription,
};
use crate::services::aggregator::{filter_activities_by_year, merge_baptisms};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Extension, Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Accepted report year range.
const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2100;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/reports/annual", post(generate_annual_report))
        .route(
            "/api/reports/answers",
            get(get_report_answers).put(put_report_answers),
        )
        .route("/api/activities", get(get_activities))
        .route("/api/baptisms", get(get_baptisms))
        .route("/api/notifications", get(get_notifications))
        .route(
            "/api/notifications/{id}/read",
            post(mark_notification_read),
        )
        .route(
            "/api/push/subscription",
            put(put_push_subscription).delete(delete_push_subscription),
        )
}

/// Resolve and validate the target year, defaulting to the current one.
fn resolve_year(year: Option<i32>) -> Result<i32> {
    let year = year.unwrap_or_else(|| chrono::Utc::now().year());
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(AppError::BadRequest(format!(
            "Year must be between {} and {}",
            MIN_YEAR, MAX_YEAR
        )));
    }
    Ok(year)
}

// ─── Annual Report ───────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct AnnualReportRequest {
    /// Target year; defaults to the current year
    #[serde(default)]
    pub year: Option<i32>,
}

/// Report response: the whole document, base64-encoded.
#[derive(Serialize)]
pub struct AnnualReportResponse {
    #[serde(rename = "fileContents")]
    pub file_contents: String,
}

/// Generate the annual report document.
async fn generate_annual_report(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<AnnualReportRequest>,
) -> Result<Json<AnnualReportResponse>> {
    let year = resolve_year(request.year)?;

    tracing::info!(user_id = %user.user_id, year, "Annual report requested");

    let bytes = state.report.generate(year).await?;

    Ok(Json(AnnualReportResponse {
        file_contents: STANDARD.encode(bytes),
    }))
}

// ─── Report Answers ──────────────────────────────────────────

#[derive(Deserialize)]
struct AnswersQuery {
    year: Option<i32>,
}

#[derive(Serialize)]
pub struct AnswersResponse {
    pub year: i32,
    #[serde(flatten)]
    pub answers: AnnualReportAnswers,
}

/// Get the narrative answers for a year (empty defaults when unset).
async fn get_report_answers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnswersQuery>,
) -> Result<Json<AnswersResponse>> {
    let year = resolve_year(params.year)?;
    let answers = state
        .db
        .get_annual_answers(year)
        .await?
        .unwrap_or_default();

    Ok(Json(AnswersResponse { year, answers }))
}

#[derive(Deserialize)]
pub struct SaveAnswersRequest {
    pub year: i32,
    #[serde(flatten)]
    pub answers: AnnualReportAnswers,
}

#[derive(Serialize)]
pub struct SaveAnswersResponse {
    pub success: bool,
}

/// Save the narrative answers for a year (settings UI write path).
async fn put_report_answers(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<SaveAnswersRequest>,
) -> Result<Json<SaveAnswersResponse>> {
    let year = resolve_year(Some(request.year))?;

    tracing::info!(user_id = %user.user_id, year, "Saving annual report answers");
    state.db.set_annual_answers(year, &request.answers).await?;

    Ok(Json(SaveAnswersResponse { success: true }))
}

// ─── Activities & Baptisms ───────────────────────────────────

#[derive(Deserialize)]
struct YearQuery {
    year: Option<i32>,
}

#[derive(Serialize)]
pub struct ActivitiesResponse {
    pub year: i32,
    pub activities: Vec<Activity>,
}

/// Activities of a year, date descending.
async fn get_activities(
    State(state): State<Arc<AppState>>,
    Query(params): Query<YearQuery>,
) -> Result<Json<ActivitiesResponse>> {
    let year = resolve_year(params.year)?;
    let activities = filter_activities_by_year(state.db.list_activities().await?, year);

    Ok(Json(ActivitiesResponse { year, activities }))
}

#[derive(Serialize)]
pub struct BaptismsResponse {
    pub year: i32,
    pub baptisms: Vec<Baptism>,
}

/// Merged baptism list of a year (manual + auto-derived), date descending.
async fn get_baptisms(
    State(state): State<Arc<AppState>>,
    Query(params): Query<YearQuery>,
) -> Result<Json<BaptismsResponse>> {
    let year = resolve_year(params.year)?;
    let manual = state.db.list_manual_baptisms().await?;
    let future = state.db.list_future_members().await?;

    Ok(Json(BaptismsResponse {
        year,
        baptisms: merge_baptisms(manual, future, year),
    }))
}

// ─── In-App Notifications ────────────────────────────────────

#[derive(Serialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<AppNotification>,
}

/// Current user's in-app notifications, newest first.
async fn get_notifications(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<NotificationsResponse>> {
    let notifications = state
        .db
        .list_notifications_for_user(&user.user_id)
        .await?;

    Ok(Json(NotificationsResponse { notifications }))
}

#[derive(Serialize)]
pub struct MarkReadResponse {
    pub success: bool,
}

/// Mark one of the caller's notifications as read.
async fn mark_notification_read(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(notification_id): Path<String>,
) -> Result<Json<MarkReadResponse>> {
    let mut record = state
        .db
        .get_app_notification(&notification_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Notification {} not found", notification_id)))?;

    // Not-found rather than forbidden: don't reveal other users' ids.
    if record.user_id != user.user_id {
        return Err(AppError::NotFound(format!(
            "Notification {} not found",
            notification_id
        )));
    }

    if !record.is_read {
        record.is_read = true;
        // The document id lives in the path, not the body.
        record.id = String::new();
        state
            .db
            .set_app_notification(&notification_id, &record)
            .await?;
    }

    Ok(Json(MarkReadResponse { success: true }))
}

// ─── Push Subscription ───────────────────────────────────────

#[derive(Serialize)]
pub struct SubscriptionResponse {
    pub success: bool,
}

/// Register (or replace) the caller's webpush subscription.
async fn put_push_subscription(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(subscription): Json<WebPushSubscription>,
) -> Result<Json<SubscriptionResponse>> {
    if subscription.endpoint.is_empty() {
        return Err(AppError::BadRequest(
            "Subscription endpoint must not be empty".to_string(),
        ));
    }

    let record = PushSubscriptionRecord {
        user_id: user.user_id.clone(),
        subscription,
    };
    state.db.upsert_push_subscription(&record).await?;

    tracing::info!(user_id = %user.user_id, "Push subscription registered");
    Ok(Json(SubscriptionResponse { success: true }))
}

/// Remove the caller's webpush subscription.
async fn delete_push_subscription(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<SubscriptionResponse>> {
    state.db.delete_push_subscription(&user.user_id).await?;

    tracing::info!(user_id = %user.user_id, "Push subscription removed");
    Ok(Json(SubscriptionResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_year_defaults_to_current() {
        let year = resolve_year(None).unwrap();
        assert_eq!(year, chrono::Utc::now().year());
    }

    #[test]
    fn test_resolve_year_rejects_out_of_range() {
        assert!(resolve_year(Some(1899)).is_err());
        assert!(resolve_year(Some(2101)).is_err());
        assert_eq!(resolve_year(Some(2025)).unwrap(), 2025);
    }
}
