// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Activities, manual baptisms and future members (report sources)
//! - Annual report answers (per-year singleton)
//! - Services, ministering families and members (notification sources)
//! - Push subscriptions and in-app notification records

use crate::db::collections;
use crate::error::AppError;
use crate::models::{
    Activity, AnnualReportAnswers, AppNotification, FutureMember, ManualBaptism, Member,
    MinisteringFamily, PushSubscriptionRecord, ServiceRecord,
};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without needing
        // a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Report Source Operations ────────────────────────────────

    /// All activities, ordered by date descending.
    ///
    /// Year filtering happens client-side on top of this ordered query.
    pub async fn list_activities(&self) -> Result<Vec<Activity>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::ACTIVITIES)
            .order_by([("date", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All manually entered baptism records, ordered by date descending.
    pub async fn list_manual_baptisms(&self) -> Result<Vec<ManualBaptism>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::BAPTISMS)
            .order_by([("date", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All pre-registered future members.
    pub async fn list_future_members(&self) -> Result<Vec<FutureMember>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::FUTURE_MEMBERS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Annual Report Answers ───────────────────────────────────

    /// Get the per-year answers document, if present.
    pub async fn get_annual_answers(
        &self,
        year: i32,
    ) -> Result<Option<AnnualReportAnswers>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ANNUAL_REPORT_ANSWERS)
            .obj()
            .one(&year.to_string())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or overwrite the per-year answers document.
    pub async fn set_annual_answers(
        &self,
        year: i32,
        answers: &AnnualReportAnswers,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::ANNUAL_REPORT_ANSWERS)
            .document_id(year.to_string())
            .object(answers)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Notification Source Operations ──────────────────────────

    /// All scheduled services.
    pub async fn list_services(&self) -> Result<Vec<ServiceRecord>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::SERVICES)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Ministering families currently flagged urgent.
    pub async fn list_urgent_families(&self) -> Result<Vec<MinisteringFamily>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::MINISTERING_FAMILIES)
            .filter(|q| q.for_all([q.field("is_urgent").eq(true)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All roster members.
    pub async fn list_members(&self) -> Result<Vec<Member>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::MEMBERS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Push Subscription Operations ────────────────────────────

    /// Every registered push subscription.
    pub async fn list_push_subscriptions(
        &self,
    ) -> Result<Vec<PushSubscriptionRecord>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::PUSH_SUBSCRIPTIONS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Register (or replace) the subscription of a user.
    ///
    /// Documents are keyed by user id: one device registration per user.
    pub async fn upsert_push_subscription(
        &self,
        record: &PushSubscriptionRecord,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::PUSH_SUBSCRIPTIONS)
            .document_id(&record.user_id)
            .object(record)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Remove the subscription of a user.
    pub async fn delete_push_subscription(&self, user_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::PUSH_SUBSCRIPTIONS)
            .document_id(user_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── In-App Notification Operations ──────────────────────────

    /// Append an in-app notification record (auto-generated document id).
    pub async fn add_app_notification(
        &self,
        notification: &AppNotification,
    ) -> Result<(), AppError> {
        let _: AppNotification = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::NOTIFICATIONS)
            .generate_document_id()
            .object(notification)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// In-app notifications of one user, newest first.
    pub async fn list_notifications_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<AppNotification>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::NOTIFICATIONS)
            .filter(move |q| q.for_all([q.field("user_id").eq(&user_id)]))
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Fetch a single in-app notification by document id.
    pub async fn get_app_notification(
        &self,
        notification_id: &str,
    ) -> Result<Option<AppNotification>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::NOTIFICATIONS)
            .obj()
            .one(notification_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Overwrite an in-app notification (used to flip `is_read`).
    pub async fn set_app_notification(
        &self,
        notification_id: &str,
        notification: &AppNotification,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::NOTIFICATIONS)
            .document_id(notification_id)
            .object(notification)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
