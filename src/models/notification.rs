// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Notification payloads, in-app records and push subscriptions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Transient notification content, never persisted as its own entity.
///
/// Serialized as the webpush payload; persisted only as an
/// [`AppNotification`] per (user, notification) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
}

/// In-app notification record in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppNotification {
    /// Document ID, populated on reads by the Firestore mapping layer
    #[serde(alias = "_firestore_id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

/// Browser push subscription, as produced by `PushManager.subscribe`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebPushSubscription {
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
}

/// Registered (user, subscription) pairing in Firestore, keyed by user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushSubscriptionRecord {
    pub user_id: String,
    pub subscription: WebPushSubscription,
}
