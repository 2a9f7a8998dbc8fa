// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Quorum activity model for storage and reporting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored activity record in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Document ID
    pub id: String,
    /// Activity title
    pub title: String,
    /// When the activity took place
    pub date: DateTime<Utc>,
    /// Base description text
    pub description: String,
    /// Wall-clock time as shown on the invitation (e.g. "18:30")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// Where the activity took place
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Context the activity happened in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// What was learned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning: Option<String>,
    /// Free-form addendum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_text: Option<String>,
    /// Image URLs attached to the activity
    #[serde(default)]
    pub image_urls: Vec<String>,
}
