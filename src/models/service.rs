// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Service project record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Scheduled service project in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// Document ID
    pub id: String,
    /// Service name/title
    pub name: String,
    /// Scheduled date
    pub date: NaiveDate,
    /// Where the service takes place
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}
