// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Quorum member roster entry.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Roster member record in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// Document ID
    pub id: String,
    /// Full name
    pub name: String,
    /// Birth date (no time component)
    pub birth_date: NaiveDate,
}
