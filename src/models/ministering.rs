// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Ministering assignment records.

use serde::{Deserialize, Serialize};

/// Family assigned to a ministering companionship.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinisteringFamily {
    /// Document ID
    pub id: String,
    /// Family name
    pub name: String,
    /// Companionship the family is assigned to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub companionship: Option<String>,
    /// Flagged as needing urgent attention
    #[serde(default)]
    pub is_urgent: bool,
}
