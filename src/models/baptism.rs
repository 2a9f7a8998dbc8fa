// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Baptism records merged from two source collections.
//!
//! Manually entered records live in `baptisms`; pre-registered future
//! members whose baptism date has passed are derived from `future_members`.
//! Both project into the single [`Baptism`] shape carrying a source tag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a merged baptism record originated.
///
/// Serialized with the tags the admin UI shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BaptismSource {
    /// Entered directly through the baptisms form
    Manual,
    /// Derived from a future-member record with a past baptism date
    #[serde(rename = "Automático")]
    Automatic,
}

/// Manually entered baptism record in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualBaptism {
    /// Document ID
    pub id: String,
    /// Name of the baptized person
    pub name: String,
    /// Baptism date
    pub date: DateTime<Utc>,
    /// Photo URLs from the service
    #[serde(default)]
    pub photo_urls: Vec<String>,
}

/// Pre-registered future member record in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FutureMember {
    /// Document ID
    pub id: String,
    /// Name of the future member
    pub name: String,
    /// Scheduled or completed baptism date, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baptism_date: Option<DateTime<Utc>>,
    /// Photo URLs from the service
    #[serde(default)]
    pub photo_urls: Vec<String>,
}

/// Merged logical baptism record.
///
/// Never persisted; built at read time from the two source collections.
#[derive(Debug, Clone, Serialize)]
pub struct Baptism {
    pub name: String,
    pub date: DateTime<Utc>,
    pub source: BaptismSource,
    pub photo_urls: Vec<String>,
}

impl From<ManualBaptism> for Baptism {
    fn from(record: ManualBaptism) -> Self {
        Self {
            name: record.name,
            date: record.date,
            source: BaptismSource::Manual,
            photo_urls: record.photo_urls,
        }
    }
}

impl Baptism {
    /// Project a future member into a baptism, if it has a baptism date.
    pub fn from_future_member(record: FutureMember) -> Option<Self> {
        let date = record.baptism_date?;
        Some(Self {
            name: record.name,
            date,
            source: BaptismSource::Automatic,
            photo_urls: record.photo_urls,
        })
    }
}
