//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const ACTIVITIES: &str = "activities";
    pub const BAPTISMS: &str = "baptisms";
    pub const FUTURE_MEMBERS: &str = "future_members";
    /// Per-year narrative answers (keyed by four-digit year)
    pub const ANNUAL_REPORT_ANSWERS: &str = "annual_report_answers";
    pub const SERVICES: &str = "services";
    pub const MINISTERING_FAMILIES: &str = "ministering_families";
    pub const MEMBERS: &str = "members";
    /// Webpush subscriptions (keyed by user id)
    pub const PUSH_SUBSCRIPTIONS: &str = "push_subscriptions";
    /// In-app notification records
    pub const NOTIFICATIONS: &str = "notifications";
}
