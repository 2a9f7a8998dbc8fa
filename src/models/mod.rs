// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod baptism;
pub mod member;
pub mod ministering;
pub mod notification;
pub mod report;
pub mod service;

pub use activity::Activity;
pub use baptism::{Baptism, BaptismSource, FutureMember, ManualBaptism};
pub use member::Member;
pub use ministering::MinisteringFamily;
pub use notification::{
    AppNotification, NotificationPayload, PushSubscriptionRecord, WebPushSubscription,
};
pub use report::AnnualReportAnswers;
pub use service::ServiceRecord;
