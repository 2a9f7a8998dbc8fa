// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod aggregator;
pub mod docx;
pub mod images;
pub mod notifications;
pub mod push;
pub mod report;
pub mod storage;

pub use aggregator::ReportAggregator;
pub use images::ImageFetcher;
pub use notifications::NotificationJob;
pub use push::{push_sender_from_config, NoopPushSender, PushSender, WebPushSender};
pub use report::ReportService;
pub use storage::TemplateStorage;
