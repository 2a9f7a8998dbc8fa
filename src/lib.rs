// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! QuorumFlow: administrative backend for a congregation quorum.
//!
//! This crate provides the backend API for annual report generation
//! (Firestore aggregation, image embedding, DOCX templating) and the
//! daily notification fan-out job.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{PushSender, ReportService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub report: ReportService,
    pub push: Arc<dyn PushSender>,
}
