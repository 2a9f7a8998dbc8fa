// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! QuorumFlow API Server
//!
//! Administrative backend for a congregation quorum: annual DOCX report
//! generation and daily notification fan-out over Firestore.

use quorumflow::{
    config::Config,
    db::FirestoreDb,
    services::{push_sender_from_config, ImageFetcher, ReportService, TemplateStorage},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting QuorumFlow API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Template storage and image fetcher for report generation
    let storage = TemplateStorage::new(&config);
    let images = ImageFetcher::new();
    let report = ReportService::new(db.clone(), storage, images);
    tracing::info!(
        bucket = %config.template_bucket,
        object = %config.template_object,
        "Report service initialized"
    );

    // Push delivery: real webpush when VAPID keys are configured,
    // otherwise a silent no-op sender.
    let push = push_sender_from_config(&config);
    if push.is_enabled() {
        tracing::info!("Push delivery enabled");
    } else {
        tracing::info!("Push delivery disabled (no VAPID configuration)");
    }

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        report,
        push,
    });

    // Build router
    let app = quorumflow::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quorumflow=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
