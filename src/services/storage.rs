// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Report template download from object storage.
//!
//! The template lives at a fixed bucket/object path and is fetched through
//! the GCS JSON API (`alt=media`). The placeholder names inside the file
//! are a schema contract maintained out-of-band with the template.

use crate::config::Config;
use crate::error::AppError;

const STORAGE_BASE_URL: &str = "https://storage.googleapis.com";

/// Object storage client for the report template.
#[derive(Clone)]
pub struct TemplateStorage {
    http: reqwest::Client,
    base_url: String,
    bucket: String,
    object: String,
}

impl TemplateStorage {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: STORAGE_BASE_URL.to_string(),
            bucket: config.template_bucket.clone(),
            object: config.template_object.clone(),
        }
    }

    /// Override the API base URL (tests).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Download the template bytes.
    pub async fn fetch_template(&self) -> Result<Vec<u8>, AppError> {
        let url = format!(
            "{}/storage/v1/b/{}/o/{}?alt=media",
            self.base_url,
            self.bucket,
            urlencoding::encode(&self.object)
        );

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Template download failed: {}", e)))?
            .error_for_status()
            .map_err(|e| AppError::Storage(format!("Template download failed: {}", e)))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Storage(format!("Template download failed: {}", e)))?;

        tracing::debug!(
            bucket = %self.bucket,
            object = %self.object,
            size = bytes.len(),
            "Template downloaded"
        );

        Ok(bytes.to_vec())
    }
}
