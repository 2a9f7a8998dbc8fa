//! Application configuration loaded from environment variables.
//!
//! Secrets arrive as environment variables (Cloud Run secret bindings) and
//! are cached in memory for the lifetime of the process.

use std::env;

/// Default object storage path of the annual report DOCX template.
pub const DEFAULT_TEMPLATE_OBJECT: &str = "plantillas/reporte_anual.docx";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Storage bucket holding the report template
    pub template_bucket: String,
    /// Object path of the report template inside the bucket
    pub template_object: String,

    // --- Secrets (injected via secret bindings) ---
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// VAPID key pair for webpush; push delivery is skipped when absent
    pub vapid: Option<VapidConfig>,
}

/// VAPID signing configuration for webpush delivery.
#[derive(Debug, Clone)]
pub struct VapidConfig {
    /// URL-safe base64 encoded private key
    pub private_key: String,
    /// Contact URI included in the VAPID claims (mailto: or https:)
    pub subject: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            template_bucket: env::var("TEMPLATE_BUCKET")
                .map_err(|_| ConfigError::Missing("TEMPLATE_BUCKET"))?,
            template_object: env::var("TEMPLATE_OBJECT")
                .unwrap_or_else(|_| DEFAULT_TEMPLATE_OBJECT.to_string()),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            vapid: Self::vapid_from_env(),
        })
    }

    /// Read the VAPID pair from the environment.
    ///
    /// Both variables must be present; otherwise push delivery is disabled
    /// and the notification job only writes in-app records.
    fn vapid_from_env() -> Option<VapidConfig> {
        let private_key = env::var("VAPID_PRIVATE_KEY").ok()?;
        let subject = env::var("VAPID_SUBJECT").ok()?;
        Some(VapidConfig {
            private_key: private_key.trim().to_string(),
            subject: subject.trim().to_string(),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            template_bucket: "test-bucket".to_string(),
            template_object: DEFAULT_TEMPLATE_OBJECT.to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            vapid: None,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test because the scenarios share process-wide env vars.
    #[test]
    fn test_config_from_env() {
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::remove_var("VAPID_PRIVATE_KEY");
        env::remove_var("VAPID_SUBJECT");

        env::remove_var("TEMPLATE_BUCKET");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TEMPLATE_BUCKET")));

        env::set_var("TEMPLATE_BUCKET", "quorumflow-assets");
        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.template_bucket, "quorumflow-assets");
        assert_eq!(config.template_object, DEFAULT_TEMPLATE_OBJECT);
        assert_eq!(config.port, 8080);
        assert!(config.vapid.is_none());
    }
}
