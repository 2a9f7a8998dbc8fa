// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Webpush delivery as an injected capability.
//!
//! Push is best-effort: with no VAPID configuration the job runs with a
//! no-op sender and still writes in-app records. Expired endpoints are
//! reported as [`PushError::Gone`]; callers log them and keep the
//! subscription registered (log-only policy).

use crate::config::{Config, VapidConfig};
use crate::models::{NotificationPayload, WebPushSubscription};
use async_trait::async_trait;
use std::sync::Arc;
use web_push::{
    ContentEncoding, HyperWebPushClient, SubscriptionInfo, VapidSignatureBuilder, WebPushClient,
    WebPushError, WebPushMessageBuilder,
};

/// Errors delivering one push message.
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    /// The endpoint answered 404/410: the subscription no longer exists.
    #[error("Subscription endpoint gone")]
    Gone,

    #[error("Push delivery failed: {0}")]
    Delivery(String),
}

/// Push delivery capability.
#[async_trait]
pub trait PushSender: Send + Sync {
    /// Deliver one payload to one subscription.
    async fn send(
        &self,
        subscription: &WebPushSubscription,
        payload: &NotificationPayload,
    ) -> Result<(), PushError>;

    /// Whether deliveries actually leave the process.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Build the configured sender: real webpush when VAPID keys exist,
/// otherwise the silent no-op.
pub fn push_sender_from_config(config: &Config) -> Arc<dyn PushSender> {
    match &config.vapid {
        Some(vapid) => Arc::new(WebPushSender::new(vapid)),
        None => Arc::new(NoopPushSender),
    }
}

/// VAPID-signed webpush sender.
pub struct WebPushSender {
    client: HyperWebPushClient,
    private_key: String,
    subject: String,
}

impl WebPushSender {
    pub fn new(vapid: &VapidConfig) -> Self {
        Self {
            client: HyperWebPushClient::new(),
            private_key: vapid.private_key.clone(),
            subject: vapid.subject.clone(),
        }
    }
}

#[async_trait]
impl PushSender for WebPushSender {
    async fn send(
        &self,
        subscription: &WebPushSubscription,
        payload: &NotificationPayload,
    ) -> Result<(), PushError> {
        let info = SubscriptionInfo::new(
            &subscription.endpoint,
            &subscription.p256dh,
            &subscription.auth,
        );

        let mut signature =
            VapidSignatureBuilder::from_base64(&self.private_key, web_push::URL_SAFE_NO_PAD, &info)
                .map_err(|e| PushError::Delivery(e.to_string()))?;
        signature.add_claim("sub", self.subject.as_str());
        let signature = signature
            .build()
            .map_err(|e| PushError::Delivery(e.to_string()))?;

        let body = serde_json::to_vec(payload).map_err(|e| PushError::Delivery(e.to_string()))?;

        let mut builder = WebPushMessageBuilder::new(&info);
        builder.set_payload(ContentEncoding::Aes128Gcm, &body);
        builder.set_vapid_signature(signature);
        let message = builder
            .build()
            .map_err(|e| PushError::Delivery(e.to_string()))?;

        self.client.send(message).await.map_err(|e| match e {
            WebPushError::EndpointNotFound | WebPushError::EndpointNotValid => {
                PushError::Gone
            }
            other => PushError::Delivery(other.to_string()),
        })
    }
}

/// Sender used when push is not configured: succeeds without sending.
pub struct NoopPushSender;

#[async_trait]
impl PushSender for NoopPushSender {
    async fn send(
        &self,
        _subscription: &WebPushSubscription,
        _payload: &NotificationPayload,
    ) -> Result<(), PushError> {
        tracing::debug!("Push delivery disabled; skipping send");
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}
