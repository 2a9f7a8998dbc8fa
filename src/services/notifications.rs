// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily notification job.
//!
//! Evaluates three independent date predicates against "today" and fans the
//! resulting payloads out to every registered push subscription, writing
//! one in-app record per (subscription owner, payload) pair. Push delivery
//! and the record write are independent: neither failure blocks the other,
//! nor the remaining pairs.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::{
    AppNotification, Member, MinisteringFamily, NotificationPayload, PushSubscriptionRecord,
    ServiceRecord,
};
use crate::services::push::{PushError, PushSender};
use crate::time_utils::{birthday_occurrence, days_until};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use futures_util::{stream, StreamExt};
use std::sync::Arc;

/// Concurrent (subscription, payload) pairs in flight.
const FAN_OUT_CONCURRENCY: usize = 8;

/// Sink for in-app notification records.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn add_app_notification(&self, notification: &AppNotification) -> Result<(), AppError>;
}

#[async_trait]
impl NotificationStore for FirestoreDb {
    async fn add_app_notification(&self, notification: &AppNotification) -> Result<(), AppError> {
        FirestoreDb::add_app_notification(self, notification).await
    }
}

/// Counters of one fan-out run.
#[derive(Debug, Default)]
pub struct FanoutSummary {
    pub notifications: usize,
    pub subscriptions: usize,
    pub pushes_delivered: usize,
    pub push_failures: usize,
    pub records_written: usize,
    pub record_failures: usize,
}

/// The scheduled daily job.
pub struct NotificationJob {
    db: FirestoreDb,
    push: Arc<dyn PushSender>,
}

impl NotificationJob {
    pub fn new(db: FirestoreDb, push: Arc<dyn PushSender>) -> Self {
        Self { db, push }
    }

    /// Evaluate all predicates for today and fan out the results.
    pub async fn run(&self) -> Result<FanoutSummary, AppError> {
        let today = Utc::now().date_naive();

        let services = self.db.list_services().await?;
        let families = self.db.list_urgent_families().await?;
        let members = self.db.list_members().await?;

        let mut payloads = service_reminders(&services, today);
        payloads.extend(urgent_family_alerts(&families));
        payloads.extend(birthday_greetings(&members, today));

        if payloads.is_empty() {
            tracing::info!(%today, "No notifications due today");
            return Ok(FanoutSummary::default());
        }

        let subscriptions = self.db.list_push_subscriptions().await?;
        tracing::info!(
            %today,
            notifications = payloads.len(),
            subscriptions = subscriptions.len(),
            push_enabled = self.push.is_enabled(),
            "Fanning out notifications"
        );

        Ok(fan_out(&payloads, &subscriptions, self.push.as_ref(), &self.db).await)
    }
}

/// Reminders for services exactly one week or one day away.
pub fn service_reminders(
    services: &[ServiceRecord],
    today: NaiveDate,
) -> Vec<NotificationPayload> {
    services
        .iter()
        .filter_map(|service| {
            let body = match days_until(service.date, today) {
                7 => format!("El servicio \"{}\" es la próxima semana", service.name),
                1 => format!("El servicio \"{}\" es mañana", service.name),
                _ => return None,
            };
            Some(NotificationPayload {
                title: "Recordatorio de servicio".to_string(),
                body,
            })
        })
        .collect()
}

/// One alert per family currently flagged urgent, on every run.
pub fn urgent_family_alerts(families: &[MinisteringFamily]) -> Vec<NotificationPayload> {
    families
        .iter()
        .filter(|family| family.is_urgent)
        .map(|family| NotificationPayload {
            title: "Necesidad urgente".to_string(),
            body: format!("La familia {} necesita atención", family.name),
        })
        .collect()
}

/// Birthday notices two weeks ahead and on the day itself.
pub fn birthday_greetings(members: &[Member], today: NaiveDate) -> Vec<NotificationPayload> {
    members
        .iter()
        .filter_map(|member| {
            let occurrence = birthday_occurrence(member.birth_date, today)?;
            match days_until(occurrence, today) {
                14 => Some(NotificationPayload {
                    title: "Cumpleaños próximo".to_string(),
                    body: format!("{} cumple años en dos semanas", member.name),
                }),
                0 => Some(NotificationPayload {
                    title: "¡Feliz cumpleaños!".to_string(),
                    body: format!("Hoy es el cumpleaños de {}", member.name),
                }),
                _ => None,
            }
        })
        .collect()
}

/// Deliver a single (subscription, payload) pair: attempt push, then write
/// the in-app record. Returns (push_ok, record_ok). The two are independent.
async fn deliver_pair<'a>(
    sub: &'a PushSubscriptionRecord,
    payload: &'a NotificationPayload,
    push: &'a dyn PushSender,
    store: &'a dyn NotificationStore,
    now: chrono::DateTime<Utc>,
) -> (bool, bool) {
    let push_ok = match push.send(&sub.subscription, payload).await {
        Ok(()) => true,
        Err(PushError::Gone) => {
            tracing::warn!(
                user_id = %sub.user_id,
                "Push subscription expired (404/410), should be removed"
            );
            false
        }
        Err(e) => {
            tracing::warn!(user_id = %sub.user_id, error = %e, "Push delivery failed");
            false
        }
    };

    let record = AppNotification {
        id: String::new(),
        user_id: sub.user_id.clone(),
        title: payload.title.clone(),
        body: payload.body.clone(),
        created_at: now,
        is_read: false,
    };
    let record_ok = match store.add_app_notification(&record).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(
                user_id = %sub.user_id,
                error = %e,
                "Failed to write in-app notification"
            );
            false
        }
    };

    (push_ok, record_ok)
}

/// Deliver every payload to every subscription through a bounded pool.
///
/// A 404/410 marks the subscription as expired in the log but performs no
/// removal. The in-app record is written regardless of the push outcome.
pub async fn fan_out(
    payloads: &[NotificationPayload],
    subscriptions: &[PushSubscriptionRecord],
    push: &dyn PushSender,
    store: &dyn NotificationStore,
) -> FanoutSummary {
    let now = Utc::now();

    let pairs: Vec<(usize, usize)> = (0..subscriptions.len())
        .flat_map(|si| (0..payloads.len()).map(move |pi| (si, pi)))
        .collect();

    let results: Vec<(bool, bool)> = stream::iter(pairs)
        .map(|(si, pi)| deliver_pair(&subscriptions[si], &payloads[pi], push, store, now))
        .buffer_unordered(FAN_OUT_CONCURRENCY)
        .collect()
        .await;

    let mut summary = FanoutSummary {
        notifications: payloads.len(),
        subscriptions: subscriptions.len(),
        ..FanoutSummary::default()
    };
    for (push_ok, record_ok) in results {
        if push_ok {
            summary.pushes_delivered += 1;
        } else {
            summary.push_failures += 1;
        }
        if record_ok {
            summary.records_written += 1;
        } else {
            summary.record_failures += 1;
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WebPushSubscription;
    use std::sync::Mutex;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn service(name: &str, d: NaiveDate) -> ServiceRecord {
        ServiceRecord {
            id: name.to_lowercase(),
            name: name.to_string(),
            date: d,
            location: None,
        }
    }

    fn member(name: &str, birth: NaiveDate) -> Member {
        Member {
            id: name.to_lowercase(),
            name: name.to_string(),
            birth_date: birth,
        }
    }

    fn family(name: &str, is_urgent: bool) -> MinisteringFamily {
        MinisteringFamily {
            id: name.to_lowercase(),
            name: name.to_string(),
            companionship: None,
            is_urgent,
        }
    }

    fn subscription(user_id: &str) -> PushSubscriptionRecord {
        PushSubscriptionRecord {
            user_id: user_id.to_string(),
            subscription: WebPushSubscription {
                endpoint: format!("https://push.example/{}", user_id),
                p256dh: "key".to_string(),
                auth: "auth".to_string(),
            },
        }
    }

    struct FailingPush;

    #[async_trait]
    impl PushSender for FailingPush {
        async fn send(
            &self,
            _subscription: &WebPushSubscription,
            _payload: &NotificationPayload,
        ) -> Result<(), PushError> {
            Err(PushError::Delivery("boom".to_string()))
        }
    }

    struct GonePush;

    #[async_trait]
    impl PushSender for GonePush {
        async fn send(
            &self,
            _subscription: &WebPushSubscription,
            _payload: &NotificationPayload,
        ) -> Result<(), PushError> {
            Err(PushError::Gone)
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        records: Mutex<Vec<AppNotification>>,
    }

    #[async_trait]
    impl NotificationStore for RecordingStore {
        async fn add_app_notification(
            &self,
            notification: &AppNotification,
        ) -> Result<(), AppError> {
            self.records.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }

    #[test]
    fn test_service_reminder_windows() {
        let today = date(2025, 3, 10);
        let services = vec![
            service("Limpieza", date(2025, 3, 17)), // D+7
            service("Mudanza", date(2025, 3, 11)),  // D+1
            service("Lejano", date(2025, 3, 18)),   // D+8 -> none
            service("Pasado", date(2025, 3, 9)),    // D-1 -> none
        ];

        let payloads = service_reminders(&services, today);
        assert_eq!(payloads.len(), 2);
        assert!(payloads[0].body.contains("Limpieza"));
        assert!(payloads[0].body.contains("próxima semana"));
        assert!(payloads[1].body.contains("Mudanza"));
        assert!(payloads[1].body.contains("mañana"));
    }

    #[test]
    fn test_urgent_families_notify_every_run() {
        let families = vec![family("García", true), family("López", false)];

        // Two consecutive runs produce the same alert: the flag, not a
        // transition, drives the predicate.
        for _ in 0..2 {
            let payloads = urgent_family_alerts(&families);
            assert_eq!(payloads.len(), 1);
            assert!(payloads[0].body.contains("García"));
        }
    }

    #[test]
    fn test_birthday_windows() {
        let today = date(2025, 3, 10);
        let members = vec![
            member("Dos semanas", date(1990, 3, 24)), // D+14
            member("Hoy", date(1985, 3, 10)),         // D0
            member("Trece días", date(1990, 3, 23)),  // D+13 -> none
            member("Pasado", date(1990, 3, 1)),       // already this year -> none
        ];

        let payloads = birthday_greetings(&members, today);
        assert_eq!(payloads.len(), 2);
        assert!(payloads[0].body.contains("Dos semanas"));
        assert_eq!(payloads[1].title, "¡Feliz cumpleaños!");
    }

    #[tokio::test]
    async fn test_push_failure_never_blocks_record_write() {
        let payloads = vec![
            NotificationPayload {
                title: "t1".to_string(),
                body: "b1".to_string(),
            },
            NotificationPayload {
                title: "t2".to_string(),
                body: "b2".to_string(),
            },
        ];
        let subscriptions = vec![subscription("user-a"), subscription("user-b")];
        let store = RecordingStore::default();

        let summary = fan_out(&payloads, &subscriptions, &FailingPush, &store).await;

        // Every (subscription, payload) pair fails push but still writes.
        assert_eq!(summary.push_failures, 4);
        assert_eq!(summary.pushes_delivered, 0);
        assert_eq!(summary.records_written, 4);
        assert_eq!(store.records.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_gone_subscription_still_gets_record() {
        let payloads = vec![NotificationPayload {
            title: "t".to_string(),
            body: "b".to_string(),
        }];
        let subscriptions = vec![subscription("user-a")];
        let store = RecordingStore::default();

        let summary = fan_out(&payloads, &subscriptions, &GonePush, &store).await;

        assert_eq!(summary.push_failures, 1);
        assert_eq!(summary.records_written, 1);
        let records = store.records.lock().unwrap();
        assert_eq!(records[0].user_id, "user-a");
        assert!(!records[0].is_read);
    }

    #[tokio::test]
    async fn test_no_subscriptions_is_a_clean_no_op() {
        let payloads = vec![NotificationPayload {
            title: "t".to_string(),
            body: "b".to_string(),
        }];
        let store = RecordingStore::default();

        let summary = fan_out(&payloads, &[], &FailingPush, &store).await;

        assert_eq!(summary.notifications, 1);
        assert_eq!(summary.subscriptions, 0);
        assert_eq!(summary.records_written, 0);
    }
}
