//! Notification center: state around the native bridge

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::bridge::NotificationBridge;
use crate::error::NotifyError;
use crate::notification::{ChannelSpec, Notification, PushPermission};
use crate::Result;

struct CenterState {
    device_token: Option<String>,
    permission: PushPermission,
    latest: Option<Notification>,
    badge: u32,
}

pub struct NotificationCenter {
    state: Arc<RwLock<CenterState>>,
    bridge: Arc<dyn NotificationBridge>,
    channel: ChannelSpec,
}

impl NotificationCenter {
    pub fn new(bridge: Arc<dyn NotificationBridge>) -> Self {
        Self::with_channel(bridge, ChannelSpec::default())
    }

    pub fn with_channel(bridge: Arc<dyn NotificationBridge>, channel: ChannelSpec) -> Self {
        Self {
            state: Arc::new(RwLock::new(CenterState {
                device_token: None,
                permission: PushPermission::NotDetermined,
                latest: None,
                badge: 0,
            })),
            bridge,
            channel,
        }
    }

    /// Register with the push service and declare the channel. Intended to
    /// run once at startup; registration failure is surfaced but leaves the
    /// center usable for local notifications.
    pub async fn initialize(&self) -> Result<()> {
        self.bridge.create_channel(&self.channel).await?;

        match self.bridge.register().await {
            Ok(token) => {
                info!(token = %token, "Registered for push notifications");
                self.state.write().device_token = Some(token);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Push registration failed");
                Err(e)
            }
        }
    }

    /// Run the platform permission prompt and record the outcome
    pub async fn request_permissions(&self) -> Result<PushPermission> {
        let permission = self.bridge.request_permission().await?;
        self.state.write().permission = permission;
        debug!(permission = ?permission, "Push permission updated");
        Ok(permission)
    }

    /// Display a local notification now (the test-harness button)
    pub async fn send_local(
        &self,
        title: String,
        body: String,
        data: serde_json::Value,
    ) -> Result<Notification> {
        self.ensure_permitted()?;

        let notification =
            Notification::new(title, body, data).with_channel(self.channel.id.clone());
        self.bridge.show(&notification).await?;

        info!(id = %notification.id, title = %notification.title, "Sent local notification");

        self.record_incoming(notification.clone());

        Ok(notification)
    }

    /// Schedule a local notification for a future time
    pub async fn schedule_local(
        &self,
        title: String,
        body: String,
        data: serde_json::Value,
        at: DateTime<Utc>,
    ) -> Result<Notification> {
        self.ensure_permitted()?;

        if at <= Utc::now() {
            return Err(NotifyError::ScheduleInPast(at));
        }

        let notification =
            Notification::new(title, body, data).with_channel(self.channel.id.clone());
        self.bridge.schedule(&notification, at).await?;

        info!(id = %notification.id, at = %at, "Scheduled local notification");

        Ok(notification)
    }

    /// Cancel every pending scheduled notification
    pub async fn cancel_all(&self) -> Result<()> {
        self.bridge.cancel_all().await?;
        debug!("Cancelled all scheduled notifications");
        Ok(())
    }

    /// Record a notification delivered by the platform: replaces `latest`
    /// and bumps the badge
    pub fn record_incoming(&self, notification: Notification) {
        let mut state = self.state.write();
        state.badge = state.badge.saturating_add(1);
        state.latest = Some(notification);
    }

    /// Dismiss the banner showing the latest notification
    pub fn clear_latest(&self) {
        self.state.write().latest = None;
    }

    pub async fn set_badge(&self, count: u32) -> Result<()> {
        self.bridge.set_badge(count).await?;
        self.state.write().badge = count;
        Ok(())
    }

    // === Reads ===

    pub fn latest(&self) -> Option<Notification> {
        self.state.read().latest.clone()
    }

    pub fn device_token(&self) -> Option<String> {
        self.state.read().device_token.clone()
    }

    pub fn permission(&self) -> PushPermission {
        self.state.read().permission
    }

    pub fn badge(&self) -> u32 {
        self.state.read().badge
    }

    fn ensure_permitted(&self) -> Result<()> {
        // NotDetermined is allowed through: the platform shows its own
        // prompt on first delivery. Only an explicit denial blocks sending.
        if self.state.read().permission == PushPermission::Denied {
            return Err(NotifyError::PermissionDenied);
        }
        Ok(())
    }
}

impl Clone for NotificationCenter {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            bridge: Arc::clone(&self.bridge),
            channel: self.channel.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::NullBridge;
    use crate::notification::DEFAULT_CHANNEL_ID;
    use async_trait::async_trait;
    use chrono::Duration;
    use parking_lot::Mutex;

    fn center() -> NotificationCenter {
        NotificationCenter::new(Arc::new(NullBridge::new()))
    }

    /// Bridge that records what was asked of it
    #[derive(Default)]
    struct RecordingBridge {
        shown: Mutex<Vec<Notification>>,
        scheduled: Mutex<Vec<(Notification, DateTime<Utc>)>>,
        cancelled: Mutex<u32>,
    }

    #[async_trait]
    impl NotificationBridge for RecordingBridge {
        async fn register(&self) -> std::result::Result<String, NotifyError> {
            Ok("test-token".to_string())
        }

        async fn request_permission(&self) -> std::result::Result<PushPermission, NotifyError> {
            Ok(PushPermission::Granted)
        }

        async fn create_channel(&self, _c: &ChannelSpec) -> std::result::Result<(), NotifyError> {
            Ok(())
        }

        async fn show(&self, n: &Notification) -> std::result::Result<(), NotifyError> {
            self.shown.lock().push(n.clone());
            Ok(())
        }

        async fn schedule(
            &self,
            n: &Notification,
            at: DateTime<Utc>,
        ) -> std::result::Result<(), NotifyError> {
            self.scheduled.lock().push((n.clone(), at));
            Ok(())
        }

        async fn cancel_all(&self) -> std::result::Result<(), NotifyError> {
            *self.cancelled.lock() += 1;
            Ok(())
        }

        async fn set_badge(&self, _count: u32) -> std::result::Result<(), NotifyError> {
            Ok(())
        }
    }

    /// Bridge whose permission prompt is declined
    struct DeniedBridge;

    #[async_trait]
    impl NotificationBridge for DeniedBridge {
        async fn register(&self) -> std::result::Result<String, NotifyError> {
            Err(NotifyError::Bridge("not registered".to_string()))
        }

        async fn request_permission(&self) -> std::result::Result<PushPermission, NotifyError> {
            Ok(PushPermission::Denied)
        }

        async fn create_channel(&self, _c: &ChannelSpec) -> std::result::Result<(), NotifyError> {
            Ok(())
        }

        async fn show(&self, _n: &Notification) -> std::result::Result<(), NotifyError> {
            Ok(())
        }

        async fn schedule(
            &self,
            _n: &Notification,
            _at: DateTime<Utc>,
        ) -> std::result::Result<(), NotifyError> {
            Ok(())
        }

        async fn cancel_all(&self) -> std::result::Result<(), NotifyError> {
            Ok(())
        }

        async fn set_badge(&self, _count: u32) -> std::result::Result<(), NotifyError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_initialize_records_device_token() {
        let c = center();
        assert!(c.device_token().is_none());

        c.initialize().await.unwrap();
        assert_eq!(c.device_token().as_deref(), Some("null-device-token"));
    }

    #[tokio::test]
    async fn test_permission_prompt_outcome_is_recorded() {
        let c = center();
        assert_eq!(c.permission(), PushPermission::NotDetermined);

        let granted = c.request_permissions().await.unwrap();
        assert!(granted.is_granted());
        assert_eq!(c.permission(), PushPermission::Granted);
    }

    #[tokio::test]
    async fn test_send_local_passes_through_bridge_and_updates_state() {
        let bridge = Arc::new(RecordingBridge::default());
        let c = NotificationCenter::new(bridge.clone());

        let sent = c
            .send_local(
                "Test".to_string(),
                "Hello from the harness".to_string(),
                serde_json::json!({ "source": "test-button" }),
            )
            .await
            .unwrap();

        assert_eq!(bridge.shown.lock().len(), 1);
        assert_eq!(c.latest().unwrap().id, sent.id);
        assert_eq!(c.badge(), 1);
        assert_eq!(sent.channel_id, DEFAULT_CHANNEL_ID);
    }

    #[tokio::test]
    async fn test_send_local_blocked_when_permission_denied() {
        let c = NotificationCenter::new(Arc::new(DeniedBridge));
        c.request_permissions().await.unwrap();

        let result = c
            .send_local("T".to_string(), "B".to_string(), serde_json::Value::Null)
            .await;

        assert!(matches!(result, Err(NotifyError::PermissionDenied)));
        assert!(c.latest().is_none());
        assert_eq!(c.badge(), 0);
    }

    #[tokio::test]
    async fn test_schedule_rejects_past_timestamps() {
        let c = center();

        let past = Utc::now() - Duration::minutes(5);
        let result = c
            .schedule_local("T".to_string(), "B".to_string(), serde_json::Value::Null, past)
            .await;

        assert!(matches!(result, Err(NotifyError::ScheduleInPast(_))));
    }

    #[tokio::test]
    async fn test_schedule_and_cancel_all() {
        let bridge = Arc::new(RecordingBridge::default());
        let c = NotificationCenter::new(bridge.clone());

        let at = Utc::now() + Duration::minutes(10);
        c.schedule_local("T".to_string(), "B".to_string(), serde_json::Value::Null, at)
            .await
            .unwrap();
        assert_eq!(bridge.scheduled.lock().len(), 1);

        c.cancel_all().await.unwrap();
        assert_eq!(*bridge.cancelled.lock(), 1);
    }

    #[tokio::test]
    async fn test_incoming_notifications_replace_latest_and_bump_badge() {
        let c = center();

        c.record_incoming(Notification::new(
            "First".to_string(),
            "".to_string(),
            serde_json::Value::Null,
        ));
        c.record_incoming(Notification::new(
            "Second".to_string(),
            "".to_string(),
            serde_json::Value::Null,
        ));

        assert_eq!(c.latest().unwrap().title, "Second");
        assert_eq!(c.badge(), 2);

        c.clear_latest();
        assert!(c.latest().is_none());

        c.set_badge(0).await.unwrap();
        assert_eq!(c.badge(), 0);
    }
}
