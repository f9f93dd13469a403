//! Native notification bridge
//!
//! Seam between the notification center and the platform push module
//! (APNs/FCM wrapper on device). Delivery itself is out of scope here;
//! implementations translate these calls into whatever the platform wants.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::NotifyError;
use crate::notification::{ChannelSpec, Notification, PushPermission};

#[async_trait]
pub trait NotificationBridge: Send + Sync {
    /// Register with the platform push service, returning the device token
    async fn register(&self) -> Result<String, NotifyError>;

    /// Prompt the user (or read the current grant) for push permission
    async fn request_permission(&self) -> Result<PushPermission, NotifyError>;

    /// Declare a channel (no-op on platforms without channels)
    async fn create_channel(&self, channel: &ChannelSpec) -> Result<(), NotifyError>;

    /// Display a notification immediately
    async fn show(&self, notification: &Notification) -> Result<(), NotifyError>;

    /// Display a notification at a future time
    async fn schedule(
        &self,
        notification: &Notification,
        at: DateTime<Utc>,
    ) -> Result<(), NotifyError>;

    /// Cancel all pending scheduled notifications
    async fn cancel_all(&self) -> Result<(), NotifyError>;

    /// Update the app icon badge
    async fn set_badge(&self, count: u32) -> Result<(), NotifyError>;
}

/// Bridge for tests and headless runs: grants permission, hands out a fixed
/// token, and drops everything else on the floor.
#[derive(Default)]
pub struct NullBridge;

impl NullBridge {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationBridge for NullBridge {
    async fn register(&self) -> Result<String, NotifyError> {
        Ok("null-device-token".to_string())
    }

    async fn request_permission(&self) -> Result<PushPermission, NotifyError> {
        Ok(PushPermission::Granted)
    }

    async fn create_channel(&self, _channel: &ChannelSpec) -> Result<(), NotifyError> {
        Ok(())
    }

    async fn show(&self, _notification: &Notification) -> Result<(), NotifyError> {
        Ok(())
    }

    async fn schedule(
        &self,
        _notification: &Notification,
        _at: DateTime<Utc>,
    ) -> Result<(), NotifyError> {
        Ok(())
    }

    async fn cancel_all(&self) -> Result<(), NotifyError> {
        Ok(())
    }

    async fn set_badge(&self, _count: u32) -> Result<(), NotifyError> {
        Ok(())
    }
}
