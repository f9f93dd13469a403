//! Relay Notifications
//!
//! Mock push-notification harness: permission and device-token state, a
//! local send/schedule test surface, badge count, and the most recently
//! received notification. Actual delivery belongs to the platform's native
//! push module, abstracted behind [`NotificationBridge`]; this crate only
//! owns the state around it.

mod bridge;
mod center;
mod error;
mod notification;

pub use bridge::{NotificationBridge, NullBridge};
pub use center::NotificationCenter;
pub use error::NotifyError;
pub use notification::{ChannelSpec, Notification, PushPermission, DEFAULT_CHANNEL_ID};

pub type Result<T> = std::result::Result<T, NotifyError>;
