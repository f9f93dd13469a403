//! Notification error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Notification permission denied")]
    PermissionDenied,

    #[error("Scheduled time is in the past: {0}")]
    ScheduleInPast(chrono::DateTime<chrono::Utc>),

    #[error("Native bridge error: {0}")]
    Bridge(String),
}
