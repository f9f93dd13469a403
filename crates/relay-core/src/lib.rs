//! Relay Core
//!
//! Central coordination layer for the Relay app: configuration, the `App`
//! container wiring the session manager, notification center and web view
//! together, and logging setup. The UI shell reads state snapshots from
//! here and calls the operations; it owns no state of its own.

mod app;
mod config;
mod error;

pub use app::App;
pub use config::Config;
pub use error::CoreError;

// Re-export core components
pub use relay_auth::{
    AuthError, DemoIdentityProvider, IdentityProvider, Session, SessionManager, SessionStatus,
    SessionStore, SqliteSessionStore, UserRecord,
};
pub use relay_notify::{
    Notification, NotificationBridge, NotificationCenter, NotifyError, NullBridge, PushPermission,
};
pub use relay_storage::{Database, StorageError};
pub use relay_webview::{LoadState, WebViewError, WebViewModel};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
