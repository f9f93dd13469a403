//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] relay_storage::StorageError),

    #[error("Auth error: {0}")]
    Auth(#[from] relay_auth::AuthError),

    #[error("Notification error: {0}")]
    Notify(#[from] relay_notify::NotifyError),

    #[error("Web view error: {0}")]
    WebView(#[from] relay_webview::WebViewError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No web view is open")]
    NoWebView,
}
