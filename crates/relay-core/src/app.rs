//! Main app state container
//!
//! Constructed once at startup and handed to the UI shell by reference;
//! every screen reads snapshots from here and calls the operations. This
//! replaces the ambient context-provider singleton the shell might
//! otherwise grow: ownership and lifetime are explicit, and tests build an
//! `App` around fakes.

use parking_lot::RwLock;
use std::sync::Arc;

use relay_auth::{
    DemoIdentityProvider, IdentityProvider, Session, SessionConfig, SessionManager, SessionStore,
    SqliteSessionStore, UserRecord,
};
use relay_notify::{
    ChannelSpec, Notification, NotificationBridge, NotificationCenter, NullBridge, PushPermission,
};
use relay_storage::Database;
use relay_webview::WebViewModel;

use crate::config::Config;
use crate::error::CoreError;
use crate::Result;

const HOMEPAGE_SETTING: &str = "homepage";

pub struct App {
    /// Configuration
    config: Config,
    /// Database
    db: Database,
    /// Authentication session state machine
    session_manager: SessionManager,
    /// Push notification harness
    notification_center: NotificationCenter,
    /// The embedded browser screen, when open
    web_view: Arc<RwLock<Option<WebViewModel>>>,
}

impl App {
    /// Build the demo app: sqlite-backed session store, constant-match
    /// identity provider, no-op notification bridge.
    pub fn new(config: Config) -> Result<Self> {
        // Ensure data directory exists
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CoreError::Config(e.to_string()))?;
        }

        let db = Database::open(&config.database_path)?;
        let store = Arc::new(SqliteSessionStore::new(db.clone()));
        let provider = Arc::new(DemoIdentityProvider::new());
        let bridge = Arc::new(NullBridge::new());

        Ok(Self::assemble(config, db, provider, store, bridge))
    }

    /// Build an app around swapped-in collaborators: a real OIDC client, a
    /// keychain-backed store, the device push module.
    pub fn with_collaborators(
        config: Config,
        db: Database,
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn SessionStore>,
        bridge: Arc<dyn NotificationBridge>,
    ) -> Self {
        Self::assemble(config, db, provider, store, bridge)
    }

    fn assemble(
        config: Config,
        db: Database,
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn SessionStore>,
        bridge: Arc<dyn NotificationBridge>,
    ) -> Self {
        let session_manager = SessionManager::with_config(
            provider,
            store,
            SessionConfig {
                token_lifetime: config.token_lifetime,
            },
        );

        let channel = ChannelSpec {
            id: config.notification_channel_id.clone(),
            ..ChannelSpec::default()
        };
        let notification_center = NotificationCenter::with_channel(bridge, channel);

        Self {
            config,
            db,
            session_manager,
            notification_center,
            web_view: Arc::new(RwLock::new(None)),
        }
    }

    /// Startup sequence: try to restore the previous session (absence is
    /// normal), then bring up notifications. A dead push service must not
    /// block app start; the center stays usable for local notifications.
    pub async fn initialize(&self) -> Result<()> {
        let restored = self.session_manager.restore_session().await?;
        match &restored {
            Some(user) => tracing::info!(email = %user.email, "Resuming previous session"),
            None => tracing::info!("Starting signed out"),
        }

        if let Err(e) = self.notification_center.initialize().await {
            tracing::warn!(error = %e, "Push registration failed, continuing without a device token");
        }
        if let Err(e) = self.notification_center.request_permissions().await {
            tracing::warn!(error = %e, "Push permission prompt failed");
        }

        tracing::info!("App initialized");

        Ok(())
    }

    // === Session operations ===

    pub fn session_manager(&self) -> &SessionManager {
        &self.session_manager
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserRecord> {
        Ok(self.session_manager.login(email, password).await?)
    }

    pub async fn logout(&self) -> Result<()> {
        Ok(self.session_manager.logout().await?)
    }

    pub async fn refresh_access_token(&self) -> Result<String> {
        Ok(self.session_manager.refresh_access_token().await?)
    }

    pub fn session(&self) -> Session {
        self.session_manager.snapshot()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session_manager.is_authenticated()
    }

    // === Web view operations ===

    /// Homepage the browser opens with: the persisted override if the user
    /// set one, the configured default otherwise
    pub fn homepage(&self) -> Result<String> {
        Ok(self
            .db
            .get_setting(HOMEPAGE_SETTING)?
            .unwrap_or_else(|| self.config.homepage.clone()))
    }

    /// Persist a homepage override, validated like any browser target
    pub fn set_homepage(&self, url: &str) -> Result<()> {
        let url = relay_webview::parse_web_url(url)?;
        self.db.set_setting(HOMEPAGE_SETTING, url.as_str())?;
        Ok(())
    }

    /// Open the embedded browser at the homepage
    pub fn open_web_view(&self) -> Result<WebViewModel> {
        let homepage = self.homepage()?;
        self.open_web_view_at(&homepage)
    }

    pub fn open_web_view_at(&self, url: &str) -> Result<WebViewModel> {
        let view = WebViewModel::open(url)?;
        *self.web_view.write() = Some(view.clone());
        Ok(view)
    }

    pub fn close_web_view(&self) {
        *self.web_view.write() = None;
    }

    pub fn web_view(&self) -> Option<WebViewModel> {
        self.web_view.read().clone()
    }

    pub fn web_view_load_finished(&self) -> Result<WebViewModel> {
        self.with_web_view(|view| view.load_finished())
    }

    pub fn web_view_load_failed(&self, reason: &str) -> Result<WebViewModel> {
        self.with_web_view(|view| view.load_failed(reason))
    }

    pub fn web_view_retry(&self) -> Result<WebViewModel> {
        self.with_web_view(|view| view.retry())
    }

    fn with_web_view<F>(&self, f: F) -> Result<WebViewModel>
    where
        F: FnOnce(&mut WebViewModel) -> relay_webview::Result<()>,
    {
        let mut slot = self.web_view.write();
        let view = slot.as_mut().ok_or(CoreError::NoWebView)?;
        f(view)?;
        Ok(view.clone())
    }

    // === Notification operations ===

    pub fn notification_center(&self) -> &NotificationCenter {
        &self.notification_center
    }

    /// The "send test notification" button
    pub async fn send_test_notification(&self) -> Result<Notification> {
        Ok(self
            .notification_center
            .send_local(
                "Test Notification".to_string(),
                "This is a test notification from Relay".to_string(),
                serde_json::json!({ "source": "test-harness" }),
            )
            .await?)
    }

    pub fn latest_notification(&self) -> Option<Notification> {
        self.notification_center.latest()
    }

    pub fn push_permission(&self) -> PushPermission {
        self.notification_center.permission()
    }

    // === Config ===

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl Clone for App {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            db: self.db.clone(),
            session_manager: self.session_manager.clone(),
            notification_center: self.notification_center.clone(),
            web_view: Arc::clone(&self.web_view),
        }
    }
}
