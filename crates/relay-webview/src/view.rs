//! Web view model: target URL plus load state

use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::error::WebViewError;
use crate::state::LoadState;
use crate::Result;

#[derive(Debug, Clone, Serialize)]
pub struct WebViewModel {
    url: Url,
    state: LoadState,
    last_error: Option<String>,
}

impl WebViewModel {
    /// Open a page. Validates the URL and enters `Loading`.
    pub fn open(url: &str) -> Result<Self> {
        let url = parse_web_url(url)?;
        debug!(url = %url, "Opening web view");

        Ok(Self {
            url,
            state: LoadState::Loading,
            last_error: None,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Failure message from the most recent failed load
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Platform callback: the page rendered
    pub fn load_finished(&mut self) -> Result<()> {
        self.transition(LoadState::Loaded)?;
        self.last_error = None;
        debug!(url = %self.url, "Page loaded");
        Ok(())
    }

    /// Platform callback: the load failed
    pub fn load_failed(&mut self, reason: impl Into<String>) -> Result<()> {
        self.transition(LoadState::Failed)?;
        let reason = reason.into();
        warn!(url = %self.url, reason = %reason, "Page failed to load");
        self.last_error = Some(reason);
        Ok(())
    }

    /// Retry the current URL after a failure
    pub fn retry(&mut self) -> Result<()> {
        if self.state != LoadState::Failed {
            return Err(WebViewError::InvalidTransition {
                from: self.state.to_string(),
                to: LoadState::Loading.to_string(),
            });
        }
        self.state = LoadState::Loading;
        self.last_error = None;
        debug!(url = %self.url, "Retrying page load");
        Ok(())
    }

    /// Navigate to a different URL, restarting the load
    pub fn navigate(&mut self, url: &str) -> Result<()> {
        self.url = parse_web_url(url)?;
        self.state = LoadState::Loading;
        self.last_error = None;
        debug!(url = %self.url, "Navigating web view");
        Ok(())
    }

    fn transition(&mut self, target: LoadState) -> Result<()> {
        if !self.state.can_transition_to(target) {
            return Err(WebViewError::InvalidTransition {
                from: self.state.to_string(),
                to: target.to_string(),
            });
        }
        self.state = target;
        Ok(())
    }
}

/// Only http(s) pages may be shown in the embedded view
pub fn parse_web_url(url: &str) -> Result<Url> {
    let url = Url::parse(url)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(WebViewError::UnsupportedScheme(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_starts_loading() {
        let view = WebViewModel::open("https://google.com").unwrap();
        assert_eq!(view.state(), LoadState::Loading);
        assert_eq!(view.url().as_str(), "https://google.com/");
        assert!(view.last_error().is_none());
    }

    #[test]
    fn test_open_rejects_bad_urls() {
        assert!(matches!(
            WebViewModel::open("not a url"),
            Err(WebViewError::InvalidUrl(_))
        ));
        assert!(matches!(
            WebViewModel::open("file:///etc/passwd"),
            Err(WebViewError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_load_failure_and_retry() {
        let mut view = WebViewModel::open("https://google.com").unwrap();

        view.load_failed("connection reset").unwrap();
        assert_eq!(view.state(), LoadState::Failed);
        assert_eq!(view.last_error(), Some("connection reset"));

        view.retry().unwrap();
        assert_eq!(view.state(), LoadState::Loading);
        assert!(view.last_error().is_none());

        view.load_finished().unwrap();
        assert_eq!(view.state(), LoadState::Loaded);
    }

    #[test]
    fn test_retry_only_valid_from_failed() {
        let mut view = WebViewModel::open("https://google.com").unwrap();
        view.load_finished().unwrap();

        assert!(matches!(
            view.retry(),
            Err(WebViewError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_settle_only_valid_from_loading() {
        let mut view = WebViewModel::open("https://google.com").unwrap();
        view.load_finished().unwrap();

        // A second "finished" callback is a no-op transition, allowed
        assert!(view.load_finished().is_ok());
        // But failing a page that already settled is not
        assert!(matches!(
            view.load_failed("late error"),
            Err(WebViewError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_navigate_restarts_load() {
        let mut view = WebViewModel::open("https://google.com").unwrap();
        view.load_finished().unwrap();

        view.navigate("https://example.com/docs").unwrap();
        assert_eq!(view.state(), LoadState::Loading);
        assert_eq!(view.url().as_str(), "https://example.com/docs");
    }
}
