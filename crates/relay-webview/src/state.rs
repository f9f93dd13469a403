//! Web view load state machine
//!
//! ```text
//! Idle
//!   ↓ open/navigate
//! Loading
//!   ↓ finished          ↓ failed
//! Loaded               Failed
//!                        ↓ retry
//!                      Loading
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    /// No page requested yet
    Idle,
    /// Page requested, waiting on the platform web view
    Loading,
    /// Page rendered
    Loaded,
    /// Load failed; retry allowed
    Failed,
}

impl LoadState {
    /// Check if transition to another state is valid
    pub fn can_transition_to(&self, target: LoadState) -> bool {
        match (self, target) {
            // Any state can start a (new) load
            (_, LoadState::Loading) => true,
            // Only an in-flight load can settle
            (LoadState::Loading, LoadState::Loaded) => true,
            (LoadState::Loading, LoadState::Failed) => true,
            // Same state is always valid (no-op)
            (a, b) if *a == b => true,
            // All other transitions are invalid
            _ => false,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoadState::Idle => "idle",
            LoadState::Loading => "loading",
            LoadState::Loaded => "loaded",
            LoadState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LoadState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "idle" => Ok(LoadState::Idle),
            "loading" => Ok(LoadState::Loading),
            "loaded" => Ok(LoadState::Loaded),
            "failed" => Ok(LoadState::Failed),
            _ => Err(format!("Unknown load state: {}", s)),
        }
    }
}
