//! Relay Web View State
//!
//! Load-state tracking for the embedded browser screen. The platform web
//! view is just a renderer; it reports load callbacks into this model and
//! the shell renders whatever state the model holds (spinner while loading,
//! error panel with retry on failure).

mod error;
mod state;
mod view;

pub use error::WebViewError;
pub use state::LoadState;
pub use view::{parse_web_url, WebViewModel};

pub type Result<T> = std::result::Result<T, WebViewError>;
