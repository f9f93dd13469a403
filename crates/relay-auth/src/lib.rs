//! Relay Authentication
//!
//! Owns the signed-in/signed-out state of the running app as a small state
//! machine:
//!
//! ```text
//! SignedOut --login/restore--> Authenticating --ok--> Authenticated
//!                                             --err-> SignedOut
//! Authenticated --refresh--> Refreshing --ok/err--> Authenticated
//! Authenticated --logout---> SigningOut --always--> SignedOut
//! ```
//!
//! At most one mutating operation is in flight at a time; the status field
//! is the guard. Calls arriving while another operation holds the guard are
//! rejected with [`AuthError::OperationInProgress`] and mutate nothing.
//!
//! The identity provider and the token store are injected behind traits so
//! the demo constant-match check and a real OIDC client are interchangeable.

mod error;
mod manager;
mod provider;
mod session;
mod store;

pub use error::AuthError;
pub use manager::SessionManager;
pub use provider::{DemoIdentityProvider, IdentityProvider, ProviderGrant, TokenGrant};
pub use session::{Session, SessionConfig, SessionStatus, UserRecord};
pub use store::{MemorySessionStore, SessionStore, SqliteSessionStore, StoredSession};

pub type Result<T> = std::result::Result<T, AuthError>;
