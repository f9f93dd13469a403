//! Authentication error types

use thiserror::Error;

use crate::session::SessionStatus;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Another session operation is in progress (status: {status})")]
    OperationInProgress { status: SessionStatus },

    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("Sign-out cleanup failed: {0}")]
    CleanupFailed(relay_storage::StorageError),

    #[error("Storage error: {0}")]
    Storage(#[from] relay_storage::StorageError),

    #[error("Identity provider error: {0}")]
    Provider(String),
}
