pub mod session;
pub mod storage;

pub use session::{Session, SessionState, SharedSession};
pub use storage::{Credential, CredentialStore, Principal};

use thiserror::Error;

/// Credential storage errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Could not determine the config directory")]
    NoConfigDir,

    #[error("Credential file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Credential file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}
