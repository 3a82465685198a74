//! Session lifecycle: Unauthenticated → Valid → Expired.
//!
//! Expiry is only ever learned from a server rejection. There is no local
//! expiry clock.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::storage::{Credential, CredentialStore, Principal};
use crate::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    Valid,
    /// The server rejected the last credential; sign in again.
    Expired,
}

/// Session shared between the views and the prediction client.
pub type SharedSession = Arc<Mutex<Session>>;

#[derive(Debug)]
pub struct Session {
    store: CredentialStore,
    credential: Option<Credential>,
    state: SessionState,
}

impl Session {
    /// Open a session from whatever the store holds. An unreadable credential
    /// is treated as absent.
    pub fn open(store: CredentialStore) -> Self {
        let credential = match store.load() {
            Ok(credential) => credential,
            Err(e) => {
                tracing::warn!("Ignoring stored credential: {}", e);
                None
            }
        };
        let state = if credential.is_some() {
            SessionState::Valid
        } else {
            SessionState::Unauthenticated
        };

        Self {
            store,
            credential,
            state,
        }
    }

    pub fn shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn token(&self) -> Option<&str> {
        self.credential.as_ref().map(|c| c.token.as_str())
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.credential.as_ref().map(|c| &c.principal)
    }

    pub fn sign_in(&mut self, credential: Credential) -> Result<(), SessionError> {
        self.store.store(&credential)?;
        tracing::info!("Signed in as {}", credential.principal.id);
        self.credential = Some(credential);
        self.state = SessionState::Valid;
        Ok(())
    }

    /// Record a server rejection: drop the credential everywhere.
    pub fn expire(&mut self) {
        if let Err(e) = self.store.invalidate() {
            tracing::warn!("Failed to remove expired credential: {}", e);
        }
        self.credential = None;
        self.state = SessionState::Expired;
        tracing::info!("Session expired");
    }

    pub fn sign_out(&mut self) -> Result<(), SessionError> {
        self.store.invalidate()?;
        self.credential = None;
        self.state = SessionState::Unauthenticated;
        Ok(())
    }
}
