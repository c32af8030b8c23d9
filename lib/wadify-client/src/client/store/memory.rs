use std::sync::Mutex;

use super::{StoreError, TokenStore};
use crate::client::auth::Credential;

/// In-process [`TokenStore`], mostly useful for tests and for callers that
/// explicitly do not want credentials on disk.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: Mutex<Option<Credential>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with a credential.
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            inner: Mutex::new(Some(credential)),
        }
    }
}

impl TokenStore for InMemoryStore {
    fn get(&self) -> Result<Credential, StoreError> {
        let guard = self.inner.lock().map_err(|_| StoreError::NotValid {
            reason: "store mutex poisoned".to_string(),
        })?;
        guard.clone().ok_or(StoreError::NotFound)
    }

    fn set(&self, credential: &Credential) -> Result<(), StoreError> {
        let mut guard = self.inner.lock().map_err(|_| StoreError::NotStored {
            reason: "store mutex poisoned".to_string(),
        })?;
        *guard = Some(credential.clone());
        Ok(())
    }
}
