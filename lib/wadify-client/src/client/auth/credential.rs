use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::client::secure::SecureString;

/// An access/refresh token pair with its expiry.
///
/// Immutable value: a refresh produces a new `Credential` that replaces the
/// old one, it is never mutated in place. The serde field names
/// (`accessToken`, `expires`, `refreshToken`) are the persisted token format
/// understood by every [`TokenStore`](crate::TokenStore) implementation.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    access_token: SecureString,
    expires: i64,
    refresh_token: SecureString,
}

impl Credential {
    /// Creates a credential from an access token, its absolute expiry in
    /// epoch seconds, and a refresh token.
    pub fn new(
        access_token: impl Into<SecureString>,
        expires: i64,
        refresh_token: impl Into<SecureString>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            expires,
            refresh_token: refresh_token.into(),
        }
    }

    /// Returns the access token value.
    pub fn access_token(&self) -> &str {
        self.access_token.as_str()
    }

    /// Returns the expiry as epoch seconds.
    pub fn expires(&self) -> i64 {
        self.expires
    }

    /// Returns the refresh token value.
    pub fn refresh_token(&self) -> &str {
        self.refresh_token.as_str()
    }

    /// Checks whether the access token is expired at `now` (epoch seconds).
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires <= now
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"[REDACTED]")
            .field("expires", &self.expires)
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// In-memory holder for the active credential.
///
/// Lives for the lifetime of the client instance and avoids repeated store
/// reads. An expired credential is still returned: expiry is repaired
/// reactively through the refresh exchange after the server answers 401,
/// there is no speculative pre-expiry refresh.
#[derive(Debug, Clone, Default)]
pub(crate) struct CredentialCache {
    inner: Arc<RwLock<Option<Credential>>>,
}

impl CredentialCache {
    /// Creates a cache seeded with an optional credential.
    pub(crate) fn with(credential: Option<Credential>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(credential)),
        }
    }

    /// Returns the cached credential, if any.
    pub(crate) async fn get(&self) -> Option<Credential> {
        let guard = self.inner.read().await;
        guard.clone()
    }

    /// Replaces the cached credential.
    pub(crate) async fn set(&self, credential: Credential) {
        let mut guard = self.inner.write().await;
        *guard = Some(credential);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_expose_fields() {
        let credential = Credential::new("T1", 2_000_000_000, "R1");
        assert_eq!(credential.access_token(), "T1");
        assert_eq!(credential.expires(), 2_000_000_000);
        assert_eq!(credential.refresh_token(), "R1");
    }

    #[test]
    fn should_detect_expiry() {
        let credential = Credential::new("T1", 1_000, "R1");
        assert!(credential.is_expired(1_000));
        assert!(credential.is_expired(1_001));
        assert!(!credential.is_expired(999));
    }

    #[test]
    fn should_use_persisted_field_names() {
        let credential = Credential::new("T1", 1_234, "R1");
        let json = serde_json::to_value(&credential).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"accessToken": "T1", "expires": 1234, "refreshToken": "R1"})
        );

        let back: Credential = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, credential);
    }

    #[test]
    fn should_redact_debug_output() {
        let credential = Credential::new("secret-access", 1, "secret-refresh");
        let debug_str = format!("{credential:?}");
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("secret-access"));
        assert!(!debug_str.contains("secret-refresh"));
    }

    #[tokio::test]
    async fn should_cache_credential() {
        let cache = CredentialCache::default();
        assert!(cache.get().await.is_none());

        cache.set(Credential::new("T1", 2_000_000_000, "R1")).await;
        let cached = cache.get().await.expect("credential should be cached");
        assert_eq!(cached.access_token(), "T1");
    }

    #[tokio::test]
    async fn should_return_expired_credential() {
        // Expiry is handled reactively on 401, not filtered here.
        let cache = CredentialCache::with(Some(Credential::new("T0", 0, "R0")));
        assert!(cache.get().await.is_some());
    }
}
