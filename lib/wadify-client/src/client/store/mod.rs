//! Durable persistence for credentials across process restarts.
//!
//! The pipeline depends only on the [`TokenStore`] contract; implementations
//! are pluggable and supplied at construction. Two are provided: a JSON file
//! ([`FileSystemStore`], the default) and an in-process holder
//! ([`InMemoryStore`]).

use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;

mod filesystem;
mod memory;

pub use self::filesystem::FileSystemStore;
pub use self::memory::InMemoryStore;

use super::auth::Credential;
use super::error::ConfigError;

/// Failures local to a [`TokenStore`].
///
/// These never surface through [`ApiError`](crate::ApiError): `NotFound` and
/// `NotValid` are recovered as "no cached credential" (falling back to the
/// initial grant), and `NotStored` is reported to operators without aborting
/// an otherwise successful request.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
pub enum StoreError {
    /// No credential has ever been persisted.
    #[display("No credential has been persisted")]
    NotFound,

    /// Persisted data cannot be parsed into a well-formed credential.
    #[display("Persisted credential is not valid: {reason}")]
    NotValid {
        /// Description of the parse failure.
        reason: String,
    },

    /// The credential could not be durably written.
    #[display("Credential could not be stored: {reason}")]
    NotStored {
        /// Description of the write failure.
        reason: String,
    },
}

/// Contract for persisting and retrieving the credential triple.
pub trait TokenStore: Send + Sync + Debug {
    /// Retrieves the last persisted credential.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when nothing has ever been persisted,
    /// [`StoreError::NotValid`] when the persisted data is malformed.
    fn get(&self) -> Result<Credential, StoreError>;

    /// Durably persists the credential, creating any necessary parent
    /// location.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotStored`] when the write cannot complete. Callers
    /// treat this as non-fatal to the in-flight request.
    fn set(&self, credential: &Credential) -> Result<(), StoreError>;
}

/// Selection of a token store provider at construction time.
///
/// Known provider identifiers map to constructors explicitly; unknown
/// identifiers are rejected with a configuration error instead of being
/// instantiated reflectively.
#[derive(Debug, Clone)]
pub enum TokenStoreConfig {
    /// JSON file at the given path (the default provider).
    FileSystem {
        /// Location of the token cache file.
        path: PathBuf,
    },
    /// In-process store, discarded when the client is dropped.
    InMemory,
}

impl Default for TokenStoreConfig {
    fn default() -> Self {
        Self::FileSystem {
            path: FileSystemStore::default_path(),
        }
    }
}

impl TokenStoreConfig {
    /// Resolves a provider identifier to its configuration.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownTokenProvider`] for identifiers outside the
    /// registry (`"filesystem"`, `"memory"`).
    pub fn from_provider(provider: &str, path: Option<PathBuf>) -> Result<Self, ConfigError> {
        match provider {
            "filesystem" => Ok(Self::FileSystem {
                path: path.unwrap_or_else(FileSystemStore::default_path),
            }),
            "memory" => Ok(Self::InMemory),
            other => Err(ConfigError::UnknownTokenProvider {
                provider: other.to_string(),
            }),
        }
    }

    /// Constructs the configured store.
    pub fn build(self) -> Arc<dyn TokenStore> {
        match self {
            Self::FileSystem { path } => Arc::new(FileSystemStore::new(path)),
            Self::InMemory => Arc::new(InMemoryStore::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_resolve_known_providers() {
        let config = TokenStoreConfig::from_provider("filesystem", Some(PathBuf::from("/tmp/t")))
            .expect("known provider");
        match config {
            TokenStoreConfig::FileSystem { path } => assert_eq!(path, PathBuf::from("/tmp/t")),
            TokenStoreConfig::InMemory => panic!("expected filesystem provider"),
        }

        let config = TokenStoreConfig::from_provider("memory", None).expect("known provider");
        assert!(matches!(config, TokenStoreConfig::InMemory));
    }

    #[test]
    fn should_reject_unknown_provider() {
        let result = TokenStoreConfig::from_provider("vault", None);
        assert_eq!(
            result.expect_err("unknown provider"),
            ConfigError::UnknownTokenProvider {
                provider: "vault".to_string()
            }
        );
    }

    #[test]
    fn should_default_to_filesystem_under_temp() {
        let TokenStoreConfig::FileSystem { path } = TokenStoreConfig::default() else {
            panic!("expected filesystem default");
        };
        assert!(path.starts_with(std::env::temp_dir()));
        assert!(path.ends_with("wadify/tokencache.json"));
    }
}
