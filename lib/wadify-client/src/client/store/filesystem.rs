use std::io::ErrorKind;
use std::path::PathBuf;
use std::{env, fs};

use tracing::debug;

use super::{StoreError, TokenStore};
use crate::client::auth::Credential;

/// File-backed [`TokenStore`]: one JSON document holding the credential
/// triple, surviving process restarts.
#[derive(Debug, Clone)]
pub struct FileSystemStore {
    path: PathBuf,
}

impl FileSystemStore {
    /// Creates a store persisting at the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The default location: `{temp dir}/wadify/tokencache.json`.
    pub fn default_path() -> PathBuf {
        env::temp_dir().join("wadify").join("tokencache.json")
    }
}

impl Default for FileSystemStore {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}

impl TokenStore for FileSystemStore {
    fn get(&self) -> Result<Credential, StoreError> {
        let bytes = fs::read(&self.path).map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                StoreError::NotFound
            } else {
                StoreError::NotValid {
                    reason: err.to_string(),
                }
            }
        })?;

        serde_json::from_slice(&bytes).map_err(|err| StoreError::NotValid {
            reason: err.to_string(),
        })
    }

    fn set(&self, credential: &Credential) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| StoreError::NotStored {
                reason: err.to_string(),
            })?;
        }

        let bytes = serde_json::to_vec(credential).map_err(|err| StoreError::NotStored {
            reason: err.to_string(),
        })?;
        fs::write(&self.path, bytes).map_err(|err| StoreError::NotStored {
            reason: err.to_string(),
        })?;

        debug!(path = %self.path.display(), "credential persisted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_fail_with_not_found_before_first_write() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSystemStore::new(dir.path().join("tokencache.json"));

        assert_eq!(store.get().expect_err("no file yet"), StoreError::NotFound);
    }

    #[test]
    fn should_round_trip_credential() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSystemStore::new(dir.path().join("tokencache.json"));
        let credential = Credential::new("T1", 2_000_000_000, "R1");

        store.set(&credential).expect("write");
        let loaded = store.get().expect("read back");
        assert_eq!(loaded, credential);
    }

    #[test]
    fn should_create_missing_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSystemStore::new(dir.path().join("nested/deeper/tokencache.json"));

        store
            .set(&Credential::new("T1", 1, "R1"))
            .expect("parents created on first write");
        assert!(store.get().is_ok());
    }

    #[test]
    fn should_fail_with_not_valid_on_malformed_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tokencache.json");
        fs::write(&path, b"{\"accessToken\": 42}").expect("seed malformed file");

        let store = FileSystemStore::new(path);
        assert!(matches!(
            store.get().expect_err("malformed"),
            StoreError::NotValid { .. }
        ));
    }

    #[test]
    fn should_fail_with_not_stored_on_unwritable_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        // The parent "directory" is a regular file, so the write cannot complete.
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"").expect("seed blocker file");

        let store = FileSystemStore::new(blocker.join("tokencache.json"));
        assert!(matches!(
            store
                .set(&Credential::new("T1", 1, "R1"))
                .expect_err("unwritable"),
            StoreError::NotStored { .. }
        ));
    }

    #[test]
    fn should_write_the_persisted_token_format() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tokencache.json");
        let store = FileSystemStore::new(path.clone());

        store
            .set(&Credential::new("T1", 1_234, "R1"))
            .expect("write");
        let raw: serde_json::Value =
            serde_json::from_slice(&fs::read(&path).expect("read")).expect("valid json");
        assert_eq!(
            raw,
            serde_json::json!({"accessToken": "T1", "expires": 1234, "refreshToken": "R1"})
        );
    }
}
