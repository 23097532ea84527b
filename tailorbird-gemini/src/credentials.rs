//! Where the Gemini API key lives. Current deployments keep it in a
//! JSON credentials file; releases before 0.4 wrote a bare key file,
//! which `migrate_legacy_credential` moves forward exactly once.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use tailorbird_core::TailorbirdError;

const CREDENTIALS_FILE: &str = "credentials.json";
const LEGACY_KEY_FILE: &str = "gemini_api_key";

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct CredentialsFile {
    gemini_api_key: String,
}

#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load(&self) -> Result<Option<SecretString>, TailorbirdError>;
    async fn store(&self, key: SecretString) -> Result<(), TailorbirdError>;
    async fn load_legacy(&self) -> Result<Option<SecretString>, TailorbirdError>;
    async fn clear_legacy(&self) -> Result<(), TailorbirdError>;
}

/// Moves a pre-0.4 bare key file into the current credentials file.
/// The legacy file is removed afterwards even when a current credential
/// already exists, so the old plaintext copy does not linger. Returns
/// whether a key was moved.
pub async fn migrate_legacy_credential(
    store: &dyn CredentialStore,
) -> Result<bool, TailorbirdError> {
    let Some(legacy) = store.load_legacy().await? else {
        return Ok(false);
    };

    let migrated = if store.load().await?.is_none() {
        store.store(legacy).await?;
        true
    } else {
        false
    };

    store.clear_legacy().await?;
    Ok(migrated)
}

#[derive(Clone, Debug)]
pub struct FileCredentialStore {
    current_path: PathBuf,
    legacy_path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            current_path: dir.join(CREDENTIALS_FILE),
            legacy_path: dir.join(LEGACY_KEY_FILE),
        }
    }

    pub fn with_paths(current_path: impl Into<PathBuf>, legacy_path: impl Into<PathBuf>) -> Self {
        Self {
            current_path: current_path.into(),
            legacy_path: legacy_path.into(),
        }
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, TailorbirdError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(TailorbirdError::InvalidConfig(format!(
            "failed to read {}: {}",
            path.display(),
            err
        ))),
    }
}

#[async_trait::async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Option<SecretString>, TailorbirdError> {
        let Some(content) = read_optional(&self.current_path)? else {
            return Ok(None);
        };
        let parsed: CredentialsFile = serde_json::from_str(&content)?;
        if parsed.gemini_api_key.is_empty() {
            return Ok(None);
        }
        Ok(Some(SecretString::new(parsed.gemini_api_key)))
    }

    async fn store(&self, key: SecretString) -> Result<(), TailorbirdError> {
        if let Some(parent) = self.current_path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| {
                TailorbirdError::InvalidConfig(format!(
                    "failed to create {}: {}",
                    parent.display(),
                    err
                ))
            })?;
        }
        let content = serde_json::to_string_pretty(&CredentialsFile {
            gemini_api_key: key.expose_secret().clone(),
        })?;
        std::fs::write(&self.current_path, content).map_err(|err| {
            TailorbirdError::InvalidConfig(format!(
                "failed to write {}: {}",
                self.current_path.display(),
                err
            ))
        })
    }

    async fn load_legacy(&self) -> Result<Option<SecretString>, TailorbirdError> {
        let Some(content) = read_optional(&self.legacy_path)? else {
            return Ok(None);
        };
        let key = content.trim();
        if key.is_empty() {
            return Ok(None);
        }
        Ok(Some(SecretString::new(key.to_string())))
    }

    async fn clear_legacy(&self) -> Result<(), TailorbirdError> {
        match std::fs::remove_file(&self.legacy_path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(TailorbirdError::InvalidConfig(format!(
                "failed to remove {}: {}",
                self.legacy_path.display(),
                err
            ))),
        }
    }
}

/// In-memory store for tests and embedded use.
#[derive(Default)]
pub struct MemoryCredentialStore {
    current: Mutex<Option<SecretString>>,
    legacy: Mutex<Option<SecretString>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_current(self, key: SecretString) -> Self {
        *self.current.lock().expect("credential lock poisoned") = Some(key);
        self
    }

    pub fn with_legacy(self, key: SecretString) -> Self {
        *self.legacy.lock().expect("credential lock poisoned") = Some(key);
        self
    }
}

#[async_trait::async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Result<Option<SecretString>, TailorbirdError> {
        Ok(self.current.lock().expect("credential lock poisoned").clone())
    }

    async fn store(&self, key: SecretString) -> Result<(), TailorbirdError> {
        *self.current.lock().expect("credential lock poisoned") = Some(key);
        Ok(())
    }

    async fn load_legacy(&self) -> Result<Option<SecretString>, TailorbirdError> {
        Ok(self.legacy.lock().expect("credential lock poisoned").clone())
    }

    async fn clear_legacy(&self) -> Result<(), TailorbirdError> {
        *self.legacy.lock().expect("credential lock poisoned") = None;
        Ok(())
    }
}
