use crate::error::AnnotatorError;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Small persistent string store with per-entry expiry.
pub trait CookieJar: Send {
    /// All live entries, as `(key, value)` pairs.
    fn entries(&self) -> Result<Vec<(String, String)>, AnnotatorError>;

    /// Store `value` under `key` for `max_age`.
    fn set(&mut self, key: &str, value: &str, max_age: Duration) -> Result<(), AnnotatorError>;
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
struct JarEntry {
    value: String,
    expires_at: Option<DateTime<Utc>>, // None never expires
}

impl JarEntry {
    fn expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct JarFile {
    #[serde(default)]
    entries: BTreeMap<String, JarEntry>,
}

/// Cookie jar kept in a single JSON file.
///
/// The file is read once on open and rewritten as a whole on every `set`.
#[derive(Debug)]
pub struct FileJar {
    path: PathBuf,
    jar: JarFile,
}

impl FileJar {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AnnotatorError> {
        let path = path.into();
        let data = match std::fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Cookie jar {} does not exist yet", path.display());
                return Ok(Self {
                    path,
                    jar: JarFile::default(),
                });
            }
            Err(e) => {
                return Err(AnnotatorError::StorageError(format!(
                    "Failed to read cookie jar {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let mut jar: JarFile = match serde_json::from_slice(&data) {
            Ok(jar) => jar,
            Err(e) => {
                warn!(
                    "Discarding corrupt cookie jar {}: {}",
                    path.display(),
                    e
                );
                JarFile::default()
            }
        };

        let now = Utc::now();
        jar.entries.retain(|key, entry| {
            let keep = !entry.expired(now);
            if !keep {
                debug!("Dropping expired cookie {}", key);
            }
            keep
        });

        Ok(Self { path, jar })
    }

    fn write(&self) -> Result<(), AnnotatorError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    error!("Failed to create directory {}: {}", parent.display(), e);
                    AnnotatorError::StorageError(format!("Failed to create directory: {}", e))
                })?;
            }
        }

        let json = serde_json::to_string_pretty(&self.jar)
            .map_err(|e| AnnotatorError::StorageError(format!("Serialize cookie jar: {}", e)))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, json).map_err(|e| {
            error!("Failed to write file {}: {}", tmp.display(), e);
            AnnotatorError::StorageError(format!("Failed to write file: {}", e))
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            error!("Failed to replace file {}: {}", self.path.display(), e);
            AnnotatorError::StorageError(format!("Failed to replace file: {}", e))
        })?;

        debug!("Successfully wrote cookie jar: {}", self.path.display());
        Ok(())
    }
}

impl CookieJar for FileJar {
    fn entries(&self) -> Result<Vec<(String, String)>, AnnotatorError> {
        let now = Utc::now();
        Ok(self
            .jar
            .entries
            .iter()
            .filter(|(_, entry)| !entry.expired(now))
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect())
    }

    fn set(&mut self, key: &str, value: &str, max_age: Duration) -> Result<(), AnnotatorError> {
        let max_age = chrono::Duration::from_std(max_age)
            .map_err(|e| AnnotatorError::StorageError(format!("max age out of range: {}", e)))?;
        let entry = JarEntry {
            value: value.to_string(),
            expires_at: Utc::now().checked_add_signed(max_age),
        };
        self.jar.entries.insert(key.to_string(), entry);
        self.write()
    }
}

/// In-memory cookie jar; clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryJar {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.entries.lock().insert(key.to_string(), value.to_string());
    }
}

impl CookieJar for MemoryJar {
    fn entries(&self) -> Result<Vec<(String, String)>, AnnotatorError> {
        let entries = self.entries.lock();
        Ok(entries
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }

    fn set(&mut self, key: &str, value: &str, _max_age: Duration) -> Result<(), AnnotatorError> {
        self.insert(key, value);
        Ok(())
    }
}
