//! Transient key-value storage for handing form input to the results runner.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{GeneratorError, Result};
use crate::types::FormInput;

/// Key the form record is stored under.
pub const FORM_DATA_KEY: &str = "formData";

/// Storage abstraction for the transient form record.
pub trait FormStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn delete(&self, key: &str) -> Result<()>;
}

/// In-process store, mainly for tests and for single-process front ends.
#[derive(Debug, Default)]
pub struct MemoryFormStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryFormStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FormStore for MemoryFormStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| GeneratorError::Storage("form store lock poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .map_err(|_| GeneratorError::Storage("form store lock poisoned".into()))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.entries
            .write()
            .map_err(|_| GeneratorError::Storage("form store lock poisoned".into()))?
            .remove(key);
        Ok(())
    }
}

/// File-backed store: one JSON file per key under a base directory.
///
/// # Example
/// ```no_run
/// use pitchcraft::storage::{FileFormStore, FormStore};
///
/// let store = FileFormStore::new_default();
/// store.set("formData", r#"{"title":"Mug"}"#)?;
/// # Ok::<(), pitchcraft::error::GeneratorError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileFormStore {
    base_dir: PathBuf,
}

impl FileFormStore {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn new_default() -> Self {
        Self {
            base_dir: default_store_dir(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", normalize_key(key)))
    }
}

impl FormStore for FileFormStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.entry_path(key)) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(GeneratorError::Storage(err.to_string())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.entry_path(key);
        fs::create_dir_all(&self.base_dir)?;
        fs::write(&path, value)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(GeneratorError::Storage(err.to_string())),
        }
    }
}

fn default_store_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".pitchcraft"))
        .unwrap_or_else(|| PathBuf::from(".pitchcraft"))
}

fn normalize_key(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "default".to_string();
    }
    trimmed
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '-'
            }
        })
        .collect()
}

/// Validate and store form input for the results runner.
pub fn submit_form(store: &dyn FormStore, input: &FormInput) -> Result<()> {
    input.validate()?;
    store.set(FORM_DATA_KEY, &serde_json::to_string(input)?)?;
    debug!(title = %input.title, has_image = input.image().is_some(), "form input stored");
    Ok(())
}

/// Read the stored form input and schedule its removal after `cleanup_delay`.
///
/// Removal is fire-and-forget so the caller can finish consuming the record
/// first. Outside a Tokio runtime the record is removed immediately.
pub fn take_form_input(store: Arc<dyn FormStore>, cleanup_delay: Duration) -> Result<FormInput> {
    let raw = store
        .get(FORM_DATA_KEY)?
        .ok_or_else(|| GeneratorError::MissingInput(FORM_DATA_KEY.to_string()))?;

    schedule_cleanup(store, cleanup_delay);

    let input: FormInput = serde_json::from_str(&raw)?;
    input.validate()?;
    Ok(input)
}

fn schedule_cleanup(store: Arc<dyn FormStore>, delay: Duration) {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                tokio::time::sleep(delay).await;
                if let Err(e) = store.delete(FORM_DATA_KEY) {
                    warn!(error = %e, "failed to remove stored form input");
                }
            });
        }
        Err(_) => {
            if let Err(e) = store.delete(FORM_DATA_KEY) {
                warn!(error = %e, "failed to remove stored form input");
            }
        }
    }
}
