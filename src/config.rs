//! The JSON configuration document shared by every plugin.
//!
//! Each plugin owns one top-level key (`goto`, `run`, `git`, `displayName`, ...).
//! Nothing enforces a schema beyond what each section type declares, and there is
//! no locking: two concurrent writers race and the last one wins.

use crate::error::ConfigError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CONFIG_FILE: &str = "config.json";

/// Reads and writes the configuration document at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The store for an installation root.
    pub fn in_root(root: &Path) -> Self {
        Self::new(root.join(CONFIG_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the whole document. A missing file reads as an empty object.
    pub fn get(&self) -> Result<Value, ConfigError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no config file yet");
                return Ok(Value::Object(Map::new()));
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if content.trim().is_empty() {
            return Ok(Value::Object(Map::new()));
        }
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Replace the whole document.
    pub fn save(&self, document: &Value) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let mut text = serde_json::to_string_pretty(document).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })?;
        text.push('\n');
        fs::write(&self.path, text).map_err(write_err)?;
        info!(path = %self.path.display(), "config saved");
        Ok(())
    }

    /// Read one top-level key as a typed section. An absent key gives `T::default()`.
    pub fn section<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, ConfigError> {
        let document = self.get()?;
        match document.get(key) {
            None | Some(Value::Null) => Ok(T::default()),
            Some(value) => serde_json::from_value(value.clone()).map_err(|source| {
                ConfigError::Section {
                    key: key.to_string(),
                    source,
                }
            }),
        }
    }

    /// Read-modify-write one top-level key, keeping every other key as it was.
    pub fn save_section<T: Serialize>(&self, key: &str, section: &T) -> Result<(), ConfigError> {
        let mut document = self.get()?;
        let value = serde_json::to_value(section).map_err(|source| ConfigError::Section {
            key: key.to_string(),
            source,
        })?;
        match document.as_object_mut() {
            Some(object) => {
                object.insert(key.to_string(), value);
            }
            None => {
                return Err(ConfigError::NotAnObject {
                    path: self.path.clone(),
                });
            }
        }
        self.save(&document)
    }
}

/// Merge a template into an existing document.
///
/// Values already present in `existing` win; keys only found in `template` are
/// added. Nested objects are merged the same way.
pub fn merge(existing: Value, template: Value) -> Value {
    match (existing, template) {
        (Value::Object(mut ours), Value::Object(theirs)) => {
            for (key, default) in theirs {
                let merged = match ours.remove(&key) {
                    Some(current) => merge(current, default),
                    None => default,
                };
                ours.insert(key, merged);
            }
            Value::Object(ours)
        }
        (existing, _) => existing,
    }
}
