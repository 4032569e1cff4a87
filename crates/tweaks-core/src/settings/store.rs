use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::TweakSettings;
use crate::error::{Error, Result};

/// Per-type settings files under one directory.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    dir: PathBuf,
}

impl SettingsStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path to the file that holds the records of type `S`
    pub fn path_for<S: TweakSettings>(&self) -> PathBuf {
        self.path_for_name(S::NAME)
    }

    pub fn path_for_name(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }

    /// Load a record. A missing file yields the default record; an
    /// unreadable or corrupt file is an error.
    pub fn load<S: TweakSettings>(&self) -> Result<S> {
        let path = self.path_for::<S>();
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                let err = Error::from(e);
                if err.is_not_found() {
                    debug!("No settings file at {}, using defaults", path.display());
                    return Ok(S::default());
                }
                return Err(err);
            }
        };
        let settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    pub fn save<S: TweakSettings>(&self, settings: &S) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(self.path_for::<S>(), content)?;
        Ok(())
    }
}
