use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Emitter used by replay when the caller names none.
    pub default_destination: String,
    /// Host bus event type that carries received IR signals.
    pub signal_event_type: String,
    pub default_list_limit: u32,
    /// Relative to the data directory.
    pub database_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_destination: "hassbeam".into(),
            signal_event_type: "esphome.hassbeam.ir_received".into(),
            default_list_limit: 10,
            database_file: "irbeam.sqlite3".into(),
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: Settings,
}

impl SettingsStore {
    /// Loads `settings.json` from `data_dir`, writing the defaults out when the file does
    /// not exist yet.
    pub fn open(data_dir: &Path) -> Result<Self> {
        Self::new(data_dir.join(SETTINGS_FILE))
    }

    pub fn new(path: PathBuf) -> Result<Self> {
        let store = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            let data = serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!(
                    "Ignoring unreadable settings in {}: {err}; using defaults",
                    path.display()
                );
                Settings::default()
            });
            Self { path, data }
        } else {
            let store = Self {
                path,
                data: Settings::default(),
            };
            store.persist()?;
            info!("Wrote default settings to {}", store.path.display());
            store
        };

        Ok(store)
    }

    pub fn settings(&self) -> Settings {
        self.data.clone()
    }

    /// Directory-relative database file resolved against `data_dir`.
    pub fn database_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.data.database_file)
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory {}", parent.display())
            })?;
        }
        let serialized = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::open(dir.path()).unwrap();
        assert_eq!(store.settings(), Settings::default());

        let written: Settings = serde_json::from_str(
            &fs::read_to_string(dir.path().join(SETTINGS_FILE)).unwrap(),
        )
        .unwrap();
        assert_eq!(written, Settings::default());
        assert_eq!(
            store.database_path(dir.path()),
            dir.path().join("irbeam.sqlite3")
        );
    }

    #[test]
    fn test_missing_data_dir_is_created() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("config").join("irbeam");
        SettingsStore::open(&nested).unwrap();
        assert!(nested.join(SETTINGS_FILE).exists());
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"default_destination": "bedroom_beam", "default_list_limit": 25}"#,
        )
        .unwrap();

        let settings = SettingsStore::open(dir.path()).unwrap().settings();
        assert_eq!(settings.default_destination, "bedroom_beam");
        assert_eq!(settings.default_list_limit, 25);
        assert_eq!(settings.signal_event_type, "esphome.hassbeam.ir_received");
    }

    #[test]
    fn test_unparsable_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "{not json").unwrap();

        let store = SettingsStore::open(dir.path()).unwrap();
        assert_eq!(store.settings(), Settings::default());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{not json");
    }
}
