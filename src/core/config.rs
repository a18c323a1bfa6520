use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Which sound a trigger plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SoundKind {
    None,
    #[default]
    Beep,
    Chime,
    Custom,
}

/// Which parts of a channel are searched for the claim marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClaimScope {
    Name,
    Topic,
    #[default]
    Either,
}

/// Per-trigger sound configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SoundSettings {
    pub kind: SoundKind,
    /// Only used when `kind` is `Custom`
    pub custom_url: String,
    /// 0.0 - 1.0, clamped at playback
    pub volume: f32,
    /// Minimum time between two alerts of this trigger
    pub cooldown_ms: i64,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            kind: SoundKind::Beep,
            custom_url: String::new(),
            volume: 0.5,
            cooldown_ms: 1000,
        }
    }
}

impl SoundSettings {
    fn new_channel_default() -> Self {
        Self {
            kind: SoundKind::Chime,
            volume: 0.6,
            cooldown_ms: 1500,
            ..Self::default()
        }
    }
}

/// Live settings, read again on every event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub enabled: bool,
    /// Category whose children are watched; empty disables channel alerts
    pub watched_category_id: String,
    pub claim_marker: String,
    pub claim_scope: ClaimScope,
    /// Only channels under the watched category can be claimed
    pub scope_claim_to_category: bool,

    pub play_on_new_channel: bool,
    /// Also requires `play_on_new_channel`
    pub play_on_moved_into_category: bool,
    pub play_on_claimed_message: bool,

    pub new_channel_sound: SoundSettings,
    pub message_sound: SoundSettings,

    pub only_when_unfocused: bool,
    pub mute_when_viewing_channel: bool,
    pub ignore_bots: bool,
    pub ignore_self: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            watched_category_id: String::new(),
            claim_marker: "🧩".to_string(),
            claim_scope: ClaimScope::Either,
            scope_claim_to_category: true,
            play_on_new_channel: true,
            play_on_moved_into_category: true,
            play_on_claimed_message: true,
            new_channel_sound: SoundSettings::new_channel_default(),
            message_sound: SoundSettings::default(),
            only_when_unfocused: false,
            mute_when_viewing_channel: true,
            ignore_bots: true,
            ignore_self: true,
        }
    }
}

/// Read-only accessor for the current settings.
///
/// Implementations must return the live values; callers never cache them
/// across events so edits take effect on the next event.
pub trait SettingsSource {
    fn settings(&self) -> Settings;
}

impl SettingsSource for Settings {
    fn settings(&self) -> Settings {
        self.clone()
    }
}

impl SettingsSource for Mutex<Settings> {
    fn settings(&self) -> Settings {
        match self.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl<T: SettingsSource + ?Sized> SettingsSource for Arc<T> {
    fn settings(&self) -> Settings {
        (**self).settings()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub struct ConfigManager {
    config_path: PathBuf,
    last_modified: Option<SystemTime>,
}

impl ConfigManager {
    pub fn new(app_config_dir: impl AsRef<Path>) -> Self {
        Self {
            config_path: app_config_dir.as_ref().join("settings.json"),
            last_modified: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Load settings, falling back to defaults if the file is missing or broken.
    pub fn load(&mut self) -> Settings {
        if !self.config_path.exists() {
            return Settings::default();
        }
        match self.try_load() {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Using default settings: {}", e);
                Settings::default()
            }
        }
    }

    pub fn try_load(&mut self) -> Result<Settings, ConfigError> {
        let content = fs::read_to_string(&self.config_path).map_err(|source| ConfigError::Read {
            path: self.config_path.clone(),
            source,
        })?;
        self.last_modified = self.modified();
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: self.config_path.clone(),
            source,
        })
    }

    pub fn save(&mut self, settings: &Settings) -> Result<(), ConfigError> {
        // Ensure directory exists
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.config_path, content).map_err(|source| ConfigError::Write {
            path: self.config_path.clone(),
            source,
        })?;
        self.last_modified = self.modified();
        Ok(())
    }

    /// Returns freshly loaded settings if the file changed since the last
    /// load or save. Parse failures keep the previous settings in effect.
    pub fn reload_if_changed(&mut self) -> Option<Settings> {
        let modified = self.modified()?;
        if self.last_modified == Some(modified) {
            return None;
        }
        match self.try_load() {
            Ok(settings) => Some(settings),
            Err(e) => {
                log::warn!("Ignoring settings change: {}", e);
                None
            }
        }
    }

    fn modified(&self) -> Option<SystemTime> {
        fs::metadata(&self.config_path)
            .and_then(|m| m.modified())
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let mut manager = ConfigManager::new(dir.path());

        let default = manager.load();
        assert_eq!(default, Settings::default());

        let new_settings = Settings {
            watched_category_id: "C1".to_string(),
            only_when_unfocused: true,
            message_sound: SoundSettings {
                kind: SoundKind::Custom,
                custom_url: "https://example.com/ping.ogg".to_string(),
                volume: 0.25,
                cooldown_ms: 0,
            },
            ..Settings::default()
        };

        manager.save(&new_settings).unwrap();
        let loaded = manager.load();

        assert_eq!(loaded, new_settings);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("settings.json"),
            r#"{ "watchedCategoryId": "C9", "claimScope": "topic", "messageSound": { "kind": "chime" } }"#,
        )
        .unwrap();

        let settings = ConfigManager::new(dir.path()).load();
        assert_eq!(settings.watched_category_id, "C9");
        assert_eq!(settings.claim_scope, ClaimScope::Topic);
        assert_eq!(settings.message_sound.kind, SoundKind::Chime);
        assert_eq!(settings.message_sound.cooldown_ms, 1000);
        assert_eq!(settings.new_channel_sound.kind, SoundKind::Chime);
        assert_eq!(settings.claim_marker, "🧩");
        assert!(settings.ignore_bots);
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("settings.json"), "{ not json").unwrap();

        let mut manager = ConfigManager::new(dir.path());
        assert!(matches!(manager.try_load(), Err(ConfigError::Parse { .. })));
        assert_eq!(manager.load(), Settings::default());
    }

    #[test]
    fn test_reload_only_after_change() {
        let dir = tempdir().unwrap();
        let mut manager = ConfigManager::new(dir.path());
        assert!(manager.reload_if_changed().is_none(), "no file yet");

        manager.save(&Settings::default()).unwrap();
        assert!(manager.reload_if_changed().is_none(), "own save is not a change");

        // Force a different mtime rather than relying on filesystem resolution
        let path = manager.path().to_path_buf();
        let edited = Settings {
            enabled: false,
            ..Settings::default()
        };
        fs::write(&path, serde_json::to_string(&edited).unwrap()).unwrap();
        let file = fs::OpenOptions::new().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH).unwrap();

        let reloaded = manager.reload_if_changed().expect("change detected");
        assert!(!reloaded.enabled);
        assert!(manager.reload_if_changed().is_none());
    }

    #[test]
    fn test_mutex_source_reads_live_value() {
        let shared = Arc::new(Mutex::new(Settings::default()));
        let source: Arc<Mutex<Settings>> = Arc::clone(&shared);
        assert!(source.settings().enabled);

        shared.lock().unwrap().enabled = false;
        assert!(!source.settings().enabled);
    }
}
