//! Player preferences
//!
//! Persisted separately from progress under their own storage key.

use serde::{Deserialize, Serialize};

use crate::platform::storage::{self, KeyValueStore, StorageError};

/// Camera placement relative to the runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CameraMode {
    /// Behind and above the player
    #[default]
    ThirdPerson,
    /// At the player's nose
    FirstPerson,
}

impl CameraMode {
    pub fn toggled(&self) -> Self {
        match self {
            CameraMode::ThirdPerson => CameraMode::FirstPerson,
            CameraMode::FirstPerson => CameraMode::ThirdPerson,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CameraMode::ThirdPerson => "Third person",
            CameraMode::FirstPerson => "First person",
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub camera: CameraMode,
    /// Show FPS counter
    pub show_fps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            camera: CameraMode::ThirdPerson,
            show_fps: false,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "spaceRunnerSettings";

    pub fn toggle_camera(&mut self) -> CameraMode {
        self.camera = self.camera.toggled();
        self.camera
    }

    pub fn toggle_show_fps(&mut self) -> bool {
        self.show_fps = !self.show_fps;
        self.show_fps
    }

    pub fn load(store: &impl KeyValueStore) -> Self {
        let settings: Self = storage::load_json_or_default(store, Self::STORAGE_KEY);
        log::info!("Camera mode: {}", settings.camera.as_str());
        settings
    }

    pub fn save(&self, store: &mut impl KeyValueStore) -> Result<(), StorageError> {
        storage::save_json(store, Self::STORAGE_KEY, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    #[test]
    fn test_camera_toggle() {
        let mut settings = Settings::default();
        assert_eq!(settings.toggle_camera(), CameraMode::FirstPerson);
        assert_eq!(settings.toggle_camera(), CameraMode::ThirdPerson);
    }

    #[test]
    fn test_fps_toggle() {
        let mut settings = Settings::default();
        assert!(settings.toggle_show_fps());
        assert!(!settings.toggle_show_fps());
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let mut store = MemoryStore::new();
        store
            .set(Settings::STORAGE_KEY, r#"{"camera":"FirstPerson"}"#)
            .unwrap();
        let settings = Settings::load(&store);
        assert_eq!(settings.camera, CameraMode::FirstPerson);
        assert!(!settings.show_fps);

        settings.save(&mut store).unwrap();
        assert_eq!(Settings::load(&store), settings);
    }
}
