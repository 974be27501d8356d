use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use super::{CameraSpeeds, EditorCameraController};
use crate::gizmos::{EditorGrid, GridSettings};

/// Editor settings that persist to disk
#[derive(Resource, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EditorSettings {
    /// Grid used until the host sends its own
    #[serde(default)]
    pub grid: GridSettings,
    #[serde(default)]
    pub camera: CameraSpeeds,
    /// Whether the plain wheel zooms. Unset picks the platform default
    /// (zoom everywhere but macOS, where trackpads scroll).
    #[serde(default)]
    pub wheel_zooms_by_default: Option<bool>,
    /// Size of the game screen, framed by the initial camera position
    #[serde(default = "default_game_resolution")]
    pub game_resolution: Vec2,
}

fn default_game_resolution() -> Vec2 {
    Vec2::new(1280.0, 720.0)
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            grid: GridSettings::default(),
            camera: CameraSpeeds::default(),
            wheel_zooms_by_default: None,
            game_resolution: default_game_resolution(),
        }
    }
}

impl EditorSettings {
    /// Get the settings file path
    fn file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("bevy_ingame_editor");
            p.push("settings.ron");
            p
        })
    }

    /// Parse settings, falling back to defaults when malformed
    pub fn from_ron(content: &str) -> Self {
        match ron::from_str(content) {
            Ok(settings) => settings,
            Err(e) => {
                error!("Failed to parse editor settings: {}", e);
                Self::default()
            }
        }
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::file_path() else {
            return Self::default();
        };

        match fs::read_to_string(&path) {
            Ok(content) => Self::from_ron(&content),
            Err(_) => Self::default(),
        }
    }

    /// Save settings to disk
    pub fn save(&self) {
        let Some(path) = Self::file_path() else {
            error!("Could not determine config directory");
            return;
        };

        if let Some(parent) = path.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            error!("Failed to create config directory: {}", e);
            return;
        }

        match ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            Ok(content) => {
                if let Err(e) = fs::write(&path, content) {
                    error!("Failed to save editor settings: {}", e);
                } else {
                    info!("Editor settings saved to: {:?}", path);
                }
            }
            Err(e) => {
                error!("Failed to serialize editor settings: {}", e);
            }
        }
    }
}

/// Push the loaded settings into the editor resources
pub(crate) fn apply_editor_settings(
    settings: Res<EditorSettings>,
    mut grid: ResMut<EditorGrid>,
    mut camera: ResMut<EditorCameraController>,
) {
    grid.settings = settings.grid.clone();
    camera.speeds = settings.camera;
    if let Some(wheel_zooms) = settings.wheel_zooms_by_default {
        camera.wheel_zooms_by_default = wheel_zooms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let settings = EditorSettings::from_ron("(game_resolution: (800.0, 600.0))");
        assert_eq!(settings.game_resolution, Vec2::new(800.0, 600.0));
        assert_eq!(settings.grid, GridSettings::default());
        assert_eq!(settings.camera, CameraSpeeds::default());
        assert_eq!(settings.wheel_zooms_by_default, None);
    }

    #[test]
    fn malformed_settings_fall_back_to_defaults() {
        assert_eq!(EditorSettings::from_ron("(grid: 12"), EditorSettings::default());
    }

    #[test]
    fn settings_round_trip() {
        let mut settings = EditorSettings::default();
        settings.grid.cell_size = Vec3::new(16.0, 16.0, 8.0);
        settings.grid.snap_by_default = true;
        settings.wheel_zooms_by_default = Some(false);
        let text = ron::ser::to_string_pretty(&settings, ron::ser::PrettyConfig::default()).expect("serializes");
        assert_eq!(EditorSettings::from_ron(&text), settings);
    }

    #[test]
    fn applied_settings_reach_grid_and_camera() {
        let mut world = World::new();
        let mut settings = EditorSettings::default();
        settings.grid.cell_size = Vec3::splat(5.0);
        settings.camera.move_speed = 2.0;
        settings.wheel_zooms_by_default = Some(false);
        world.insert_resource(settings);
        world.init_resource::<EditorGrid>();
        world.init_resource::<EditorCameraController>();
        world.run_system_cached(apply_editor_settings).expect("runs");

        assert_eq!(world.resource::<EditorGrid>().settings.cell_size, Vec3::splat(5.0));
        let camera = world.resource::<EditorCameraController>();
        assert_eq!(camera.speeds.move_speed, 2.0);
        assert!(!camera.wheel_zooms_by_default);
    }
}
