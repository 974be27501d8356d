mod grid;
mod mover;
mod transform;

pub use grid::*;
pub use mover::*;
pub use transform::*;

use bevy::gizmos::config::{GizmoConfigGroup, GizmoConfigStore};
use bevy::prelude::*;

use crate::editor::EditorSet;

/// Gizmo group for everything the editor draws over the scene
#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct EditorGizmos;

pub struct EditorGizmosPlugin;

impl Plugin for EditorGizmosPlugin {
    fn build(&self, app: &mut App) {
        app.init_gizmo_group::<EditorGizmos>()
            .init_resource::<EditorGrid>()
            .init_resource::<ObjectMover>()
            .init_resource::<TransformGizmo>()
            .add_systems(Startup, configure_gizmos)
            .add_systems(Update, hide_editor_grid.in_set(EditorSet::Poll))
            .add_systems(Update, handle_gizmo_hotkeys.in_set(EditorSet::GizmoHotkeys))
            .add_systems(Update, drag_selection_with_gizmo.in_set(EditorSet::SelectionMovement))
            .add_systems(Update, refresh_transform_gizmo.in_set(EditorSet::GizmoRefresh))
            .add_systems(Update, (draw_editor_grid, draw_transform_gizmo).in_set(EditorSet::Draw));
    }
}

/// Editor lines stay on top of the geometry they annotate
fn configure_gizmos(mut config_store: ResMut<GizmoConfigStore>) {
    let (config, _) = config_store.config_mut::<EditorGizmos>();
    config.line.width = 3.0;
    config.depth_bias = -1.0;
}

/// The grid only shows on frames where a gesture places it
fn hide_editor_grid(mut grid: ResMut<EditorGrid>) {
    grid.hide();
}
