use avian3d::prelude::PhysicsPlugins;
use bevy::prelude::*;
use bevy_egui::EguiPlugin;

use super::camera::{notify_camera_changes, spawn_editor_camera, step_editor_camera};
use super::drag::drag_selected_entities;
use super::focus::{track_ui_focus, track_window_focus};
use super::inner_area::{draw_inner_area, refresh_inner_area};
use super::input::poll_editor_input;
use super::insert::drag_new_instance;
use super::requests::{
    handle_camera_requests, handle_editor_requests, handle_instance_requests, move_selection_under_cursor,
    switch_scene,
};
use super::settings::apply_editor_settings;
use super::shortcuts::forward_shortcuts;
use super::{
    EditorCameraController, EditorInput, EditorRequest, EditorSettings, EditorState, EntityDrag, InnerAreaOutline,
    InputFocusTracker, NewInstanceDrag, ObjectCatalog, editor_active,
};
use crate::commands::CommandsPlugin;
use crate::gizmos::EditorGizmosPlugin;
use crate::picking::{CursorHover, update_cursor_hover};
use crate::scene::{ScenePlugin, rebuild_render_graph};
use crate::selection::SelectionPlugin;

/// Steps of one editor frame, run in this order in `Update`
#[derive(SystemSet, Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum EditorSet {
    /// Host requests. Runs even while the editor is paused so it can be resumed.
    Requests,
    /// Rebuild the pickable render graph
    Prepare,
    /// Sample input, focus and hover
    Poll,
    GizmoHotkeys,
    Camera,
    /// Ctrl-drag and drag-new-instance
    EntityDrag,
    SelectionMovement,
    SelectionRectangle,
    ClickSelection,
    Outline,
    InnerArea,
    Shortcuts,
    /// Re-attach the gizmo, skipped on the first frame after a scene switch
    GizmoRefresh,
    Notify,
    Draw,
}

/// Options for embedding the editor in a game
#[derive(Resource, Clone, Debug)]
pub struct EditorPluginConfig {
    /// Settings to use instead of the ones saved on disk
    pub settings: Option<EditorSettings>,
    /// Spawn an ambient light for scenes that have none
    pub spawn_lighting: bool,
    /// Save settings changed by the host
    pub persist_settings: bool,
    /// Add avian3d's physics plugins. Disable when the game adds them itself.
    pub add_physics: bool,
}

impl Default for EditorPluginConfig {
    fn default() -> Self {
        Self {
            settings: None,
            spawn_lighting: true,
            persist_settings: true,
            add_physics: true,
        }
    }
}

/// Main editor plugin that bundles all editor functionality
#[derive(Default)]
pub struct EditorPlugin {
    pub config: EditorPluginConfig,
}

impl Plugin for EditorPlugin {
    fn build(&self, app: &mut App) {
        let settings = self.config.settings.clone().unwrap_or_else(EditorSettings::load);

        if !app.is_plugin_added::<EguiPlugin>() {
            app.add_plugins(EguiPlugin::default());
        }
        if self.config.add_physics {
            app.add_plugins(PhysicsPlugins::default());
        }

        app.configure_sets(
            Update,
            (
                EditorSet::Requests,
                EditorSet::Prepare,
                EditorSet::Poll,
                EditorSet::GizmoHotkeys,
                EditorSet::Camera,
                EditorSet::EntityDrag,
                EditorSet::SelectionMovement,
                EditorSet::SelectionRectangle,
                EditorSet::ClickSelection,
                EditorSet::Outline,
                EditorSet::InnerArea,
                EditorSet::Shortcuts,
                EditorSet::GizmoRefresh,
                EditorSet::Notify,
                EditorSet::Draw,
            )
                .chain(),
        )
        .configure_sets(
            Update,
            (
                EditorSet::Prepare,
                EditorSet::Poll,
                EditorSet::GizmoHotkeys,
                EditorSet::Camera,
                EditorSet::EntityDrag,
                EditorSet::SelectionMovement,
                EditorSet::SelectionRectangle,
                EditorSet::ClickSelection,
                EditorSet::Outline,
                EditorSet::InnerArea,
                EditorSet::Shortcuts,
                EditorSet::GizmoRefresh,
                EditorSet::Notify,
                EditorSet::Draw,
            )
                .distributive_run_if(editor_active),
        );

        app.insert_resource(self.config.clone())
            .insert_resource(settings)
            .add_message::<EditorRequest>()
            .init_resource::<EditorState>()
            .init_resource::<EditorInput>()
            .init_resource::<InputFocusTracker>()
            .init_resource::<EditorCameraController>()
            .init_resource::<CursorHover>()
            .init_resource::<EntityDrag>()
            .init_resource::<NewInstanceDrag>()
            .init_resource::<ObjectCatalog>()
            .init_resource::<InnerAreaOutline>()
            .add_plugins((ScenePlugin, SelectionPlugin, EditorGizmosPlugin, CommandsPlugin))
            .add_systems(Startup, (apply_editor_settings, spawn_editor_camera).chain())
            .add_systems(
                Update,
                (
                    switch_scene,
                    handle_instance_requests,
                    move_selection_under_cursor,
                    handle_camera_requests,
                    handle_editor_requests,
                )
                    .chain()
                    .in_set(EditorSet::Requests),
            )
            .add_systems(Update, rebuild_render_graph.in_set(EditorSet::Prepare))
            .add_systems(
                Update,
                (
                    (track_window_focus, track_ui_focus).run_if(resource_exists::<InputFocusTracker>),
                    poll_editor_input,
                    update_cursor_hover,
                )
                    .chain()
                    .in_set(EditorSet::Poll),
            )
            .add_systems(Update, step_editor_camera.in_set(EditorSet::Camera))
            .add_systems(Update, (drag_selected_entities, drag_new_instance).chain().in_set(EditorSet::EntityDrag))
            .add_systems(Update, refresh_inner_area.in_set(EditorSet::InnerArea))
            .add_systems(Update, forward_shortcuts.in_set(EditorSet::Shortcuts))
            .add_systems(Update, notify_camera_changes.in_set(EditorSet::Notify))
            .add_systems(Update, draw_inner_area.in_set(EditorSet::Draw));

        if self.config.spawn_lighting {
            app.add_systems(Startup, setup_editor_lighting);
        }
    }
}

/// Setup initial editor scene with lighting
fn setup_editor_lighting(mut commands: Commands) {
    commands.spawn(AmbientLight {
        color: Color::WHITE,
        brightness: 300.0,
        affects_lightmapped_meshes: true,
    });
}
