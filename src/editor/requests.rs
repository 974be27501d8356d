//! Inbound requests from the host editor.
//!
//! Requests are plain messages. Each handler below reads the ones it owns and
//! is a no-op when nothing is being edited.

use bevy::ecs::system::SystemParam;
use bevy::platform::collections::HashMap;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{
    EditorCamera, EditorCameraController, EditorCameraState, EditorInput, EditorPluginConfig, EditorSettings,
    EditorState, EntityDrag, InputFocusTracker, NewInstanceDrag,
};
use crate::commands::{PendingChanges, move_instances, offset_under_cursor, spawn_instance};
use crate::constants::margins;
use crate::gizmos::{BeingEdited, EditorGrid, GridSettings, TransformGizmo, end_editing};
use crate::picking::ScenePicker;
use crate::scene::{
    DefaultSize, EditedContainer, InstanceFlags, InstanceLayer, InstanceRecord, InstanceRecords, Object3d,
    PersistentId, Placement, SceneEntity, SceneLayer, SceneLayers, ZOrder,
};
use crate::selection::{Aabb3, Selection, SelectionOutlines, SelectionRectangle};

/// Screen fraction framed when a scene is opened without a saved camera
pub const INITIAL_VISIBLE_AREA: Rect = Rect {
    min: Vec2::splat(0.15),
    max: Vec2::splat(0.85),
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoomTarget {
    Content,
    Selection,
    InitialPosition,
}

/// Requests the host editor sends to the running game
#[derive(Message, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EditorRequest {
    /// Replace everything being edited
    SwitchScene {
        container: EditedContainer,
        layers: Vec<SceneLayer>,
        instances: Vec<InstanceRecord>,
        #[serde(default)]
        inner_area: Option<Aabb3>,
        #[serde(default)]
        grid: Option<GridSettings>,
        /// Camera saved the last time this container was edited
        #[serde(default)]
        camera_state: Option<EditorCameraState>,
    },
    /// Records changed on the host side; move the live instances to match
    ReloadInstances(Vec<InstanceRecord>),
    AddInstances(Vec<InstanceRecord>),
    DeleteSelection,
    /// Select instances by persistent uuid, in this order
    SetSelection(Vec<String>),
    ZoomToFit {
        target: ZoomTarget,
        /// Part of the viewport not covered by host panels, as fractions
        visible_area: Rect,
    },
    ZoomBy(f32),
    SetZoom(f32),
    RestoreCameraState(EditorCameraState),
    MoveSelectionUnderCursor,
    DragNewInstance {
        object_name: String,
        dropped: bool,
        is_alt_pressed: bool,
    },
    CancelDragNewInstance,
    SetInnerArea(Option<Aabb3>),
    SetSelectedLayer(String),
    /// Layer visibility or locks changed
    SetLayers(Vec<SceneLayer>),
    SetGridSettings(GridSettings),
    SetEditorActive(bool),
}

/// Area framed by the initial camera: the inner area, or the game screen
pub fn initial_area(inner_area: Option<Aabb3>, game_resolution: Vec2) -> Aabb3 {
    inner_area.unwrap_or(Aabb3::new(Vec3::ZERO, game_resolution.extend(0.0)))
}

/// Gesture state that must not survive a scene switch or deactivation
#[derive(SystemParam)]
pub struct TransientEditorState<'w, 's> {
    outlines: ResMut<'w, SelectionOutlines>,
    gizmo: ResMut<'w, TransformGizmo>,
    entity_drag: ResMut<'w, EntityDrag>,
    new_instance: ResMut<'w, NewInstanceDrag>,
    rectangle: ResMut<'w, SelectionRectangle>,
    grid: ResMut<'w, EditorGrid>,
    being_edited: Query<'w, 's, Entity, With<BeingEdited>>,
}

impl TransientEditorState<'_, '_> {
    pub fn reset(&mut self, commands: &mut Commands) {
        self.outlines.clear();
        self.gizmo.reset();
        self.entity_drag.cancel();
        self.new_instance.discard(commands);
        self.rectangle.cancel();
        self.grid.hide();
        end_editing(commands, &self.being_edited);
    }
}

/// What is edited: the container, its layers and its records
#[derive(SystemParam)]
pub struct EditedScene<'w> {
    container: ResMut<'w, EditedContainer>,
    layers: ResMut<'w, SceneLayers>,
    records: ResMut<'w, InstanceRecords>,
    state: ResMut<'w, EditorState>,
}

/// Viewport size for camera framing, before the first input sample too
fn framing_viewport(input: &EditorInput, settings: &EditorSettings) -> Vec2 {
    if input.viewport.cmpgt(Vec2::ZERO).all() {
        input.viewport
    } else {
        settings.game_resolution
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn switch_scene(
    mut commands: Commands,
    mut requests: MessageReader<EditorRequest>,
    live: Query<Entity, With<SceneEntity>>,
    ids: Query<&PersistentId>,
    mut transient: TransientEditorState,
    mut edited: EditedScene,
    mut selection: ResMut<Selection>,
    mut camera: ResMut<EditorCameraController>,
    mut pending: ResMut<PendingChanges>,
    input: Res<EditorInput>,
    settings: Res<EditorSettings>,
) {
    for request in requests.read() {
        let EditorRequest::SwitchScene {
            container,
            layers,
            instances,
            inner_area,
            grid,
            camera_state,
        } = request
        else {
            continue;
        };

        let kept_selection: Vec<String> = selection
            .entities()
            .iter()
            .filter_map(|entity| ids.get(*entity).ok())
            .map(|id| id.0.clone())
            .collect();

        transient.reset(&mut commands);
        for entity in &live {
            commands.entity(entity).despawn();
        }
        let spawned: HashMap<&str, Entity> = instances
            .iter()
            .map(|record| (record.persistent_uuid.as_str(), spawn_instance(&mut commands, record)))
            .collect();

        *edited.container = container.clone();
        *edited.layers = if layers.is_empty() {
            SceneLayers::default()
        } else {
            SceneLayers { layers: layers.clone() }
        };
        edited.records.replace_all(instances.iter().cloned());
        edited.state.inner_area = *inner_area;
        edited.state.selected_layer.clear();
        edited.state.first_frame = true;
        if let Some(grid) = grid {
            transient.grid.settings = grid.clone();
        }

        selection.clear();
        selection.add_all(kept_selection.iter().filter_map(|uuid| spawned.get(uuid.as_str()).copied()));
        pending.answer_default_size();

        match camera_state {
            Some(state) => camera.restore(state),
            None => camera.zoom_to_fit_area(
                &initial_area(*inner_area, settings.game_resolution),
                INITIAL_VISIBLE_AREA,
                framing_viewport(&input, &settings),
                margins::INITIAL_POSITION,
            ),
        }
        info!(
            "Editing {:?}: {} instances, {} kept selected",
            container.name().unwrap_or_default(),
            instances.len(),
            selection.len()
        );
    }
}

type LiveInstances<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static PersistentId,
        &'static mut Placement,
        &'static DefaultSize,
        &'static mut InstanceLayer,
        &'static mut ZOrder,
    ),
>;

#[allow(clippy::too_many_arguments)]
pub(crate) fn handle_instance_requests(
    mut commands: Commands,
    mut requests: MessageReader<EditorRequest>,
    container: Res<EditedContainer>,
    mut records: ResMut<InstanceRecords>,
    mut instances: LiveInstances,
    mut selection: ResMut<Selection>,
    mut pending: ResMut<PendingChanges>,
    mut gizmo: ResMut<TransformGizmo>,
) {
    for request in requests.read() {
        let handled = matches!(
            request,
            EditorRequest::ReloadInstances(_)
                | EditorRequest::AddInstances(_)
                | EditorRequest::DeleteSelection
                | EditorRequest::SetSelection(_)
        );
        if !handled {
            continue;
        }
        if !container.is_loaded() {
            warn!("Ignoring {:?}: nothing is being edited", request);
            continue;
        }

        match request {
            EditorRequest::ReloadInstances(updated) => {
                let by_uuid: HashMap<&str, &InstanceRecord> = updated
                    .iter()
                    .map(|record| (record.persistent_uuid.as_str(), record))
                    .collect();
                for (_, id, mut placement, default_size, mut layer, mut z_order) in &mut instances {
                    let Some(record) = by_uuid.get(id.0.as_str()) else {
                        continue;
                    };
                    *placement = record.placement(default_size.0);
                    layer.0.clone_from(&record.layer);
                    z_order.0 = record.z_order;
                }
                for record in updated {
                    records.update(record);
                }
                // Force the gizmo to re-attach to the moved instances
                gizmo.attached = None;
                debug!("Reloaded {} instances", updated.len());
            }
            EditorRequest::AddInstances(added) => {
                for record in added {
                    spawn_instance(&mut commands, record);
                    records.add(record.clone());
                }
                debug!("Added {} instances", added.len());
            }
            EditorRequest::DeleteSelection => {
                for entity in selection.entities() {
                    if let Ok((_, id, ..)) = instances.get(*entity) {
                        records.remove(&id.0);
                    }
                    if let Ok(mut entity_commands) = commands.get_entity(*entity) {
                        entity_commands.despawn();
                    }
                }
                info!("Deleted {} selected instances", selection.len());
                selection.clear();
            }
            EditorRequest::SetSelection(uuids) => {
                let by_uuid: HashMap<&str, Entity> = instances
                    .iter()
                    .map(|(entity, id, ..)| (id.0.as_str(), entity))
                    .collect();
                selection.clear();
                selection.add_all(uuids.iter().filter_map(|uuid| by_uuid.get(uuid.as_str()).copied()));
                pending.answer_default_size();
            }
            _ => {}
        }
    }
}

pub(crate) fn move_selection_under_cursor(
    mut requests: MessageReader<EditorRequest>,
    picker: ScenePicker,
    flags: InstanceFlags,
    selection: Res<Selection>,
    mut instances: Query<(&mut Placement, Has<Object3d>)>,
    mut pending: ResMut<PendingChanges>,
) {
    for request in requests.read() {
        if !matches!(request, EditorRequest::MoveSelectionUnderCursor) {
            continue;
        }
        let Some(cursor) = picker.cursor_in_3d(selection.entities()) else {
            continue;
        };
        let boxes: Vec<(Aabb3, bool)> = selection
            .entities()
            .iter()
            .filter(|entity| !flags.is_locked(**entity))
            .filter_map(|entity| instances.get(*entity).ok())
            .map(|(placement, is_3d)| (placement.aabb(is_3d), is_3d))
            .collect();
        let Some(offset) = offset_under_cursor(boxes, cursor) else {
            continue;
        };
        move_instances(&selection, &flags, &mut instances, offset);
        pending.selection_modified();
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn handle_camera_requests(
    mut requests: MessageReader<EditorRequest>,
    container: Res<EditedContainer>,
    state: Res<EditorState>,
    settings: Res<EditorSettings>,
    input: Res<EditorInput>,
    selection: Res<Selection>,
    instances: Query<(Entity, &Placement, Has<Object3d>), With<SceneEntity>>,
    mut camera: ResMut<EditorCameraController>,
) {
    for request in requests.read() {
        if !container.is_loaded() {
            continue;
        }
        let viewport = framing_viewport(&input, &settings);
        match request {
            EditorRequest::ZoomToFit { target, visible_area } => {
                let boxes = instances
                    .iter()
                    .filter(|(entity, ..)| *target != ZoomTarget::Selection || selection.contains(*entity))
                    .map(|(_, placement, is_3d)| placement.aabb(is_3d));
                let fitted = match target {
                    ZoomTarget::InitialPosition => None,
                    ZoomTarget::Content => Aabb3::merge_all(boxes).map(|area| (area, margins::CONTENT)),
                    ZoomTarget::Selection => Aabb3::merge_all(boxes).map(|area| (area, margins::SELECTION)),
                };
                let (area, margin) = fitted.unwrap_or_else(|| {
                    (
                        initial_area(state.inner_area, settings.game_resolution),
                        margins::INITIAL_POSITION,
                    )
                });
                camera.zoom_to_fit_area(&area, *visible_area, viewport, margin);
            }
            EditorRequest::ZoomBy(factor) => camera.zoom_by(*factor),
            EditorRequest::SetZoom(zoom) => camera.set_zoom(*zoom, viewport.y),
            EditorRequest::RestoreCameraState(camera_state) => camera.restore(camera_state),
            _ => {}
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn handle_editor_requests(
    mut commands: Commands,
    mut requests: MessageReader<EditorRequest>,
    config: Res<EditorPluginConfig>,
    mut state: ResMut<EditorState>,
    mut layers: ResMut<SceneLayers>,
    mut settings: ResMut<EditorSettings>,
    mut transient: TransientEditorState,
    mut cameras: Query<&mut Camera, With<EditorCamera>>,
) {
    for request in requests.read() {
        match request {
            EditorRequest::SetInnerArea(area) => state.inner_area = *area,
            EditorRequest::SetSelectedLayer(name) => state.selected_layer.clone_from(name),
            EditorRequest::SetLayers(updated) => {
                if updated.is_empty() {
                    warn!("Ignoring an empty layer list");
                    continue;
                }
                layers.layers.clone_from(updated);
            }
            EditorRequest::SetGridSettings(grid) => {
                transient.grid.settings = grid.clone();
                settings.grid = grid.clone();
                if config.persist_settings {
                    settings.save();
                }
            }
            EditorRequest::SetEditorActive(active) => {
                if state.active == *active {
                    continue;
                }
                state.active = *active;
                for mut camera in &mut cameras {
                    camera.is_active = *active;
                }
                if *active {
                    commands.init_resource::<InputFocusTracker>();
                } else {
                    transient.reset(&mut commands);
                    commands.remove_resource::<InputFocusTracker>();
                }
                info!("In-game editor {}", if *active { "resumed" } else { "paused" });
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneInstanceBundle;

    fn record(uuid: &str, x: f32, is_3d: bool) -> InstanceRecord {
        InstanceRecord {
            name: "Crate".into(),
            persistent_uuid: uuid.into(),
            layer: String::new(),
            x,
            y: 0.0,
            z: is_3d.then_some(0.0),
            angle: 0.0,
            rotation_x: None,
            rotation_y: None,
            z_order: 0,
            custom_size: false,
            width: 32.0,
            height: 32.0,
            depth: None,
            default_width: 32.0,
            default_height: 32.0,
            default_depth: is_3d.then_some(32.0),
            locked: false,
            sealed: false,
        }
    }

    fn request_world() -> World {
        let mut world = World::new();
        world.init_resource::<Messages<EditorRequest>>();
        world.init_resource::<EditorState>();
        world.init_resource::<SceneLayers>();
        world.init_resource::<InstanceRecords>();
        world.init_resource::<Selection>();
        world.init_resource::<PendingChanges>();
        world.init_resource::<EditorCameraController>();
        world.init_resource::<EditorInput>();
        world.init_resource::<EditorSettings>();
        world.init_resource::<SelectionOutlines>();
        world.init_resource::<TransformGizmo>();
        world.init_resource::<EntityDrag>();
        world.init_resource::<NewInstanceDrag>();
        world.init_resource::<SelectionRectangle>();
        world.init_resource::<EditorGrid>();
        world.init_resource::<InputFocusTracker>();
        world.insert_resource(EditorPluginConfig {
            persist_settings: false,
            ..default()
        });
        world.insert_resource(EditedContainer::Scene { name: "Level".into() });
        world
    }

    fn switch_to(world: &mut World, instances: Vec<InstanceRecord>) {
        world.write_message(EditorRequest::SwitchScene {
            container: EditedContainer::Scene { name: "Level".into() },
            layers: vec![SceneLayer::new("")],
            instances,
            inner_area: None,
            grid: None,
            camera_state: None,
        });
        world.run_system_cached(switch_scene).expect("runs");
    }

    fn entity_with_uuid(world: &mut World, uuid: &str) -> Option<Entity> {
        world
            .query::<(Entity, &PersistentId)>()
            .iter(world)
            .find(|(_, id)| id.0 == uuid)
            .map(|(entity, _)| entity)
    }

    #[test]
    fn scene_switch_keeps_selection_by_uuid() {
        let mut world = request_world();
        switch_to(&mut world, vec![record("a", 0.0, true), record("b", 64.0, false)]);
        let a = entity_with_uuid(&mut world, "a").expect("spawned");
        world.resource_mut::<Selection>().add(a);
        world.resource_mut::<EditorState>().first_frame = false;

        switch_to(&mut world, vec![record("a", 10.0, true), record("c", 64.0, false)]);
        assert!(world.get_entity(a).is_err());
        let reloaded = entity_with_uuid(&mut world, "a").expect("respawned");
        assert_ne!(reloaded, a);
        assert_eq!(world.resource::<Selection>().entities(), &[reloaded]);
        assert!(entity_with_uuid(&mut world, "b").is_none());
        assert!(world.get::<Object3d>(reloaded).is_some());

        assert!(world.resource::<EditorState>().first_frame);
        assert_eq!(world.resource::<InstanceRecords>().len(), 2);
        assert!(world.resource::<PendingChanges>().is_pending());
    }

    #[test]
    fn scene_switch_without_camera_frames_the_game_screen() {
        let mut world = request_world();
        switch_to(&mut world, Vec::new());
        let camera = world.resource::<EditorCameraController>();
        assert!(!camera.is_free());
        assert_eq!(camera.anchor().truncate(), Vec2::new(640.0, 360.0));
        assert_eq!(camera.elevation_angle(), 90.0);
    }

    #[test]
    fn set_selection_follows_request_order() {
        let mut world = request_world();
        let first = world
            .spawn(SceneInstanceBundle::new("Coin", "", Placement::default(), Vec3::ONE).with_persistent_id(PersistentId("1".into())))
            .id();
        let second = world
            .spawn(SceneInstanceBundle::new("Coin", "", Placement::default(), Vec3::ONE).with_persistent_id(PersistentId("2".into())))
            .id();

        world.write_message(EditorRequest::SetSelection(vec!["2".into(), "missing".into(), "1".into()]));
        world.run_system_cached(handle_instance_requests).expect("runs");
        assert_eq!(world.resource::<Selection>().entities(), &[second, first]);
        assert!(world.resource::<PendingChanges>().is_pending());
    }

    #[test]
    fn reload_moves_live_instances() {
        let mut world = request_world();
        let entity = world
            .spawn(SceneInstanceBundle::from_record(&record("a", 0.0, false)))
            .id();
        let mut moved = record("a", 48.0, false);
        moved.z_order = 3;
        world.write_message(EditorRequest::ReloadInstances(vec![moved]));
        world.run_system_cached(handle_instance_requests).expect("runs");

        assert_eq!(world.get::<Placement>(entity).map(|p| p.position.x), Some(48.0));
        assert_eq!(world.get::<ZOrder>(entity), Some(&ZOrder(3)));
    }

    #[test]
    fn requests_without_a_scene_do_nothing() {
        let mut world = request_world();
        world.insert_resource(EditedContainer::None);
        world.write_message(EditorRequest::AddInstances(vec![record("a", 0.0, true)]));
        world.run_system_cached(handle_instance_requests).expect("runs");
        assert!(world.resource::<InstanceRecords>().is_empty());
        assert!(entity_with_uuid(&mut world, "a").is_none());
    }

    #[test]
    fn deactivating_drops_the_focus_tracker() {
        let mut world = request_world();
        world.write_message(EditorRequest::SetEditorActive(false));
        world.run_system_cached(handle_editor_requests).expect("runs");
        assert!(!world.resource::<EditorState>().active);
        assert!(!world.contains_resource::<InputFocusTracker>());

        world.write_message(EditorRequest::SetEditorActive(true));
        world.run_system_cached(handle_editor_requests).expect("runs");
        assert!(world.contains_resource::<InputFocusTracker>());
    }

    #[test]
    fn initial_area_prefers_inner_area() {
        let inner = Aabb3::new(Vec3::splat(-10.0), Vec3::splat(10.0));
        assert_eq!(initial_area(Some(inner), Vec2::new(800.0, 600.0)), inner);
        assert_eq!(
            initial_area(None, Vec2::new(800.0, 600.0)),
            Aabb3::new(Vec3::ZERO, Vec3::new(800.0, 600.0, 0.0))
        );
    }
}
