use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use super::{EditorRequest, EditorState};
use crate::commands::PendingChanges;
use crate::gizmos::{BeingEdited, EditorGrid, GridNormal, end_editing, put_to_sleep};
use crate::picking::ScenePicker;
use crate::scene::{EditedContainer, Object3d, Placement, SceneInstanceBundle, SceneLayers};
use crate::selection::Selection;
use crate::utils::round_half_up;

/// What the editor needs to know to create an instance of an object by name
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CatalogObject {
    pub default_size: Vec3,
    pub is_3d: bool,
}

/// Objects the host lets the user drag into the scene
#[derive(Resource, Default, Debug)]
pub struct ObjectCatalog {
    pub objects: HashMap<String, CatalogObject>,
}

impl ObjectCatalog {
    pub fn insert(&mut self, name: impl Into<String>, default_size: Vec3, is_3d: bool) -> &mut Self {
        self.objects.insert(name.into(), CatalogObject { default_size, is_3d });
        self
    }

    pub fn get(&self, name: &str) -> Option<&CatalogObject> {
        self.objects.get(name)
    }
}

/// Provisional instance following the cursor while the host drags a new
/// object over the scene
#[derive(Resource, Default, Debug)]
pub struct NewInstanceDrag {
    entity: Option<Entity>,
    object_name: String,
    placement: Placement,
    is_3d: bool,
}

impl NewInstanceDrag {
    pub fn entity(&self) -> Option<Entity> {
        self.entity
    }

    pub fn is_dragging(&self) -> bool {
        self.entity.is_some()
    }

    /// Despawn the provisional instance, if any
    pub fn discard(&mut self, commands: &mut Commands) {
        if let Some(entity) = self.entity.take()
            && let Ok(mut entity_commands) = commands.get_entity(entity)
        {
            entity_commands.despawn();
        }
    }
}

/// Outcome of dropping a provisional instance
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DropEffect {
    Accept(Vec3),
    Reject,
}

/// Decide whether a drop is kept.
///
/// `hit` is the scene geometry under the cursor and `projected` the cursor on
/// Z = 0. A flat instance is never dropped where it would be hidden under 3D
/// geometry, and nothing is dropped beyond what the layer camera renders.
pub fn resolve_drop(hit: Option<Vec3>, projected: Option<Vec3>, is_3d: bool, camera: Vec3, far_plane: f32) -> DropEffect {
    if hit.is_some() && !is_3d {
        return DropEffect::Reject;
    }
    let Some(point) = hit.or(projected) else {
        return DropEffect::Reject;
    };
    if point.distance(camera) > far_plane {
        return DropEffect::Reject;
    }
    DropEffect::Accept(point)
}

/// Position of the provisional instance for a cursor point. X and Y are
/// rounded, Z is kept so stacked boxes of fractional depth stay flush.
pub fn hover_position(grid: &EditorGrid, spanning: bool, cursor: Vec3, is_3d: bool) -> Vec3 {
    let (x, y) = if spanning {
        (grid.snapped_x(cursor.x), grid.snapped_y(cursor.y))
    } else {
        (cursor.x, cursor.y)
    };
    Vec3::new(round_half_up(x), round_half_up(y), if is_3d { cursor.z } else { 0.0 })
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn drag_new_instance(
    mut commands: Commands,
    mut requests: MessageReader<EditorRequest>,
    picker: ScenePicker,
    catalog: Res<ObjectCatalog>,
    state: Res<EditorState>,
    container: Res<EditedContainer>,
    layers: Res<SceneLayers>,
    being_edited: Query<Entity, With<BeingEdited>>,
    mut drag: ResMut<NewInstanceDrag>,
    mut grid: ResMut<EditorGrid>,
    mut selection: ResMut<Selection>,
    mut pending: ResMut<PendingChanges>,
) {
    for request in requests.read() {
        let (object_name, dropped, is_alt_pressed) = match request {
            EditorRequest::DragNewInstance {
                object_name,
                dropped,
                is_alt_pressed,
            } => (object_name, *dropped, *is_alt_pressed),
            EditorRequest::CancelDragNewInstance => {
                drag.discard(&mut commands);
                grid.hide();
                continue;
            }
            _ => continue,
        };
        if !container.is_loaded() {
            continue;
        }
        let Some(layer) = layers.camera_layer(&state.selected_layer, &container) else {
            warn!("Cannot drop instances on unknown layer {:?}", state.selected_layer);
            continue;
        };

        if drag.is_dragging() && drag.object_name != *object_name {
            drag.discard(&mut commands);
        }

        if !drag.is_dragging() {
            let Some(object) = catalog.get(object_name) else {
                warn!("Cannot drag unknown object {:?}", object_name);
                continue;
            };
            let placement = Placement::new(Vec3::ZERO, object.default_size);
            let mut entity_commands = commands.spawn(SceneInstanceBundle::new(
                object_name.clone(),
                state.selected_layer.clone(),
                placement,
                object.default_size,
            ));
            if object.is_3d {
                entity_commands.insert(Object3d);
            }
            let entity = entity_commands.id();
            put_to_sleep(&mut commands, &[entity]);
            drag.entity = Some(entity);
            drag.object_name = object_name.clone();
            drag.placement = placement;
            drag.is_3d = object.is_3d;
            debug!("Started dragging a new {:?}", object_name);
        }
        let Some(entity) = drag.entity else {
            continue;
        };

        // The final cursor position only arrives with the drop and would make
        // the instance jump, so a drop keeps the last hover position.
        if !dropped {
            let cursor = if drag.is_3d {
                picker.cursor_in_3d(&[entity])
            } else {
                picker.projected_cursor()
            };
            if let Some(cursor) = cursor {
                grid.place(GridNormal::Z, cursor);
                let spanning = grid.is_spanning(is_alt_pressed);
                drag.placement.position = hover_position(&grid, spanning, cursor, drag.is_3d);
                let placement = drag.placement;
                if let Ok(mut entity_commands) = commands.get_entity(entity) {
                    entity_commands.try_insert(placement);
                }
            }
            continue;
        }

        let hit = picker.closest_hit(&[entity]).map(|hit| hit.point);
        let effect = resolve_drop(
            hit,
            picker.projected_cursor(),
            drag.is_3d,
            picker.camera_position(),
            layer.far_plane,
        );
        match effect {
            DropEffect::Accept(_) => {
                drag.entity = None;
                end_editing(&mut commands, &being_edited);
                selection.clear();
                selection.add(entity);
                PendingChanges::added(&mut pending, entity);
                info!("Dropped a new {:?} at {:?}", object_name, drag.placement.position);
            }
            DropEffect::Reject => {
                drag.discard(&mut commands);
                grid.hide();
                info!("Dropping {:?} here is not possible, cancelled", object_name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{CameraMode, EditorCameraController, EditorCameraState, EditorInput};
    use crate::scene::{GraphInstance, NodeBox, RenderGraph};

    const CAMERA: Vec3 = Vec3::new(0.0, 0.0, 800.0);

    #[test]
    fn flat_instances_are_not_dropped_on_geometry() {
        let surface = Some(Vec3::new(0.0, 0.0, 20.0));
        assert_eq!(resolve_drop(surface, Some(Vec3::ZERO), false, CAMERA, 10_000.0), DropEffect::Reject);
        assert_eq!(
            resolve_drop(surface, Some(Vec3::ZERO), true, CAMERA, 10_000.0),
            DropEffect::Accept(Vec3::new(0.0, 0.0, 20.0))
        );
        assert_eq!(
            resolve_drop(None, Some(Vec3::ZERO), false, CAMERA, 10_000.0),
            DropEffect::Accept(Vec3::ZERO)
        );
    }

    #[test]
    fn drops_over_the_horizon_or_too_far_are_rejected() {
        assert_eq!(resolve_drop(None, None, true, CAMERA, 10_000.0), DropEffect::Reject);
        assert_eq!(resolve_drop(None, Some(Vec3::ZERO), true, CAMERA, 500.0), DropEffect::Reject);
    }

    #[test]
    fn hover_rounds_xy_but_not_z() {
        let mut grid = EditorGrid::default();
        assert_eq!(
            hover_position(&grid, false, Vec3::new(10.4, 10.5, 3.25), true),
            Vec3::new(10.0, 11.0, 3.25)
        );
        assert_eq!(hover_position(&grid, false, Vec3::new(1.0, 2.0, 3.0), false).z, 0.0);

        grid.settings.cell_size = Vec3::splat(16.0);
        assert_eq!(
            hover_position(&grid, true, Vec3::new(20.0, 30.0, 0.5), true),
            Vec3::new(16.0, 32.0, 0.5)
        );
    }

    fn drop_world() -> (World, Entity) {
        let mut world = World::new();
        world.init_resource::<Messages<EditorRequest>>();
        world.init_resource::<EditorState>();
        world.init_resource::<SceneLayers>();
        world.init_resource::<EditorGrid>();
        world.init_resource::<Selection>();
        world.init_resource::<PendingChanges>();
        world.init_resource::<NewInstanceDrag>();
        // Looking straight down from 800 units above the origin
        let mut camera = EditorCameraController::default();
        camera.restore(&EditorCameraState {
            camera_mode: CameraMode::Orbit,
            position: Vec3::ZERO,
            rotation_angle: 0.0,
            elevation_angle: 90.0,
            distance: 800.0,
        });
        world.insert_resource(camera);
        world.insert_resource(EditedContainer::Scene { name: "Level".into() });
        world.insert_resource(EditorInput {
            cursor: Vec2::new(400.0, 300.0),
            viewport: Vec2::new(800.0, 600.0),
            ..default()
        });
        let mut catalog = ObjectCatalog::default();
        catalog
            .insert("Sprite", Vec3::new(32.0, 32.0, 0.0), false)
            .insert("Cube", Vec3::splat(32.0), true);
        world.insert_resource(catalog);

        // A 3D box right under the cursor
        let ground = world.spawn_empty().id();
        let mut graph = RenderGraph::default();
        graph.instances.insert(
            ground,
            GraphInstance {
                layer: String::new(),
                z_order: 0,
                placement: Placement::new(Vec3::new(-50.0, -50.0, 0.0), Vec3::splat(100.0)),
                is_3d: true,
            },
        );
        graph.insert(NodeBox {
            node: ground,
            owner: ground,
            center: Vec3::new(0.0, 0.0, 50.0),
            rotation: Quat::IDENTITY,
            half_extents: Vec3::splat(50.0),
            pickable: true,
        });
        world.insert_resource(graph);
        (world, ground)
    }

    fn drag_frame(world: &mut World, object_name: &str, dropped: bool) {
        world.write_message(EditorRequest::DragNewInstance {
            object_name: object_name.to_string(),
            dropped,
            is_alt_pressed: false,
        });
        world.run_system_cached(drag_new_instance).expect("runs");
    }

    #[test]
    fn flat_instance_dropped_on_a_3d_surface_is_cancelled() {
        let (mut world, _) = drop_world();
        drag_frame(&mut world, "Sprite", false);
        let provisional = world.resource::<NewInstanceDrag>().entity().expect("provisional instance");
        assert!(world.get_entity(provisional).is_ok());

        drag_frame(&mut world, "Sprite", true);
        assert!(world.get_entity(provisional).is_err());
        assert!(!world.resource::<NewInstanceDrag>().is_dragging());
        assert!(!world.resource::<PendingChanges>().is_pending());
        assert!(world.resource::<Selection>().is_empty());
    }

    #[test]
    fn cube_dropped_on_a_surface_is_added_and_selected() {
        let (mut world, _) = drop_world();
        drag_frame(&mut world, "Cube", false);
        let cube = world.resource::<NewInstanceDrag>().entity().expect("provisional instance");
        let placement = world.get::<Placement>(cube).expect("placed");
        assert!((placement.position.z - 100.0).abs() < 1e-2);

        drag_frame(&mut world, "Cube", true);
        assert!(world.get_entity(cube).is_ok());
        assert!(world.resource::<PendingChanges>().is_pending());
        assert!(world.resource::<Selection>().contains(cube));
    }

    #[test]
    fn switching_object_discards_the_provisional_instance() {
        let (mut world, _) = drop_world();
        drag_frame(&mut world, "Cube", false);
        let cube = world.resource::<NewInstanceDrag>().entity().expect("cube");
        drag_frame(&mut world, "Sprite", false);
        let sprite = world.resource::<NewInstanceDrag>().entity().expect("sprite");
        assert_ne!(cube, sprite);
        assert!(world.get_entity(cube).is_err());

        world.write_message(EditorRequest::CancelDragNewInstance);
        world.run_system_cached(drag_new_instance).expect("runs");
        assert!(world.get_entity(sprite).is_err());
    }
}
