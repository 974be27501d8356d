use bevy::prelude::*;

use super::PendingChanges;
use crate::editor::EditorInput;
use crate::scene::{
    DefaultSize, InstanceFlags, InstanceLayer, InstanceRecord, Object3d, ObjectName, PersistentId, Placement,
    SceneInstanceBundle, ZOrder,
};
use crate::selection::{Aabb3, Selection};

/// Everything copied from a live instance when it is duplicated
#[derive(Clone, Debug, PartialEq)]
pub struct InstanceTemplate {
    pub object_name: String,
    pub layer: String,
    pub z_order: i32,
    pub placement: Placement,
    pub default_size: Vec3,
    pub is_3d: bool,
}

pub type TemplateQuery<'w, 's> = Query<
    'w,
    's,
    (
        &'static ObjectName,
        &'static InstanceLayer,
        &'static ZOrder,
        &'static Placement,
        &'static DefaultSize,
        Has<Object3d>,
    ),
>;

impl InstanceTemplate {
    pub fn of(instances: &TemplateQuery, entity: Entity) -> Option<Self> {
        let (name, layer, z_order, placement, default_size, is_3d) = instances.get(entity).ok()?;
        Some(Self {
            object_name: name.0.clone(),
            layer: layer.0.clone(),
            z_order: z_order.0,
            placement: *placement,
            default_size: default_size.0,
            is_3d,
        })
    }

    /// Spawn a copy with a fresh persistent id
    pub fn spawn(&self, commands: &mut Commands) -> Entity {
        let bundle = SceneInstanceBundle::new(
            self.object_name.clone(),
            self.layer.clone(),
            self.placement.constrained(self.is_3d),
            self.default_size,
        )
        .with_z_order(self.z_order);
        let mut entity = commands.spawn(bundle);
        if self.is_3d {
            entity.insert(Object3d);
        }
        entity.id()
    }
}

/// Spawn the live entity described by a record
pub fn spawn_instance(commands: &mut Commands, record: &InstanceRecord) -> Entity {
    let mut entity = commands.spawn(SceneInstanceBundle::from_record(record));
    if record.is_3d() {
        entity.insert(Object3d);
    }
    entity.id()
}

/// Copy `entities` next to the originals. Returns the copies in the same
/// order, skipping entities that are not scene instances.
pub fn duplicate_instances(commands: &mut Commands, instances: &TemplateQuery, entities: &[Entity]) -> Vec<(Entity, Entity)> {
    entities
        .iter()
        .filter_map(|original| {
            let template = InstanceTemplate::of(instances, *original)?;
            Some((*original, template.spawn(commands)))
        })
        .collect()
}

/// Despawn the selection and report it as removed
pub fn delete_selected_instances(
    commands: &mut Commands,
    selection: &mut Selection,
    ids: &Query<&PersistentId>,
    pending: &mut PendingChanges,
) -> usize {
    let mut count = 0;
    for entity in selection.entities() {
        let Ok(mut entity_commands) = commands.get_entity(*entity) else {
            continue;
        };
        if let Ok(id) = ids.get(*entity) {
            pending.removed(id.0.clone());
        }
        entity_commands.despawn();
        count += 1;
    }
    selection.clear();
    count
}

/// Translation bringing the selection's XY center onto `cursor` and its
/// lowest 3D point onto the cursor's Z. `None` for an empty selection.
pub fn offset_under_cursor(boxes: impl IntoIterator<Item = (Aabb3, bool)>, cursor: Vec3) -> Option<Vec3> {
    let boxes: Vec<(Aabb3, bool)> = boxes.into_iter().collect();
    let bounds = Aabb3::merge_all(boxes.iter().map(|(aabb, _)| *aabb))?;
    let min_z = boxes
        .iter()
        .filter(|(_, is_3d)| *is_3d)
        .map(|(aabb, _)| aabb.min.z)
        .reduce(f32::min)
        .unwrap_or(0.0);
    let center = bounds.center();
    Some(Vec3::new(cursor.x - center.x, cursor.y - center.y, cursor.z - min_z))
}

/// Move every selected, unlocked instance by `offset`. Flat instances stay
/// at Z = 0.
pub fn move_instances(
    selection: &Selection,
    flags: &InstanceFlags,
    instances: &mut Query<(&mut Placement, Has<Object3d>)>,
    offset: Vec3,
) {
    for entity in selection.entities() {
        if flags.is_locked(*entity) {
            continue;
        }
        if let Ok((mut placement, is_3d)) = instances.get_mut(*entity) {
            let moved = placement.position + offset;
            placement.position = if is_3d { moved } else { moved.with_z(placement.position.z) };
        }
    }
}

pub(crate) fn delete_selection_on_key(
    mut commands: Commands,
    input: Res<EditorInput>,
    ids: Query<&PersistentId>,
    mut selection: ResMut<Selection>,
    mut pending: ResMut<PendingChanges>,
) {
    let pressed = input.key_just_pressed(KeyCode::Delete) || input.key_just_pressed(KeyCode::Backspace);
    if !pressed || selection.is_empty() {
        return;
    }
    let count = delete_selected_instances(&mut commands, &mut selection, &ids, &mut pending);
    info!("Deleted {} entities", count);
}
