//! Outbound notifications to the host editor.
//!
//! Editor systems only flag what changed in [`PendingChanges`]. Once per
//! frame the flags are turned into a single [`EditorNotification`], so a
//! gesture touching many entities still produces one message.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::editor::EditorCameraState;
use crate::scene::{
    DefaultSize, InstanceLayer, InstanceRecord, InstanceRecords, LiveInstance, Object3d, ObjectName,
    PersistentId, Placement, SelectedInstance, ZOrder,
};
use crate::selection::Selection;

/// Changes gathered during the frame, published in the notify step
#[derive(Resource, Default, Debug)]
pub struct PendingChanges {
    send: bool,
    modified: bool,
    added: Vec<Entity>,
    removed: Vec<String>,
    object_name_to_edit: Option<String>,
    default_size_answer: bool,
}

impl PendingChanges {
    /// The selection changed; publish it
    pub fn selection_changed(&mut self) {
        self.send = true;
    }

    /// The selected entities were transformed
    pub fn selection_modified(&mut self) {
        self.send = true;
        self.modified = true;
    }

    pub fn added(&mut self, entity: Entity) {
        self.send = true;
        self.added.push(entity);
    }

    pub fn removed(&mut self, persistent_uuid: impl Into<String>) {
        self.send = true;
        self.removed.push(persistent_uuid.into());
    }

    pub fn edit_object(&mut self, object_name: impl Into<String>) {
        self.send = true;
        self.object_name_to_edit = Some(object_name.into());
    }

    /// The host asked for the selection, including default sizes
    pub fn answer_default_size(&mut self) {
        self.send = true;
        self.default_size_answer = true;
    }

    pub fn is_pending(&self) -> bool {
        self.send
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// A selected instance with the default size hints the host may need
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectionEntry {
    pub persistent_uuid: String,
    pub default_width: f32,
    pub default_height: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_depth: Option<f32>,
}

/// Key forwarded to the host because the editor did not consume it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardedShortcut {
    pub key_code: String,
    pub meta: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

/// Fire-and-forget messages for the host editor
#[derive(Message, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EditorNotification {
    InstanceChanges {
        updated: Vec<InstanceRecord>,
        added: Vec<InstanceRecord>,
        selected: Vec<SelectionEntry>,
        removed: Vec<SelectedInstance>,
        object_name_to_edit: Option<String>,
        is_sending_back_selection_for_default_size: bool,
    },
    CameraStateChanged(EditorCameraState),
    Undo,
    Redo,
    Copy,
    Cut,
    Paste,
    OpenContextMenu { x: f32, y: f32 },
    Shortcut(ForwardedShortcut),
}

type LiveQuery<'w, 's> = Query<
    'w,
    's,
    (
        &'static PersistentId,
        &'static ObjectName,
        &'static InstanceLayer,
        &'static ZOrder,
        &'static Placement,
        &'static DefaultSize,
        Has<Object3d>,
    ),
>;

fn describe(instances: &LiveQuery, records: &InstanceRecords, entity: Entity) -> Option<InstanceRecord> {
    let (id, name, layer, z_order, placement, default_size, is_3d) = instances.get(entity).ok()?;
    let live = LiveInstance {
        persistent_uuid: &id.0,
        name: &name.0,
        layer: &layer.0,
        z_order: z_order.0,
        placement,
        default_size: default_size.0,
        is_3d,
    };
    Some(InstanceRecord::from_live(&live, records.get(&id.0)))
}

/// Publish the frame's pending changes as one notification
pub(crate) fn send_instance_changes(
    mut pending: ResMut<PendingChanges>,
    selection: Res<Selection>,
    records: Res<InstanceRecords>,
    instances: LiveQuery,
    mut notifications: MessageWriter<EditorNotification>,
) {
    if !pending.is_pending() {
        return;
    }

    let updated = if pending.modified {
        selection
            .entities()
            .iter()
            .filter(|entity| !pending.added.contains(entity))
            .filter_map(|entity| describe(&instances, &records, *entity))
            .collect()
    } else {
        Vec::new()
    };
    let added = pending
        .added
        .iter()
        .filter_map(|entity| describe(&instances, &records, *entity))
        .collect();
    let selected = selection
        .entities()
        .iter()
        .filter_map(|entity| instances.get(*entity).ok())
        .map(|(id, _, _, _, _, default_size, is_3d)| SelectionEntry {
            persistent_uuid: id.0.clone(),
            default_width: default_size.0.x,
            default_height: default_size.0.y,
            default_depth: is_3d.then_some(default_size.0.z),
        })
        .collect();
    let removed = pending
        .removed
        .iter()
        .map(|uuid| SelectedInstance {
            persistent_uuid: uuid.clone(),
        })
        .collect();

    notifications.write(EditorNotification::InstanceChanges {
        updated,
        added,
        selected,
        removed,
        object_name_to_edit: pending.object_name_to_edit.take(),
        is_sending_back_selection_for_default_size: pending.default_size_answer,
    });
    pending.clear();
}

/// Apply published diffs to the record store
pub(crate) fn mirror_instance_records(
    mut notifications: MessageReader<EditorNotification>,
    mut records: ResMut<InstanceRecords>,
) {
    for notification in notifications.read() {
        let EditorNotification::InstanceChanges {
            updated, added, removed, ..
        } = notification
        else {
            continue;
        };
        for instance in removed {
            records.remove(&instance.persistent_uuid);
        }
        for record in updated {
            records.update(record);
        }
        for record in added {
            records.add(record.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneInstanceBundle;

    fn notify_world() -> World {
        let mut world = World::new();
        world.init_resource::<PendingChanges>();
        world.init_resource::<Selection>();
        world.init_resource::<InstanceRecords>();
        world.init_resource::<Messages<EditorNotification>>();
        world
    }

    fn run_notify(world: &mut World) -> Vec<EditorNotification> {
        world.run_system_cached(send_instance_changes).expect("notify runs");
        world.run_system_cached(mirror_instance_records).expect("mirror runs");
        let mut messages = world.resource_mut::<Messages<EditorNotification>>();
        messages.drain().collect()
    }

    #[test]
    fn nothing_pending_sends_nothing() {
        let mut world = notify_world();
        assert!(run_notify(&mut world).is_empty());
    }

    #[test]
    fn added_instances_are_published_and_mirrored() {
        let mut world = notify_world();
        let placement = Placement::new(Vec3::new(10.0, 20.0, 0.0), Vec3::new(32.0, 32.0, 0.0));
        let entity = world
            .spawn(SceneInstanceBundle::new("Coin", "", placement, Vec3::new(32.0, 32.0, 0.0)))
            .id();
        world.resource_mut::<Selection>().add(entity);
        PendingChanges::added(&mut world.resource_mut::<PendingChanges>(), entity);

        let sent = run_notify(&mut world);
        assert_eq!(sent.len(), 1);
        let EditorNotification::InstanceChanges {
            updated,
            added,
            selected,
            removed,
            ..
        } = &sent[0]
        else {
            panic!("expected instance changes");
        };
        assert!(updated.is_empty());
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].name, "Coin");
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].default_depth, None);
        assert!(removed.is_empty());
        assert_eq!(world.resource::<InstanceRecords>().len(), 1);
        assert!(!world.resource::<PendingChanges>().is_pending());
    }

    #[test]
    fn removed_instances_leave_the_store() {
        let mut world = notify_world();
        let placement = Placement::new(Vec3::ZERO, Vec3::splat(8.0));
        let entity = world
            .spawn((SceneInstanceBundle::new("Box", "", placement, Vec3::splat(8.0)), Object3d))
            .id();
        PendingChanges::added(&mut world.resource_mut::<PendingChanges>(), entity);
        run_notify(&mut world);
        let uuid = world.get::<PersistentId>(entity).expect("id").0.clone();

        world.resource_mut::<PendingChanges>().removed(uuid.clone());
        world.despawn(entity);
        let sent = run_notify(&mut world);
        assert!(matches!(
            &sent[0],
            EditorNotification::InstanceChanges { removed, .. } if removed[0].persistent_uuid == uuid
        ));
        assert!(world.resource::<InstanceRecords>().is_empty());
    }

    #[test]
    fn notifications_encode_to_ron() {
        let notification = EditorNotification::OpenContextMenu { x: 4.0, y: 8.0 };
        let text = ron::to_string(&notification).expect("serializable");
        let back: EditorNotification = ron::from_str(&text).expect("parsable");
        assert_eq!(back, notification);
    }
}
