//! A game scene mixing flat sprites and 3D crates, edited in place.
//!
//! Run with: `cargo run --example mixed_scene`
//!
//! This demonstrates:
//! - Opening a scene with a `SwitchScene` request
//! - Giving spawned instances meshes, colliders and pickable render nodes
//! - Dragging a new instance in from the host (hold `N`, release to drop)
//! - Listening to the editor's notifications

use avian3d::prelude::*;
use bevy::prelude::*;
use bevy_ingame_editor::{
    EditedContainer, EditorNotification, EditorPlugin, EditorRequest, InstanceRecord, Object3d, ObjectCatalog,
    RenderNode, SceneEntity, SceneLayer,
};

const CRATE: &str = "Crate";
const COIN: &str = "Coin";

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Bevy In-Game Editor - Mixed Scene".to_string(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(EditorPlugin::default())
        .add_systems(Startup, (register_objects, open_scene))
        .add_systems(Update, (decorate_instances, drag_crate_from_host, log_notifications))
        .run();
}

fn register_objects(mut catalog: ResMut<ObjectCatalog>) {
    catalog
        .insert(CRATE, Vec3::splat(64.0), true)
        .insert(COIN, Vec3::new(32.0, 32.0, 0.0), false);
}

fn record(name: &str, uuid: &str, position: Vec3, is_3d: bool) -> InstanceRecord {
    let (width, height, depth) = if is_3d { (64.0, 64.0, Some(64.0)) } else { (32.0, 32.0, None) };
    InstanceRecord {
        name: name.to_string(),
        persistent_uuid: uuid.to_string(),
        layer: String::new(),
        x: position.x,
        y: position.y,
        z: is_3d.then_some(position.z),
        angle: 0.0,
        rotation_x: is_3d.then_some(0.0),
        rotation_y: is_3d.then_some(0.0),
        z_order: 0,
        custom_size: false,
        width,
        height,
        depth: None,
        default_width: width,
        default_height: height,
        default_depth: depth,
        locked: false,
        sealed: false,
    }
}

fn open_scene(mut requests: MessageWriter<EditorRequest>) {
    let mut instances = Vec::new();
    for i in 0..5 {
        let position = Vec3::new(200.0 + i as f32 * 160.0, 300.0, 0.0);
        instances.push(record(CRATE, &format!("crate-{i}"), position, true));
    }
    for i in 0..8 {
        let position = Vec3::new(180.0 + i as f32 * 100.0, 500.0, 0.0);
        instances.push(record(COIN, &format!("coin-{i}"), position, false));
    }
    let mut locked = record(CRATE, "crate-locked", Vec3::new(600.0, 120.0, 0.0), true);
    locked.locked = true;
    instances.push(locked);

    requests.write(EditorRequest::SwitchScene {
        container: EditedContainer::Scene {
            name: "Mixed".to_string(),
        },
        layers: vec![SceneLayer::new(""), SceneLayer::new("Foreground")],
        instances,
        inner_area: None,
        grid: None,
        camera_state: None,
    });
}

/// Give every new instance something to look at and something to pick
fn decorate_instances(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    added: Query<(Entity, Has<Object3d>), Added<SceneEntity>>,
) {
    for (entity, is_3d) in &added {
        let (mesh, color) = if is_3d {
            (meshes.add(Cuboid::new(1.0, 1.0, 1.0)), Color::srgb(0.8, 0.55, 0.3))
        } else {
            (meshes.add(Rectangle::new(1.0, 1.0)), Color::srgb(0.95, 0.8, 0.2))
        };
        let material = materials.add(StandardMaterial {
            base_color: color,
            ..default()
        });
        let node = commands
            .spawn((Mesh3d(mesh), MeshMaterial3d(material), RenderNode::new(entity)))
            .id();
        commands.entity(entity).add_child(node);
        if is_3d {
            commands
                .entity(entity)
                .insert((RigidBody::Static, Collider::cuboid(1.0, 1.0, 1.0)));
        }
    }
}

/// Stand-in for a host object list: hold `N` to drag a crate, release to drop it
fn drag_crate_from_host(
    keys: Res<ButtonInput<KeyCode>>,
    mut requests: MessageWriter<EditorRequest>,
) {
    let dropped = keys.just_released(KeyCode::KeyN);
    if keys.pressed(KeyCode::KeyN) || dropped {
        requests.write(EditorRequest::DragNewInstance {
            object_name: CRATE.to_string(),
            dropped,
            is_alt_pressed: keys.pressed(KeyCode::AltLeft),
        });
    }
}

fn log_notifications(mut notifications: MessageReader<EditorNotification>) {
    for notification in notifications.read() {
        match notification {
            EditorNotification::InstanceChanges {
                updated, added, removed, ..
            } => info!(
                "Host received {} updated, {} added, {} removed instances",
                updated.len(),
                added.len(),
                removed.len()
            ),
            EditorNotification::CameraStateChanged(state) => debug!("Camera moved: {:?}", state),
            other => info!("Host received {:?}", other),
        }
    }
}
