//! Host scene model: the live entities the editor manipulates.
//!
//! The running game owns these entities. The editor reads and writes their
//! [`Placement`] and reports changes; it never owns them.

mod records;
mod render_graph;

pub use records::*;
pub use render_graph::*;

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::transform::TransformSystems;
use serde::{Deserialize, Serialize};

use crate::selection::Aabb3;

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<SceneEntity>()
            .register_type::<PersistentId>()
            .register_type::<ObjectName>()
            .register_type::<Placement>()
            .register_type::<DefaultSize>()
            .register_type::<InstanceLayer>()
            .register_type::<ZOrder>()
            .register_type::<Object3d>()
            .init_resource::<SceneLayers>()
            .init_resource::<EditedContainer>()
            .init_resource::<InstanceRecords>()
            .init_resource::<RenderGraph>()
            .add_systems(
                PostUpdate,
                sync_instance_transforms.before(TransformSystems::Propagate),
            );
    }
}

/// Marker component for entities that are part of the editable scene
#[derive(Component, Default, Reflect)]
#[reflect(Component)]
pub struct SceneEntity;

/// Stable identity surviving save/reload, correlating a live entity with its
/// [`InstanceRecord`].
#[derive(Component, Clone, Debug, PartialEq, Eq, Hash, Reflect)]
#[reflect(Component)]
pub struct PersistentId(pub String);

impl PersistentId {
    /// Generate a fresh random identity in the canonical uuid v4 layout.
    pub fn generate() -> Self {
        let hi = fastrand::u64(..);
        let lo = fastrand::u64(..);
        // Version 4, variant 10xx
        let hi = (hi & 0xffff_ffff_ffff_0fff) | 0x0000_0000_0000_4000;
        let lo = (lo & 0x3fff_ffff_ffff_ffff) | 0x8000_0000_0000_0000;
        Self(format!(
            "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
            hi >> 32,
            (hi >> 16) & 0xffff,
            hi & 0xffff,
            lo >> 48,
            lo & 0xffff_ffff_ffff
        ))
    }
}

/// Name of the object (the "type") an instance was created from
#[derive(Component, Clone, Debug, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct ObjectName(pub String);

/// Marks an instance as 3D-capable: it carries a meaningful Z position, X/Y
/// rotations and a depth. Instances without it are flat and have those
/// fields clamped to their defaults.
#[derive(Component, Default, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Object3d;

/// Layer an instance is drawn on
#[derive(Component, Clone, Debug, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct InstanceLayer(pub String);

/// Drawing order inside a layer (higher is on top)
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct ZOrder(pub i32);

/// Size the instance has when not resized
#[derive(Component, Clone, Copy, Debug, PartialEq, Reflect)]
#[reflect(Component)]
pub struct DefaultSize(pub Vec3);

/// Placement of an instance in scene space (X right, Y down, Z up).
///
/// `position` is the minimum corner of the unrotated bounds. Angles are in
/// degrees; `angle` turns around Z.
#[derive(Component, Clone, Copy, Debug, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct Placement {
    pub position: Vec3,
    pub angle: f32,
    pub rotation_x: f32,
    pub rotation_y: f32,
    /// Width, height and depth
    pub size: Vec3,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            angle: 0.0,
            rotation_x: 0.0,
            rotation_y: 0.0,
            size: Vec3::ONE,
        }
    }
}

impl Placement {
    pub fn new(position: Vec3, size: Vec3) -> Self {
        Self {
            position,
            size,
            ..default()
        }
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    /// Center of the unrotated bounds. Flat instances are centered on Z = 0.
    pub fn center(&self, is_3d: bool) -> Vec3 {
        let center = self.position + self.size * 0.5;
        if is_3d { center } else { center.with_z(0.0) }
    }

    /// Clamp the 3D-only fields of a flat instance to their defaults.
    pub fn constrained(mut self, is_3d: bool) -> Self {
        if !is_3d {
            self.position.z = 0.0;
            self.rotation_x = 0.0;
            self.rotation_y = 0.0;
            self.size.z = 0.0;
        }
        self
    }

    /// Orientation in scene space (Z, then Y, then X)
    pub fn orientation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::ZYX,
            self.angle.to_radians(),
            self.rotation_y.to_radians(),
            self.rotation_x.to_radians(),
        )
    }

    /// Bounds used for framing and selection. 3D instances contribute their
    /// unrotated box; flat ones their rotated rectangle at Z = 0.
    pub fn aabb(&self, is_3d: bool) -> Aabb3 {
        if is_3d {
            return Aabb3::new(self.position, self.position + self.size);
        }
        let half = self.size.truncate() * 0.5;
        let center = self.position.truncate() + half;
        let (sin, cos) = self.angle.to_radians().sin_cos();
        let extent = Vec2::new(
            cos.abs() * half.x + sin.abs() * half.y,
            sin.abs() * half.x + cos.abs() * half.y,
        );
        Aabb3::new((center - extent).extend(0.0), (center + extent).extend(0.0))
    }

    /// Whether a scene-space point lies on the (rotated) rectangle of a flat instance.
    pub fn contains_point_2d(&self, point: Vec2) -> bool {
        let half = self.size.truncate() * 0.5;
        let center = self.position.truncate() + half;
        let local = Vec2::from_angle(-self.angle.to_radians()).rotate(point - center);
        local.x.abs() <= half.x && local.y.abs() <= half.y
    }

    /// Transform of the instance in render space
    pub fn render_transform(&self, is_3d: bool) -> Transform {
        let scale = if is_3d {
            self.size
        } else {
            self.size.with_z(1.0)
        };
        Transform {
            translation: to_render(self.center(is_3d)),
            rotation: to_render_rotation(self.orientation()),
            scale,
        }
    }
}

/// Convert a scene-space point or vector to render space (Y mirrored).
pub fn to_render(v: Vec3) -> Vec3 {
    Vec3::new(v.x, -v.y, v.z)
}

/// Convert a render-space point or vector to scene space.
pub fn to_scene(v: Vec3) -> Vec3 {
    Vec3::new(v.x, -v.y, v.z)
}

/// Mirror a scene-space rotation into render space.
pub fn to_render_rotation(q: Quat) -> Quat {
    Quat::from_xyzw(-q.x, q.y, -q.z, q.w)
}

/// A layer of the edited scene
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneLayer {
    pub name: String,
    pub visible: bool,
    pub locked: bool,
    /// Far clip distance of the layer camera
    pub far_plane: f32,
}

impl SceneLayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            locked: false,
            far_plane: 10_000.0,
        }
    }

    /// Instances on this layer can be picked and selected
    pub fn is_interactive(&self) -> bool {
        self.visible && !self.locked
    }
}

/// Layers of the edited container, ordered back to front. The first layer
/// is the base layer.
#[derive(Resource, Clone, Debug)]
pub struct SceneLayers {
    pub layers: Vec<SceneLayer>,
}

impl Default for SceneLayers {
    fn default() -> Self {
        Self {
            layers: vec![SceneLayer::new("")],
        }
    }
}

impl SceneLayers {
    pub fn content_layer(&self, name: &str) -> Option<&SceneLayer> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.layers.iter().position(|layer| layer.name == name)
    }

    /// Layer holding the camera for instances of `name`. When an embedded
    /// object is edited, every content layer shares the base camera layer.
    pub fn camera_layer(&self, name: &str, container: &EditedContainer) -> Option<&SceneLayer> {
        match container {
            EditedContainer::EmbeddedObject { .. } => self.layers.first(),
            EditedContainer::Scene { .. } => self.content_layer(name),
            EditedContainer::None => None,
        }
    }
}

/// What the editor is currently editing
#[derive(Resource, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditedContainer {
    /// No scene is loaded yet
    #[default]
    None,
    Scene { name: String },
    /// An object edited in isolation inside a host scene
    EmbeddedObject { name: String },
}

impl EditedContainer {
    pub fn is_loaded(&self) -> bool {
        !matches!(self, EditedContainer::None)
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            EditedContainer::None => None,
            EditedContainer::Scene { name } | EditedContainer::EmbeddedObject { name } => Some(name),
        }
    }
}

/// Everything needed to spawn an editable instance
#[derive(Bundle)]
pub struct SceneInstanceBundle {
    pub scene_entity: SceneEntity,
    pub persistent_id: PersistentId,
    pub object_name: ObjectName,
    pub placement: Placement,
    pub default_size: DefaultSize,
    pub layer: InstanceLayer,
    pub z_order: ZOrder,
    pub transform: Transform,
}

impl SceneInstanceBundle {
    pub fn new(object_name: impl Into<String>, layer: impl Into<String>, placement: Placement, default_size: Vec3) -> Self {
        Self {
            scene_entity: SceneEntity,
            persistent_id: PersistentId::generate(),
            object_name: ObjectName(object_name.into()),
            placement,
            default_size: DefaultSize(default_size),
            layer: InstanceLayer(layer.into()),
            z_order: ZOrder(0),
            transform: placement.render_transform(false),
        }
    }

    /// Build the bundle of a stored record
    pub fn from_record(record: &InstanceRecord) -> Self {
        let default_size = record.default_size();
        let placement = record.placement(default_size);
        Self {
            scene_entity: SceneEntity,
            persistent_id: PersistentId(record.persistent_uuid.clone()),
            object_name: ObjectName(record.name.clone()),
            placement,
            default_size: DefaultSize(default_size),
            layer: InstanceLayer(record.layer.clone()),
            z_order: ZOrder(record.z_order),
            transform: placement.render_transform(record.z.is_some()),
        }
    }

    pub fn with_persistent_id(mut self, id: PersistentId) -> Self {
        self.persistent_id = id;
        self
    }

    pub fn with_z_order(mut self, z_order: i32) -> Self {
        self.z_order = ZOrder(z_order);
        self
    }
}

/// Editability of live entities, read from their records and layers
#[derive(SystemParam)]
pub struct InstanceFlags<'w, 's> {
    records: Res<'w, InstanceRecords>,
    layers: Res<'w, SceneLayers>,
    instances: Query<'w, 's, (&'static PersistentId, &'static InstanceLayer)>,
}

impl InstanceFlags<'_, '_> {
    pub fn is_locked(&self, entity: Entity) -> bool {
        self.instances
            .get(entity)
            .is_ok_and(|(id, _)| self.records.is_locked(&id.0))
    }

    pub fn is_sealed(&self, entity: Entity) -> bool {
        self.instances
            .get(entity)
            .is_ok_and(|(id, _)| self.records.is_sealed(&id.0))
    }

    /// The entity's layer is locked, or unknown
    pub fn is_layer_locked(&self, entity: Entity) -> bool {
        let Ok((_, layer)) = self.instances.get(entity) else {
            return true;
        };
        self.layers
            .content_layer(&layer.0)
            .is_none_or(|layer| layer.locked)
    }

    /// Transforms may be applied to the entity
    pub fn is_editable(&self, entity: Entity) -> bool {
        !self.is_locked(entity) && !self.is_sealed(entity)
    }
}

/// Keep render transforms in step with placements
fn sync_instance_transforms(
    mut instances: Query<(&Placement, Has<Object3d>, &mut Transform), Changed<Placement>>,
) {
    for (placement, is_3d, mut transform) in &mut instances {
        *transform = placement.render_transform(is_3d);
    }
}
