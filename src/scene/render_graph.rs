//! Pickable geometry of the scene, rebuilt every frame.
//!
//! Each [`RenderNode`] names the scene entity owning it, so picking never has
//! to walk the hierarchy to find what was hit.

use avian3d::prelude::*;
use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use super::{InstanceLayer, Object3d, Placement, SceneEntity, ZOrder, to_render_rotation, to_scene};

/// A renderable part of a scene entity that picking can hit
#[derive(Component, Clone, Copy, Debug)]
pub struct RenderNode {
    pub owner: Entity,
    /// Half extents in local units. When unset, the node's collider is used,
    /// then the owner's placement size.
    pub half_extents: Option<Vec3>,
    /// Editor visuals and dragged entities are not pickable
    pub pickable: bool,
}

impl RenderNode {
    pub fn new(owner: Entity) -> Self {
        Self {
            owner,
            half_extents: None,
            pickable: true,
        }
    }
}

/// Oriented box of a render node, in scene space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeBox {
    pub node: Entity,
    pub owner: Entity,
    pub center: Vec3,
    pub rotation: Quat,
    pub half_extents: Vec3,
    pub pickable: bool,
}

impl NodeBox {
    /// Distance along a normalized ray to the first hit of the box
    pub fn ray_distance(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let inverse = self.rotation.inverse();
        let local_origin = inverse * (origin - self.center);
        let local_dir = inverse * direction;

        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;
        for axis in 0..3 {
            let o = local_origin[axis];
            let d = local_dir[axis];
            let h = self.half_extents[axis];
            if d.abs() < 1e-8 {
                if o.abs() > h {
                    return None;
                }
                continue;
            }
            let t1 = (-h - o) / d;
            let t2 = (h - o) / d;
            t_min = t_min.max(t1.min(t2));
            t_max = t_max.min(t1.max(t2));
            if t_min > t_max {
                return None;
            }
        }
        if t_max < 0.0 {
            return None;
        }
        Some(t_min.max(0.0))
    }
}

/// Per-frame copy of the placement data picking needs about a scene entity
#[derive(Clone, Debug, PartialEq)]
pub struct GraphInstance {
    pub layer: String,
    pub z_order: i32,
    pub placement: Placement,
    pub is_3d: bool,
}

/// Snapshot of every pickable node plus the node to owner map
#[derive(Resource, Default, Debug)]
pub struct RenderGraph {
    pub nodes: Vec<NodeBox>,
    owners: HashMap<Entity, Entity>,
    pub instances: HashMap<Entity, GraphInstance>,
}

impl RenderGraph {
    pub fn instance(&self, entity: Entity) -> Option<&GraphInstance> {
        self.instances.get(&entity)
    }

    pub fn owner_of(&self, node: Entity) -> Option<Entity> {
        self.owners.get(&node).copied()
    }

    pub fn insert(&mut self, node: NodeBox) {
        self.owners.insert(node.node, node.owner);
        self.nodes.push(node);
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.owners.clear();
        self.instances.clear();
    }

    /// Whether any node is owned by `owner`
    pub fn has_geometry(&self, owner: Entity) -> bool {
        self.nodes.iter().any(|node| node.owner == owner)
    }
}

/// Pick box half extents of a node: its own extents scaled by its transform,
/// else its collider, else the owner's size.
pub fn node_half_extents(node: &RenderNode, scale: Vec3, collider: Option<&Collider>, placement: &Placement) -> Vec3 {
    node.half_extents
        .map(|half| half * scale.abs())
        // avian scales colliders with their transform already
        .or_else(|| collider.map(|c| c.aabb(Vec3::ZERO, Quat::IDENTITY).size() * 0.5))
        .unwrap_or(placement.size * 0.5)
}

/// Rebuild the [`RenderGraph`] from the current scene entities and node
/// transforms. Only 3D-capable owners contribute geometry.
pub fn rebuild_render_graph(
    mut graph: ResMut<RenderGraph>,
    nodes: Query<(Entity, &RenderNode, &GlobalTransform, Option<&Collider>)>,
    owners: Query<(Entity, &Placement, &InstanceLayer, &ZOrder, Has<Object3d>), With<SceneEntity>>,
) {
    graph.clear();
    for (entity, placement, layer, z_order, is_3d) in &owners {
        graph.instances.insert(
            entity,
            GraphInstance {
                layer: layer.0.clone(),
                z_order: z_order.0,
                placement: *placement,
                is_3d,
            },
        );
    }
    for (entity, node, global, collider) in &nodes {
        let Ok((_, placement, _, _, is_3d)) = owners.get(node.owner) else {
            continue;
        };
        if !is_3d {
            continue;
        }
        let (scale, rotation, translation) = global.to_scale_rotation_translation();
        let half_extents = node_half_extents(node, scale, collider, placement);
        graph.insert(NodeBox {
            node: entity,
            owner: node.owner,
            center: to_scene(translation),
            // Mirroring is its own inverse
            rotation: to_render_rotation(rotation),
            half_extents,
            pickable: node.pickable,
        });
    }
}
