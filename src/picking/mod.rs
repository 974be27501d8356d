//! Ray and rectangle picking against the [`RenderGraph`].
//!
//! Every query runs in scene space. Editor visuals never reach the graph, and
//! callers exclude entities (for example the ones being dragged) by passing
//! them explicitly instead of hiding them from the graph.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::constants::camera::NEAR;
use crate::editor::{EditorCameraController, EditorInput};
use crate::scene::{RenderGraph, SceneLayers};
use crate::utils::ray_plane_intersection;

/// Camera parameters needed to turn screen positions into rays and back
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EditorView {
    pub position: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    /// Screen up; with Y pointing down in scene space this is `forward × right`
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Viewport size in pixels
    pub viewport: Vec2,
}

impl EditorView {
    fn aspect(&self) -> f32 {
        if self.viewport.y <= 0.0 {
            1.0
        } else {
            self.viewport.x / self.viewport.y
        }
    }

    /// Normalized device coordinates of a window position (Y up)
    pub fn ndc(&self, cursor: Vec2) -> Vec2 {
        let size = self.viewport.max(Vec2::ONE);
        Vec2::new(cursor.x / size.x * 2.0 - 1.0, 1.0 - cursor.y / size.y * 2.0)
    }

    /// Ray through a window position, as (origin, normalized direction)
    pub fn ray(&self, cursor: Vec2) -> (Vec3, Vec3) {
        let ndc = self.ndc(cursor);
        let tan_half = (self.fov_y * 0.5).tan();
        let direction = self.forward
            + self.right * ndc.x * tan_half * self.aspect()
            + self.up * ndc.y * tan_half;
        (self.position, direction.normalize_or(self.forward))
    }

    /// Window position of a scene point, `None` when it is behind the near plane
    pub fn project(&self, point: Vec3) -> Option<Vec2> {
        let delta = point - self.position;
        let depth = delta.dot(self.forward);
        if depth <= NEAR {
            return None;
        }
        let tan_half = (self.fov_y * 0.5).tan();
        let ndc = Vec2::new(
            delta.dot(self.right) / (depth * tan_half * self.aspect()),
            delta.dot(self.up) / (depth * tan_half),
        );
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.viewport.x,
            (1.0 - ndc.y) * 0.5 * self.viewport.y,
        ))
    }

    /// Scene units covered by one pixel at `depth` along the view direction
    pub fn units_per_pixel(&self, depth: f32) -> f32 {
        if self.viewport.y <= 0.0 {
            return 0.0;
        }
        2.0 * depth * (self.fov_y * 0.5).tan() / self.viewport.y
    }
}

/// A ray hit on a scene entity
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickHit {
    pub entity: Entity,
    pub distance: f32,
    pub point: Vec3,
}

/// Closest 3D hit over the nodes of every visible layer.
///
/// All layers are seen through the same editor camera, so ray distances are
/// compared directly across layers.
pub fn closest_hit(
    graph: &RenderGraph,
    layers: &SceneLayers,
    origin: Vec3,
    direction: Vec3,
    excluded: &[Entity],
) -> Option<PickHit> {
    let mut best: Option<PickHit> = None;
    for node in &graph.nodes {
        if !node.pickable || excluded.contains(&node.owner) {
            continue;
        }
        let Some(instance) = graph.instance(node.owner) else {
            continue;
        };
        let visible = layers
            .content_layer(&instance.layer)
            .is_some_and(|layer| layer.visible);
        if !visible {
            continue;
        }
        let Some(distance) = node.ray_distance(origin, direction) else {
            continue;
        };
        if best.is_none_or(|hit| distance < hit.distance) {
            best = Some(PickHit {
                entity: node.owner,
                distance,
                point: origin + direction * distance,
            });
        }
    }
    best
}

/// Topmost flat instance containing `point`, among instances without 3D
/// geometry on unlocked visible layers. Higher layers win, then higher
/// Z order.
pub fn flat_hit(graph: &RenderGraph, layers: &SceneLayers, point: Vec2, excluded: &[Entity]) -> Option<Entity> {
    graph
        .instances
        .iter()
        .filter(|(entity, _)| !excluded.contains(entity) && !graph.has_geometry(**entity))
        .filter_map(|(entity, instance)| {
            let index = layers.index_of(&instance.layer)?;
            let layer = &layers.layers[index];
            (layer.is_interactive() && instance.placement.contains_point_2d(point))
                .then_some((*entity, index, instance.z_order))
        })
        .max_by_key(|(entity, index, z_order)| (*index, *z_order, *entity))
        .map(|(entity, _, _)| entity)
}

/// Instances on unlocked visible layers whose center projects inside the
/// screen rectangle spanned by `corner_a` and `corner_b`.
pub fn frustum_select(
    graph: &RenderGraph,
    layers: &SceneLayers,
    view: &EditorView,
    corner_a: Vec2,
    corner_b: Vec2,
) -> Vec<Entity> {
    let min = corner_a.min(corner_b);
    let max = corner_a.max(corner_b);
    let mut found: Vec<(usize, i32, Entity)> = graph
        .instances
        .iter()
        .filter_map(|(entity, instance)| {
            let index = layers.index_of(&instance.layer)?;
            if !layers.layers[index].is_interactive() {
                return None;
            }
            let screen = view.project(instance.placement.center(instance.is_3d))?;
            (screen.cmpge(min).all() && screen.cmple(max).all()).then_some((index, instance.z_order, *entity))
        })
        .collect();
    found.sort();
    found.into_iter().map(|(_, _, entity)| entity).collect()
}

/// Where a ray crosses the Z = 0 plane
pub fn ground_point(origin: Vec3, direction: Vec3) -> Option<Vec3> {
    let t = ray_plane_intersection(origin, direction, Vec3::ZERO, Vec3::Z)?;
    Some(origin + direction * t)
}

/// Entity the cursor currently hovers
#[derive(Resource, Default, Debug)]
pub struct CursorHover {
    pub entity: Option<Entity>,
}

/// Picking queries at the current cursor position
#[derive(SystemParam)]
pub struct ScenePicker<'w> {
    graph: Res<'w, RenderGraph>,
    layers: Res<'w, SceneLayers>,
    camera: Res<'w, EditorCameraController>,
    input: Res<'w, EditorInput>,
}

impl ScenePicker<'_> {
    pub fn view(&self) -> EditorView {
        self.camera.view(self.input.viewport)
    }

    fn cursor_ray(&self) -> (Vec3, Vec3) {
        self.view().ray(self.input.cursor)
    }

    pub fn closest_hit(&self, excluded: &[Entity]) -> Option<PickHit> {
        let (origin, direction) = self.cursor_ray();
        closest_hit(&self.graph, &self.layers, origin, direction, excluded)
    }

    /// Topmost entity under the cursor: 3D geometry first, then flat
    /// instances under the cursor's point on Z = 0.
    pub fn top_entity_under_cursor(&self, excluded: &[Entity]) -> Option<Entity> {
        if let Some(hit) = self.closest_hit(excluded) {
            return Some(hit.entity);
        }
        let ground = self.projected_cursor()?;
        flat_hit(&self.graph, &self.layers, ground.truncate(), excluded)
    }

    /// Cursor on the scene geometry, or on Z = 0 when nothing is hit
    pub fn cursor_in_3d(&self, excluded: &[Entity]) -> Option<Vec3> {
        match self.closest_hit(excluded) {
            Some(hit) => Some(hit.point),
            None => self.projected_cursor(),
        }
    }

    /// Cursor projected on the Z = 0 plane
    pub fn projected_cursor(&self) -> Option<Vec3> {
        let (origin, direction) = self.cursor_ray();
        ground_point(origin, direction)
    }

    pub fn frustum_select(&self, corner_a: Vec2, corner_b: Vec2) -> Vec<Entity> {
        frustum_select(&self.graph, &self.layers, &self.view(), corner_a, corner_b)
    }

    pub fn camera_position(&self) -> Vec3 {
        self.camera.position()
    }

    /// Camera rotation around Z, in degrees
    pub fn camera_yaw(&self) -> f32 {
        self.camera.rotation_angle()
    }
}

pub(crate) fn update_cursor_hover(picker: ScenePicker, mut hover: ResMut<CursorHover>) {
    hover.entity = picker.top_entity_under_cursor(&[]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{GraphInstance, NodeBox, Placement, SceneLayer};

    fn top_down_view() -> EditorView {
        EditorView {
            position: Vec3::new(0.0, 0.0, 100.0),
            forward: -Vec3::Z,
            right: Vec3::X,
            up: -Vec3::Y,
            fov_y: 45f32.to_radians(),
            viewport: Vec2::new(800.0, 600.0),
        }
    }

    fn add_instance(graph: &mut RenderGraph, entity: Entity, layer: &str, z_order: i32, placement: Placement, is_3d: bool) {
        graph.instances.insert(
            entity,
            GraphInstance {
                layer: layer.to_string(),
                z_order,
                placement,
                is_3d,
            },
        );
    }

    fn add_box(graph: &mut RenderGraph, owner: Entity, center: Vec3) {
        graph.insert(NodeBox {
            node: owner,
            owner,
            center,
            rotation: Quat::IDENTITY,
            half_extents: Vec3::splat(5.0),
            pickable: true,
        });
    }

    fn two_layers() -> SceneLayers {
        SceneLayers {
            layers: vec![SceneLayer::new(""), SceneLayer::new("Top")],
        }
    }

    #[test]
    fn center_ray_points_forward() {
        let view = top_down_view();
        let (origin, direction) = view.ray(Vec2::new(400.0, 300.0));
        assert_eq!(origin, view.position);
        assert!(direction.abs_diff_eq(-Vec3::Z, 1e-5));
    }

    #[test]
    fn projection_inverts_the_ray() {
        let view = top_down_view();
        let cursor = Vec2::new(120.0, 450.0);
        let (origin, direction) = view.ray(cursor);
        let point = ground_point(origin, direction).expect("ray looks down");
        let back = view.project(point).expect("point in front");
        assert!(back.abs_diff_eq(cursor, 1e-2));
        // Screen Y grows with scene Y
        assert!(point.y > 0.0);
    }

    #[test]
    fn points_behind_camera_do_not_project() {
        let view = top_down_view();
        assert!(view.project(Vec3::new(0.0, 0.0, 200.0)).is_none());
    }

    #[test]
    fn closest_hit_across_layers_wins() {
        let mut world = World::new();
        let near = world.spawn_empty().id();
        let far = world.spawn_empty().id();
        let mut graph = RenderGraph::default();
        add_instance(&mut graph, near, "", 0, Placement::default(), true);
        add_instance(&mut graph, far, "Top", 0, Placement::default(), true);
        add_box(&mut graph, near, Vec3::new(0.0, 0.0, 50.0));
        add_box(&mut graph, far, Vec3::ZERO);

        let layers = two_layers();
        let hit = closest_hit(&graph, &layers, Vec3::new(0.0, 0.0, 100.0), -Vec3::Z, &[]).expect("hit");
        assert_eq!(hit.entity, near);
        assert_eq!(hit.distance, 45.0);

        let hit = closest_hit(&graph, &layers, Vec3::new(0.0, 0.0, 100.0), -Vec3::Z, &[near]).expect("hit");
        assert_eq!(hit.entity, far);
    }

    #[test]
    fn hidden_layers_are_not_hit() {
        let mut world = World::new();
        let entity = world.spawn_empty().id();
        let mut graph = RenderGraph::default();
        add_instance(&mut graph, entity, "Top", 0, Placement::default(), true);
        add_box(&mut graph, entity, Vec3::ZERO);
        let mut layers = two_layers();
        layers.layers[1].visible = false;
        assert!(closest_hit(&graph, &layers, Vec3::new(0.0, 0.0, 100.0), -Vec3::Z, &[]).is_none());
    }

    #[test]
    fn flat_fallback_prefers_higher_layer_then_z_order() {
        let mut world = World::new();
        let base_high = world.spawn_empty().id();
        let top_low = world.spawn_empty().id();
        let top_high = world.spawn_empty().id();
        let mut graph = RenderGraph::default();
        let rect = Placement::new(Vec3::ZERO, Vec3::new(10.0, 10.0, 0.0));
        add_instance(&mut graph, base_high, "", 10, rect, false);
        add_instance(&mut graph, top_low, "Top", 1, rect, false);
        add_instance(&mut graph, top_high, "Top", 2, rect, false);

        let mut layers = two_layers();
        assert_eq!(flat_hit(&graph, &layers, Vec2::new(5.0, 5.0), &[]), Some(top_high));
        assert_eq!(flat_hit(&graph, &layers, Vec2::new(50.0, 5.0), &[]), None);

        layers.layers[1].locked = true;
        assert_eq!(flat_hit(&graph, &layers, Vec2::new(5.0, 5.0), &[]), Some(base_high));
    }

    #[test]
    fn rectangle_selects_projected_centers_on_interactive_layers() {
        let mut world = World::new();
        let inside = world.spawn_empty().id();
        let outside = world.spawn_empty().id();
        let locked = world.spawn_empty().id();
        let mut graph = RenderGraph::default();
        let size = Vec3::new(2.0, 2.0, 0.0);
        add_instance(&mut graph, inside, "", 0, Placement::new(Vec3::new(-1.0, -1.0, 0.0), size), false);
        add_instance(&mut graph, outside, "", 0, Placement::new(Vec3::new(30.0, 30.0, 0.0), size), false);
        add_instance(&mut graph, locked, "Top", 0, Placement::new(Vec3::new(-1.0, -1.0, 0.0), size), false);
        let mut layers = two_layers();
        layers.layers[1].locked = true;

        let view = top_down_view();
        let picked = frustum_select(&graph, &layers, &view, Vec2::new(350.0, 250.0), Vec2::new(450.0, 350.0));
        assert_eq!(picked, vec![inside]);
    }
}
