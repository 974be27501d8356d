use avian3d::prelude::{Sleeping, SleepingDisabled};
use bevy::prelude::*;

use crate::commands::PendingChanges;
use crate::constants::{gizmo_colors, gizmo_sizes};
use crate::editor::{EditorInput, EditorState, EntityDrag};
use crate::picking::ScenePicker;
use crate::scene::{InstanceFlags, Object3d, Placement, to_render, to_scene};
use crate::selection::Selection;
use crate::utils::{closest_axis_parameter, point_to_ray_distance, ray_plane_intersection, ray_to_line_segment_distance};

use super::{EditorGizmos, EditorGrid, GridNormal, ObjectMover, TransformDelta};

/// Scale responds this much slower on plane and uniform handles
const MULTI_AXIS_SCALE_DAMPING: f32 = 0.2;

/// Marker component for entities currently being edited (to track sleep state)
#[derive(Component)]
pub struct BeingEdited;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GizmoMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

/// A grabbable part of the gizmo. Axis handles are rings in rotate mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GizmoHandle {
    X,
    Y,
    Z,
    XY,
    YZ,
    XZ,
    XYZ,
}

impl GizmoHandle {
    pub const AXES: [GizmoHandle; 3] = [GizmoHandle::X, GizmoHandle::Y, GizmoHandle::Z];
    pub const PLANES: [GizmoHandle; 3] = [GizmoHandle::XY, GizmoHandle::YZ, GizmoHandle::XZ];

    /// Axes moved by this handle
    pub fn axes(self) -> BVec3 {
        match self {
            GizmoHandle::X => BVec3::new(true, false, false),
            GizmoHandle::Y => BVec3::new(false, true, false),
            GizmoHandle::Z => BVec3::new(false, false, true),
            GizmoHandle::XY => BVec3::new(true, true, false),
            GizmoHandle::YZ => BVec3::new(false, true, true),
            GizmoHandle::XZ => BVec3::new(true, false, true),
            GizmoHandle::XYZ => BVec3::TRUE,
        }
    }

    pub fn axis_count(self) -> usize {
        self.axes().bitmask().count_ones() as usize
    }

    fn as_vec(self) -> Vec3 {
        Vec3::select(self.axes(), Vec3::ONE, Vec3::ZERO)
    }

    /// Normal of a plane handle, or the direction of an axis handle
    fn direction(self) -> Vec3 {
        match self {
            GizmoHandle::XY | GizmoHandle::YZ | GizmoHandle::XZ => Vec3::ONE - self.as_vec(),
            _ => self.as_vec(),
        }
    }

    /// In-plane unit vectors of a plane handle
    fn plane_axes(self) -> (Vec3, Vec3) {
        match self {
            GizmoHandle::XY => (Vec3::X, Vec3::Y),
            GizmoHandle::YZ => (Vec3::Y, Vec3::Z),
            _ => (Vec3::X, Vec3::Z),
        }
    }

    /// Axis color; a plane takes the color of the axis it lacks
    pub fn color(self) -> Color {
        match self {
            GizmoHandle::X | GizmoHandle::YZ => gizmo_colors::X,
            GizmoHandle::Y | GizmoHandle::XZ => gizmo_colors::Y,
            GizmoHandle::Z | GizmoHandle::XY => gizmo_colors::Z,
            GizmoHandle::XYZ => gizmo_colors::CENTER,
        }
    }
}

/// The node the gizmo manipulates, in render space. Entities never move
/// with it directly: its change from the drag baseline becomes a
/// [`TransformDelta`].
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct GizmoProxy {
    pub translation: Vec3,
    /// Radians around the render X, Y and Z axes
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl GizmoProxy {
    pub fn at(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    pub fn transform(&self) -> Transform {
        Transform {
            translation: self.translation,
            rotation: Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z),
            scale: self.scale,
        }
    }
}

/// State recorded when a handle is grabbed
#[derive(Debug, Clone, Copy)]
pub struct GizmoDrag {
    pub handle: GizmoHandle,
    baseline: GizmoProxy,
    /// Handle length when grabbed
    length: f32,
    /// Point under the cursor on the handle's line or plane
    start_point: Vec3,
    start_cursor: Vec2,
    /// Position of the attached entity when grabbed
    anchor: Vec3,
    anchor_is_3d: bool,
}

/// Transform manipulator attached to the last editable selected entity
#[derive(Resource, Debug, Default)]
pub struct TransformGizmo {
    pub mode: GizmoMode,
    pub attached: Option<Entity>,
    pub proxy: Option<Entity>,
    pub visible: bool,
    pub hovered: Option<GizmoHandle>,
    pub drag: Option<GizmoDrag>,
    selection_moved: bool,
}

impl TransformGizmo {
    /// The pointer is over a handle or dragging one
    pub fn is_hovered(&self) -> bool {
        self.hovered.is_some() || self.drag.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// The current drag moved the selection away from its baseline
    pub fn has_selection_moved(&self) -> bool {
        self.selection_moved
    }

    pub fn active_handle(&self) -> Option<GizmoHandle> {
        self.drag.map(|drag| drag.handle).or(self.hovered)
    }

    /// Forget the attachment, e.g. when the scene is swapped
    pub fn reset(&mut self) {
        self.attached = None;
        self.visible = false;
        self.hovered = None;
        self.drag = None;
        self.selection_moved = false;
    }
}

/// Length of the handles for a gizmo at `center` seen from `camera`
pub fn handle_length(center: Vec3, camera: Vec3) -> f32 {
    (center - camera).length().max(1.0) * gizmo_sizes::SCREEN_FACTOR
}

/// Handle under a render-space ray
pub fn pick_handle(mode: GizmoMode, center: Vec3, length: f32, origin: Vec3, direction: Vec3) -> Option<GizmoHandle> {
    let radius = length * gizmo_sizes::PICK_RADIUS;

    if mode == GizmoMode::Rotate {
        let ring = length * gizmo_sizes::RING_RADIUS;
        return GizmoHandle::AXES
            .into_iter()
            .filter_map(|handle| {
                let t = ray_plane_intersection(origin, direction, center, handle.direction())?;
                let distance = (origin + direction * t - center).length();
                ((distance - ring).abs() < radius).then_some((handle, t))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(handle, _)| handle);
    }

    if point_to_ray_distance(center, origin, direction) < radius * 1.5 {
        return Some(GizmoHandle::XYZ);
    }

    let low = length * gizmo_sizes::PLANE_HANDLE_OFFSET;
    let high = low + length * gizmo_sizes::PLANE_HANDLE_SIZE;
    let plane = GizmoHandle::PLANES
        .into_iter()
        .filter_map(|handle| {
            let t = ray_plane_intersection(origin, direction, center, handle.direction())?;
            let local = origin + direction * t - center;
            let (u, v) = handle.plane_axes();
            let (a, b) = (local.dot(u), local.dot(v));
            (a >= low && a <= high && b >= low && b <= high).then_some((handle, t))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((handle, _)) = plane {
        return Some(handle);
    }

    GizmoHandle::AXES
        .into_iter()
        .map(|handle| {
            let end = center + handle.direction() * length;
            (handle, ray_to_line_segment_distance(origin, direction, center, end))
        })
        .filter(|(_, distance)| *distance < radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(handle, _)| handle)
}

/// Point grabbed on the handle's line or plane. The uniform handle slides
/// on the plane facing the camera.
pub fn handle_point(
    mode: GizmoMode,
    handle: GizmoHandle,
    center: Vec3,
    camera_forward: Vec3,
    origin: Vec3,
    direction: Vec3,
) -> Option<Vec3> {
    let on_plane = |normal: Vec3| {
        ray_plane_intersection(origin, direction, center, normal).map(|t| origin + direction * t)
    };
    match (mode, handle) {
        (_, GizmoHandle::XYZ) => on_plane(camera_forward),
        (GizmoMode::Rotate, _) => on_plane(handle.direction()),
        (_, GizmoHandle::X | GizmoHandle::Y | GizmoHandle::Z) => {
            let axis = handle.direction();
            closest_axis_parameter(origin, direction, center, axis).map(|s| center + axis * s)
        }
        (_, plane) => on_plane(plane.direction()),
    }
}

/// Proxy after dragging `handle` from `start` to `point`
pub fn drag_proxy(mode: GizmoMode, drag: &GizmoDrag, point: Vec3, cursor: Vec2) -> GizmoProxy {
    let mut proxy = drag.baseline;
    let center = drag.baseline.translation;
    let handle = drag.handle;
    match mode {
        GizmoMode::Translate => {
            let mut offset = point - drag.start_point;
            if handle.axis_count() == 1 {
                offset = handle.direction() * offset.dot(handle.direction());
            }
            proxy.translation += offset;
        }
        GizmoMode::Rotate => {
            let axis = handle.direction();
            let from = drag.start_point - center;
            let to = point - center;
            let angle = from.cross(to).dot(axis).atan2(from.dot(to));
            proxy.rotation += axis * angle;
        }
        GizmoMode::Scale => {
            let factor = match handle {
                GizmoHandle::XYZ => {
                    1.0 + (drag.start_cursor.y - cursor.y) / gizmo_sizes::UNIFORM_SCALE_PIXELS
                }
                GizmoHandle::X | GizmoHandle::Y | GizmoHandle::Z => {
                    1.0 + (point - drag.start_point).dot(handle.direction()) / drag.length
                }
                _ => {
                    let from = (drag.start_point - center).length();
                    if from < 1e-4 {
                        1.0
                    } else {
                        (point - center).length() / from
                    }
                }
            };
            proxy.scale = Vec3::select(handle.axes(), drag.baseline.scale * factor, drag.baseline.scale);
        }
    }
    proxy
}

/// Convert the proxy change into the entity convention: Y translation is
/// mirrored, turns around X and Z change sign.
pub fn proxy_delta(baseline: &GizmoProxy, current: &GizmoProxy, handle: GizmoHandle) -> TransformDelta {
    let turn = current.rotation - baseline.rotation;
    let damping = if handle.axis_count() == 1 {
        1.0
    } else {
        MULTI_AXIS_SCALE_DAMPING
    };
    let ratio = current.scale / baseline.scale;
    TransformDelta {
        translation: to_scene(current.translation - baseline.translation),
        rotation: Vec3::new(-turn.x.to_degrees(), turn.y.to_degrees(), -turn.z.to_degrees()),
        scale: Vec3::ONE + (ratio - Vec3::ONE) * damping,
    }
}

/// Snap each moved axis so the anchor lands on the grid
pub fn snap_translation(grid: &EditorGrid, anchor: Vec3, translation: Vec3, axes: BVec3) -> Vec3 {
    let target = anchor + translation;
    let snapped = Vec3::new(grid.snapped_x(target.x), grid.snapped_y(target.y), grid.snapped_z(target.z));
    Vec3::select(axes, snapped - anchor, translation)
}

pub(crate) fn handle_gizmo_hotkeys(input: Res<EditorInput>, mut gizmo: ResMut<TransformGizmo>) {
    if gizmo.is_dragging() || input.any_modifier() {
        return;
    }
    let mode = if input.key_just_pressed(KeyCode::Digit1) {
        GizmoMode::Translate
    } else if input.key_just_pressed(KeyCode::Digit2) {
        GizmoMode::Rotate
    } else if input.key_just_pressed(KeyCode::Digit3) {
        GizmoMode::Scale
    } else {
        return;
    };
    if gizmo.mode != mode {
        info!("Gizmo mode: {:?}", mode);
        gizmo.mode = mode;
    }
}

fn begin_editing(commands: &mut Commands, entities: impl IntoIterator<Item = Entity>) {
    for entity in entities {
        if let Ok(mut entity_commands) = commands.get_entity(entity) {
            entity_commands.try_insert((BeingEdited, Sleeping, SleepingDisabled));
        }
    }
}

/// Wake every body put to sleep by an edit
pub(crate) fn end_editing(commands: &mut Commands, being_edited: &Query<Entity, With<BeingEdited>>) {
    for entity in being_edited {
        commands
            .entity(entity)
            .try_remove::<(BeingEdited, Sleeping, SleepingDisabled)>();
    }
}

pub(crate) fn put_to_sleep(commands: &mut Commands, entities: &[Entity]) {
    begin_editing(commands, entities.iter().copied());
}

/// Drive the grabbed handle and move the selection with it
#[allow(clippy::too_many_arguments)]
pub(crate) fn drag_selection_with_gizmo(
    mut commands: Commands,
    input: Res<EditorInput>,
    picker: ScenePicker,
    flags: InstanceFlags,
    selection: Res<Selection>,
    being_edited: Query<Entity, With<BeingEdited>>,
    mut gizmo: ResMut<TransformGizmo>,
    mut mover: ResMut<ObjectMover>,
    mut grid: ResMut<EditorGrid>,
    mut pending: ResMut<PendingChanges>,
    mut proxies: Query<(&mut GizmoProxy, &mut Transform)>,
    mut instances: Query<(&mut Placement, Has<Object3d>)>,
) {
    let proxy_entity = gizmo.proxy.filter(|_| gizmo.visible);
    let Some((mut proxy, mut proxy_transform)) = proxy_entity.and_then(|entity| proxies.get_mut(entity).ok()) else {
        gizmo.hovered = None;
        if gizmo.drag.take().is_some() && mover.end() {
            pending.selection_modified();
        }
        return;
    };

    let view = picker.view();
    let (origin, direction) = view.ray(input.cursor);
    let (origin, direction) = (to_render(origin), to_render(direction));
    let camera_forward = to_render(view.forward);
    let mode = gizmo.mode;

    let Some(drag) = gizmo.drag else {
        let length = handle_length(proxy.translation, origin);
        gizmo.hovered = if input.touch_count() > 0 {
            None
        } else {
            pick_handle(mode, proxy.translation, length, origin, direction)
        };

        let Some(handle) = gizmo.hovered else {
            return;
        };
        if let Some(attached) = gizmo.attached
            && let Ok((placement, is_3d)) = instances.get(attached)
        {
            if mode == GizmoMode::Translate {
                let normal = GridNormal::for_movement(handle.axes().x, handle.axes().y, handle.axes().z, picker.camera_yaw());
                grid.place(normal, placement.position);
            }
            if !input.mouse.just_pressed(MouseButton::Left) {
                return;
            }
            let Some(start_point) = handle_point(mode, handle, proxy.translation, camera_forward, origin, direction) else {
                return;
            };
            gizmo.drag = Some(GizmoDrag {
                handle,
                baseline: *proxy,
                length,
                start_point,
                start_cursor: input.cursor,
                anchor: placement.position,
                anchor_is_3d: is_3d,
            });
            gizmo.selection_moved = false;
            mover.start();
            let editable: Vec<Entity> = selection
                .entities()
                .iter()
                .copied()
                .filter(|entity| !flags.is_locked(*entity))
                .collect();
            put_to_sleep(&mut commands, &editable);
            debug!("Grabbed {:?} handle in {:?} mode", handle, mode);
        }
        return;
    };

    if !input.pressed(MouseButton::Left) {
        gizmo.drag = None;
        gizmo.selection_moved = false;
        if mover.end() {
            info!("Moved {} entities with the gizmo", selection.len());
            pending.selection_modified();
        }
        end_editing(&mut commands, &being_edited);
        return;
    }

    let Some(point) = handle_point(mode, drag.handle, drag.baseline.translation, camera_forward, origin, direction)
    else {
        return;
    };
    let moved_proxy = drag_proxy(mode, &drag, point, input.cursor);
    let mut delta = proxy_delta(&drag.baseline, &moved_proxy, drag.handle);

    if mode == GizmoMode::Translate {
        if drag.handle == GizmoHandle::XYZ {
            let cursor = if drag.anchor_is_3d {
                picker.cursor_in_3d(selection.entities())
            } else {
                picker.projected_cursor()
            };
            // The anchor follows the cursor; no hit means no move
            delta.translation = cursor.map_or(Vec3::ZERO, |cursor| cursor - drag.anchor);
            if !drag.anchor_is_3d {
                delta.translation.z = 0.0;
            }
        }
        if grid.is_spanning(input.alt()) {
            delta.translation = snap_translation(&grid, drag.anchor, delta.translation, drag.handle.axes());
        }
        let axes = drag.handle.axes();
        grid.place(
            GridNormal::for_movement(axes.x, axes.y, axes.z, picker.camera_yaw()),
            drag.anchor + delta.translation,
        );
    }

    for entity in selection.entities() {
        if let Ok((mut placement, is_3d)) = instances.get_mut(*entity) {
            mover.move_object(*entity, &mut placement, is_3d, flags.is_locked(*entity), &delta);
        }
    }
    if !delta.is_identity() {
        gizmo.selection_moved = true;
    }

    *proxy = moved_proxy;
    if mode == GizmoMode::Translate {
        proxy.translation = drag.baseline.translation + to_render(delta.translation);
    }
    *proxy_transform = proxy.transform();
}

/// Attach the gizmo to the last editable selected entity and park its proxy
/// on it. Skipped on the first frame after a scene switch, when new
/// entities may not be settled yet.
#[allow(clippy::too_many_arguments)]
pub(crate) fn refresh_transform_gizmo(
    mut commands: Commands,
    mut state: ResMut<EditorState>,
    input: Res<EditorInput>,
    entity_drag: Res<EntityDrag>,
    selection: Res<Selection>,
    flags: InstanceFlags,
    instances: Query<(&Placement, Has<Object3d>)>,
    mut gizmo: ResMut<TransformGizmo>,
    mut proxies: Query<(&mut GizmoProxy, &mut Transform)>,
) {
    if state.first_frame {
        state.first_frame = false;
        return;
    }
    if gizmo.is_dragging() {
        return;
    }

    let attached = selection.last_selected(|entity| !flags.is_editable(entity));
    let placed = attached.and_then(|entity| instances.get(entity).ok());
    let visible = placed.is_some() && !input.space() && input.touch_count() < 2 && !entity_drag.is_dragging();
    gizmo.attached = attached;
    gizmo.visible = visible;

    let Some((placement, is_3d)) = placed.filter(|_| visible) else {
        gizmo.hovered = None;
        if let Some(proxy) = gizmo.proxy.take()
            && let Ok(mut entity_commands) = commands.get_entity(proxy)
        {
            entity_commands.despawn();
        }
        return;
    };

    let anchor = if gizmo.mode == GizmoMode::Rotate {
        placement.center(is_3d)
    } else {
        placement.position
    };
    let rest = GizmoProxy::at(to_render(anchor));
    match gizmo.proxy.and_then(|entity| proxies.get_mut(entity).ok()) {
        Some((mut proxy, mut transform)) => {
            if *proxy != rest {
                *proxy = rest;
                *transform = rest.transform();
            }
        }
        None => {
            let proxy = commands
                .spawn((Name::new("Gizmo Proxy"), rest, rest.transform()))
                .id();
            gizmo.proxy = Some(proxy);
        }
    }
}

pub(crate) fn draw_transform_gizmo(
    gizmo: Res<TransformGizmo>,
    picker: ScenePicker,
    proxies: Query<&GizmoProxy>,
    mut gizmos: Gizmos<EditorGizmos>,
) {
    if !gizmo.visible {
        return;
    }
    let Some(proxy) = gizmo.proxy.and_then(|entity| proxies.get(entity).ok()) else {
        return;
    };
    let center = proxy.translation;
    let length = gizmo
        .drag
        .map_or_else(|| handle_length(center, to_render(picker.camera_position())), |drag| drag.length);
    let active = gizmo.active_handle();
    let color = |handle: GizmoHandle| {
        if active == Some(handle) {
            gizmo_colors::HIGHLIGHT
        } else {
            handle.color()
        }
    };

    match gizmo.mode {
        GizmoMode::Rotate => {
            let rotation = proxy.transform().rotation;
            for handle in GizmoHandle::AXES {
                let normal = rotation * handle.direction();
                gizmos
                    .circle(
                        Isometry3d::new(center, Quat::from_rotation_arc(Vec3::Z, normal)),
                        length * gizmo_sizes::RING_RADIUS,
                        color(handle),
                    )
                    .resolution(gizmo_sizes::RING_SEGMENTS);
            }
        }
        mode => {
            for handle in GizmoHandle::AXES {
                let end = center + handle.direction() * length;
                if mode == GizmoMode::Translate {
                    gizmos.arrow(center, end, color(handle));
                } else {
                    gizmos.line(center, end, color(handle));
                    gizmos.cube(
                        Transform::from_translation(end).with_scale(Vec3::splat(length * 0.08)),
                        color(handle),
                    );
                }
            }
            let low = length * gizmo_sizes::PLANE_HANDLE_OFFSET;
            let high = low + length * gizmo_sizes::PLANE_HANDLE_SIZE;
            for handle in GizmoHandle::PLANES {
                let (u, v) = handle.plane_axes();
                let corners = [
                    center + u * low + v * low,
                    center + u * high + v * low,
                    center + u * high + v * high,
                    center + u * low + v * high,
                ];
                gizmos.linestrip([corners[0], corners[1], corners[2], corners[3], corners[0]], color(handle));
            }
            gizmos.sphere(
                Isometry3d::from_translation(center),
                length * gizmo_sizes::PICK_RADIUS,
                color(GizmoHandle::XYZ),
            );
        }
    }
}
