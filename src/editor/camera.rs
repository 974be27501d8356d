//! Editor camera: a free-fly camera and an orbit camera sharing one view.
//!
//! Only one of the two is active. Switching keeps the angles and recomputes
//! the position or target so the view does not jump.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::EditorInput;
use crate::commands::EditorNotification;
use crate::constants::camera::*;
use crate::picking::EditorView;
use crate::scene::{Object3d, Placement, to_render};
use crate::selection::{Aabb3, Selection};

/// Marker component for the camera driven by the editor
#[derive(Component)]
pub struct EditorCamera;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraMode {
    #[default]
    Free,
    Orbit,
}

/// Forward, right and screen-up vectors for a camera turned by `yaw` around
/// Z and looking down by `elevation` (both in degrees).
pub fn camera_basis(yaw: f32, elevation: f32) -> (Vec3, Vec3, Vec3) {
    let (sin_yaw, cos_yaw) = yaw.to_radians().sin_cos();
    let (sin_el, cos_el) = elevation.to_radians().sin_cos();
    let forward = Vec3::new(sin_yaw * cos_el, -cos_yaw * cos_el, -sin_el);
    let right = Vec3::new(cos_yaw, sin_yaw, 0.0);
    let up = forward.cross(right).normalize_or(Vec3::Z);
    (forward, right, up)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FreeCamera {
    pub position: Vec3,
    pub rotation_angle: f32,
    pub elevation_angle: f32,
}

impl Default for FreeCamera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation_angle: 0.0,
            elevation_angle: FREE_DEFAULT_ELEVATION,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub rotation_angle: f32,
    pub elevation_angle: f32,
    pub distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            rotation_angle: 0.0,
            elevation_angle: ORBIT_DEFAULT_ELEVATION,
            distance: ORBIT_DEFAULT_DISTANCE,
        }
    }
}

impl OrbitCamera {
    pub fn forward(&self) -> Vec3 {
        camera_basis(self.rotation_angle, self.elevation_angle).0
    }

    pub fn position(&self) -> Vec3 {
        self.target - self.forward() * self.distance
    }

    /// Orbit around the point where a camera at `position` looks at Z = 0,
    /// or `max_distance` ahead when that point is missing or too far.
    pub fn orbit_from_position_around_z0(&mut self, position: Vec3, max_distance: f32) {
        let forward = self.forward();
        let on_ground = (forward.z.abs() > 1e-6)
            .then(|| -position.z / forward.z)
            .filter(|t| *t > 0.0 && *t <= max_distance);
        let distance = on_ground.unwrap_or(max_distance);
        self.target = position + forward * distance;
        self.distance = distance;
    }
}

/// Camera state exchanged with the host so a view survives reloads.
/// For the orbit camera `position` is the target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EditorCameraState {
    pub camera_mode: CameraMode,
    pub position: Vec3,
    pub rotation_angle: f32,
    pub elevation_angle: f32,
    pub distance: f32,
}

/// Movement tuning, loaded from the editor settings
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSpeeds {
    /// Units per frame for the movement keys
    pub move_speed: f32,
    /// Units per frame for the movement keys with Shift held
    pub fast_move_speed: f32,
    /// Degrees per pixel of pointer drag
    pub rotation_speed: f32,
}

impl Default for CameraSpeeds {
    fn default() -> Self {
        Self {
            move_speed: MOVE_SPEED,
            fast_move_speed: FAST_MOVE_SPEED,
            rotation_speed: ROTATION_SPEED,
        }
    }
}

/// Tracks the touches of the gesture in progress
#[derive(Clone, Debug, Default)]
struct TouchGesture {
    ids: Vec<u64>,
    centroid: Vec2,
    distance: f32,
}

impl TouchGesture {
    /// Returns the centroid and distance deltas when the same touches are
    /// still down, restarting the gesture otherwise.
    fn track(&mut self, input: &EditorInput) -> Option<(Vec2, f32)> {
        let ids = input.touch_ids();
        let centroid = input.touch_centroid();
        let distance = input.touch_distance();
        if ids.is_empty() || ids != self.ids {
            self.ids = ids;
            self.centroid = centroid;
            self.distance = distance;
            return None;
        }
        let deltas = (centroid - self.centroid, distance - self.distance);
        self.centroid = centroid;
        self.distance = distance;
        Some(deltas)
    }
}

#[derive(Resource, Debug, Clone)]
pub struct EditorCameraController {
    mode: CameraMode,
    pub free: FreeCamera,
    pub orbit: OrbitCamera,
    pub speeds: CameraSpeeds,
    /// The wheel zooms without Ctrl/Cmd (trackpads on macOS pan instead)
    pub wheel_zooms_by_default: bool,
    has_changed: bool,
    had_changed: bool,
    last_cursor: Vec2,
    was_right_pressed: bool,
    was_middle_pressed: bool,
    gesture: TouchGesture,
}

impl Default for EditorCameraController {
    fn default() -> Self {
        Self {
            mode: CameraMode::default(),
            free: FreeCamera::default(),
            orbit: OrbitCamera::default(),
            speeds: CameraSpeeds::default(),
            wheel_zooms_by_default: !cfg!(target_os = "macos"),
            has_changed: false,
            had_changed: false,
            last_cursor: Vec2::ZERO,
            was_right_pressed: false,
            was_middle_pressed: false,
            gesture: TouchGesture::default(),
        }
    }
}

impl EditorCameraController {
    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn is_free(&self) -> bool {
        self.mode == CameraMode::Free
    }

    pub fn rotation_angle(&self) -> f32 {
        match self.mode {
            CameraMode::Free => self.free.rotation_angle,
            CameraMode::Orbit => self.orbit.rotation_angle,
        }
    }

    pub fn elevation_angle(&self) -> f32 {
        match self.mode {
            CameraMode::Free => self.free.elevation_angle,
            CameraMode::Orbit => self.orbit.elevation_angle,
        }
    }

    /// Camera position in scene space
    pub fn position(&self) -> Vec3 {
        match self.mode {
            CameraMode::Free => self.free.position,
            CameraMode::Orbit => self.orbit.position(),
        }
    }

    /// Point the camera is anchored on: the free position or the orbit target
    pub fn anchor(&self) -> Vec3 {
        match self.mode {
            CameraMode::Free => self.free.position,
            CameraMode::Orbit => self.orbit.target,
        }
    }

    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        camera_basis(self.rotation_angle(), self.elevation_angle())
    }

    pub fn view(&self, viewport: Vec2) -> EditorView {
        let (forward, right, up) = self.basis();
        EditorView {
            position: self.position(),
            forward,
            right,
            up,
            fov_y: FOV_DEGREES.to_radians(),
            viewport,
        }
    }

    /// Transform of the rendering camera
    pub fn render_transform(&self) -> Transform {
        let (forward, _, up) = self.basis();
        Transform::from_translation(to_render(self.position())).looking_to(to_render(forward), to_render(up))
    }

    pub fn mark_changed(&mut self) {
        self.has_changed = true;
    }

    pub fn switch_to_free(&mut self) {
        if self.mode == CameraMode::Orbit {
            self.free = FreeCamera {
                position: self.orbit.position(),
                rotation_angle: self.orbit.rotation_angle,
                elevation_angle: self.orbit.elevation_angle,
            };
            self.mode = CameraMode::Free;
        }
        self.mark_changed();
    }

    pub fn switch_to_orbit_around_position(&mut self, target: Vec3) {
        if self.mode == CameraMode::Free {
            self.orbit.rotation_angle = self.free.rotation_angle;
            self.orbit.elevation_angle = self.free.elevation_angle;
        }
        self.orbit.target = target;
        self.mode = CameraMode::Orbit;
        self.mark_changed();
    }

    /// Orbit around what the free camera looks at, without moving it
    pub fn switch_to_orbit_around_z0(&mut self, max_distance: f32) {
        if self.mode == CameraMode::Free {
            self.orbit.rotation_angle = self.free.rotation_angle;
            self.orbit.elevation_angle = self.free.elevation_angle;
            self.orbit.orbit_from_position_around_z0(self.free.position, max_distance);
        }
        self.mode = CameraMode::Orbit;
        self.mark_changed();
    }

    pub fn reset_rotation_to_top_down(&mut self) {
        self.orbit.rotation_angle = 0.0;
        self.orbit.elevation_angle = ORBIT_DEFAULT_ELEVATION;
        self.free.rotation_angle = 0.0;
        self.free.elevation_angle = ORBIT_DEFAULT_ELEVATION;
        self.mark_changed();
    }

    /// Zoom in by `factor` (below one zooms out)
    pub fn zoom_by(&mut self, factor: f32) {
        match self.mode {
            CameraMode::Orbit => self.orbit.distance /= factor,
            CameraMode::Free => {
                let (forward, _, _) = self.basis();
                let step = if factor > 1.0 { FREE_ZOOM_STEP } else { -FREE_ZOOM_STEP };
                self.free.position += forward * step;
            }
        }
        self.mark_changed();
    }

    /// Top-down orbit around the current anchor, at the distance where one
    /// scene unit covers `zoom` pixels.
    pub fn set_zoom(&mut self, zoom: f32, viewport_height: f32) {
        let anchor = self.anchor();
        self.switch_to_orbit_around_position(anchor.with_z(0.0));
        self.reset_rotation_to_top_down();
        self.orbit.distance = distance_for_zoom(zoom, viewport_height);
    }

    /// Frame `area` inside the `visible` fraction of the viewport, leaving
    /// `margin` (a fraction of the binding dimension) on each side.
    pub fn zoom_to_fit_area(&mut self, area: &Aabb3, visible: Rect, viewport: Vec2, margin: f32) {
        let area_size = area.size().truncate();
        let editor_size = visible.size() * viewport;
        let is_content_wider = editor_size.x * area_size.y < area_size.x * editor_size.y;
        let mut zoom = (1.0 - 2.0 * margin)
            * if is_content_wider {
                editor_size.x / area_size.x
            } else {
                editor_size.y / area_size.y
            };
        if !zoom.is_finite() || zoom <= 0.0 {
            zoom = 1.0;
        }
        let center = area.center();
        self.switch_to_orbit_around_position(Vec3::new(center.x, center.y, area.min.z));
        self.reset_rotation_to_top_down();
        self.orbit.distance = distance_for_zoom(zoom, viewport.y);
    }

    pub fn state(&self) -> EditorCameraState {
        match self.mode {
            CameraMode::Free => EditorCameraState {
                camera_mode: CameraMode::Free,
                position: self.free.position,
                rotation_angle: self.free.rotation_angle,
                elevation_angle: self.free.elevation_angle,
                distance: 0.0,
            },
            CameraMode::Orbit => EditorCameraState {
                camera_mode: CameraMode::Orbit,
                position: self.orbit.target,
                rotation_angle: self.orbit.rotation_angle,
                elevation_angle: self.orbit.elevation_angle,
                distance: self.orbit.distance,
            },
        }
    }

    pub fn restore(&mut self, state: &EditorCameraState) {
        self.mode = state.camera_mode;
        match state.camera_mode {
            CameraMode::Free => {
                self.free = FreeCamera {
                    position: state.position,
                    rotation_angle: state.rotation_angle,
                    elevation_angle: state.elevation_angle,
                };
            }
            CameraMode::Orbit => {
                self.orbit = OrbitCamera {
                    target: state.position,
                    rotation_angle: state.rotation_angle,
                    elevation_angle: state.elevation_angle,
                    distance: state.distance,
                };
            }
        }
        self.mark_changed();
    }

    fn should_zoom(&self, input: &EditorInput) -> bool {
        input.ctrl_or_cmd() || (self.wheel_zooms_by_default && !input.any_modifier())
    }

    /// Apply one frame of input. `focus` is the point `F` orbits around.
    pub fn step(&mut self, input: &EditorInput, focus: Option<Vec3>) {
        self.apply_transitions(input, focus);
        match self.mode {
            CameraMode::Free => self.step_free(input),
            CameraMode::Orbit => self.step_orbit(input),
        }
        self.was_right_pressed = input.pressed(MouseButton::Right);
        self.was_middle_pressed = input.pressed(MouseButton::Middle);
        self.last_cursor = input.cursor;
    }

    fn apply_transitions(&mut self, input: &EditorInput, focus: Option<Vec3>) {
        let middle = input.pressed(MouseButton::Middle);
        if self.mode == CameraMode::Orbit
            && ((input.space() && input.pressed(MouseButton::Left))
                || (input.shift() && middle)
                || input.touch_count() == 2)
        {
            self.switch_to_free();
            self.gesture = TouchGesture::default();
        }
        if self.mode == CameraMode::Free
            && ((!input.shift() && middle)
                || input.touch_count() == 3
                || (input.key_pressed(KeyCode::KeyO) && !input.any_modifier()))
        {
            self.switch_to_orbit_around_z0(ORBIT_AROUND_Z0_MAX_DISTANCE);
            self.gesture = TouchGesture::default();
        }
        if input.key_just_pressed(KeyCode::KeyF)
            && !input.any_modifier()
            && let Some(focus) = focus
        {
            self.switch_to_orbit_around_position(focus);
        }
    }

    fn keyboard_zoom(&mut self, input: &EditorInput) {
        if !input.ctrl_or_cmd() {
            return;
        }
        if input.key_just_pressed(KeyCode::Equal) {
            self.zoom_by(2f32.powf(KEYBOARD_ZOOM_EXPONENT));
        } else if input.key_just_pressed(KeyCode::Minus) {
            self.zoom_by(2f32.powf(-KEYBOARD_ZOOM_EXPONENT));
        }
    }

    fn step_free(&mut self, input: &EditorInput) {
        let (forward, right, up) = camera_basis(self.free.rotation_angle, self.free.elevation_angle);
        let mut movement = Vec3::ZERO;

        let wheel = input.wheel;
        if wheel.y != 0.0 && self.should_zoom(input) {
            movement += forward * wheel.y;
        } else if wheel.y != 0.0 && input.alt() {
            movement += right * (wheel.y / WHEEL_PAN_DIVISOR);
        } else if wheel != Vec2::ZERO {
            movement += up * (wheel.y / WHEEL_PAN_DIVISOR) + right * (wheel.x / WHEEL_PAN_DIVISOR);
        }

        if input.touch_count() == 2 {
            if let Some((centroid, distance)) = self.gesture.track(input) {
                let pan = centroid * TOUCH_PAN_FACTOR;
                movement += up * pan.y - right * pan.x;
                movement += forward * (distance * TOUCH_PINCH_FACTOR);
            }
        } else {
            self.gesture.track(input);
        }

        if !input.ctrl_or_cmd() && !input.alt() {
            let speed = if input.shift() {
                self.speeds.fast_move_speed
            } else {
                self.speeds.move_speed
            };
            let bindings = [
                (KeyCode::ArrowLeft, -right),
                (KeyCode::ArrowRight, right),
                (KeyCode::ArrowUp, up),
                (KeyCode::ArrowDown, -up),
                (KeyCode::KeyW, forward),
                (KeyCode::KeyS, -forward),
                (KeyCode::KeyA, -right),
                (KeyCode::KeyD, right),
                (KeyCode::KeyQ, -up),
                (KeyCode::KeyE, up),
            ];
            for (key, direction) in bindings {
                if input.key_pressed(key) {
                    movement += direction * speed;
                }
            }
        }

        let panning = (input.space() && input.pressed(MouseButton::Left))
            || (input.shift() && input.pressed(MouseButton::Middle));
        if panning {
            let drag = self.last_cursor - input.cursor;
            movement += up * -drag.y + right * drag.x;
        }

        if movement != Vec3::ZERO {
            self.free.position += movement;
            self.mark_changed();
        }

        if input.pressed(MouseButton::Right) && self.was_right_pressed {
            let delta = input.cursor - self.last_cursor;
            if delta != Vec2::ZERO {
                self.free.rotation_angle += delta.x * self.speeds.rotation_speed;
                self.free.elevation_angle += delta.y * self.speeds.rotation_speed;
                self.mark_changed();
            }
        }

        self.keyboard_zoom(input);
    }

    fn step_orbit(&mut self, input: &EditorInput) {
        let rotating = (input.pressed(MouseButton::Right) && self.was_right_pressed)
            || (input.pressed(MouseButton::Middle) && self.was_middle_pressed);
        if rotating {
            let delta = input.cursor - self.last_cursor;
            if delta != Vec2::ZERO {
                self.orbit.rotation_angle += delta.x * self.speeds.rotation_speed;
                self.orbit.elevation_angle += delta.y * self.speeds.rotation_speed;
                self.mark_changed();
            }
        }

        if input.wheel.y != 0.0 && self.should_zoom(input) {
            let factor = 2f32.powf(-input.wheel.y / WHEEL_ZOOM_DIVISOR);
            self.orbit.distance = (self.orbit.distance * factor).max(MIN_ORBIT_DISTANCE);
            self.mark_changed();
        }

        self.keyboard_zoom(input);

        let gesture = self.gesture.track(input);
        if input.touch_count() == 3
            && let Some((centroid, _)) = gesture
            && centroid != Vec2::ZERO
        {
            self.orbit.rotation_angle += centroid.x * TILT_SPEED;
            self.orbit.elevation_angle =
                (self.orbit.elevation_angle + centroid.y * TILT_SPEED).clamp(MIN_TOUCH_ELEVATION, MAX_TOUCH_ELEVATION);
            self.mark_changed();
        }
    }

    /// Close the frame. Returns true once motion has stopped after a change,
    /// so continuous motion is reported a single time.
    pub fn end_frame(&mut self) -> bool {
        let settled = self.had_changed && !self.has_changed;
        self.had_changed = self.has_changed;
        self.has_changed = false;
        settled
    }
}

/// Orbit distance at which one scene unit covers `zoom` pixels
pub fn distance_for_zoom(zoom: f32, viewport_height: f32) -> f32 {
    0.5 * viewport_height / zoom / (0.5 * FOV_DEGREES.to_radians()).tan()
}

pub(crate) fn spawn_editor_camera(mut commands: Commands, controller: Res<EditorCameraController>) {
    commands.spawn((
        Name::new("Editor Camera"),
        EditorCamera,
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: FOV_DEGREES.to_radians(),
            near: NEAR,
            far: FAR,
            ..default()
        }),
        controller.render_transform(),
    ));
}

/// Step the controller and move the rendering camera
pub(crate) fn step_editor_camera(
    input: Res<EditorInput>,
    selection: Res<Selection>,
    instances: Query<(&Placement, Has<Object3d>)>,
    mut controller: ResMut<EditorCameraController>,
    mut cameras: Query<&mut Transform, With<EditorCamera>>,
) {
    let focus = selection
        .last_selected(|_| false)
        .and_then(|entity| instances.get(entity).ok())
        .map(|(placement, is_3d)| {
            let center = placement.center(is_3d);
            Vec3::new(center.x, center.y, if is_3d { placement.position.z } else { 0.0 })
        });
    controller.step(&input, focus);

    let transform = controller.render_transform();
    for mut camera in &mut cameras {
        *camera = transform;
    }
}

pub(crate) fn notify_camera_changes(
    mut controller: ResMut<EditorCameraController>,
    mut notifications: MessageWriter<EditorNotification>,
) {
    if controller.end_frame() {
        debug!("Camera settled in {:?} mode", controller.mode());
        notifications.write(EditorNotification::CameraStateChanged(controller.state()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn free_at(position: Vec3, yaw: f32, elevation: f32) -> EditorCameraController {
        let mut controller = EditorCameraController::default();
        controller.restore(&EditorCameraState {
            camera_mode: CameraMode::Free,
            position,
            rotation_angle: yaw,
            elevation_angle: elevation,
            distance: 0.0,
        });
        controller
    }

    fn top_down_orbit() -> EditorCameraController {
        let mut controller = EditorCameraController::default();
        controller.restore(&EditorCameraState {
            camera_mode: CameraMode::Orbit,
            position: Vec3::ZERO,
            rotation_angle: 0.0,
            elevation_angle: ORBIT_DEFAULT_ELEVATION,
            distance: ORBIT_DEFAULT_DISTANCE,
        });
        controller
    }

    #[test]
    fn starts_as_a_free_camera_looking_slightly_down() {
        let controller = EditorCameraController::default();
        assert!(controller.is_free());
        assert_eq!(controller.elevation_angle(), FREE_DEFAULT_ELEVATION);
        assert_eq!(controller.position(), Vec3::ZERO);
    }

    #[test]
    fn basis_is_orthonormal() {
        for (yaw, elevation) in [(0.0, 90.0), (30.0, 45.0), (-120.0, 10.0)] {
            let (forward, right, up) = camera_basis(yaw, elevation);
            assert!((forward.length() - 1.0).abs() < 1e-5);
            assert!(forward.dot(right).abs() < 1e-5);
            assert!(forward.dot(up).abs() < 1e-5);
            assert!(right.dot(up).abs() < 1e-5);
        }
        let (forward, _, up) = camera_basis(0.0, 90.0);
        assert!(forward.abs_diff_eq(-Vec3::Z, 1e-5));
        // Looking straight down, screen up is towards negative Y
        assert!(up.abs_diff_eq(-Vec3::Y, 1e-5));
    }

    #[test]
    fn free_orbit_free_keeps_the_view() {
        let position = Vec3::new(120.0, -40.0, 300.0);
        let mut controller = free_at(position, 35.0, 40.0);

        controller.switch_to_orbit_around_z0(ORBIT_AROUND_Z0_MAX_DISTANCE);
        assert_eq!(controller.mode(), CameraMode::Orbit);
        assert!(controller.position().abs_diff_eq(position, 1e-2));
        assert!(controller.orbit.target.z.abs() < 1e-2);

        controller.switch_to_free();
        assert_eq!(controller.mode(), CameraMode::Free);
        assert!(controller.position().abs_diff_eq(position, 1e-2));
        assert_eq!(controller.rotation_angle(), 35.0);
        assert_eq!(controller.elevation_angle(), 40.0);
    }

    #[test]
    fn orbit_around_z0_clamps_to_max_distance() {
        // Looking up: the ground is behind the camera
        let mut controller = free_at(Vec3::new(0.0, 0.0, 100.0), 0.0, -30.0);
        controller.switch_to_orbit_around_z0(4000.0);
        assert_eq!(controller.orbit.distance, 4000.0);
    }

    #[test]
    fn zoom_to_fit_fills_binding_dimension() {
        let mut controller = EditorCameraController::default();
        let area = Aabb3::new(Vec3::ZERO, Vec3::new(800.0, 600.0, 0.0));
        let viewport = Vec2::new(1600.0, 1200.0);
        controller.zoom_to_fit_area(&area, Rect::new(0.0, 0.0, 1.0, 1.0), viewport, 0.1);

        assert_eq!(controller.mode(), CameraMode::Orbit);
        assert_eq!(controller.orbit.target, Vec3::new(400.0, 300.0, 0.0));
        assert_eq!(controller.elevation_angle(), 90.0);

        let visible_height = 2.0 * controller.orbit.distance * (0.5 * FOV_DEGREES.to_radians()).tan();
        let visible_width = visible_height * viewport.x / viewport.y;
        assert!((600.0 / visible_height - 0.8).abs() < 1e-4);
        assert!((800.0 / visible_width - 0.8).abs() < 1e-4);
    }

    #[test]
    fn wheel_zoom_is_geometric_and_clamped() {
        let mut controller = top_down_orbit();
        controller.wheel_zooms_by_default = true;
        let mut input = EditorInput::default();
        input.wheel = Vec2::new(0.0, 512.0);
        controller.step(&input, None);
        assert!((controller.orbit.distance - ORBIT_DEFAULT_DISTANCE / 2.0).abs() < 1e-3);

        input.wheel = Vec2::new(0.0, 512.0 * 20.0);
        controller.step(&input, None);
        assert_eq!(controller.orbit.distance, MIN_ORBIT_DISTANCE);
    }

    #[test]
    fn first_drag_frame_does_not_rotate() {
        let mut controller = EditorCameraController::default();
        let mut input = EditorInput::default();
        input.mouse.press(MouseButton::Right);
        input.cursor = Vec2::new(100.0, 100.0);
        controller.step(&input, None);
        assert_eq!(controller.rotation_angle(), 0.0);

        input.cursor = Vec2::new(110.0, 100.0);
        controller.step(&input, None);
        assert!((controller.rotation_angle() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn camera_change_is_reported_once_motion_stops() {
        let mut controller = EditorCameraController::default();
        controller.zoom_by(2.0);
        assert!(!controller.end_frame());
        controller.zoom_by(2.0);
        assert!(!controller.end_frame());
        assert!(controller.end_frame());
        assert!(!controller.end_frame());
    }

    #[test]
    fn state_round_trips_through_ron() {
        let controller = free_at(Vec3::new(1.0, 2.0, 3.0), 10.0, 20.0);
        let text = ron::to_string(&controller.state()).expect("serializes");
        let state: EditorCameraState = ron::from_str(&text).expect("parses");
        assert_eq!(state, controller.state());
    }
}
