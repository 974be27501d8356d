use std::hash::Hash;

use bevy::input::mouse::{AccumulatedMouseScroll, MouseScrollUnit};
use bevy::input::touch::Touches;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use super::InputFocusTracker;
use crate::constants::camera::WHEEL_LINE_PIXELS;

/// A touch currently on the screen
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchPoint {
    pub id: u64,
    pub position: Vec2,
}

/// Input state sampled once at the start of every editor frame.
///
/// Presses that begin while the host UI owns the pointer or keyboard are
/// filtered out, so editor systems only ever see input meant for them.
#[derive(Resource, Default, Debug, Clone)]
pub struct EditorInput {
    pub keys: ButtonInput<KeyCode>,
    pub mouse: ButtonInput<MouseButton>,
    /// Last known cursor position in window pixels
    pub cursor: Vec2,
    pub previous_cursor: Vec2,
    /// Size of the window in logical pixels
    pub viewport: Vec2,
    /// Accumulated wheel movement this frame, in pixels. Positive Y scrolls
    /// up (away from the user).
    pub wheel: Vec2,
    /// Active touches sorted by id
    pub touches: Vec<TouchPoint>,
    /// Cursor position when the primary or secondary button went down
    pub press_origin: Vec2,
}

impl EditorInput {
    pub fn shift(&self) -> bool {
        self.keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight])
    }

    pub fn ctrl(&self) -> bool {
        self.keys.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight])
    }

    pub fn meta(&self) -> bool {
        self.keys.any_pressed([KeyCode::SuperLeft, KeyCode::SuperRight])
    }

    /// Control, or Command on macOS keyboards
    pub fn ctrl_or_cmd(&self) -> bool {
        self.ctrl() || self.meta()
    }

    pub fn alt(&self) -> bool {
        self.keys.any_pressed([KeyCode::AltLeft, KeyCode::AltRight])
    }

    pub fn space(&self) -> bool {
        self.keys.pressed(KeyCode::Space)
    }

    pub fn ctrl_only(&self) -> bool {
        self.ctrl_or_cmd() && !self.shift() && !self.alt()
    }

    pub fn ctrl_shift_only(&self) -> bool {
        self.ctrl_or_cmd() && self.shift() && !self.alt()
    }

    pub fn any_modifier(&self) -> bool {
        self.ctrl_or_cmd() || self.shift() || self.alt()
    }

    pub fn pressed(&self, button: MouseButton) -> bool {
        self.mouse.pressed(button)
    }

    pub fn just_released(&self, button: MouseButton) -> bool {
        self.mouse.just_released(button)
    }

    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys.pressed(key)
    }

    pub fn key_just_pressed(&self, key: KeyCode) -> bool {
        self.keys.just_pressed(key)
    }

    pub fn touch_count(&self) -> usize {
        self.touches.len()
    }

    pub fn touch_ids(&self) -> Vec<u64> {
        self.touches.iter().map(|touch| touch.id).collect()
    }

    pub fn touch_centroid(&self) -> Vec2 {
        if self.touches.is_empty() {
            return Vec2::ZERO;
        }
        let sum: Vec2 = self.touches.iter().map(|touch| touch.position).sum();
        sum / self.touches.len() as f32
    }

    /// Distance between the first two touches
    pub fn touch_distance(&self) -> f32 {
        match self.touches.as_slice() {
            [first, second, ..] => first.position.distance(second.position),
            _ => 0.0,
        }
    }

    pub fn cursor_delta(&self) -> Vec2 {
        self.cursor - self.previous_cursor
    }

    /// The cursor is within `tolerance` pixels of where the last press began
    pub fn cursor_stayed_still(&self, tolerance: f32) -> bool {
        self.cursor.distance_squared(self.press_origin) <= tolerance * tolerance
    }

    /// Fold the raw device state of one frame into the snapshot
    pub fn sample(
        &mut self,
        keys: &ButtonInput<KeyCode>,
        mouse: &ButtonInput<MouseButton>,
        cursor: Option<Vec2>,
        wheel: Vec2,
        touches: Vec<TouchPoint>,
        focus: Option<&InputFocusTracker>,
    ) {
        let pointer_captured = focus.is_some_and(|f| f.pointer_captured());
        let keyboard_captured = focus.is_some_and(|f| f.keyboard_captured());

        let was_primary = self.mouse.pressed(MouseButton::Left);
        let was_secondary = self.mouse.pressed(MouseButton::Right);

        self.keys = gate_buttons(keys, &self.keys, keyboard_captured);
        self.mouse = gate_buttons(mouse, &self.mouse, pointer_captured);
        self.previous_cursor = self.cursor;
        if let Some(cursor) = cursor {
            self.cursor = cursor;
        }
        self.wheel = if pointer_captured { Vec2::ZERO } else { wheel };
        self.touches = if pointer_captured { Vec::new() } else { touches };
        self.touches.sort_by_key(|touch| touch.id);

        if !was_primary
            && !was_secondary
            && (self.mouse.pressed(MouseButton::Left) || self.mouse.pressed(MouseButton::Right))
        {
            self.press_origin = self.cursor;
        }
    }
}

/// Copy `current`, dropping every button that the editor did not already
/// hold when input is captured by someone else.
pub fn gate_buttons<T>(current: &ButtonInput<T>, previous: &ButtonInput<T>, captured: bool) -> ButtonInput<T>
where
    T: Copy + Eq + Hash + Send + Sync + 'static,
{
    let mut gated = current.clone();
    if !captured {
        return gated;
    }
    let touched: Vec<T> = current
        .get_pressed()
        .chain(current.get_just_released())
        .copied()
        .collect();
    for button in touched {
        if !previous.pressed(button) {
            gated.reset(button);
        }
    }
    gated
}

pub(crate) fn poll_editor_input(
    mut input: ResMut<EditorInput>,
    keys: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    scroll: Res<AccumulatedMouseScroll>,
    touches: Res<Touches>,
    windows: Query<&Window, With<PrimaryWindow>>,
    focus: Option<Res<InputFocusTracker>>,
) {
    let (cursor, viewport) = match windows.single() {
        Ok(window) => (window.cursor_position(), Vec2::new(window.width(), window.height())),
        Err(_) => (None, input.viewport),
    };
    input.viewport = viewport;
    let touches = touches
        .iter()
        .map(|touch| TouchPoint {
            id: touch.id(),
            position: touch.position(),
        })
        .collect();
    let wheel = match scroll.unit {
        MouseScrollUnit::Line => scroll.delta * WHEEL_LINE_PIXELS,
        MouseScrollUnit::Pixel => scroll.delta,
    };
    input.sample(&keys, &mouse, cursor, wheel, touches, focus.as_deref());
}
