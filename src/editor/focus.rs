use bevy::prelude::*;
use bevy::window::WindowFocused;
use bevy_egui::EguiContexts;

/// Who currently owns the user's input.
///
/// Inserted when the editor starts and removed when it is deactivated, so
/// nothing about focus outlives the editor itself.
#[derive(Resource, Debug)]
pub struct InputFocusTracker {
    window_focused: bool,
    had_focus: bool,
    ui_wants_pointer: bool,
    ui_wants_keyboard: bool,
}

impl Default for InputFocusTracker {
    fn default() -> Self {
        Self {
            window_focused: true,
            had_focus: true,
            ui_wants_pointer: false,
            ui_wants_keyboard: false,
        }
    }
}

impl InputFocusTracker {
    pub fn window_focused(&self) -> bool {
        self.window_focused
    }

    pub fn set_window_focused(&mut self, focused: bool) {
        self.window_focused = focused;
    }

    /// Close the frame, returning `true` when focus was lost since the last one
    pub fn end_frame(&mut self) -> bool {
        let lost = self.had_focus && !self.window_focused;
        self.had_focus = self.window_focused;
        lost
    }

    pub fn set_ui_wants(&mut self, pointer: bool, keyboard: bool) {
        self.ui_wants_pointer = pointer;
        self.ui_wants_keyboard = keyboard;
    }

    pub fn pointer_captured(&self) -> bool {
        self.ui_wants_pointer
    }

    pub fn keyboard_captured(&self) -> bool {
        self.ui_wants_keyboard || !self.window_focused
    }
}

/// Release every held key when the window is blurred, so keys released while
/// another window had focus do not stay stuck down.
pub(crate) fn track_window_focus(
    mut focus_events: MessageReader<WindowFocused>,
    mut tracker: ResMut<InputFocusTracker>,
    mut keys: ResMut<ButtonInput<KeyCode>>,
    mut mouse: ResMut<ButtonInput<MouseButton>>,
) {
    for event in focus_events.read() {
        tracker.set_window_focused(event.focused);
    }
    if tracker.end_frame() {
        debug!("Editor window lost focus, releasing held input");
        keys.release_all();
        mouse.release_all();
    }
}

pub(crate) fn track_ui_focus(mut contexts: EguiContexts, mut tracker: ResMut<InputFocusTracker>) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };
    let pointer = ctx.wants_pointer_input() || ctx.is_pointer_over_area();
    let keyboard = ctx.wants_keyboard_input();
    tracker.set_ui_wants(pointer, keyboard);
}
