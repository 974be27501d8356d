use bevy::prelude::*;

use crate::selection::Aabb3;

/// Editor-wide state resource
#[derive(Debug, Resource)]
pub struct EditorState {
    /// Whether the editor processes input and draws its overlays
    pub active: bool,
    /// Set by a scene switch. Entities created by the switch may not have a
    /// settled placement until the next frame.
    pub first_frame: bool,
    /// Area the edited container asks to be outlined, if any
    pub inner_area: Option<Aabb3>,
    /// Layer new instances are dropped on
    pub selected_layer: String,
}

impl Default for EditorState {
    fn default() -> Self {
        Self {
            active: true,
            first_frame: false,
            inner_area: None,
            selected_layer: String::new(),
        }
    }
}

/// Run condition for systems that only work while editing
pub fn editor_active(state: Res<EditorState>) -> bool {
    state.active
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_condition_follows_active_flag() {
        let mut world = World::new();
        world.insert_resource(EditorState::default());
        assert!(world.run_system_cached(editor_active).expect("runs"));
        world.resource_mut::<EditorState>().active = false;
        assert!(!world.run_system_cached(editor_active).expect("runs"));
    }
}
