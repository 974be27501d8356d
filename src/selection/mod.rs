mod aabb;
mod outline;
mod rectangle;
mod selection;

pub use aabb::*;
pub use outline::*;
pub use rectangle::*;
pub use selection::*;

use bevy::prelude::*;

use crate::editor::EditorSet;

pub struct SelectionPlugin;

impl Plugin for SelectionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Selection>()
            .init_resource::<ClickTracker>()
            .init_resource::<SelectionRectangle>()
            .init_resource::<SelectionOutlines>()
            .add_systems(Update, prune_selection.in_set(EditorSet::Poll))
            .add_systems(Update, update_selection_rectangle.in_set(EditorSet::SelectionRectangle))
            .add_systems(Update, handle_click_selection.in_set(EditorSet::ClickSelection))
            .add_systems(Update, refresh_selection_outlines.in_set(EditorSet::Outline))
            .add_systems(
                Update,
                (sync_selected_markers, draw_selection_outlines, draw_selection_rectangle).in_set(EditorSet::Draw),
            );
    }
}
