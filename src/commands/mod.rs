mod notify;
mod operations;

pub use notify::*;
pub use operations::*;

use bevy::prelude::*;

use crate::editor::EditorSet;

pub struct CommandsPlugin;

impl Plugin for CommandsPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<EditorNotification>()
            .init_resource::<PendingChanges>()
            .add_systems(
                Update,
                delete_selection_on_key
                    .in_set(EditorSet::ClickSelection)
                    .after(crate::selection::handle_click_selection),
            )
            .add_systems(
                Update,
                (send_instance_changes, mirror_instance_records)
                    .chain()
                    .in_set(EditorSet::Notify),
            );
    }
}
