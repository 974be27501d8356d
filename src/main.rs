//! Main binary for running the editor standalone on an empty scene.
//!
//! For using the editor as a library in your own project,
//! see the demos directory.

use bevy::prelude::*;
use bevy_ingame_editor::{EditedContainer, EditorPlugin, EditorRequest};

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Bevy In-Game Editor".to_string(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(EditorPlugin::default())
        .add_systems(Startup, open_empty_scene)
        .run();
}

fn open_empty_scene(mut requests: MessageWriter<EditorRequest>) {
    requests.write(EditorRequest::SwitchScene {
        container: EditedContainer::Scene {
            name: "Untitled".to_string(),
        },
        layers: Vec::new(),
        instances: Vec::new(),
        inner_area: None,
        grid: None,
        camera_state: None,
    });
}
