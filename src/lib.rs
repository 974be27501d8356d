//! # Bevy In-Game Editor
//!
//! A scene editor that runs inside the game while the simulation keeps going.
//! A host editor drives it with [`EditorRequest`] messages and listens to
//! [`EditorNotification`]s describing what the user changed.
//!
//! ## Quick Start
//!
//! ```no_run
//! use bevy::prelude::*;
//! use bevy_ingame_editor::EditorPlugin;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(EditorPlugin::default())
//!         .run();
//! }
//! ```
//!
//! ## Making Entities Editable
//!
//! Scene instances are spawned from [`InstanceRecord`]s by the
//! [`EditorRequest::SwitchScene`] request, or directly with a
//! [`SceneInstanceBundle`]. Add [`Object3d`] to give an instance a depth, a Z
//! position and X/Y rotations. Attach [`RenderNode`]s to the meshes of an
//! instance so it can be picked in 3D.
//!
//! ## Controls
//!
//! - **Select**: click, Shift+click to extend, drag a rectangle, Escape to clear
//! - **Transform**: `1` translate, `2` rotate, `3` scale, then drag a handle
//! - **Duplicate**: Ctrl+drag a selected instance
//! - **Camera**: middle drag orbits, Space+drag or Shift+middle drag flies,
//!   wheel pans (or zooms with Ctrl), `F` focuses the selection, `O` orbits
//!   around what the camera looks at

pub mod commands;
pub mod constants;
pub mod editor;
pub mod gizmos;
pub mod picking;
pub mod scene;
pub mod selection;
pub mod utils;

// Re-export the main plugin and configuration
pub use editor::{EditorPlugin, EditorPluginConfig, EditorSet};

// Re-export the host-facing messages
pub use commands::EditorNotification;
pub use editor::{EditorCameraState, EditorRequest, ObjectCatalog, ZoomTarget};

// Re-export commonly used types
pub use scene::{
    EditedContainer, InstanceRecord, Object3d, PersistentId, Placement, RenderNode, SceneEntity,
    SceneInstanceBundle, SceneLayer,
};

// Re-export selection types
pub use selection::{Selected, Selection};
