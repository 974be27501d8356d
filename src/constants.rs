//! Centralized constants for the editor
//!
//! Colors, camera tuning values and interaction thresholds shared across
//! the editor modules.

use bevy::prelude::*;

/// Outline colors for instance bounding boxes, indexed by state flags
pub mod outline_colors {
    use super::*;

    /// Hovered only (#54daff)
    pub const HOVERED: Color = Color::srgb(0.329, 0.855, 1.0);
    /// Selected only (#f2a63c)
    pub const SELECTED: Color = Color::srgb(0.949, 0.651, 0.235);
    /// Selected and hovered (#ffd200)
    pub const SELECTED_HOVERED: Color = Color::srgb(1.0, 0.824, 0.0);
    /// Locked and hovered (#b02715)
    pub const LOCKED_HOVERED: Color = Color::srgb(0.690, 0.153, 0.082);
    /// Locked and selected (#b87f7f)
    pub const LOCKED_SELECTED: Color = Color::srgb(0.722, 0.498, 0.498);
    /// Locked, selected and hovered (#f51e02)
    pub const LOCKED_SELECTED_HOVERED: Color = Color::srgb(0.961, 0.118, 0.008);
    /// Any other combination (#aaaaaa)
    pub const FALLBACK: Color = Color::srgb(0.667, 0.667, 0.667);

    /// Inner area wireframe (#444444)
    pub const INNER_AREA: Color = Color::srgb(0.267, 0.267, 0.267);
    /// Selection rectangle border (#f2a63c)
    pub const RECTANGLE: Color = SELECTED;
}

/// Transform gizmo handle colors
pub mod gizmo_colors {
    use super::*;

    /// X axis (#f53e63)
    pub const X: Color = Color::srgb(0.961, 0.243, 0.388);
    /// Y axis (#a4e507)
    pub const Y: Color = Color::srgb(0.643, 0.898, 0.027);
    /// Z axis (#36a9f5)
    pub const Z: Color = Color::srgb(0.212, 0.663, 0.961);
    /// Hovered or dragged handle (#eeeeee)
    pub const HIGHLIGHT: Color = Color::srgb(0.933, 0.933, 0.933);
    /// Handle moving on all axes at once
    pub const CENTER: Color = Color::srgb(0.6, 0.6, 0.6);

    /// Editing grid lines
    pub const GRID: Color = Color::srgba(0.8, 0.8, 0.8, 0.35);
}

/// Editor camera tuning
pub mod camera {
    /// Vertical field of view of the editor camera, in degrees
    pub const FOV_DEGREES: f32 = 45.0;
    /// Near clip plane
    pub const NEAR: f32 = 1.0;
    /// Far clip plane
    pub const FAR: f32 = 100_000.0;

    pub const ORBIT_DEFAULT_DISTANCE: f32 = 800.0;
    pub const ORBIT_DEFAULT_ELEVATION: f32 = 90.0;
    pub const FREE_DEFAULT_ELEVATION: f32 = 30.0;
    pub const MIN_ORBIT_DISTANCE: f32 = 10.0;
    /// Large enough to orbit quickly on most parts of a level
    pub const ORBIT_AROUND_Z0_MAX_DISTANCE: f32 = 4000.0;

    /// Degrees of rotation per pixel of pointer drag
    pub const ROTATION_SPEED: f32 = 0.2;
    /// Degrees of rotation per pixel of three-finger drag
    pub const TILT_SPEED: f32 = 0.2;
    pub const MIN_TOUCH_ELEVATION: f32 = 5.0;
    pub const MAX_TOUCH_ELEVATION: f32 = 175.0;
    /// Pixels of wheel travel per scrolled line
    pub const WHEEL_LINE_PIXELS: f32 = 100.0;
    /// Wheel delta producing a 2x zoom on the orbit camera
    pub const WHEEL_ZOOM_DIVISOR: f32 = 512.0;

    pub const MOVE_SPEED: f32 = 6.0;
    pub const FAST_MOVE_SPEED: f32 = 48.0;
    pub const WHEEL_PAN_DIVISOR: f32 = 5.0;
    pub const TOUCH_PAN_FACTOR: f32 = 5.0;
    pub const TOUCH_PINCH_FACTOR: f32 = 10.0;
    /// Forward movement of the free camera for one keyboard zoom step
    pub const FREE_ZOOM_STEP: f32 = 200.0;

    /// Keyboard zoom factor exponent (2^(2/16) per step)
    pub const KEYBOARD_ZOOM_EXPONENT: f32 = 2.0 / 16.0;
}

/// Margins used when framing content
pub mod margins {
    pub const INITIAL_POSITION: f32 = 0.1;
    pub const CONTENT: f32 = 0.01;
    pub const SELECTION: f32 = 0.2;
}

/// Pointer interaction thresholds
pub mod interaction {
    /// Maximum cursor travel (pixels) for a press/release to count as a click
    pub const CLICK_TOLERANCE: f32 = 10.0;
    /// Maximum cursor travel (pixels) for a secondary click to open the context menu
    pub const CONTEXT_MENU_TOLERANCE: f32 = 0.0;
    /// Maximum delay between two clicks on the same instance for a double click
    pub const DOUBLE_CLICK_SECONDS: f64 = 0.4;
}

/// Gizmo geometry, in pixels of screen space converted at the gizmo distance
pub mod gizmo_sizes {
    /// Handle length as a fraction of the distance to the camera
    pub const SCREEN_FACTOR: f32 = 0.15;
    /// Pick radius as a fraction of the handle length
    pub const PICK_RADIUS: f32 = 0.08;
    /// Plane handle square offset and size as a fraction of the handle length
    pub const PLANE_HANDLE_OFFSET: f32 = 0.25;
    pub const PLANE_HANDLE_SIZE: f32 = 0.2;
    /// Rotation ring radius as a fraction of the handle length
    pub const RING_RADIUS: f32 = 0.9;
    pub const RING_SEGMENTS: u32 = 48;
    /// Pixels of vertical drag doubling the size with the uniform scale handle
    pub const UNIFORM_SCALE_PIXELS: f32 = 100.0;
}
