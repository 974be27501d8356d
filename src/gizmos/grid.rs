//! Editing grid: snapping math and its gizmo rendering.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::EditorGizmos;
use crate::constants::gizmo_colors;
use crate::scene::to_render;
use crate::utils::{angle_difference, round_half_up};

/// Number of cells drawn along each side of the visible grid
const GRID_CELLS: i32 = 10;

/// Snap `value` to a grid of `cell_size` shifted by `offset`.
/// A zero cell size disables snapping.
pub fn snap(value: f32, cell_size: f32, offset: f32) -> f32 {
    if cell_size == 0.0 {
        return value;
    }
    offset + cell_size * round_half_up((value - offset) / cell_size)
}

/// Axis the grid plane is perpendicular to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridNormal {
    X,
    Y,
    #[default]
    Z,
}

impl GridNormal {
    /// Plane for a handle moving along the given axes. Moving on Z alone
    /// picks the vertical plane that faces a camera turned by `camera_yaw`.
    pub fn for_movement(x: bool, y: bool, z: bool, camera_yaw: f32) -> GridNormal {
        if !z {
            return GridNormal::Z;
        }
        if !x && !y {
            let rotation = angle_difference(camera_yaw, 0.0).abs();
            if rotation <= 45.0 || rotation > 135.0 {
                GridNormal::Y
            } else {
                GridNormal::X
            }
        } else if !x {
            GridNormal::X
        } else if !y {
            GridNormal::Y
        } else {
            GridNormal::Z
        }
    }
}

/// Grid configuration shared by the host and the editor
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// Whether the grid may be shown at all
    pub visible: bool,
    /// Cell size per axis (width, height, depth). Zero disables snapping on that axis.
    pub cell_size: Vec3,
    pub offset: Vec3,
    /// Snapping applies unless Alt is held
    pub snap_by_default: bool,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            visible: true,
            cell_size: Vec3::new(32.0, 32.0, 32.0),
            offset: Vec3::ZERO,
            snap_by_default: false,
        }
    }
}

/// The editing grid as currently placed in the scene
#[derive(Resource, Default, Debug, Clone)]
pub struct EditorGrid {
    pub settings: GridSettings,
    pub normal: GridNormal,
    pub position: Vec3,
    /// Shown this frame (still hidden when the settings disable the grid)
    pub shown: bool,
}

impl EditorGrid {
    pub fn snapped_x(&self, x: f32) -> f32 {
        snap(x, self.settings.cell_size.x, self.settings.offset.x)
    }

    pub fn snapped_y(&self, y: f32) -> f32 {
        snap(y, self.settings.cell_size.y, self.settings.offset.y)
    }

    pub fn snapped_z(&self, z: f32) -> f32 {
        snap(z, self.settings.cell_size.z, self.settings.offset.z)
    }

    /// Snap the two axes lying in the grid plane
    pub fn snap_in_plane(&self, point: Vec3) -> Vec3 {
        match self.normal {
            GridNormal::X => Vec3::new(point.x, self.snapped_y(point.y), self.snapped_z(point.z)),
            GridNormal::Y => Vec3::new(self.snapped_x(point.x), point.y, self.snapped_z(point.z)),
            GridNormal::Z => Vec3::new(self.snapped_x(point.x), self.snapped_y(point.y), point.z),
        }
    }

    /// Whether a gesture snaps: the default flipped by the modifier
    pub fn is_spanning(&self, alt_pressed: bool) -> bool {
        self.settings.snap_by_default != alt_pressed
    }

    pub fn place(&mut self, normal: GridNormal, position: Vec3) {
        self.normal = normal;
        self.position = position;
        self.shown = true;
    }

    pub fn hide(&mut self) {
        self.shown = false;
    }

    pub fn is_visible(&self) -> bool {
        self.shown && self.settings.visible
    }

    /// Grid lines in scene space, centered on the snapped grid position
    pub fn lines(&self) -> Vec<(Vec3, Vec3)> {
        let cell = self.settings.cell_size;
        let center = self.snap_in_plane(self.position);
        let (u, v, du, dv) = match self.normal {
            GridNormal::X => (Vec3::Y, Vec3::Z, cell.y, cell.z),
            GridNormal::Y => (Vec3::X, Vec3::Z, cell.x, cell.z),
            GridNormal::Z => (Vec3::X, Vec3::Y, cell.x, cell.y),
        };
        if du <= 0.0 || dv <= 0.0 {
            return Vec::new();
        }
        let half_u = du * GRID_CELLS as f32 * 0.5;
        let half_v = dv * GRID_CELLS as f32 * 0.5;
        let mut lines = Vec::with_capacity(2 * (GRID_CELLS as usize + 1));
        for i in 0..=GRID_CELLS {
            let a = -half_u + du * i as f32;
            lines.push((center + u * a - v * half_v, center + u * a + v * half_v));
            let b = -half_v + dv * i as f32;
            lines.push((center + v * b - u * half_u, center + v * b + u * half_u));
        }
        lines
    }
}

pub(crate) fn draw_editor_grid(grid: Res<EditorGrid>, mut gizmos: Gizmos<EditorGizmos>) {
    if !grid.is_visible() {
        return;
    }
    for (start, end) in grid.lines() {
        gizmos.line(to_render(start), to_render(end), gizmo_colors::GRID);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapping_is_idempotent() {
        for &(value, cell, offset) in &[
            (13.7, 8.0, 0.0),
            (-13.7, 8.0, 3.0),
            (100.0, 32.0, 16.0),
            (-0.5, 1.0, 0.0),
            (7.25, 0.5, 0.1),
        ] {
            let once = snap(value, cell, offset);
            assert_eq!(snap(once, cell, offset), once, "value {value}, cell {cell}");
        }
    }

    #[test]
    fn zero_cell_size_is_identity() {
        for value in [-1000.25, -3.5, 0.0, 0.3, 42.0] {
            assert_eq!(snap(value, 0.0, 7.0), value);
        }
    }

    #[test]
    fn snapping_respects_offset() {
        assert_eq!(snap(10.0, 8.0, 3.0), 11.0);
        assert_eq!(snap(6.0, 8.0, 3.0), 3.0);
        assert_eq!(snap(-4.0, 8.0, 0.0), 0.0);
    }

    #[test]
    fn modifier_inverts_snapping_default() {
        let mut grid = EditorGrid::default();
        assert!(!grid.is_spanning(false));
        assert!(grid.is_spanning(true));
        grid.settings.snap_by_default = true;
        assert!(grid.is_spanning(false));
        assert!(!grid.is_spanning(true));
    }

    #[test]
    fn only_in_plane_axes_snap() {
        let mut grid = EditorGrid::default();
        grid.settings.cell_size = Vec3::splat(10.0);
        let point = Vec3::new(12.0, 17.0, 23.0);
        grid.normal = GridNormal::Z;
        assert_eq!(grid.snap_in_plane(point), Vec3::new(10.0, 20.0, 23.0));
        grid.normal = GridNormal::X;
        assert_eq!(grid.snap_in_plane(point), Vec3::new(12.0, 20.0, 20.0));
        grid.normal = GridNormal::Y;
        assert_eq!(grid.snap_in_plane(point), Vec3::new(10.0, 17.0, 20.0));
    }

    #[test]
    fn vertical_moves_pick_plane_facing_camera() {
        assert_eq!(GridNormal::for_movement(true, true, false, 0.0), GridNormal::Z);
        assert_eq!(GridNormal::for_movement(false, false, true, 10.0), GridNormal::Y);
        assert_eq!(GridNormal::for_movement(false, false, true, 180.0), GridNormal::Y);
        assert_eq!(GridNormal::for_movement(false, false, true, 90.0), GridNormal::X);
        assert_eq!(GridNormal::for_movement(false, false, true, -100.0), GridNormal::X);
        assert_eq!(GridNormal::for_movement(false, true, true, 0.0), GridNormal::X);
        assert_eq!(GridNormal::for_movement(true, false, true, 0.0), GridNormal::Y);
    }

    #[test]
    fn grid_lines_cover_ten_cells() {
        let mut grid = EditorGrid::default();
        grid.settings.cell_size = Vec3::splat(10.0);
        grid.place(GridNormal::Z, Vec3::new(3.0, 4.0, 5.0));
        let lines = grid.lines();
        assert_eq!(lines.len(), 22);
        let (start, end) = lines[0];
        assert_eq!(start, Vec3::new(-50.0, -50.0, 5.0));
        assert_eq!(end, Vec3::new(-50.0, 50.0, 5.0));
    }

    #[test]
    fn hidden_settings_override_placement() {
        let mut grid = EditorGrid::default();
        grid.place(GridNormal::Z, Vec3::ZERO);
        assert!(grid.is_visible());
        grid.settings.visible = false;
        assert!(!grid.is_visible());
    }
}
