use bevy::prelude::*;

use crate::commands::PendingChanges;
use crate::constants::{camera::NEAR, outline_colors};
use crate::editor::{EditorInput, EntityDrag};
use crate::gizmos::{EditorGizmos, TransformGizmo};
use crate::picking::ScenePicker;
use crate::scene::{InstanceFlags, to_render};

use super::Selection;

/// Screen rectangle dragged with the primary button to select many entities
#[derive(Resource, Default, Debug)]
pub struct SelectionRectangle {
    start: Option<Vec2>,
    end: Vec2,
    selected_this_frame: bool,
}

impl SelectionRectangle {
    pub fn is_active(&self) -> bool {
        self.start.is_some()
    }

    /// Corners of the current rectangle
    pub fn corners(&self) -> Option<(Vec2, Vec2)> {
        self.start.map(|start| (start, self.end))
    }

    /// The rectangle replaced or extended the selection this frame
    pub fn selected_this_frame(&self) -> bool {
        self.selected_this_frame
    }

    pub fn begin(&mut self, cursor: Vec2) {
        self.start = Some(cursor);
        self.end = cursor;
    }

    pub fn cancel(&mut self) {
        self.start = None;
    }

    /// Close the rectangle, returning its corners when it has an area
    pub fn finish(&mut self) -> Option<(Vec2, Vec2)> {
        let (start, end) = self.corners()?;
        self.start = None;
        let size = end - start;
        (size.x != 0.0 && size.y != 0.0).then_some((start, end))
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn update_selection_rectangle(
    input: Res<EditorInput>,
    entity_drag: Res<EntityDrag>,
    gizmo: Res<TransformGizmo>,
    picker: ScenePicker,
    flags: InstanceFlags,
    mut rectangle: ResMut<SelectionRectangle>,
    mut selection: ResMut<Selection>,
    mut pending: ResMut<PendingChanges>,
) {
    rectangle.selected_this_frame = false;

    let can_track = input.pressed(MouseButton::Left)
        && !entity_drag.is_dragging()
        && !input.space()
        && input.touch_count() < 2;

    if !rectangle.is_active() {
        let starts = can_track
            && input.mouse.just_pressed(MouseButton::Left)
            && !gizmo.is_hovered();
        if starts {
            rectangle.begin(input.cursor);
        }
        return;
    }

    rectangle.end = input.cursor;
    if gizmo.has_selection_moved() {
        rectangle.cancel();
        return;
    }
    if can_track {
        return;
    }

    let Some((start, end)) = rectangle.finish() else {
        return;
    };
    if input.touch_count() >= 2 {
        return;
    }
    if !input.shift() {
        selection.clear();
    }
    let picked = picker.frustum_select(start, end);
    debug!("Selection rectangle picked {} entities", picked.len());
    selection.add_all(picked.into_iter().filter(|entity| !flags.is_sealed(*entity)));
    rectangle.selected_this_frame = true;
    pending.selection_changed();
}

/// Draw the rectangle just in front of the near plane
pub(crate) fn draw_selection_rectangle(
    rectangle: Res<SelectionRectangle>,
    picker: ScenePicker,
    mut gizmos: Gizmos<EditorGizmos>,
) {
    let Some((start, end)) = rectangle.corners() else {
        return;
    };
    let view = picker.view();
    let corners = [start, Vec2::new(end.x, start.y), end, Vec2::new(start.x, end.y)];
    let points = corners.map(|corner| {
        let (origin, direction) = view.ray(corner);
        let depth = direction.dot(view.forward).max(1e-3);
        to_render(origin + direction * (NEAR * 2.0 / depth))
    });
    gizmos.linestrip(
        [points[0], points[1], points[2], points[3], points[0]],
        outline_colors::RECTANGLE,
    );
}
