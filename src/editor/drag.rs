use bevy::prelude::*;

use super::EditorInput;
use crate::commands::{PendingChanges, TemplateQuery, duplicate_instances};
use crate::gizmos::{BeingEdited, EditorGrid, GridNormal, ObjectMover, TransformDelta, TransformGizmo, end_editing, put_to_sleep};
use crate::picking::{CursorHover, ScenePicker};
use crate::scene::{InstanceFlags, Object3d, Placement};
use crate::selection::Selection;

/// Ctrl-drag of the selection: the selection is duplicated on press and the
/// copies follow the cursor.
#[derive(Resource, Default, Debug)]
pub struct EntityDrag {
    dragged: Option<Entity>,
    /// Position of the dragged entity when the gesture started
    initial: Vec3,
    is_3d: bool,
}

impl EntityDrag {
    pub fn is_dragging(&self) -> bool {
        self.dragged.is_some()
    }

    pub fn dragged(&self) -> Option<Entity> {
        self.dragged
    }

    pub fn cancel(&mut self) {
        self.dragged = None;
    }
}

/// Offset moving the dragged entity's position onto the cursor point,
/// snapping X and Y when the grid is spanning.
pub fn drag_translation(grid: &EditorGrid, spanning: bool, initial: Vec3, cursor: Vec3) -> Vec3 {
    let target = if spanning {
        Vec3::new(grid.snapped_x(cursor.x), grid.snapped_y(cursor.y), cursor.z)
    } else {
        cursor
    };
    target - initial
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn drag_selected_entities(
    mut commands: Commands,
    input: Res<EditorInput>,
    picker: ScenePicker,
    hover: Res<CursorHover>,
    gizmo: Res<TransformGizmo>,
    flags: InstanceFlags,
    being_edited: Query<Entity, With<BeingEdited>>,
    mut drag: ResMut<EntityDrag>,
    mut selection: ResMut<Selection>,
    mut mover: ResMut<ObjectMover>,
    mut grid: ResMut<EditorGrid>,
    mut pending: ResMut<PendingChanges>,
    mut queries: ParamSet<(TemplateQuery, Query<(&mut Placement, Has<Object3d>)>)>,
) {
    let should_drag = input.ctrl_or_cmd() && !gizmo.is_dragging();

    if drag.is_dragging() && (!input.pressed(MouseButton::Left) || !should_drag) {
        drag.dragged = None;
        if mover.end() {
            info!("Dragged {} entities", selection.len());
            pending.selection_modified();
        } else {
            pending.selection_changed();
        }
        end_editing(&mut commands, &being_edited);
    }
    if !should_drag {
        return;
    }

    if input.pressed(MouseButton::Left)
        && !drag.is_dragging()
        && let Some(hovered) = hover.entity
        && selection.contains(hovered)
    {
        let originals = selection.entities().to_vec();
        let copies = duplicate_instances(&mut commands, &queries.p0(), &originals);
        let Some(&(_, copy)) = copies.iter().find(|(original, _)| *original == hovered) else {
            return;
        };
        let Ok((placement, is_3d)) = queries.p1().get(hovered).map(|(placement, is_3d)| (*placement, is_3d)) else {
            return;
        };

        selection.clear();
        for (_, entity) in &copies {
            selection.add(*entity);
            PendingChanges::added(&mut pending, *entity);
        }
        let spawned: Vec<Entity> = copies.iter().map(|(_, entity)| *entity).collect();
        put_to_sleep(&mut commands, &spawned);
        debug!("Duplicated {} entities for dragging", copies.len());

        drag.dragged = Some(copy);
        drag.initial = if is_3d { placement.position } else { placement.position.with_z(0.0) };
        drag.is_3d = is_3d;
        mover.start();
    }

    if !drag.is_dragging() {
        return;
    }

    let cursor = if drag.is_3d {
        picker.cursor_in_3d(selection.entities())
    } else {
        picker.projected_cursor()
    };
    let delta = match cursor {
        Some(cursor) => {
            grid.place(GridNormal::Z, cursor);
            let spanning = grid.is_spanning(input.alt());
            TransformDelta::from_translation(drag_translation(&grid, spanning, drag.initial, cursor))
        }
        None => TransformDelta::IDENTITY,
    };

    let mut instances = queries.p1();
    for entity in selection.entities() {
        if let Ok((mut placement, is_3d)) = instances.get_mut(*entity) {
            mover.move_object(*entity, &mut placement, is_3d, flags.is_locked(*entity), &delta);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_moves_position_onto_cursor() {
        let grid = EditorGrid::default();
        let offset = drag_translation(&grid, false, Vec3::new(10.0, 10.0, 0.0), Vec3::new(25.0, 40.0, 0.0));
        assert_eq!(offset, Vec3::new(15.0, 30.0, 0.0));
    }

    #[test]
    fn spanning_snaps_only_x_and_y() {
        let mut grid = EditorGrid::default();
        grid.settings.cell_size = Vec3::splat(10.0);
        let offset = drag_translation(&grid, true, Vec3::ZERO, Vec3::new(14.0, 26.0, 7.5));
        assert_eq!(offset, Vec3::new(10.0, 30.0, 7.5));
    }

    #[test]
    fn idle_drag_is_not_dragging() {
        let mut drag = EntityDrag::default();
        assert!(!drag.is_dragging());
        drag.cancel();
        assert_eq!(drag.dragged(), None);
    }
}
