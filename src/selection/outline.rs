use bevy::prelude::*;
use bitflags::bitflags;

use crate::constants::outline_colors;
use crate::gizmos::{EditorGizmos, TransformGizmo};
use crate::picking::CursorHover;
use crate::scene::{InstanceFlags, Object3d, Placement};

use super::Selection;

/// Padding added around flat instances so their outline stays visible
const FLAT_OUTLINE_PADDING: f32 = 2.0;

bitflags! {
    /// State of an outlined instance
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct InstanceStateFlags: u8 {
        const LOCKED = 1 << 0;
        const SELECTED = 1 << 1;
        const HOVERED = 1 << 2;
    }
}

impl InstanceStateFlags {
    pub fn color(self) -> Color {
        const COLORS: [(InstanceStateFlags, Color); 6] = [
            (InstanceStateFlags::HOVERED, outline_colors::HOVERED),
            (InstanceStateFlags::SELECTED, outline_colors::SELECTED),
            (
                InstanceStateFlags::SELECTED.union(InstanceStateFlags::HOVERED),
                outline_colors::SELECTED_HOVERED,
            ),
            (
                InstanceStateFlags::LOCKED.union(InstanceStateFlags::HOVERED),
                outline_colors::LOCKED_HOVERED,
            ),
            (
                InstanceStateFlags::LOCKED.union(InstanceStateFlags::SELECTED),
                outline_colors::LOCKED_SELECTED,
            ),
            (InstanceStateFlags::all(), outline_colors::LOCKED_SELECTED_HOVERED),
        ];

        COLORS
            .iter()
            .find(|(flags, _)| *flags == self)
            .map_or(outline_colors::FALLBACK, |(_, color)| *color)
    }
}

/// One outline box, in render space
#[derive(Clone, Copy, Debug)]
pub struct OutlineBox {
    pub entity: Entity,
    pub transform: Transform,
    pub flags: InstanceStateFlags,
}

/// Outline boxes refreshed every frame
#[derive(Resource, Default, Debug)]
pub struct SelectionOutlines {
    pub boxes: Vec<OutlineBox>,
}

impl SelectionOutlines {
    pub fn clear(&mut self) {
        self.boxes.clear();
    }
}

/// Box covering an instance. Flat instances get a zero-depth box slightly
/// larger than their rectangle.
pub fn outline_transform(placement: &Placement, is_3d: bool) -> Transform {
    let mut transform = placement.render_transform(is_3d);
    if !is_3d {
        transform.scale = Vec3::new(
            placement.size.x + FLAT_OUTLINE_PADDING,
            placement.size.y + FLAT_OUTLINE_PADDING,
            0.0,
        );
    }
    transform
}

pub(crate) fn refresh_selection_outlines(
    selection: Res<Selection>,
    hover: Res<CursorHover>,
    gizmo: Res<TransformGizmo>,
    flags: InstanceFlags,
    instances: Query<(&Placement, Has<Object3d>)>,
    mut outlines: ResMut<SelectionOutlines>,
) {
    outlines.clear();

    let hovered = hover.entity.filter(|entity| !flags.is_sealed(*entity));
    let candidates = selection
        .entities()
        .iter()
        .copied()
        .chain(hovered.filter(|entity| !selection.contains(*entity)));

    for entity in candidates {
        let Ok((placement, is_3d)) = instances.get(entity) else {
            continue;
        };
        let mut state = InstanceStateFlags::empty();
        state.set(InstanceStateFlags::LOCKED, flags.is_locked(entity) || !is_3d);
        state.set(InstanceStateFlags::SELECTED, selection.contains(entity));
        state.set(
            InstanceStateFlags::HOVERED,
            hovered == Some(entity) && !gizmo.is_hovered(),
        );
        outlines.boxes.push(OutlineBox {
            entity,
            transform: outline_transform(placement, is_3d),
            flags: state,
        });
    }
}

pub(crate) fn draw_selection_outlines(outlines: Res<SelectionOutlines>, mut gizmos: Gizmos<EditorGizmos>) {
    for outline in &outlines.boxes {
        gizmos.cube(outline.transform, outline.flags.color());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outline_colors_follow_state() {
        use InstanceStateFlags as F;
        assert_eq!(F::HOVERED.color(), outline_colors::HOVERED);
        assert_eq!(F::SELECTED.color(), outline_colors::SELECTED);
        assert_eq!((F::SELECTED | F::HOVERED).color(), outline_colors::SELECTED_HOVERED);
        assert_eq!((F::LOCKED | F::HOVERED).color(), outline_colors::LOCKED_HOVERED);
        assert_eq!((F::LOCKED | F::SELECTED).color(), outline_colors::LOCKED_SELECTED);
        assert_eq!(F::all().color(), outline_colors::LOCKED_SELECTED_HOVERED);
        assert_eq!(F::LOCKED.color(), outline_colors::FALLBACK);
        assert_eq!(F::empty().color(), outline_colors::FALLBACK);
    }

    #[test]
    fn flat_outlines_are_padded_and_flat() {
        let placement = Placement::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 20.0, 0.0));
        let transform = outline_transform(&placement, false);
        assert_eq!(transform.scale, Vec3::new(12.0, 22.0, 0.0));
        assert_eq!(transform.translation, Vec3::new(5.0, -10.0, 0.0));
    }
}
