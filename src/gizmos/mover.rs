use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use crate::scene::Placement;
use crate::utils::{round_half_up, wrap_degrees};

/// An in-progress edit, relative to the placements at the start of the gesture
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformDelta {
    pub translation: Vec3,
    /// Degrees around X, Y and Z (the Z turn is the instance angle)
    pub rotation: Vec3,
    /// Factors applied to width, height and depth
    pub scale: Vec3,
}

impl Default for TransformDelta {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl TransformDelta {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

/// Applies a [`TransformDelta`] to entities, always from the placement they
/// had when the gesture started.
#[derive(Resource, Default, Debug)]
pub struct ObjectMover {
    baselines: HashMap<Entity, Placement>,
    change_happened: bool,
}

impl ObjectMover {
    pub fn start(&mut self) {
        self.baselines.clear();
        self.change_happened = false;
    }

    /// Move one entity. Locked entities are left untouched.
    pub fn move_object(&mut self, entity: Entity, placement: &mut Placement, is_3d: bool, locked: bool, delta: &TransformDelta) {
        if locked {
            return;
        }
        self.change_happened |= !delta.is_identity();
        let base = *self.baselines.entry(entity).or_insert(*placement);

        let mut moved = *placement;
        moved.position = (base.position + delta.translation).map(round_half_up);
        moved.angle = wrap_degrees(round_half_up(base.angle + delta.rotation.z));
        moved.rotation_x = wrap_degrees(round_half_up(base.rotation_x + delta.rotation.x));
        moved.rotation_y = wrap_degrees(round_half_up(base.rotation_y + delta.rotation.y));
        for axis in 0..3 {
            if delta.scale[axis] != 1.0 {
                moved.size[axis] = round_half_up(base.size[axis] * delta.scale[axis].abs());
            }
        }
        *placement = moved.constrained(is_3d);
    }

    /// Finish the gesture, returning whether anything changed
    pub fn end(&mut self) -> bool {
        self.baselines.clear();
        std::mem::take(&mut self.change_happened)
    }

    pub fn is_moving(&self, entity: Entity) -> bool {
        self.baselines.contains_key(&entity)
    }
}
