use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Axis-aligned box in scene space
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb3 {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb3 {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn merge(&self, other: &Aabb3) -> Aabb3 {
        Aabb3 {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Merge every box of the iterator, `None` when it is empty
    pub fn merge_all(boxes: impl IntoIterator<Item = Aabb3>) -> Option<Aabb3> {
        boxes.into_iter().reduce(|acc, aabb| acc.merge(&aabb))
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// The twelve edges of the box
    pub fn edges(&self) -> [(Vec3, Vec3); 12] {
        let (a, b) = (self.min, self.max);
        let c = |x: f32, y: f32, z: f32| Vec3::new(x, y, z);
        [
            (c(a.x, a.y, a.z), c(b.x, a.y, a.z)),
            (c(a.x, b.y, a.z), c(b.x, b.y, a.z)),
            (c(a.x, a.y, b.z), c(b.x, a.y, b.z)),
            (c(a.x, b.y, b.z), c(b.x, b.y, b.z)),
            (c(a.x, a.y, a.z), c(a.x, b.y, a.z)),
            (c(b.x, a.y, a.z), c(b.x, b.y, a.z)),
            (c(a.x, a.y, b.z), c(a.x, b.y, b.z)),
            (c(b.x, a.y, b.z), c(b.x, b.y, b.z)),
            (c(a.x, a.y, a.z), c(a.x, a.y, b.z)),
            (c(b.x, a.y, a.z), c(b.x, a.y, b.z)),
            (c(a.x, b.y, a.z), c(a.x, b.y, b.z)),
            (c(b.x, b.y, a.z), c(b.x, b.y, b.z)),
        ]
    }
}
