//! Authoritative instance descriptions owned by the host.
//!
//! The editor never edits a record in place. It changes the live entity and
//! publishes a new record built with [`InstanceRecord::from_live`].

use bevy::platform::collections::HashMap;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::Placement;

/// Serialized placement of one instance
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstanceRecord {
    pub name: String,
    pub persistent_uuid: String,
    pub layer: String,
    pub x: f32,
    pub y: f32,
    /// Only present for 3D instances
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
    pub angle: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_y: Option<f32>,
    #[serde(default)]
    pub z_order: i32,
    /// Width and height differ from the default size
    #[serde(default)]
    pub custom_size: bool,
    pub width: f32,
    pub height: f32,
    /// Only present when it differs from the default depth
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<f32>,
    pub default_width: f32,
    pub default_height: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_depth: Option<f32>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub sealed: bool,
}

/// Everything read from a live entity to describe it
pub struct LiveInstance<'a> {
    pub persistent_uuid: &'a str,
    pub name: &'a str,
    pub layer: &'a str,
    pub z_order: i32,
    pub placement: &'a Placement,
    pub default_size: Vec3,
    pub is_3d: bool,
}

impl InstanceRecord {
    /// Describe a live entity. Editability flags are carried over from the
    /// previous record because the editor never changes them.
    pub fn from_live(live: &LiveInstance, previous: Option<&InstanceRecord>) -> Self {
        let placement = live.placement;
        let size = placement.size;
        let default = live.default_size;
        Self {
            name: live.name.to_string(),
            persistent_uuid: live.persistent_uuid.to_string(),
            layer: live.layer.to_string(),
            x: placement.position.x,
            y: placement.position.y,
            z: live.is_3d.then_some(placement.position.z),
            angle: placement.angle,
            rotation_x: live.is_3d.then_some(placement.rotation_x),
            rotation_y: live.is_3d.then_some(placement.rotation_y),
            z_order: live.z_order,
            custom_size: size.x != default.x || size.y != default.y,
            width: size.x,
            height: size.y,
            depth: (live.is_3d && size.z != default.z).then_some(size.z),
            default_width: default.x,
            default_height: default.y,
            default_depth: live.is_3d.then_some(default.z),
            locked: previous.is_some_and(|record| record.locked),
            sealed: previous.is_some_and(|record| record.sealed),
        }
    }

    pub fn is_3d(&self) -> bool {
        self.z.is_some()
    }

    pub fn default_size(&self) -> Vec3 {
        Vec3::new(
            self.default_width,
            self.default_height,
            self.default_depth.unwrap_or(0.0),
        )
    }

    /// Placement described by this record
    pub fn placement(&self, default_size: Vec3) -> Placement {
        let (width, height) = if self.custom_size {
            (self.width, self.height)
        } else {
            (default_size.x, default_size.y)
        };
        Placement {
            position: Vec3::new(self.x, self.y, self.z.unwrap_or(0.0)),
            angle: self.angle,
            rotation_x: self.rotation_x.unwrap_or(0.0),
            rotation_y: self.rotation_y.unwrap_or(0.0),
            size: Vec3::new(width, height, self.depth.unwrap_or(default_size.z)),
        }
        .constrained(self.is_3d())
    }
}

/// Reference to a selected instance in outbound payloads
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedInstance {
    pub persistent_uuid: String,
}

/// Records of the edited container, keyed by persistent uuid
#[derive(Resource, Default, Debug)]
pub struct InstanceRecords {
    records: HashMap<String, InstanceRecord>,
}

impl InstanceRecords {
    pub fn get(&self, uuid: &str) -> Option<&InstanceRecord> {
        self.records.get(uuid)
    }

    pub fn is_locked(&self, uuid: &str) -> bool {
        self.get(uuid).is_some_and(|record| record.locked)
    }

    pub fn is_sealed(&self, uuid: &str) -> bool {
        self.get(uuid).is_some_and(|record| record.sealed)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InstanceRecord> {
        self.records.values()
    }

    pub fn add(&mut self, record: InstanceRecord) {
        self.records.insert(record.persistent_uuid.clone(), record);
    }

    /// Replace the placement of a known record, keeping its flags.
    /// Unknown uuids are ignored.
    pub fn update(&mut self, record: &InstanceRecord) {
        let Some(existing) = self.records.get_mut(&record.persistent_uuid) else {
            return;
        };
        let (locked, sealed) = (existing.locked, existing.sealed);
        *existing = record.clone();
        existing.locked = locked;
        existing.sealed = sealed;
    }

    pub fn remove(&mut self, uuid: &str) -> Option<InstanceRecord> {
        self.records.remove(uuid)
    }

    pub fn replace_all(&mut self, records: impl IntoIterator<Item = InstanceRecord>) {
        self.records.clear();
        for record in records {
            self.add(record);
        }
    }

    pub fn set_locked(&mut self, uuid: &str, locked: bool) {
        if let Some(record) = self.records.get_mut(uuid) {
            record.locked = locked;
        }
    }

    pub fn set_sealed(&mut self, uuid: &str, sealed: bool) {
        if let Some(record) = self.records.get_mut(uuid) {
            record.sealed = sealed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live<'a>(placement: &'a Placement, is_3d: bool) -> LiveInstance<'a> {
        LiveInstance {
            persistent_uuid: "a",
            name: "Crate",
            layer: "",
            z_order: 3,
            placement,
            default_size: Vec3::new(32.0, 32.0, 32.0),
            is_3d,
        }
    }

    #[test]
    fn default_sized_instance_is_not_custom() {
        let placement = Placement::new(Vec3::new(10.0, 20.0, 0.0), Vec3::new(32.0, 32.0, 32.0));
        let record = InstanceRecord::from_live(&live(&placement, true), None);
        assert!(!record.custom_size);
        assert_eq!(record.depth, None);
        assert_eq!(record.z, Some(0.0));
        assert_eq!(record.default_depth, Some(32.0));
    }

    #[test]
    fn resized_instance_reports_custom_size_and_depth() {
        let placement = Placement::new(Vec3::ZERO, Vec3::new(64.0, 32.0, 10.0));
        let record = InstanceRecord::from_live(&live(&placement, true), None);
        assert!(record.custom_size);
        assert_eq!(record.width, 64.0);
        assert_eq!(record.depth, Some(10.0));
    }

    #[test]
    fn flat_records_omit_3d_fields() {
        let placement = Placement::new(Vec3::new(1.0, 2.0, 0.0), Vec3::new(32.0, 32.0, 0.0));
        let record = InstanceRecord::from_live(&live(&placement, false), None);
        assert_eq!(record.z, None);
        assert_eq!(record.rotation_x, None);
        assert_eq!(record.depth, None);
        assert!(!record.is_3d());
    }

    #[test]
    fn flags_survive_updates() {
        let placement = Placement::new(Vec3::ZERO, Vec3::splat(32.0));
        let mut records = InstanceRecords::default();
        let mut first = InstanceRecord::from_live(&live(&placement, true), None);
        first.locked = true;
        records.add(first.clone());

        let moved = Placement::new(Vec3::new(5.0, 0.0, 0.0), Vec3::splat(32.0));
        let next = InstanceRecord::from_live(&live(&moved, true), Some(&first));
        assert!(next.locked);

        let mut unlocked = next.clone();
        unlocked.locked = false;
        records.update(&unlocked);
        assert!(records.is_locked("a"));
        assert_eq!(records.get("a").map(|r| r.x), Some(5.0));
    }

    #[test]
    fn record_placement_uses_default_size_unless_custom() {
        let placement = Placement::new(Vec3::new(4.0, 5.0, 6.0), Vec3::splat(32.0));
        let record = InstanceRecord::from_live(&live(&placement, true), None);
        let restored = record.placement(record.default_size());
        assert_eq!(restored, placement);
    }

    #[test]
    fn records_parse_from_ron() {
        let text = r#"(
            name: "Tree",
            persistent_uuid: "b",
            layer: "",
            x: 1.0,
            y: 2.0,
            angle: 0.0,
            width: 10.0,
            height: 20.0,
            default_width: 10.0,
            default_height: 20.0,
            sealed: true,
        )"#;
        let record: InstanceRecord = ron::from_str(text).expect("valid record");
        assert!(record.sealed);
        assert!(!record.locked);
        assert!(!record.is_3d());
    }
}
