use bevy::prelude::*;

use crate::commands::PendingChanges;
use crate::constants::interaction::{CLICK_TOLERANCE, DOUBLE_CLICK_SECONDS};
use crate::editor::EditorInput;
use crate::gizmos::TransformGizmo;
use crate::picking::CursorHover;
use crate::scene::{InstanceFlags, ObjectName, SceneEntity};

use super::SelectionRectangle;

/// Marker mirroring [`Selection`] membership, for host systems that prefer
/// querying selected entities
#[derive(Component, Default)]
pub struct Selected;

/// Ordered set of selected entities, most recently selected last
#[derive(Resource, Default, Debug, Clone)]
pub struct Selection {
    entities: Vec<Entity>,
}

impl Selection {
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.contains(&entity)
    }

    /// Append `entity` unless it is already selected
    pub fn add(&mut self, entity: Entity) {
        if !self.contains(entity) {
            self.entities.push(entity);
        }
    }

    pub fn add_all(&mut self, entities: impl IntoIterator<Item = Entity>) {
        for entity in entities {
            self.add(entity);
        }
    }

    pub fn remove(&mut self, entity: Entity) {
        self.entities.retain(|selected| *selected != entity);
    }

    pub fn toggle(&mut self, entity: Entity) {
        if self.contains(entity) {
            self.remove(entity);
        } else {
            self.entities.push(entity);
        }
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }

    pub fn retain(&mut self, keep: impl FnMut(&Entity) -> bool) {
        self.entities.retain(keep);
    }

    /// Most recently selected entity for which `ignore_if` does not hold
    pub fn last_selected(&self, ignore_if: impl Fn(Entity) -> bool) -> Option<Entity> {
        self.entities.iter().rev().copied().find(|entity| !ignore_if(*entity))
    }
}

/// Detects a second click on the same entity
#[derive(Resource, Default, Debug)]
pub struct ClickTracker {
    last: Option<(Entity, f64)>,
}

impl ClickTracker {
    /// Record a click at `now` seconds, returning `true` for a double click
    pub fn register(&mut self, entity: Entity, now: f64) -> bool {
        let double = self
            .last
            .is_some_and(|(last, at)| last == entity && now - at <= DOUBLE_CLICK_SECONDS);
        self.last = if double { None } else { Some((entity, now)) };
        double
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Click to select, Shift to extend, Escape to clear
#[allow(clippy::too_many_arguments)]
pub(crate) fn handle_click_selection(
    input: Res<EditorInput>,
    hover: Res<CursorHover>,
    gizmo: Res<TransformGizmo>,
    rectangle: Res<SelectionRectangle>,
    flags: InstanceFlags,
    names: Query<&ObjectName>,
    time: Res<Time<Real>>,
    mut tracker: ResMut<ClickTracker>,
    mut selection: ResMut<Selection>,
    mut pending: ResMut<PendingChanges>,
) {
    if input.key_just_pressed(KeyCode::Escape) {
        selection.clear();
        pending.selection_changed();
        return;
    }

    if gizmo.is_hovered() || rectangle.selected_this_frame() {
        return;
    }
    if !input.just_released(MouseButton::Left) || !input.cursor_stayed_still(CLICK_TOLERANCE) {
        return;
    }

    if !input.shift() {
        selection.clear();
    }
    if let Some(entity) = hover.entity
        && !flags.is_layer_locked(entity)
        && !flags.is_sealed(entity)
    {
        selection.toggle(entity);
        if tracker.register(entity, time.elapsed_secs_f64())
            && let Ok(name) = names.get(entity)
        {
            debug!("Double click on {}", name.0);
            pending.edit_object(name.0.clone());
        }
    }
    pending.selection_changed();
}

/// Drop despawned entities from the selection
pub(crate) fn prune_selection(mut selection: ResMut<Selection>, alive: Query<(), With<SceneEntity>>) {
    if selection.entities().iter().any(|entity| !alive.contains(*entity)) {
        selection.retain(|entity| alive.contains(*entity));
    }
}

/// Keep [`Selected`] markers in step with the [`Selection`]
pub(crate) fn sync_selected_markers(
    mut commands: Commands,
    selection: Res<Selection>,
    marked: Query<Entity, With<Selected>>,
    alive: Query<(), (With<SceneEntity>, Without<Selected>)>,
) {
    if !selection.is_changed() {
        return;
    }
    for entity in &marked {
        if !selection.contains(entity) {
            commands.entity(entity).try_remove::<Selected>();
        }
    }
    for entity in selection.entities() {
        if alive.contains(*entity) {
            commands.entity(*entity).try_insert(Selected);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(count: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..count).map(|_| world.spawn_empty().id()).collect()
    }

    #[test]
    fn toggle_twice_restores_membership() {
        let [a, b] = entities(2)[..] else { unreachable!() };
        let mut selection = Selection::default();
        selection.add(b);
        selection.toggle(a);
        selection.toggle(a);
        assert!(!selection.contains(a));
        assert_eq!(selection.entities(), &[b]);

        selection.toggle(b);
        selection.toggle(b);
        assert_eq!(selection.entities(), &[b]);
    }

    #[test]
    fn adding_twice_keeps_one_entry() {
        let [a] = entities(1)[..] else { unreachable!() };
        let mut selection = Selection::default();
        selection.add(a);
        selection.add(a);
        selection.add_all([a, a]);
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn last_selected_skips_ignored_entities() {
        let [a, b, c] = entities(3)[..] else { unreachable!() };
        let mut selection = Selection::default();
        selection.add_all([a, b, c]);
        assert_eq!(selection.last_selected(|_| false), Some(c));
        assert_eq!(selection.last_selected(|e| e == c), Some(b));
        assert_eq!(selection.last_selected(|_| true), None);
    }

    #[test]
    fn double_click_needs_same_entity_in_time() {
        let [a, b] = entities(2)[..] else { unreachable!() };
        let mut tracker = ClickTracker::default();
        assert!(!tracker.register(a, 1.0));
        assert!(!tracker.register(b, 1.1));
        assert!(tracker.register(b, 1.3));
        // A third click starts over
        assert!(!tracker.register(b, 1.4));
        assert!(!tracker.register(b, 2.0));
    }
}
