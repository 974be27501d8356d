use bevy::prelude::*;

use super::{EditorSettings, EditorState};
use crate::constants::outline_colors::INNER_AREA;
use crate::gizmos::EditorGizmos;
use crate::scene::{EditedContainer, to_render};
use crate::selection::Aabb3;

/// Depth given to the game screen rectangle so it still draws as a box
const SCREEN_DEPTH: f32 = 0.01;

/// Wireframe marking the edited container's bounds
#[derive(Resource, Default, Debug)]
pub struct InnerAreaOutline {
    pub area: Option<Aabb3>,
}

/// The inner area set by the host, or the game screen on Z = 0
pub fn inner_area_box(inner_area: Option<Aabb3>, game_resolution: Vec2) -> Aabb3 {
    inner_area.unwrap_or(Aabb3::new(Vec3::ZERO, game_resolution.extend(SCREEN_DEPTH)))
}

pub(crate) fn refresh_inner_area(
    state: Res<EditorState>,
    settings: Res<EditorSettings>,
    container: Res<EditedContainer>,
    mut outline: ResMut<InnerAreaOutline>,
) {
    outline.area = container
        .is_loaded()
        .then(|| inner_area_box(state.inner_area, settings.game_resolution));
}

pub(crate) fn draw_inner_area(outline: Res<InnerAreaOutline>, mut gizmos: Gizmos<EditorGizmos>) {
    let Some(area) = outline.area else {
        return;
    };
    for (start, end) in area.edges() {
        gizmos.line(to_render(start), to_render(end), INNER_AREA);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_screen_is_outlined_without_inner_area() {
        let area = inner_area_box(None, Vec2::new(1280.0, 720.0));
        assert_eq!(area.min, Vec3::ZERO);
        assert_eq!(area.max, Vec3::new(1280.0, 720.0, SCREEN_DEPTH));

        let inner = Aabb3::new(Vec3::new(-50.0, -50.0, 0.0), Vec3::new(50.0, 50.0, 100.0));
        assert_eq!(inner_area_box(Some(inner), Vec2::new(1280.0, 720.0)), inner);
    }

    #[test]
    fn nothing_is_outlined_before_a_scene_is_loaded() {
        let mut world = World::new();
        world.init_resource::<EditorState>();
        world.init_resource::<EditorSettings>();
        world.init_resource::<EditedContainer>();
        world.init_resource::<InnerAreaOutline>();
        world.run_system_cached(refresh_inner_area).expect("runs");
        assert!(world.resource::<InnerAreaOutline>().area.is_none());

        world.insert_resource(EditedContainer::Scene { name: "Level".into() });
        world.run_system_cached(refresh_inner_area).expect("runs");
        assert!(world.resource::<InnerAreaOutline>().area.is_some());
    }
}
