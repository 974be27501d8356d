use bevy::prelude::*;

use super::EditorInput;
use crate::commands::{EditorNotification, ForwardedShortcut};
use crate::constants::interaction::CONTEXT_MENU_TOLERANCE;

/// Clipboard and history shortcuts the host implements
fn host_action(input: &EditorInput) -> Option<EditorNotification> {
    if input.ctrl_only() {
        let actions = [
            (KeyCode::KeyZ, EditorNotification::Undo),
            (KeyCode::KeyY, EditorNotification::Redo),
            (KeyCode::KeyC, EditorNotification::Copy),
            (KeyCode::KeyV, EditorNotification::Paste),
            (KeyCode::KeyX, EditorNotification::Cut),
        ];
        // Just-pressed, since macOS swallows key releases while Command is held
        return actions
            .into_iter()
            .find(|(key, _)| input.key_just_pressed(*key))
            .map(|(_, action)| action);
    }
    if input.ctrl_shift_only() && input.key_just_pressed(KeyCode::KeyZ) {
        return Some(EditorNotification::Redo);
    }
    None
}

/// Notifications for this frame's context menu and keyboard shortcuts
pub fn shortcut_notifications(input: &EditorInput) -> Vec<EditorNotification> {
    let mut notifications = Vec::new();
    if input.just_released(MouseButton::Right) && input.cursor_stayed_still(CONTEXT_MENU_TOLERANCE) {
        notifications.push(EditorNotification::OpenContextMenu {
            x: input.cursor.x,
            y: input.cursor.y,
        });
    }

    if let Some(action) = host_action(input) {
        notifications.push(action);
        return notifications;
    }

    // The host only sees keys the editor let through, so anything pressed
    // with a modifier is passed on as is.
    if !input.any_modifier() {
        return notifications;
    }
    let mut just_pressed: Vec<KeyCode> = input.keys.get_just_pressed().copied().collect();
    just_pressed.sort_by_key(|key| format!("{:?}", key));
    notifications.extend(just_pressed.into_iter().map(|key| {
        EditorNotification::Shortcut(ForwardedShortcut {
            key_code: format!("{:?}", key),
            meta: input.meta(),
            ctrl: input.ctrl(),
            alt: input.alt(),
            shift: input.shift(),
        })
    }));
    notifications
}

pub(crate) fn forward_shortcuts(input: Res<EditorInput>, mut notifications: MessageWriter<EditorNotification>) {
    for notification in shortcut_notifications(&input) {
        debug!("Forwarding {:?}", notification);
        notifications.write(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pressing(keys: &[KeyCode]) -> EditorInput {
        let mut input = EditorInput::default();
        for key in keys {
            input.keys.press(*key);
        }
        input
    }

    #[test]
    fn ctrl_shortcuts_map_to_host_actions() {
        let input = pressing(&[KeyCode::ControlLeft, KeyCode::KeyZ]);
        assert_eq!(host_action(&input), Some(EditorNotification::Undo));

        let input = pressing(&[KeyCode::SuperLeft, KeyCode::KeyV]);
        assert_eq!(host_action(&input), Some(EditorNotification::Paste));

        let input = pressing(&[KeyCode::ControlLeft, KeyCode::ShiftLeft, KeyCode::KeyZ]);
        assert_eq!(host_action(&input), Some(EditorNotification::Redo));

        let input = pressing(&[KeyCode::ControlLeft, KeyCode::AltLeft, KeyCode::KeyZ]);
        assert_eq!(host_action(&input), None);
    }

    #[test]
    fn handled_shortcuts_are_not_forwarded() {
        let input = pressing(&[KeyCode::ControlLeft, KeyCode::KeyC]);
        assert_eq!(shortcut_notifications(&input), vec![EditorNotification::Copy]);
    }

    #[test]
    fn other_modified_keys_are_forwarded() {
        let mut input = pressing(&[KeyCode::ShiftLeft]);
        input.keys.clear();
        input.keys.press(KeyCode::KeyS);
        let notifications = shortcut_notifications(&input);
        assert_eq!(
            notifications,
            vec![EditorNotification::Shortcut(ForwardedShortcut {
                key_code: "KeyS".into(),
                meta: false,
                ctrl: false,
                alt: false,
                shift: true,
            })]
        );

        let input = pressing(&[KeyCode::KeyS]);
        assert!(shortcut_notifications(&input).is_empty());
    }

    #[test]
    fn still_right_click_opens_the_context_menu() {
        let mut input = EditorInput {
            cursor: Vec2::new(120.0, 80.0),
            press_origin: Vec2::new(120.0, 80.0),
            ..default()
        };
        input.mouse.press(MouseButton::Right);
        input.mouse.release(MouseButton::Right);
        assert_eq!(
            shortcut_notifications(&input),
            vec![EditorNotification::OpenContextMenu { x: 120.0, y: 80.0 }]
        );

        input.press_origin = Vec2::new(121.0, 80.0);
        assert!(shortcut_notifications(&input).is_empty());
    }
}
