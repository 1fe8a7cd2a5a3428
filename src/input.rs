//! Key and mouse bindings: normal and vim-style.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

/// Action from a key press or mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Left,
    Right,
    Up,
    Down,
    Select,
    Pause,
    Restart,
    Quit,
    /// Pointer moved over terminal cell (column, row).
    Hover(u16, u16),
    /// Left click on terminal cell (column, row).
    Click(u16, u16),
    None,
}

/// Map key event to game action. Supports both normal (arrows, enter) and vim (hjkl, space).
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('p' | 'P') => Action::Pause,
        KeyCode::Char('r' | 'R') => Action::Restart,
        KeyCode::Left | KeyCode::Char('h') => Action::Left,
        KeyCode::Right | KeyCode::Char('l') => Action::Right,
        KeyCode::Up | KeyCode::Char('k') => Action::Up,
        KeyCode::Down | KeyCode::Char('j') => Action::Down,
        KeyCode::Enter | KeyCode::Char(' ' | 'x') => Action::Select,
        _ => Action::None,
    }
}

pub fn mouse_to_action(mouse: MouseEvent) -> Action {
    match mouse.kind {
        MouseEventKind::Moved | MouseEventKind::Drag(MouseButton::Left) => {
            Action::Hover(mouse.column, mouse.row)
        }
        MouseEventKind::Down(MouseButton::Left) => Action::Click(mouse.column, mouse.row),
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new_with_kind(code, modifiers, KeyEventKind::Press)
    }

    fn mouse(kind: MouseEventKind) -> MouseEvent {
        MouseEvent {
            kind,
            column: 7,
            row: 3,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_arrows_and_vim_keys_agree() {
        let none = KeyModifiers::NONE;
        assert_eq!(key_to_action(key(KeyCode::Left, none)), Action::Left);
        assert_eq!(key_to_action(key(KeyCode::Char('h'), none)), Action::Left);
        assert_eq!(key_to_action(key(KeyCode::Down, none)), Action::Down);
        assert_eq!(key_to_action(key(KeyCode::Char('j'), none)), Action::Down);
        assert_eq!(key_to_action(key(KeyCode::Enter, none)), Action::Select);
        assert_eq!(key_to_action(key(KeyCode::Char(' '), none)), Action::Select);
    }

    #[test]
    fn test_control_chords_are_ignored() {
        let ctrl = KeyModifiers::CONTROL;
        assert_eq!(key_to_action(key(KeyCode::Char('q'), ctrl)), Action::None);
        assert_eq!(
            key_to_action(key(KeyCode::Char('R'), KeyModifiers::SHIFT)),
            Action::Restart
        );
        assert_eq!(
            key_to_action(key(KeyCode::Char('P'), KeyModifiers::SHIFT)),
            Action::Pause
        );
        assert_eq!(
            key_to_action(key(KeyCode::Char('p'), KeyModifiers::NONE)),
            Action::Pause
        );
    }

    #[test]
    fn test_mouse_events() {
        assert_eq!(mouse_to_action(mouse(MouseEventKind::Moved)), Action::Hover(7, 3));
        assert_eq!(
            mouse_to_action(mouse(MouseEventKind::Down(MouseButton::Left))),
            Action::Click(7, 3)
        );
        assert_eq!(
            mouse_to_action(mouse(MouseEventKind::Down(MouseButton::Right))),
            Action::None
        );
    }
}
