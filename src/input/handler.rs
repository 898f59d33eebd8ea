use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, MouseEventKind};

use super::keybindings::{Action, KeyBindings};
use crate::app::state::AppState;

pub enum InputResult {
    Continue,
    Quit,
    Action(Action),
    /// Confirm or cancel the open dialog
    Confirm(bool),
    CloseReview,
    /// Mouse wheel, in rows (negative = up)
    Scroll(isize),
    Resize(u16, u16),
    FocusLost,
    FocusGained,
}

pub fn handle_input(event: Event, state: &AppState, bindings: &KeyBindings) -> InputResult {
    match event {
        Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
            handle_key(key_event, state, bindings)
        }
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::ScrollUp => InputResult::Scroll(-3),
            MouseEventKind::ScrollDown => InputResult::Scroll(3),
            _ => InputResult::Continue,
        },
        Event::Resize(width, height) => InputResult::Resize(width, height),
        Event::FocusLost => InputResult::FocusLost,
        Event::FocusGained => InputResult::FocusGained,
        _ => InputResult::Continue,
    }
}

fn handle_key(key: KeyEvent, state: &AppState, bindings: &KeyBindings) -> InputResult {
    if state.modal.confirm().is_some() {
        return handle_confirm_input(key);
    }

    if state.modal.is_help() {
        return handle_help_input(key, bindings);
    }

    if state.review_open() {
        return handle_review_input(key);
    }

    if state.composer_focused() {
        return handle_composer_input(key, bindings);
    }

    if let Some(action) = bindings.get(&key) {
        if action == Action::Quit {
            return InputResult::Quit;
        }
        return InputResult::Action(action);
    }

    InputResult::Continue
}

fn handle_confirm_input(key: KeyEvent) -> InputResult {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => InputResult::Confirm(true),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => InputResult::Confirm(false),
        _ => InputResult::Continue,
    }
}

fn handle_help_input(key: KeyEvent, bindings: &KeyBindings) -> InputResult {
    if bindings.get(&key) == Some(Action::Help) {
        return InputResult::Action(Action::Help);
    }
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => InputResult::Action(Action::Help),
        _ => InputResult::Continue,
    }
}

fn handle_review_input(key: KeyEvent) -> InputResult {
    match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => InputResult::CloseReview,
        _ => InputResult::Continue,
    }
}

fn handle_composer_input(key: KeyEvent, bindings: &KeyBindings) -> InputResult {
    // The composer is a focus placeholder; only leaving it is meaningful
    match bindings.get(&key) {
        Some(Action::ToggleComposer) => InputResult::Action(Action::ToggleComposer),
        Some(Action::Quit) if key.code != KeyCode::Char('q') => InputResult::Quit,
        _ if key.code == KeyCode::Esc => InputResult::Action(Action::ToggleComposer),
        _ => InputResult::Continue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::{ConfirmDialog, ModalState};
    use crate::config::KeybindingMode;
    use crate::timeline::FocusTarget;
    use crossterm::event::KeyModifiers;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_quit_action() {
        let bindings = KeyBindings::new(&KeybindingMode::Vim);
        let state = AppState::default();

        let result = handle_key(press(KeyCode::Char('q')), &state, &bindings);
        assert!(matches!(result, InputResult::Quit));
    }

    #[test]
    fn test_confirm_dialog_captures_keys() {
        let bindings = KeyBindings::new(&KeybindingMode::Vim);
        let state = AppState {
            modal: ModalState::Confirm(ConfirmDialog::Block),
            ..Default::default()
        };

        assert!(matches!(
            handle_key(press(KeyCode::Char('y')), &state, &bindings),
            InputResult::Confirm(true)
        ));
        assert!(matches!(
            handle_key(press(KeyCode::Esc), &state, &bindings),
            InputResult::Confirm(false)
        ));
        // Bound keys don't leak through the dialog
        assert!(matches!(
            handle_key(press(KeyCode::Char('q')), &state, &bindings),
            InputResult::Continue
        ));
    }

    #[test]
    fn test_composer_focus_swallows_timeline_keys() {
        let bindings = KeyBindings::new(&KeybindingMode::Vim);
        let state = AppState {
            focus: FocusTarget::Elsewhere,
            ..Default::default()
        };

        assert!(matches!(
            handle_key(press(KeyCode::Char('j')), &state, &bindings),
            InputResult::Continue
        ));
        assert!(matches!(
            handle_key(press(KeyCode::Tab), &state, &bindings),
            InputResult::Action(Action::ToggleComposer)
        ));
    }

    #[test]
    fn test_mouse_wheel_scrolls() {
        let bindings = KeyBindings::new(&KeybindingMode::Vim);
        let state = AppState::default();
        let event = Event::Mouse(crossterm::event::MouseEvent {
            kind: MouseEventKind::ScrollUp,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        });
        assert!(matches!(
            handle_input(event, &state, &bindings),
            InputResult::Scroll(-3)
        ));
    }
}
