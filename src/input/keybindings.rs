use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

use crate::config::KeybindingMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    // Selection
    SelectPrev,
    SelectNext,
    SelectOldest,
    SelectNewest,
    ClearSelection,

    // Scrolling
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    JumpToNewest,

    // Warning banner
    ReviewWarning,
    DismissWarning,

    // Conversation
    Block,
    Unblock,
    Delete,
    AcceptRequest,

    // Focus
    ToggleComposer,

    Quit,
    Help,
}

pub struct KeyBindings {
    bindings: HashMap<KeyEvent, Action>,
}

/// A displayable keybinding entry
#[derive(Debug, Clone)]
pub struct KeybindingEntry {
    pub key: String,
    pub description: String,
    pub category: &'static str,
}

impl KeyBindings {
    pub fn new(mode: &KeybindingMode) -> Self {
        let mut bindings = Self::common_bindings();
        bindings.extend(match mode {
            KeybindingMode::Vim => Self::vim_bindings(),
            KeybindingMode::Arrows => Self::arrow_bindings(),
        });
        Self { bindings }
    }

    pub fn get(&self, event: &KeyEvent) -> Option<Action> {
        self.bindings.get(event).copied()
    }

    /// Get all keybindings as displayable entries grouped by category
    pub fn all_bindings(&self) -> Vec<KeybindingEntry> {
        let mut entries: Vec<_> = self
            .bindings
            .iter()
            .map(|(event, action)| KeybindingEntry {
                key: format_key_event(event),
                description: action_description(action).to_string(),
                category: action_category(action),
            })
            .collect();

        entries.sort_by(|a, b| {
            category_order(a.category)
                .cmp(&category_order(b.category))
                .then_with(|| a.description.cmp(&b.description))
                .then_with(|| a.key.cmp(&b.key))
        });
        entries
    }

    /// Bindings shared by every mode. Arrow keys always move the selection.
    fn common_bindings() -> HashMap<KeyEvent, Action> {
        let mut map = HashMap::new();

        map.insert(key_code(KeyCode::Up), Action::SelectPrev);
        map.insert(key_code(KeyCode::Down), Action::SelectNext);
        map.insert(ctrl_key_code(KeyCode::Up), Action::SelectOldest);
        map.insert(ctrl_key_code(KeyCode::Down), Action::SelectNewest);
        map.insert(super_key_code(KeyCode::Up), Action::SelectOldest);
        map.insert(super_key_code(KeyCode::Down), Action::SelectNewest);
        map.insert(key_code(KeyCode::PageUp), Action::PageUp);
        map.insert(key_code(KeyCode::PageDown), Action::PageDown);
        map.insert(key_code(KeyCode::End), Action::JumpToNewest);
        map.insert(key_code(KeyCode::Esc), Action::ClearSelection);
        map.insert(key_code(KeyCode::Tab), Action::ToggleComposer);
        map.insert(key('?'), Action::Help);

        map
    }

    fn vim_bindings() -> HashMap<KeyEvent, Action> {
        let mut map = HashMap::new();

        // Selection
        map.insert(key('k'), Action::SelectPrev);
        map.insert(key('j'), Action::SelectNext);
        map.insert(key('g'), Action::SelectOldest);
        map.insert(shift_key('G'), Action::SelectNewest);

        // Scrolling
        map.insert(ctrl_key('y'), Action::ScrollUp);
        map.insert(ctrl_key('e'), Action::ScrollDown);
        map.insert(ctrl_key('u'), Action::PageUp);
        map.insert(ctrl_key('d'), Action::PageDown);
        map.insert(key('n'), Action::JumpToNewest);

        // Banner
        map.insert(key('r'), Action::ReviewWarning);
        map.insert(key('x'), Action::DismissWarning);

        // Conversation
        map.insert(key('b'), Action::Block);
        map.insert(shift_key('U'), Action::Unblock);
        map.insert(shift_key('D'), Action::Delete);
        map.insert(key('a'), Action::AcceptRequest);

        map.insert(key('q'), Action::Quit);

        map
    }

    fn arrow_bindings() -> HashMap<KeyEvent, Action> {
        let mut map = HashMap::new();

        // Scrolling
        map.insert(shift_key_code(KeyCode::Up), Action::ScrollUp);
        map.insert(shift_key_code(KeyCode::Down), Action::ScrollDown);
        map.insert(key_code(KeyCode::Home), Action::SelectOldest);

        // Banner
        map.insert(key_code(KeyCode::F(2)), Action::ReviewWarning);
        map.insert(key_code(KeyCode::F(3)), Action::DismissWarning);

        // Conversation
        map.insert(ctrl_key('b'), Action::Block);
        map.insert(ctrl_key('u'), Action::Unblock);
        map.insert(key_code(KeyCode::Delete), Action::Delete);
        map.insert(ctrl_key('a'), Action::AcceptRequest);

        map.insert(ctrl_key('q'), Action::Quit);

        map
    }
}

fn key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
}

fn shift_key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::SHIFT)
}

fn ctrl_key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

fn key_code(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn shift_key_code(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::SHIFT)
}

fn ctrl_key_code(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::CONTROL)
}

fn super_key_code(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::SUPER)
}

/// Format a KeyEvent for display
fn format_key_event(event: &KeyEvent) -> String {
    let mut parts = Vec::new();

    if event.modifiers.contains(KeyModifiers::CONTROL) {
        parts.push("Ctrl+");
    }
    if event.modifiers.contains(KeyModifiers::SUPER) {
        parts.push("Super+");
    }
    if event.modifiers.contains(KeyModifiers::SHIFT) && !matches!(event.code, KeyCode::Char(_)) {
        parts.push("Shift+");
    }

    let key_str = match event.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PgUp".to_string(),
        KeyCode::PageDown => "PgDn".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => format!("{:?}", event.code),
    };

    format!("{}{}", parts.join(""), key_str)
}

fn action_description(action: &Action) -> &'static str {
    match action {
        Action::SelectPrev => "Select previous message",
        Action::SelectNext => "Select next message",
        Action::SelectOldest => "Select oldest loaded message",
        Action::SelectNewest => "Select newest message",
        Action::ClearSelection => "Clear selection",
        Action::ScrollUp => "Scroll up one line",
        Action::ScrollDown => "Scroll down one line",
        Action::PageUp => "Page up",
        Action::PageDown => "Page down",
        Action::JumpToNewest => "Jump to newest",
        Action::ReviewWarning => "Review warning",
        Action::DismissWarning => "Dismiss warning",
        Action::Block => "Block conversation",
        Action::Unblock => "Unblock conversation",
        Action::Delete => "Delete conversation",
        Action::AcceptRequest => "Accept message request",
        Action::ToggleComposer => "Focus composer / timeline",
        Action::Quit => "Quit",
        Action::Help => "Toggle help",
    }
}

fn action_category(action: &Action) -> &'static str {
    match action {
        Action::SelectPrev
        | Action::SelectNext
        | Action::SelectOldest
        | Action::SelectNewest
        | Action::ClearSelection => "Selection",

        Action::ScrollUp
        | Action::ScrollDown
        | Action::PageUp
        | Action::PageDown
        | Action::JumpToNewest => "Scrolling",

        Action::ReviewWarning
        | Action::DismissWarning
        | Action::Block
        | Action::Unblock
        | Action::Delete
        | Action::AcceptRequest => "Conversation",

        Action::ToggleComposer | Action::Quit | Action::Help => "General",
    }
}

fn category_order(category: &str) -> u8 {
    match category {
        "Selection" => 0,
        "Scrolling" => 1,
        "Conversation" => 2,
        "General" => 3,
        _ => 99,
    }
}
