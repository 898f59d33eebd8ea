//! Keyboard selection and focus handling

use super::props::MessageId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: NavKey,
    /// Ctrl (or Super) held
    pub platform_modifier: bool,
}

impl KeyPress {
    pub fn plain(key: NavKey) -> Self {
        Self {
            key,
            platform_modifier: false,
        }
    }

    pub fn with_modifier(key: NavKey) -> Self {
        Self {
            key,
            platform_modifier: true,
        }
    }
}

/// Whether the host should keep routing the key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Consumed; stop propagation
    Handled,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavIntent {
    /// Leave the selection where it is
    Stay,
    Select(usize),
    ScrollToBottom { select_last: bool },
}

/// Where keyboard focus currently is, as far as the timeline cares
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FocusTarget {
    #[default]
    Timeline,
    /// An overlay (review dialog, picker) that keeps keyboard control of the timeline
    Overlay,
    /// Anywhere else, e.g. the composer
    Elsewhere,
}

impl FocusTarget {
    /// Selection survives a blur only if focus stayed with the timeline or its overlays
    pub fn keeps_selection(self) -> bool {
        matches!(self, Self::Timeline | Self::Overlay)
    }
}

pub fn navigate(items: &[MessageId], selected: Option<&MessageId>, press: KeyPress) -> (KeyOutcome, NavIntent) {
    if press.platform_modifier {
        return match press.key {
            NavKey::Up if items.is_empty() => (KeyOutcome::Handled, NavIntent::Stay),
            NavKey::Up => (KeyOutcome::Handled, NavIntent::Select(0)),
            NavKey::Down => (
                KeyOutcome::Handled,
                NavIntent::ScrollToBottom { select_last: true },
            ),
        };
    }

    let Some(current) = selected.and_then(|id| items.iter().position(|item| item == id)) else {
        return (KeyOutcome::Ignored, NavIntent::Stay);
    };

    let target = match press.key {
        NavKey::Up => current.checked_sub(1),
        NavKey::Down => Some(current + 1).filter(|&next| next < items.len()),
    };

    match target {
        Some(index) => (KeyOutcome::Handled, NavIntent::Select(index)),
        None => (KeyOutcome::Handled, NavIntent::Stay),
    }
}
