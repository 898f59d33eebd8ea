use std::time::Instant;

use ratatui::text::Line;

use crate::config::KeybindingMode;
use crate::constants::ERROR_TTL_SECS;
use crate::input::KeybindingEntry;
use crate::timeline::{
    ContactSpoofingWarning, ConversationKind, FocusTarget, ItemRenderer, MessageLoadingState,
    ReviewRequest, ScrollDownButton, Timeline,
};

/// Destructive actions that need a confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmDialog {
    Block,
    Unblock,
    Delete,
}

impl ConfirmDialog {
    pub fn title(self) -> &'static str {
        match self {
            Self::Block => "Block this conversation?",
            Self::Unblock => "Unblock this conversation?",
            Self::Delete => "Delete this conversation?",
        }
    }

    pub fn body(self) -> &'static str {
        match self {
            Self::Block => "Blocked people can't send you messages.",
            Self::Unblock => "They will be able to message you again.",
            Self::Delete => "All messages in this conversation will be removed.",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub enum ModalState {
    #[default]
    None,
    Help {
        keybindings: Vec<KeybindingEntry>,
    },
    Confirm(ConfirmDialog),
}

impl ModalState {
    pub fn is_help(&self) -> bool {
        matches!(self, Self::Help { .. })
    }

    pub fn confirm(&self) -> Option<ConfirmDialog> {
        match self {
            Self::Confirm(dialog) => Some(*dialog),
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, Self::None)
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatusState {
    pub loading: bool,
    pub error: Option<String>,
    pub error_time: Option<Instant>,
    pub message: String,
    /// Persists after error bar expires - shown as indicator in status bar
    pub has_unacknowledged_error: bool,
}

impl StatusState {
    pub fn set_error(&mut self, error: impl ToString) {
        self.error = Some(error.to_string());
        self.error_time = Some(Instant::now());
        self.has_unacknowledged_error = true;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
        self.error_time = None;
    }

    pub fn acknowledge_error(&mut self) {
        self.has_unacknowledged_error = false;
    }

    /// Clear error if TTL expired. Returns true if error was cleared.
    pub fn clear_error_if_expired(&mut self) -> bool {
        if let Some(time) = self.error_time
            && time.elapsed().as_secs() >= ERROR_TTL_SECS
        {
            self.clear_error();
            true
        } else {
            false
        }
    }

    pub fn set_message(&mut self, msg: impl ToString) {
        self.message = msg.to_string();
    }
}

/// Everything the render thread needs from the timeline for one frame
#[derive(Debug, Clone, Default)]
pub struct TimelineView {
    pub lines: Vec<Line<'static>>,
    pub warning: Option<ContactSpoofingWarning>,
    pub review: Option<ReviewRequest>,
    pub scroll_down: Option<ScrollDownButton>,
    pub loading: Option<MessageLoadingState>,
    pub total_unread: usize,
    pub has_selection: bool,
    pub is_blocked: bool,
    pub is_message_request: bool,
    pub is_group: bool,
    pub is_near_bottom: bool,
}

impl TimelineView {
    pub fn capture<R: ItemRenderer>(timeline: &Timeline<R>) -> Self {
        let props = timeline.props();
        Self {
            lines: timeline.visible_lines(),
            warning: timeline.active_warning().cloned(),
            review: timeline.review_request().cloned(),
            scroll_down: timeline.scroll_down_button(),
            loading: props.loading_state,
            total_unread: props.total_unread,
            has_selection: props.selected_message_id.is_some(),
            is_blocked: props.is_blocked,
            is_message_request: props.is_incoming_message_request,
            is_group: props.conversation_kind == ConversationKind::Group,
            is_near_bottom: timeline.visibility().is_near_bottom,
        }
    }
}

/// Snapshot sent to the render thread
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub title: String,
    pub timeline: TimelineView,
    pub status: StatusState,
    pub modal: ModalState,
    pub focus: FocusTarget,
    /// Selects the key hints shown in bars and banners
    pub keybinding_mode: KeybindingMode,
}

impl AppState {
    pub fn set_error(&mut self, error: impl ToString) {
        self.status.set_error(error);
    }

    pub fn clear_error_if_expired(&mut self) -> bool {
        self.status.clear_error_if_expired()
    }

    pub fn acknowledge_error(&mut self) {
        self.status.acknowledge_error();
    }

    pub fn set_status(&mut self, msg: impl ToString) {
        self.status.set_message(msg);
    }

    /// True while keyboard input belongs to something other than the timeline
    pub fn composer_focused(&self) -> bool {
        self.focus == FocusTarget::Elsewhere
    }

    pub fn review_open(&self) -> bool {
        self.timeline.review.is_some()
    }
}
