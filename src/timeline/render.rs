//! Render callbacks injected by the host
//!
//! The timeline decides *what* goes where (order, neighbours, unread marker,
//! hero and typing rows); the renderer decides how each piece looks. Every
//! callback returns lines already wrapped to `width`, so the number of lines
//! is the rendered height.

use ratatui::text::Line;

use super::command::{CommandSink, TimelineCommand};
use super::props::{ConversationId, MessageId};

/// Actions a rendered item may trigger, bundled so renderers don't need the sink
#[derive(Debug, Clone)]
pub struct ItemActions {
    conversation_id: ConversationId,
    sink: CommandSink,
}

impl ItemActions {
    pub fn new(conversation_id: ConversationId, sink: CommandSink) -> Self {
        Self {
            conversation_id,
            sink,
        }
    }

    pub fn select_message(&self, message_id: &MessageId) {
        self.sink.send(TimelineCommand::SelectMessage {
            conversation_id: self.conversation_id.clone(),
            message_id: message_id.clone(),
        });
    }

    pub fn clear_selected_message(&self) {
        self.sink.send(TimelineCommand::ClearSelectedMessage);
    }

    pub fn show_block_dialog(&self) {
        self.sink.send(TimelineCommand::ShowBlockDialog {
            conversation_id: self.conversation_id.clone(),
        });
    }

    pub fn show_delete_dialog(&self) {
        self.sink.send(TimelineCommand::ShowDeleteDialog {
            conversation_id: self.conversation_id.clone(),
        });
    }

    pub fn show_unblock_dialog(&self) {
        self.sink.send(TimelineCommand::ShowUnblockDialog {
            conversation_id: self.conversation_id.clone(),
        });
    }
}

/// Per-item information handed to [`ItemRenderer::render_item`]
#[derive(Debug)]
pub struct ItemContext<'a> {
    pub id: &'a MessageId,
    pub index: usize,
    pub previous_id: Option<&'a MessageId>,
    pub next_id: Option<&'a MessageId>,
    pub is_selected: bool,
    /// The unread marker is placed directly above this item
    pub is_oldest_unread: bool,
    pub has_recently_scrolled: bool,
    pub width: u16,
    pub actions: &'a ItemActions,
}

pub trait ItemRenderer {
    fn render_item(&self, ctx: &ItemContext<'_>) -> Vec<Line<'static>>;

    /// Conversation header shown above the oldest message
    fn render_hero(&self, width: u16) -> Vec<Line<'static>>;

    fn render_typing(&self, width: u16) -> Vec<Line<'static>>;

    fn render_unread_marker(&self, total_unread: usize, _width: u16) -> Vec<Line<'static>> {
        let label = if total_unread == 1 {
            "── 1 unread message ──".to_string()
        } else {
            format!("── {total_unread} unread messages ──")
        };
        vec![Line::from(label)]
    }
}
