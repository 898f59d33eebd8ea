//! Side effects requested by the timeline
//!
//! All of these are fire-and-forget: the timeline never waits for the store,
//! it only reacts when the next props arrive.

use tokio::sync::mpsc;

use super::props::{ConversationId, MessageId};
use super::warning::GroupNameCollisions;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineCommand {
    LoadOlderMessages {
        conversation_id: ConversationId,
        oldest_message_id: MessageId,
    },
    LoadNewerMessages {
        conversation_id: ConversationId,
        newest_message_id: MessageId,
    },
    /// Jump to the newest page; optionally select its last message
    LoadNewestMessages {
        conversation_id: ConversationId,
        newest_message_id: Option<MessageId>,
        set_focus: bool,
    },
    /// Drop everything but the newest `number_to_keep_at_bottom` items from the view
    DiscardMessages {
        conversation_id: ConversationId,
        number_to_keep_at_bottom: usize,
    },
    MarkMessageRead {
        conversation_id: ConversationId,
        message_id: MessageId,
    },
    SetIsNearBottom {
        conversation_id: ConversationId,
        is_near_bottom: bool,
    },
    SelectMessage {
        conversation_id: ConversationId,
        message_id: MessageId,
    },
    ClearSelectedMessage,
    AcknowledgeGroupMemberNameCollisions {
        conversation_id: ConversationId,
        collisions: GroupNameCollisions,
    },
    ReviewContactSpoofingRequest {
        conversation_id: ConversationId,
        safe_conversation_id: ConversationId,
    },
    ReviewGroupMemberNameCollision {
        group_conversation_id: ConversationId,
    },
    CloseContactSpoofingReview,
    ShowBlockDialog {
        conversation_id: ConversationId,
    },
    ShowDeleteDialog {
        conversation_id: ConversationId,
    },
    ShowUnblockDialog {
        conversation_id: ConversationId,
    },
    PeekGroupCallForTheFirstTime {
        conversation_id: ConversationId,
    },
}

/// Non-blocking sender for timeline commands
#[derive(Debug, Clone)]
pub struct CommandSink {
    tx: mpsc::Sender<TimelineCommand>,
}

impl CommandSink {
    pub fn new(tx: mpsc::Sender<TimelineCommand>) -> Self {
        Self { tx }
    }

    /// Send without waiting. Dropped commands are logged; the store will
    /// receive a fresh request on the next visibility change.
    pub fn send(&self, cmd: TimelineCommand) {
        tracing::trace!("timeline command: {:?}", cmd);
        match self.tx.try_send(cmd) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(cmd)) => {
                tracing::warn!("Store command queue full, dropping {:?}", cmd);
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::error!("Store actor disconnected");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_queue_drops_without_blocking() {
        let (tx, mut rx) = mpsc::channel(1);
        let sink = CommandSink::new(tx);

        sink.send(TimelineCommand::ClearSelectedMessage);
        sink.send(TimelineCommand::CloseContactSpoofingReview);

        assert_eq!(rx.try_recv().unwrap(), TimelineCommand::ClearSelectedMessage);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_channel_is_tolerated() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        CommandSink::new(tx).send(TimelineCommand::ClearSelectedMessage);
    }
}
