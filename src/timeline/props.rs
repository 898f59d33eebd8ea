//! Inputs pushed into the timeline by the store on every update

use std::fmt;

use super::warning::{ContactSpoofingWarning, ReviewRequest};

/// Opaque message identifier, unique within a conversation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

pub type ConversationId = String;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConversationKind {
    #[default]
    Direct,
    Group,
}

/// What the store is currently fetching for this conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLoadingState {
    DoingInitialLoad,
    LoadingOlderMessages,
    LoadingNewerMessages,
}

/// Everything the timeline knows about the conversation for one render
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimelineProps {
    pub conversation_id: ConversationId,
    pub conversation_kind: ConversationKind,
    /// Ordered message ids, oldest first
    pub items: Vec<MessageId>,
    pub have_newest: bool,
    pub have_oldest: bool,
    pub loading_state: Option<MessageLoadingState>,
    pub oldest_unread_index: Option<usize>,
    pub total_unread: usize,
    pub scroll_to_index: Option<usize>,
    /// Bumped by the store on every scroll request, even for the same index
    pub scroll_to_index_counter: u64,
    pub selected_message_id: Option<MessageId>,
    pub is_someone_typing: bool,
    pub is_incoming_message_request: bool,
    pub is_blocked: bool,
    pub warning: Option<ContactSpoofingWarning>,
    pub review_request: Option<ReviewRequest>,
}

impl TimelineProps {
    pub fn is_loading(&self) -> bool {
        self.loading_state.is_some()
    }

    pub fn is_doing_initial_load(&self) -> bool {
        self.loading_state == Some(MessageLoadingState::DoingInitialLoad)
    }

    pub fn first_item(&self) -> Option<&MessageId> {
        self.items.first()
    }

    pub fn last_item(&self) -> Option<&MessageId> {
        self.items.last()
    }

    pub fn index_of(&self, id: &MessageId) -> Option<usize> {
        self.items.iter().position(|item| item == id)
    }

    /// The oldest-unread index, if it still points into the current list
    pub fn valid_oldest_unread_index(&self) -> Option<usize> {
        self.oldest_unread_index
            .filter(|&index| index < self.items.len())
    }
}

/// Loading state that finished between two renders, if any
pub fn loading_state_that_just_finished(
    prev: &TimelineProps,
    next: &TimelineProps,
) -> Option<MessageLoadingState> {
    match (prev.loading_state, next.loading_state) {
        (Some(state), None) => Some(state),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_unread_index_is_filtered() {
        let props = TimelineProps {
            items: vec!["a".into(), "b".into()],
            oldest_unread_index: Some(5),
            ..Default::default()
        };
        assert_eq!(props.valid_oldest_unread_index(), None);

        let props = TimelineProps {
            oldest_unread_index: Some(1),
            ..props
        };
        assert_eq!(props.valid_oldest_unread_index(), Some(1));
    }

    #[test]
    fn test_loading_state_that_just_finished() {
        let loading = TimelineProps {
            loading_state: Some(MessageLoadingState::LoadingOlderMessages),
            ..Default::default()
        };
        let idle = TimelineProps::default();

        assert_eq!(
            loading_state_that_just_finished(&loading, &idle),
            Some(MessageLoadingState::LoadingOlderMessages)
        );
        assert_eq!(loading_state_that_just_finished(&idle, &loading), None);
        assert_eq!(loading_state_that_just_finished(&idle, &idle), None);
    }
}
