use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Local};

use super::Message;
use super::history::{self, DIRECT_TITLE};
use crate::config::{DemoConfig, DemoWarning};
use crate::timeline::warning::{GroupNameCollisions, SafeConversation};
use crate::timeline::{
    ContactSpoofingWarning, ConversationKind, MessageId, MessageLoadingState, ReviewRequest,
    TimelineCommand, TimelineProps,
};

const CONVERSATION_ID: &str = "demo-conversation";
const GROUP_TITLE: &str = "Release crew";

/// A page fetch that has been accepted and is waiting on latency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingLoad {
    Initial,
    Older,
    Newer,
    Newest { set_focus: bool },
}

impl PendingLoad {
    fn loading_state(self) -> MessageLoadingState {
        match self {
            Self::Initial => MessageLoadingState::DoingInitialLoad,
            Self::Older => MessageLoadingState::LoadingOlderMessages,
            Self::Newer | Self::Newest { .. } => MessageLoadingState::LoadingNewerMessages,
        }
    }
}

/// What the caller should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Props changed; publish them
    Changed,
    /// Props changed and a load must be finished later
    Load(PendingLoad),
    Notice(String),
}

/// One conversation with a sliding window of loaded messages.
///
/// `start..end` indexes into `history`; the timeline only ever sees that window.
#[derive(Debug)]
pub struct ConversationStore {
    id: String,
    kind: ConversationKind,
    history: Vec<Message>,
    start: usize,
    end: usize,
    page_size: usize,
    loading: Option<MessageLoadingState>,
    /// Everything before this history index has been read
    read_upto: usize,
    selected: Option<MessageId>,
    typing: bool,
    near_bottom: bool,
    message_request: bool,
    blocked: bool,
    warning: Option<ContactSpoofingWarning>,
    review: Option<ReviewRequest>,
    scroll_to_index: Option<usize>,
    scroll_to_index_counter: u64,
    peeked_call: bool,
}

impl ConversationStore {
    /// A store with the full history generated but nothing loaded yet
    pub fn new(config: &DemoConfig, now: DateTime<Local>) -> Self {
        let kind = match config.warning {
            DemoWarning::DirectDuplicate => ConversationKind::Direct,
            DemoWarning::GroupCollision => ConversationKind::Group,
            DemoWarning::None if config.group => ConversationKind::Group,
            DemoWarning::None => ConversationKind::Direct,
        };
        let history = history::generate(
            config.history_len,
            kind == ConversationKind::Group,
            now,
        );
        let read_upto = history.len().saturating_sub(config.unread);

        Self {
            id: CONVERSATION_ID.to_string(),
            kind,
            history,
            start: 0,
            end: 0,
            page_size: config.page_size.max(1),
            loading: Some(MessageLoadingState::DoingInitialLoad),
            read_upto,
            selected: None,
            typing: false,
            near_bottom: true,
            message_request: config.message_request,
            blocked: false,
            warning: initial_warning(config.warning),
            review: None,
            scroll_to_index: None,
            scroll_to_index_counter: 0,
            peeked_call: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        match self.kind {
            ConversationKind::Group => GROUP_TITLE,
            ConversationKind::Direct => DIRECT_TITLE,
        }
    }

    pub fn kind(&self) -> ConversationKind {
        self.kind
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    pub fn is_near_bottom(&self) -> bool {
        self.near_bottom
    }

    pub fn loaded_messages(&self) -> &[Message] {
        &self.history[self.start..self.end]
    }

    fn have_newest(&self) -> bool {
        self.end == self.history.len()
    }

    fn have_oldest(&self) -> bool {
        self.start == 0 && self.loading != Some(MessageLoadingState::DoingInitialLoad)
    }

    fn is_unread(&self, index: usize) -> bool {
        index >= self.read_upto && !self.history[index].outgoing
    }

    fn total_unread(&self) -> usize {
        (self.read_upto..self.history.len())
            .filter(|&i| self.is_unread(i))
            .count()
    }

    /// Window-relative index of the oldest unread message, if it is loaded.
    /// An unread message above the window means the marker is not loaded.
    fn oldest_unread_index(&self) -> Option<usize> {
        let oldest = (self.read_upto..self.history.len()).find(|&i| self.is_unread(i))?;
        (self.start..self.end)
            .contains(&oldest)
            .then(|| oldest - self.start)
    }

    pub fn props(&self) -> TimelineProps {
        TimelineProps {
            conversation_id: self.id.clone(),
            conversation_kind: self.kind,
            items: self.loaded_messages().iter().map(|m| m.id.clone()).collect(),
            have_newest: self.have_newest(),
            have_oldest: self.have_oldest(),
            loading_state: self.loading,
            oldest_unread_index: self.oldest_unread_index(),
            total_unread: self.total_unread(),
            scroll_to_index: self.scroll_to_index,
            scroll_to_index_counter: self.scroll_to_index_counter,
            selected_message_id: self.selected.clone(),
            is_someone_typing: self.typing,
            is_incoming_message_request: self.message_request,
            is_blocked: self.blocked,
            warning: self.warning.clone(),
            review_request: self.review.clone(),
        }
    }

    fn position(&self, id: &MessageId) -> Option<usize> {
        self.history.iter().position(|m| &m.id == id)
    }

    fn begin(&mut self, load: PendingLoad) -> Effect {
        self.loading = Some(load.loading_state());
        Effect::Load(load)
    }

    pub fn apply(&mut self, cmd: TimelineCommand) -> Effect {
        match cmd {
            TimelineCommand::LoadOlderMessages {
                oldest_message_id, ..
            } => {
                let is_edge = self.history.get(self.start).map(|m| &m.id) == Some(&oldest_message_id);
                if self.is_loading() || self.start == 0 || !is_edge {
                    tracing::debug!("ignoring load older from {}", oldest_message_id);
                    return Effect::None;
                }
                self.begin(PendingLoad::Older)
            }
            TimelineCommand::LoadNewerMessages {
                newest_message_id, ..
            } => {
                let is_edge = self
                    .end
                    .checked_sub(1)
                    .and_then(|i| self.history.get(i))
                    .map(|m| &m.id)
                    == Some(&newest_message_id);
                if self.is_loading() || self.have_newest() || !is_edge {
                    tracing::debug!("ignoring load newer from {}", newest_message_id);
                    return Effect::None;
                }
                self.begin(PendingLoad::Newer)
            }
            TimelineCommand::LoadNewestMessages { set_focus, .. } => {
                if self.is_loading() {
                    return Effect::None;
                }
                self.begin(PendingLoad::Newest { set_focus })
            }
            TimelineCommand::DiscardMessages {
                number_to_keep_at_bottom,
                ..
            } => {
                let loaded = self.end - self.start;
                if self.is_loading() || number_to_keep_at_bottom >= loaded {
                    return Effect::None;
                }
                tracing::debug!(
                    "discarding {} messages, keeping {}",
                    loaded - number_to_keep_at_bottom,
                    number_to_keep_at_bottom
                );
                self.start = self.end - number_to_keep_at_bottom;
                // Window indices shifted; a stale scroll request must not re-fire
                self.scroll_to_index = None;
                Effect::Changed
            }
            TimelineCommand::MarkMessageRead { message_id, .. } => {
                match self.position(&message_id) {
                    Some(index) if index + 1 > self.read_upto => {
                        self.read_upto = index + 1;
                        Effect::Changed
                    }
                    _ => Effect::None,
                }
            }
            TimelineCommand::SetIsNearBottom { is_near_bottom, .. } => {
                self.near_bottom = is_near_bottom;
                Effect::None
            }
            TimelineCommand::SelectMessage { message_id, .. } => {
                if self.selected.as_ref() == Some(&message_id) {
                    return Effect::None;
                }
                self.selected = Some(message_id);
                Effect::Changed
            }
            TimelineCommand::ClearSelectedMessage => {
                if self.selected.take().is_some() {
                    Effect::Changed
                } else {
                    Effect::None
                }
            }
            TimelineCommand::AcknowledgeGroupMemberNameCollisions { collisions, .. } => {
                if let Some(ContactSpoofingWarning::MultipleGroupMembersWithSameTitle {
                    acknowledged_group_name_collisions,
                    ..
                }) = self.warning.as_mut()
                {
                    *acknowledged_group_name_collisions = collisions;
                    Effect::Changed
                } else {
                    Effect::None
                }
            }
            TimelineCommand::ReviewContactSpoofingRequest {
                conversation_id, ..
            } => match &self.warning {
                Some(ContactSpoofingWarning::MultipleDirectConversationsWithSameTitle {
                    safe_conversation,
                }) => {
                    self.review = Some(ReviewRequest::DirectConversationWithSameTitle {
                        possibly_unsafe_conversation: SafeConversation {
                            id: conversation_id,
                            title: self.title().to_string(),
                        },
                        safe_conversation: safe_conversation.clone(),
                    });
                    Effect::Changed
                }
                _ => Effect::None,
            },
            TimelineCommand::ReviewGroupMemberNameCollision {
                group_conversation_id,
            } => match &self.warning {
                Some(ContactSpoofingWarning::MultipleGroupMembersWithSameTitle {
                    group_name_collisions,
                    ..
                }) => {
                    self.review = Some(ReviewRequest::MultipleGroupMembersWithSameTitle {
                        group_conversation_id,
                        collisions: group_name_collisions.clone(),
                    });
                    Effect::Changed
                }
                _ => Effect::None,
            },
            TimelineCommand::CloseContactSpoofingReview => {
                if self.review.take().is_some() {
                    Effect::Changed
                } else {
                    Effect::None
                }
            }
            TimelineCommand::PeekGroupCallForTheFirstTime { .. } => {
                if self.peeked_call || self.kind != ConversationKind::Group {
                    return Effect::None;
                }
                self.peeked_call = true;
                Effect::Notice("No active call in this group".to_string())
            }
            // Dialogs are presented by the host, not the store
            TimelineCommand::ShowBlockDialog { .. }
            | TimelineCommand::ShowDeleteDialog { .. }
            | TimelineCommand::ShowUnblockDialog { .. } => Effect::None,
        }
    }

    /// Complete a load accepted by `apply`
    pub fn finish(&mut self, load: PendingLoad) {
        let len = self.history.len();
        let page = self.page_size;
        match load {
            PendingLoad::Initial => {
                let first_unread = (self.read_upto..len).find(|&i| self.is_unread(i));
                let (start, end) = match first_unread {
                    // Open with a little context above the oldest unread message
                    Some(first) => {
                        let start = first.saturating_sub(page / 3);
                        let end = (start + page).min(len);
                        (end.saturating_sub(page), end)
                    }
                    None => (len.saturating_sub(page), len),
                };
                self.start = start;
                self.end = end;
            }
            PendingLoad::Older => {
                self.start = self.start.saturating_sub(page);
            }
            PendingLoad::Newer => {
                self.end = (self.end + page).min(len);
            }
            PendingLoad::Newest { set_focus } => {
                self.end = len;
                self.start = len.saturating_sub(page);
                if let Some(last) = self.history.last() {
                    if set_focus {
                        self.selected = Some(last.id.clone());
                    }
                    self.scroll_to_index = Some(self.end - self.start - 1);
                    self.scroll_to_index_counter += 1;
                }
            }
        }
        self.loading = None;
    }

    /// Returns true if the typing state changed
    pub fn set_typing(&mut self, typing: bool) -> bool {
        let changed = self.typing != typing;
        self.typing = typing;
        changed
    }

    /// Append a message from the other side. It joins the loaded window only
    /// when the window already reaches the newest message.
    pub fn receive(&mut self, now: DateTime<Local>) -> MessageId {
        let followed = self.have_newest();
        let message = history::incoming(self.history.len(), self.kind == ConversationKind::Group, now);
        let id = message.id.clone();
        self.history.push(message);
        if followed {
            self.end = self.history.len();
        }
        self.typing = false;
        id
    }

    pub fn block(&mut self) -> Effect {
        self.blocked = true;
        Effect::Changed
    }

    pub fn unblock(&mut self) -> Effect {
        self.blocked = false;
        Effect::Changed
    }

    pub fn accept_request(&mut self) -> Effect {
        self.message_request = false;
        Effect::Changed
    }

    /// Remove every message
    pub fn delete(&mut self) -> Effect {
        self.history.clear();
        self.start = 0;
        self.end = 0;
        self.read_upto = 0;
        self.selected = None;
        self.scroll_to_index = None;
        Effect::Changed
    }
}

fn initial_warning(warning: DemoWarning) -> Option<ContactSpoofingWarning> {
    match warning {
        DemoWarning::None => None,
        DemoWarning::DirectDuplicate => {
            Some(ContactSpoofingWarning::MultipleDirectConversationsWithSameTitle {
                safe_conversation: SafeConversation {
                    id: "conversation-sam-verified".to_string(),
                    title: DIRECT_TITLE.to_string(),
                },
            })
        }
        DemoWarning::GroupCollision => {
            let mut collisions: GroupNameCollisions = BTreeMap::new();
            collisions.insert(
                "Alex".to_string(),
                BTreeSet::from(["member-alex-1".to_string(), "member-alex-2".to_string()]),
            );
            Some(ContactSpoofingWarning::MultipleGroupMembersWithSameTitle {
                group_name_collisions: collisions,
                acknowledged_group_name_collisions: BTreeMap::new(),
            })
        }
    }
}
