//! Contact-spoofing warnings and their dismissal state
//!
//! Warnings arrive pre-computed from the store. This module only decides
//! whether the banner for the current warning should be shown, and turns the
//! banner's buttons into store commands.

use std::collections::{BTreeMap, BTreeSet};

use super::command::TimelineCommand;
use super::props::ConversationId;

/// Display title -> conversations (group members) sharing that title
pub type GroupNameCollisions = BTreeMap<String, BTreeSet<ConversationId>>;

/// The conversation the user already trusts, shown next to the suspicious one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeConversation {
    pub id: ConversationId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactSpoofingWarning {
    /// This direct conversation has the same title as another, known-safe one
    MultipleDirectConversationsWithSameTitle { safe_conversation: SafeConversation },
    /// Some members of this group share display titles
    MultipleGroupMembersWithSameTitle {
        group_name_collisions: GroupNameCollisions,
        acknowledged_group_name_collisions: GroupNameCollisions,
    },
}

/// A request from the store to show a review dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewRequest {
    DirectConversationWithSameTitle {
        possibly_unsafe_conversation: SafeConversation,
        safe_conversation: SafeConversation,
    },
    MultipleGroupMembersWithSameTitle {
        group_conversation_id: ConversationId,
        collisions: GroupNameCollisions,
    },
}

/// Buttons on the warning banner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerAction {
    Review,
    Close,
}

/// True when `current` contains a colliding conversation not in `acknowledged`
pub fn has_unacknowledged_collisions(
    acknowledged: &GroupNameCollisions,
    current: &GroupNameCollisions,
) -> bool {
    current.iter().any(|(title, ids)| match acknowledged.get(title) {
        Some(seen) => !ids.is_subset(seen),
        None => !ids.is_empty(),
    })
}

/// Tracks local dismissal of the direct-conversation warning
#[derive(Debug, Default)]
pub struct WarningPresenter {
    last_seen: Option<ContactSpoofingWarning>,
    dismissed: bool,
}

impl WarningPresenter {
    /// Observe the warning from the latest props. A different warning value
    /// resets any previous dismissal.
    pub fn sync(&mut self, warning: Option<&ContactSpoofingWarning>) {
        if self.last_seen.as_ref() != warning {
            self.last_seen = warning.cloned();
            self.dismissed = false;
        }
    }

    /// The warning whose banner should currently be visible
    pub fn active<'a>(
        &self,
        warning: Option<&'a ContactSpoofingWarning>,
    ) -> Option<&'a ContactSpoofingWarning> {
        let warning = warning?;
        let visible = match warning {
            ContactSpoofingWarning::MultipleDirectConversationsWithSameTitle { .. } => {
                !self.dismissed
            }
            ContactSpoofingWarning::MultipleGroupMembersWithSameTitle {
                group_name_collisions,
                acknowledged_group_name_collisions,
            } => has_unacknowledged_collisions(
                acknowledged_group_name_collisions,
                group_name_collisions,
            ),
        };
        visible.then_some(warning)
    }

    /// Handle a banner button. Returns the command to send to the store, if any.
    pub fn handle(
        &mut self,
        action: BannerAction,
        conversation_id: &ConversationId,
        warning: &ContactSpoofingWarning,
    ) -> Option<TimelineCommand> {
        match (action, warning) {
            (
                BannerAction::Review,
                ContactSpoofingWarning::MultipleDirectConversationsWithSameTitle {
                    safe_conversation,
                },
            ) => Some(TimelineCommand::ReviewContactSpoofingRequest {
                conversation_id: conversation_id.clone(),
                safe_conversation_id: safe_conversation.id.clone(),
            }),
            (BannerAction::Review, ContactSpoofingWarning::MultipleGroupMembersWithSameTitle { .. }) => {
                Some(TimelineCommand::ReviewGroupMemberNameCollision {
                    group_conversation_id: conversation_id.clone(),
                })
            }
            (
                BannerAction::Close,
                ContactSpoofingWarning::MultipleDirectConversationsWithSameTitle { .. },
            ) => {
                self.dismissed = true;
                None
            }
            (
                BannerAction::Close,
                ContactSpoofingWarning::MultipleGroupMembersWithSameTitle {
                    group_name_collisions,
                    ..
                },
            ) => Some(TimelineCommand::AcknowledgeGroupMemberNameCollisions {
                conversation_id: conversation_id.clone(),
                collisions: group_name_collisions.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collisions(entries: &[(&str, &[&str])]) -> GroupNameCollisions {
        entries
            .iter()
            .map(|(title, ids)| {
                (
                    title.to_string(),
                    ids.iter().map(|id| id.to_string()).collect(),
                )
            })
            .collect()
    }

    fn direct(safe_id: &str) -> ContactSpoofingWarning {
        ContactSpoofingWarning::MultipleDirectConversationsWithSameTitle {
            safe_conversation: SafeConversation {
                id: safe_id.to_string(),
                title: "Alice".to_string(),
            },
        }
    }

    fn group(current: &[(&str, &[&str])], acked: &[(&str, &[&str])]) -> ContactSpoofingWarning {
        ContactSpoofingWarning::MultipleGroupMembersWithSameTitle {
            group_name_collisions: collisions(current),
            acknowledged_group_name_collisions: collisions(acked),
        }
    }

    #[test]
    fn test_direct_warning_dismissal_is_one_shot() {
        let mut presenter = WarningPresenter::default();
        let warning = direct("safe-1");
        let convo = "c1".to_string();

        presenter.sync(Some(&warning));
        assert!(presenter.active(Some(&warning)).is_some());

        assert_eq!(presenter.handle(BannerAction::Close, &convo, &warning), None);
        assert!(presenter.active(Some(&warning)).is_none());

        // Same warning value again: still dismissed
        presenter.sync(Some(&warning.clone()));
        assert!(presenter.active(Some(&warning)).is_none());

        // A different safe conversation re-shows the banner
        let other = direct("safe-2");
        presenter.sync(Some(&other));
        assert!(presenter.active(Some(&other)).is_some());
    }

    #[test]
    fn test_group_warning_reappears_only_for_new_collisions() {
        let presenter = WarningPresenter::default();

        let unacked = group(&[("Bob", &["x", "y"])], &[]);
        assert!(presenter.active(Some(&unacked)).is_some());

        let acked = group(&[("Bob", &["x", "y"])], &[("Bob", &["x", "y"])]);
        assert!(presenter.active(Some(&acked)).is_none());

        let new_member = group(&[("Bob", &["x", "y", "z"])], &[("Bob", &["x", "y"])]);
        let active = presenter.active(Some(&new_member));
        match active {
            Some(ContactSpoofingWarning::MultipleGroupMembersWithSameTitle {
                group_name_collisions,
                ..
            }) => {
                assert_eq!(group_name_collisions["Bob"].len(), 3);
            }
            other => panic!("expected group warning, got {other:?}"),
        }
    }

    #[test]
    fn test_collision_that_disappeared_does_not_trigger() {
        let acked = collisions(&[("Bob", &["x", "y"]), ("Eve", &["p", "q"])]);
        let current = collisions(&[("Bob", &["x", "y"])]);
        assert!(!has_unacknowledged_collisions(&acked, &current));
        assert!(has_unacknowledged_collisions(&acked, &collisions(&[("Mal", &["m", "n"])])));
    }

    #[test]
    fn test_group_close_acknowledges_current_collisions() {
        let mut presenter = WarningPresenter::default();
        let warning = group(&[("Bob", &["x", "y"])], &[]);
        let convo = "g1".to_string();

        let cmd = presenter.handle(BannerAction::Close, &convo, &warning);
        assert_eq!(
            cmd,
            Some(TimelineCommand::AcknowledgeGroupMemberNameCollisions {
                conversation_id: "g1".to_string(),
                collisions: collisions(&[("Bob", &["x", "y"])]),
            })
        );
    }

    #[test]
    fn test_review_direct_warning() {
        let mut presenter = WarningPresenter::default();
        let warning = direct("safe-1");
        let cmd = presenter.handle(BannerAction::Review, &"c1".to_string(), &warning);
        assert_eq!(
            cmd,
            Some(TimelineCommand::ReviewContactSpoofingRequest {
                conversation_id: "c1".to_string(),
                safe_conversation_id: "safe-1".to_string(),
            })
        );
    }
}
