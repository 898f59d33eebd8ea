//! Internal-consistency violations
//!
//! None of these abort the timeline. They are logged and the caller continues
//! with a safe fallback, since a broken timeline is worse than a misplaced
//! scroll position.

use super::props::MessageId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsistencyError {
    #[error("expected an unread marker in the layout but found none")]
    MissingUnreadMarker,
    #[error("no rendered block for item index {0}")]
    MissingIndex(usize),
    #[error("empty message id at index {0}")]
    EmptyMessageId(usize),
    #[error("duplicate message id {id} at index {index}")]
    DuplicateMessageId { id: MessageId, index: usize },
    #[error("oldest unread index {index} is out of range for {len} items")]
    StaleUnreadIndex { index: usize, len: usize },
}

/// Log a consistency violation. Never panics.
pub fn report_consistency(err: &ConsistencyError) {
    tracing::error!("timeline consistency: {}", err);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ConsistencyError::MissingIndex(4).to_string(),
            "no rendered block for item index 4"
        );
        assert_eq!(
            ConsistencyError::DuplicateMessageId {
                id: "m1".into(),
                index: 2
            }
            .to_string(),
            "duplicate message id m1 at index 2"
        );
    }
}
