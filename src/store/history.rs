//! Deterministic demo conversation

use chrono::{DateTime, Duration, Local};

use super::Message;
use crate::timeline::MessageId;

const SELF_NAME: &str = "You";

const GROUP_MEMBERS: &[&str] = &["Alex", "Jordan", "Priya", SELF_NAME];

const BODIES: &[&str] = &[
    "Morning! Did anyone look at the build failures from last night?",
    "yep",
    "I think it's the flaky integration test again. It only fails when the runner is under load.",
    "Can we pin the toolchain until the release is out?",
    "Pushed a fix, let me know if it still breaks.",
    "Lunch at 12:30?",
    "Sounds good",
    "The new scrolling code keeps your place when older messages load above you, which is the whole point.",
    "Has anyone seen the updated design doc? I left a few comments on the pagination section, mostly about what happens when you jump to the newest message while a page is still loading.",
    "👍",
    "Running late, start without me",
    "Back online",
    "Reminder: retro tomorrow at 10",
    "Can someone review my PR before the end of the day?",
    "On it",
    "Merged. Thanks everyone!",
];

/// Title used for the other side of a direct conversation
pub const DIRECT_TITLE: &str = "Sam Rivera";

pub fn message_id(seq: usize) -> MessageId {
    MessageId::new(format!("msg-{seq:05}"))
}

fn authors(group: bool) -> &'static [&'static str] {
    if group {
        GROUP_MEMBERS
    } else {
        &[DIRECT_TITLE, SELF_NAME]
    }
}

/// Build one message. Author and body cycle with coprime strides so the
/// pattern doesn't repeat too obviously.
pub fn make_message(seq: usize, group: bool, sent_at: DateTime<Local>) -> Message {
    let authors = authors(group);
    let author = authors[(seq * 3 + seq / 7) % authors.len()];
    Message {
        id: message_id(seq),
        author: author.to_string(),
        body: BODIES[(seq * 5 + 1) % BODIES.len()].to_string(),
        sent_at,
        outgoing: author == SELF_NAME,
    }
}

/// `len` messages ending at `now`, a few minutes apart
pub fn generate(len: usize, group: bool, now: DateTime<Local>) -> Vec<Message> {
    (0..len)
        .map(|seq| {
            let minutes_ago = i64::try_from((len - seq) * 7).unwrap_or(i64::MAX / 60_000);
            make_message(seq, group, now - Duration::minutes(minutes_ago))
        })
        .collect()
}

/// An incoming (never outgoing) message from someone else
pub fn incoming(seq: usize, group: bool, now: DateTime<Local>) -> Message {
    let mut message = make_message(seq, group, now);
    if message.outgoing {
        message.author = authors(group)[0].to_string();
        message.outgoing = false;
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_is_ordered_and_unique() {
        let now = Local::now();
        let history = generate(50, true, now);
        assert_eq!(history.len(), 50);

        let ids: HashSet<_> = history.iter().map(|m| m.id.clone()).collect();
        assert_eq!(ids.len(), 50);
        assert!(history.windows(2).all(|w| w[0].sent_at < w[1].sent_at));
        assert!(history.iter().all(|m| m.sent_at < now));
    }

    #[test]
    fn test_incoming_is_from_someone_else() {
        let now = Local::now();
        for seq in 0..20 {
            let m = incoming(seq, false, now);
            assert!(!m.outgoing);
            assert_eq!(m.author, DIRECT_TITLE);
        }
    }
}
