//! Contact-spoofing banner and the floating jump-to-newest button

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::status_bar::{display_width, truncate_to_width};
use super::theme::{Theme, symbols};
use crate::timeline::{ContactSpoofingWarning, ScrollDownButton};

/// Banner text for a warning, without key hints
pub fn warning_text(warning: &ContactSpoofingWarning) -> String {
    match warning {
        ContactSpoofingWarning::MultipleDirectConversationsWithSameTitle { safe_conversation } => {
            format!(
                "Review carefully. You have another conversation named \"{}\".",
                safe_conversation.title
            )
        }
        ContactSpoofingWarning::MultipleGroupMembersWithSameTitle {
            group_name_collisions,
            ..
        } => {
            let members: usize = group_name_collisions.values().map(|ids| ids.len()).sum();
            format!("{} group members have the same name.", members)
        }
    }
}

pub fn render_warning_banner(
    frame: &mut Frame,
    area: Rect,
    warning: &ContactSpoofingWarning,
    review_key: &str,
    dismiss_key: &str,
) {
    let style = Theme::warning_banner();
    let hints = format!(" {} review  {} dismiss ", review_key, dismiss_key);
    let prefix = format!(" {} ", symbols::WARNING);

    let available = (area.width as usize)
        .saturating_sub(display_width(&prefix) + display_width(&hints));
    let text = truncate_to_width(&warning_text(warning), available);
    let padding = available.saturating_sub(display_width(&text));

    let line = Line::from(vec![
        Span::styled(prefix, style),
        Span::styled(text, style),
        Span::styled(" ".repeat(padding), style),
        Span::styled(hints, Theme::help_key()),
    ]);
    frame.render_widget(Paragraph::new(line).style(style), area);
}

/// Bottom-right corner of the timeline
pub fn render_scroll_down_button(frame: &mut Frame, timeline_area: Rect, button: ScrollDownButton) {
    let label = if button.unread_count > 0 {
        format!(" {} {} ", symbols::JUMP_DOWN, button.unread_count)
    } else {
        format!(" {} ", symbols::JUMP_DOWN)
    };
    let width = (display_width(&label) as u16).min(timeline_area.width);
    if width == 0 || timeline_area.height == 0 {
        return;
    }

    let area = Rect::new(
        timeline_area.x + timeline_area.width - width,
        timeline_area.y + timeline_area.height - 1,
        width,
        1,
    );
    frame.render_widget(
        Paragraph::new(label).style(Theme::scroll_down_button()),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::warning::SafeConversation;
    use std::collections::{BTreeMap, BTreeSet};

    #[test]
    fn test_direct_warning_names_safe_conversation() {
        let warning = ContactSpoofingWarning::MultipleDirectConversationsWithSameTitle {
            safe_conversation: SafeConversation {
                id: "c-safe".to_string(),
                title: "Sam Rivera".to_string(),
            },
        };
        assert!(warning_text(&warning).contains("\"Sam Rivera\""));
    }

    #[test]
    fn test_group_warning_counts_members() {
        let mut collisions = BTreeMap::new();
        collisions.insert(
            "Alex".to_string(),
            BTreeSet::from(["a1".to_string(), "a2".to_string()]),
        );
        let warning = ContactSpoofingWarning::MultipleGroupMembersWithSameTitle {
            group_name_collisions: collisions,
            acknowledged_group_name_collisions: BTreeMap::new(),
        };
        assert_eq!(warning_text(&warning), "2 group members have the same name.");
    }
}
