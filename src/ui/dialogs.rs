//! Modal popups: confirmation, spoofing review, help

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use super::centered_rect_constrained;
use super::theme::{Theme, borders};
use crate::app::state::ConfirmDialog;
use crate::constants::DIALOG_MAX_WIDTH;
use crate::input::KeybindingEntry;
use crate::timeline::ReviewRequest;

fn popup_block(title: &str, footer: &str) -> Block<'static> {
    Block::default()
        .title(format!(" {} ", title))
        .title_bottom(format!(" {} ", footer))
        .borders(Borders::ALL)
        .border_type(borders::popup())
        .border_style(Theme::border_focused())
}

pub fn render_confirm_dialog(frame: &mut Frame, area: Rect, dialog: ConfirmDialog) {
    let popup_area = centered_rect_constrained(area, 30, 48, 6, 6);
    frame.render_widget(Clear, popup_area);

    let block = popup_block(dialog.title(), "y confirm │ n cancel");
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let lines = vec![
        Line::from(""),
        Line::styled(dialog.body(), Theme::text()),
    ];
    let paragraph = Paragraph::new(lines)
        .style(Theme::main_bg())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, inner);
}

/// Body lines of the review dialog
pub fn review_lines(request: &ReviewRequest) -> Vec<Line<'static>> {
    match request {
        ReviewRequest::DirectConversationWithSameTitle {
            possibly_unsafe_conversation,
            safe_conversation,
        } => vec![
            Line::styled(
                "Two of your conversations have the same name.",
                Theme::text(),
            ),
            Line::from(""),
            Line::from(vec![
                Span::styled("This conversation   ", Theme::label()),
                Span::styled(possibly_unsafe_conversation.title.clone(), Theme::text_accent()),
            ]),
            Line::from(vec![
                Span::styled("Known contact       ", Theme::label()),
                Span::styled(safe_conversation.title.clone(), Theme::text_accent()),
            ]),
            Line::from(""),
            Line::styled(
                "If you don't know who this is, block or delete the conversation.",
                Theme::text_secondary(),
            ),
        ],
        ReviewRequest::MultipleGroupMembersWithSameTitle { collisions, .. } => {
            let mut lines = vec![
                Line::styled(
                    "These members of the group share a name:",
                    Theme::text(),
                ),
                Line::from(""),
            ];
            for (title, ids) in collisions {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {}", title), Theme::text_accent()),
                    Span::styled(format!("  {} members", ids.len()), Theme::text_muted()),
                ]));
                for id in ids {
                    lines.push(Line::styled(format!("    {}", id), Theme::text_muted()));
                }
            }
            lines.push(Line::from(""));
            lines.push(Line::styled(
                "Check who you are talking to before sharing anything.",
                Theme::text_secondary(),
            ));
            lines
        }
    }
}

pub fn render_review_dialog(frame: &mut Frame, area: Rect, request: &ReviewRequest) {
    let lines = review_lines(request);
    let height = (lines.len() as u16 + 4).max(8);
    let popup_area = centered_rect_constrained(area, 36, DIALOG_MAX_WIDTH, 8, height);
    frame.render_widget(Clear, popup_area);

    let block = popup_block("Review", "Esc close");
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let paragraph = Paragraph::new(lines)
        .style(Theme::main_bg())
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, inner.inner(ratatui::layout::Margin::new(1, 1)));
}

/// Keybindings grouped by category
pub fn render_help_popup(frame: &mut Frame, area: Rect, keys: &[KeybindingEntry]) {
    let mut categories: Vec<&str> = Vec::new();
    for key in keys {
        if categories.last() != Some(&key.category) {
            categories.push(key.category);
        }
    }
    let content_height = keys.len() + categories.len() * 2;

    let popup_width = 50.min(area.width.saturating_sub(4)).max(36);
    let popup_height = (content_height as u16 + 2)
        .min(area.height.saturating_sub(4))
        .max(10);
    let popup_area = centered_rect_constrained(area, popup_width, popup_width, popup_height, popup_height);

    frame.render_widget(Clear, popup_area);

    let block = popup_block("Help", "? or Esc close");
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let mut items: Vec<ListItem> = Vec::new();
    let mut current_category: Option<&str> = None;
    let key_width = 12;

    for entry in keys {
        if current_category != Some(entry.category) {
            if current_category.is_some() {
                items.push(ListItem::new(Line::from("")));
            }
            let header_line = Line::from(vec![
                Span::styled(
                    format!("── {} ", entry.category),
                    Theme::text_secondary().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    "─".repeat(inner.width.saturating_sub(entry.category.len() as u16 + 4) as usize),
                    Theme::border(),
                ),
            ]);
            items.push(ListItem::new(header_line));
            current_category = Some(entry.category);
        }

        let key_display = if entry.key.chars().count() > key_width {
            entry.key.chars().take(key_width).collect::<String>()
        } else {
            format!("{:width$}", entry.key, width = key_width)
        };

        items.push(ListItem::new(Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled(key_display, Theme::text_accent()),
            Span::styled(entry.description.clone(), Theme::text()),
        ])));
    }

    frame.render_widget(List::new(items).style(Theme::main_bg()), inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::warning::SafeConversation;
    use std::collections::{BTreeMap, BTreeSet};

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_direct_review_shows_both_titles() {
        let request = ReviewRequest::DirectConversationWithSameTitle {
            possibly_unsafe_conversation: SafeConversation {
                id: "c-1".to_string(),
                title: "Sam Rivera".to_string(),
            },
            safe_conversation: SafeConversation {
                id: "c-2".to_string(),
                title: "Sam Rivera".to_string(),
            },
        };
        let lines: Vec<String> = review_lines(&request).iter().map(text).collect();
        assert_eq!(
            lines.iter().filter(|l| l.contains("Sam Rivera")).count(),
            2
        );
    }

    #[test]
    fn test_group_review_lists_every_member() {
        let mut collisions = BTreeMap::new();
        collisions.insert(
            "Alex".to_string(),
            BTreeSet::from(["member-alex-1".to_string(), "member-alex-2".to_string()]),
        );
        let request = ReviewRequest::MultipleGroupMembersWithSameTitle {
            group_conversation_id: "g-1".to_string(),
            collisions,
        };
        let lines: Vec<String> = review_lines(&request).iter().map(text).collect();
        assert!(lines.iter().any(|l| l.contains("2 members")));
        assert!(lines.iter().any(|l| l.trim() == "member-alex-1"));
        assert!(lines.iter().any(|l| l.trim() == "member-alex-2"));
    }
}
