//! Message rendering for the conversation timeline

use std::collections::HashMap;
use std::fmt::Write;

use chrono::{DateTime, Local};
use ratatui::text::{Line, Span};

use super::theme::{Theme, symbols, with_selection_bg};
use super::widgets::{format_date, sanitize_text, wrap_text};
use crate::constants::HEADER_GAP_MINUTES;
use crate::store::Message;
use crate::timeline::{ConversationKind, ItemContext, ItemRenderer, MessageId};

const GUTTER: usize = 2;

/// Renders loaded messages. The timeline only knows ids; content is fed in
/// from store updates.
pub struct ConversationRenderer {
    title: String,
    kind: ConversationKind,
    messages: HashMap<MessageId, Message>,
    date_format: String,
}

impl ConversationRenderer {
    pub fn new(date_format: impl Into<String>) -> Self {
        Self {
            title: String::new(),
            kind: ConversationKind::default(),
            messages: HashMap::new(),
            date_format: date_format.into(),
        }
    }

    pub fn set_conversation(&mut self, title: impl Into<String>, kind: ConversationKind) {
        self.title = title.into();
        self.kind = kind;
    }

    pub fn set_messages(&mut self, messages: Vec<Message>) {
        self.messages = messages
            .into_iter()
            .map(|message| (message.id.clone(), message))
            .collect();
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// A header is shown when the author changes or after a long pause
    fn starts_run(&self, message: &Message, previous: Option<&MessageId>) -> bool {
        let Some(prev) = previous.and_then(|id| self.messages.get(id)) else {
            return true;
        };
        prev.author != message.author
            || prev.outgoing != message.outgoing
            || (message.sent_at - prev.sent_at).num_minutes() >= HEADER_GAP_MINUTES
    }

    fn header_date(&self, sent_at: &DateTime<Local>, detailed: bool) -> String {
        if detailed {
            let mut out = String::new();
            if write!(out, "{}", sent_at.format(&self.date_format)).is_ok() {
                return out;
            }
        }
        format_date(sent_at, &Local::now())
    }
}

fn gutter(selected: bool) -> Span<'static> {
    if selected {
        Span::styled(
            format!("{:<GUTTER$}", symbols::SELECTED),
            with_selection_bg(Theme::text_accent(), true),
        )
    } else {
        Span::styled(" ".repeat(GUTTER), Theme::main_bg())
    }
}

impl ItemRenderer for ConversationRenderer {
    fn render_item(&self, ctx: &ItemContext<'_>) -> Vec<Line<'static>> {
        let selected = ctx.is_selected;
        let Some(message) = self.messages.get(ctx.id) else {
            return vec![Line::from(vec![
                gutter(selected),
                Span::styled(symbols::TYPING, with_selection_bg(Theme::text_muted(), selected)),
            ])];
        };

        let mut lines = Vec::new();

        if self.starts_run(message, ctx.previous_id) {
            let (author, author_style) = if message.outgoing {
                ("You", Theme::author_self())
            } else {
                (message.author.as_str(), Theme::author())
            };
            let date = self.header_date(&message.sent_at, ctx.has_recently_scrolled);
            lines.push(Line::from(vec![
                gutter(selected),
                Span::styled(sanitize_text(author), with_selection_bg(author_style, selected)),
                Span::styled(
                    format!("  {}", date),
                    with_selection_bg(Theme::text_muted(), selected),
                ),
            ]));
        }

        let body_width = usize::from(ctx.width).saturating_sub(GUTTER).max(1);
        let body_style = with_selection_bg(Theme::text(), selected);
        for text in wrap_text(&sanitize_text(&message.body), body_width) {
            lines.push(Line::from(vec![
                gutter(selected),
                Span::styled(text, body_style),
            ]));
        }

        lines
    }

    fn render_hero(&self, width: u16) -> Vec<Line<'static>> {
        let subtitle = match self.kind {
            ConversationKind::Direct => "Direct conversation",
            ConversationKind::Group => "Group conversation",
        };
        let title = wrap_text(&sanitize_text(&self.title), usize::from(width).max(1));
        let mut lines: Vec<Line<'static>> = title
            .into_iter()
            .map(|line| Line::styled(line, Theme::title()).centered())
            .collect();
        lines.push(Line::styled(subtitle, Theme::text_muted()).centered());
        lines.push(Line::from(""));
        lines
    }

    fn render_typing(&self, _width: u16) -> Vec<Line<'static>> {
        let who = match self.kind {
            ConversationKind::Direct if !self.title.is_empty() => self.title.as_str(),
            _ => "Someone",
        };
        vec![Line::from(vec![
            Span::styled(" ".repeat(GUTTER), Theme::main_bg()),
            Span::styled(format!("{} is typing{}", who, symbols::TYPING), Theme::typing()),
        ])]
    }

    fn render_unread_marker(&self, total_unread: usize, width: u16) -> Vec<Line<'static>> {
        let label = if total_unread == 1 {
            " 1 unread message ".to_string()
        } else {
            format!(" {} unread messages ", total_unread)
        };
        let fill = usize::from(width).saturating_sub(label.chars().count());
        let left = fill / 2;
        let text = format!("{}{}{}", "─".repeat(left), label, "─".repeat(fill - left));
        vec![Line::styled(text, Theme::unread_marker())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{CommandSink, ItemActions};
    use chrono::TimeZone;
    use tokio::sync::mpsc;

    fn at(hour: u32, minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 6, 15, hour, minute, 0).unwrap()
    }

    fn message(id: &str, author: &str, body: &str, sent_at: DateTime<Local>) -> Message {
        Message {
            id: MessageId::from(id),
            author: author.to_string(),
            body: body.to_string(),
            sent_at,
            outgoing: false,
        }
    }

    fn renderer() -> ConversationRenderer {
        let mut renderer = ConversationRenderer::new("%Y-%m-%d %H:%M");
        renderer.set_conversation("Sam Rivera", ConversationKind::Direct);
        renderer.set_messages(vec![
            message("m1", "Sam", "hello there", at(9, 0)),
            message("m2", "Sam", "are you around", at(9, 2)),
            message("m3", "Sam", "ping", at(10, 0)),
            message("m4", "Alex", "hi", at(10, 1)),
        ]);
        renderer
    }

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn render(
        renderer: &ConversationRenderer,
        id: &str,
        previous: Option<&str>,
        selected: bool,
        scrolled: bool,
        width: u16,
    ) -> Vec<Line<'static>> {
        let (tx, _rx) = mpsc::channel(4);
        let actions = ItemActions::new("c1".to_string(), CommandSink::new(tx));
        let id = MessageId::from(id);
        let previous = previous.map(MessageId::from);
        let ctx = ItemContext {
            id: &id,
            index: 0,
            previous_id: previous.as_ref(),
            next_id: None,
            is_selected: selected,
            is_oldest_unread: false,
            has_recently_scrolled: scrolled,
            width,
            actions: &actions,
        };
        renderer.render_item(&ctx)
    }

    #[test]
    fn test_header_only_at_start_of_run() {
        let renderer = renderer();

        let first = render(&renderer, "m1", None, false, false, 40);
        assert_eq!(first.len(), 2);
        assert!(text(&first[0]).contains("Sam"));

        // Same author two minutes later: body only
        let second = render(&renderer, "m2", Some("m1"), false, false, 40);
        assert_eq!(second.len(), 1);
        assert_eq!(text(&second[0]), "  are you around");

        // Same author after a long pause, then a different author
        assert_eq!(render(&renderer, "m3", Some("m2"), false, false, 40).len(), 2);
        assert_eq!(render(&renderer, "m4", Some("m3"), false, false, 40).len(), 2);
    }

    #[test]
    fn test_body_wraps_to_width() {
        let renderer = renderer();
        // 12 columns minus the gutter leaves 10 for "hello there"
        let lines = render(&renderer, "m1", None, false, false, 12);
        assert_eq!(lines.len(), 3);
        assert_eq!(text(&lines[1]), "  hello");
        assert_eq!(text(&lines[2]), "  there");
    }

    #[test]
    fn test_recent_scroll_shows_detailed_date() {
        let renderer = renderer();
        let lines = render(&renderer, "m1", None, false, true, 60);
        assert!(text(&lines[0]).contains("2024-06-15 09:00"));
    }

    #[test]
    fn test_selected_item_has_marker() {
        let renderer = renderer();
        let lines = render(&renderer, "m2", Some("m1"), true, false, 40);
        assert!(text(&lines[0]).starts_with(symbols::SELECTED));
    }

    #[test]
    fn test_unknown_message_renders_placeholder() {
        let renderer = renderer();
        assert_eq!(render(&renderer, "missing", None, false, false, 40).len(), 1);
    }

    #[test]
    fn test_unread_marker_fills_width() {
        let renderer = renderer();
        let lines = renderer.render_unread_marker(3, 40);
        assert_eq!(lines.len(), 1);
        let line = text(&lines[0]);
        assert!(line.contains("3 unread messages"));
        assert_eq!(line.chars().count(), 40);
    }

    #[test]
    fn test_typing_names_direct_contact() {
        let mut renderer = renderer();
        assert!(text(&renderer.render_typing(40)[0]).contains("Sam Rivera is typing"));

        renderer.set_conversation("Release crew", ConversationKind::Group);
        assert!(text(&renderer.render_typing(40)[0]).contains("Someone is typing"));
    }
}
