//! Status bar rendering with scroll position and unread indicators

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme::{Theme, symbols};
use crate::constants::SPINNER_FRAME_MS;
use crate::timeline::{FocusTarget, MessageLoadingState};

/// Status bar info for rendering
pub struct StatusInfo<'a> {
    pub title: &'a str,
    pub unread: usize,
    pub loading: Option<MessageLoadingState>,
    pub near_bottom: bool,
    pub status_message: Option<&'a str>,
    /// Whether there's an unacknowledged error (show indicator)
    pub has_error: bool,
    pub focus: FocusTarget,
}

/// Calculate display width of a string (accounting for Unicode)
pub(crate) fn display_width(s: &str) -> usize {
    use unicode_width::UnicodeWidthStr;
    s.width()
}

/// Truncate string to fit display width
pub(crate) fn truncate_to_width(s: &str, max_width: usize) -> String {
    use unicode_width::UnicodeWidthChar;

    if display_width(s) <= max_width {
        return s.to_string();
    }
    if max_width < 4 {
        return s.chars().take(max_width).collect();
    }

    let mut width = 0;
    let mut result = String::new();

    for c in s.chars() {
        let char_width = c.width().unwrap_or(1);
        if width + char_width > max_width - 3 {
            result.push_str("...");
            return result;
        }
        width += char_width;
        result.push(c);
    }
    result
}

fn loading_label(state: MessageLoadingState) -> &'static str {
    match state {
        MessageLoadingState::DoingInitialLoad => "loading",
        MessageLoadingState::LoadingOlderMessages => "loading older",
        MessageLoadingState::LoadingNewerMessages => "loading newer",
    }
}

fn focus_label(focus: FocusTarget) -> Option<&'static str> {
    match focus {
        FocusTarget::Timeline => None,
        FocusTarget::Overlay => Some("[overlay]"),
        FocusTarget::Elsewhere => Some("[composer]"),
    }
}

pub fn status_bar(frame: &mut Frame, area: Rect, info: &StatusInfo) {
    let style = Theme::status_bar();
    let width = area.width as usize;

    // Scroll position indicator
    let (indicator, indicator_style) = match info.loading {
        Some(_) => (format!(" {} ", spinner_char()), Theme::status_busy()),
        None if info.near_bottom => (format!(" {} ", symbols::AT_BOTTOM), Theme::status_ok()),
        None => (format!(" {} ", symbols::SCROLLED_UP), Theme::status_muted()),
    };

    let error_indicator = if info.has_error { "! " } else { "" };

    let mut left: Vec<(String, Style)> = Vec::new();
    if info.unread > 0 {
        left.push((
            format!("{} {} ", symbols::UNREAD, info.unread),
            Theme::status_badge().add_modifier(Modifier::BOLD),
        ));
    }
    if let Some(label) = focus_label(info.focus) {
        left.push((format!("{} ", label), Theme::status_muted()));
    }

    // Right side: loading state, then transient message
    let mut right = String::new();
    if let Some(state) = info.loading {
        right.push_str(loading_label(state));
        right.push_str(" │ ");
    }
    if let Some(msg) = info.status_message
        && !msg.is_empty()
    {
        right.push_str(msg);
        right.push_str(" │ ");
    }

    let left_fixed = display_width(&indicator)
        + display_width(error_indicator)
        + left.iter().map(|(s, _)| display_width(s)).sum::<usize>();
    let min_padding = 2;
    let available_for_title =
        width.saturating_sub(left_fixed + display_width(&right) + min_padding + 1);
    let title = truncate_to_width(info.title, available_for_title.max(10));

    let used = left_fixed + display_width(&title) + 1 + display_width(&right);
    let padding = " ".repeat(width.saturating_sub(used));

    let mut spans = vec![Span::styled(indicator, indicator_style)];
    if info.has_error {
        spans.push(Span::styled(error_indicator, Theme::status_error()));
    }
    for (text, span_style) in left {
        spans.push(Span::styled(text, span_style));
    }
    spans.extend([
        Span::styled(padding, style),
        Span::styled(right, Theme::status_info()),
        Span::styled(format!("{} ", title), style.add_modifier(Modifier::BOLD)),
    ]);

    let paragraph = Paragraph::new(Line::from(spans)).style(style);
    frame.render_widget(paragraph, area);
}

/// Get an animated spinner character for loading states
pub fn spinner_char() -> char {
    let spinner = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";
    let millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let idx = (millis / SPINNER_FRAME_MS) as usize % spinner.chars().count();

    spinner.chars().nth(idx).unwrap_or('*')
}
