//! Common UI widgets and utilities

use chrono::{DateTime, Datelike, Local};
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme::Theme;

pub fn error_bar(frame: &mut Frame, area: Rect, message: &str) {
    let style = Theme::error_bar();
    let paragraph = Paragraph::new(format!(" Error: {} ", message)).style(style);
    frame.render_widget(paragraph, area);
}

pub fn help_bar(frame: &mut Frame, area: Rect, hints: &[(&str, &str)]) {
    use unicode_width::UnicodeWidthStr;

    let available_width = area.width as usize;

    // Format: " key desc │" (separator between hints)
    let hint_widths: Vec<usize> = hints
        .iter()
        .enumerate()
        .map(|(i, (key, desc))| {
            let base = format!(" {} ", key).width() + desc.width();
            if i + 1 < hints.len() {
                base + 3 // " │ " separator
            } else {
                base + 1 // trailing space
            }
        })
        .collect();

    let mut total_width = 0;
    let mut hints_to_show = 0;
    for width in &hint_widths {
        if total_width + width <= available_width {
            total_width += width;
            hints_to_show += 1;
        } else {
            break;
        }
    }

    // Show at least one hint if possible
    hints_to_show = hints_to_show.max(1).min(hints.len());

    let mut spans: Vec<Span> = Vec::new();
    for (i, (key, desc)) in hints.iter().take(hints_to_show).enumerate() {
        spans.push(Span::styled(format!(" {} ", key), Theme::help_key()));
        spans.push(Span::styled(desc.to_string(), Theme::help_desc()));
        if i + 1 < hints_to_show {
            spans.push(Span::styled(" │ ", Theme::help_desc()));
        }
    }
    spans.push(Span::styled(" ", Theme::help_desc()));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Short date for message headers, relative to `now`
pub fn format_date(dt: &DateTime<Local>, now: &DateTime<Local>) -> String {
    let today = now.date_naive();
    let date = dt.date_naive();

    if date == today {
        dt.format("%H:%M").to_string()
    } else if (today - date).num_days() < 7 {
        dt.format("%a %H:%M").to_string()
    } else if date.year() == today.year() {
        dt.format("%b %d").to_string()
    } else {
        dt.format("%Y-%m-%d").to_string()
    }
}

/// Sanitize text for display: remove control characters and ANSI escape sequences
pub fn sanitize_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        // ANSI escape sequence (ESC [ ... letter)
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            while let Some(&ch) = chars.peek() {
                chars.next();
                if ch.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        // Replace other control characters (except newline) with space
        if c.is_control() && c != '\n' {
            result.push(' ');
        } else {
            result.push(c);
        }
    }

    result
}

/// Greedy word wrap by display width. Words longer than `width` are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_width = 0;

        for word in paragraph.split_whitespace() {
            let word_width = word.width();
            let sep = usize::from(!current.is_empty());

            if current_width + sep + word_width <= width {
                if sep == 1 {
                    current.push(' ');
                }
                current.push_str(word);
                current_width += sep + word_width;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }

            if word_width <= width {
                current.push_str(word);
                current_width = word_width;
            } else {
                for c in word.chars() {
                    let cw = c.width().unwrap_or(1);
                    if current_width + cw > width && !current.is_empty() {
                        lines.push(std::mem::take(&mut current));
                        current_width = 0;
                    }
                    current.push(c);
                    current_width += cw;
                }
            }
        }

        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sanitize_strips_escapes() {
        assert_eq!(sanitize_text("\x1b[31mred\x1b[0m"), "red");
        assert_eq!(sanitize_text("a\tb\nc"), "a b\nc");
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("hello brave new world", 11), vec!["hello brave", "new world"]);
        assert_eq!(wrap_text("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert_eq!(wrap_text("one\n\ntwo", 10), vec!["one", "", "two"]);
        assert_eq!(wrap_text("", 10), vec![""]);
    }

    #[test]
    fn test_format_date_today_and_older() {
        let now = Local.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let earlier = Local.with_ymd_and_hms(2024, 6, 15, 9, 5, 0).unwrap();
        assert_eq!(format_date(&earlier, &now), "09:05");

        let old = Local.with_ymd_and_hms(2023, 1, 2, 9, 5, 0).unwrap();
        assert_eq!(format_date(&old, &now), "2023-01-02");
    }
}
