//! Top-level frame rendering

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Paragraph},
};

use super::banner::{render_scroll_down_button, render_warning_banner};
use super::dialogs::{render_confirm_dialog, render_help_popup, render_review_dialog};
use super::screen_layout;
use super::status_bar::{StatusInfo, status_bar, truncate_to_width};
use super::theme::Theme;
use super::widgets::{error_bar, help_bar};
use crate::app::state::{AppState, ModalState};
use crate::config::KeybindingMode;

/// Keys shown in hints, per keybinding mode
struct Hints {
    nav: &'static str,
    review: &'static str,
    dismiss: &'static str,
    accept: &'static str,
    block: &'static str,
    unblock: &'static str,
    delete: &'static str,
    newest: &'static str,
}

fn hints(mode: KeybindingMode) -> Hints {
    match mode {
        KeybindingMode::Vim => Hints {
            nav: "j/k",
            review: "r",
            dismiss: "x",
            accept: "a",
            block: "b",
            unblock: "U",
            delete: "D",
            newest: "n",
        },
        KeybindingMode::Arrows => Hints {
            nav: "↑/↓",
            review: "F2",
            dismiss: "F3",
            accept: "^a",
            block: "^b",
            unblock: "^u",
            delete: "Del",
            newest: "End",
        },
    }
}

pub fn render(frame: &mut Frame, state: &AppState) {
    let area = frame.area();
    frame.render_widget(Block::default().style(Theme::main_bg()), area);

    let view = &state.timeline;
    let keys = hints(state.keybinding_mode);
    let layout = screen_layout(area, view.warning.is_some());

    render_header(frame, layout.header, state);

    if let (Some(banner), Some(warning)) = (layout.banner, view.warning.as_ref()) {
        render_warning_banner(frame, banner, warning, keys.review, keys.dismiss);
    }

    render_timeline(frame, layout.timeline, state);

    let info = StatusInfo {
        title: &state.title,
        unread: view.total_unread,
        loading: view.loading,
        near_bottom: view.is_near_bottom,
        status_message: Some(state.status.message.as_str()),
        has_error: state.status.has_unacknowledged_error,
        focus: state.focus,
    };
    status_bar(frame, layout.status, &info);

    render_footer(frame, layout.footer, state, &keys);

    // Overlays, topmost last
    if let Some(review) = view.review.as_ref() {
        render_review_dialog(frame, area, review);
    }
    if let Some(dialog) = state.modal.confirm() {
        render_confirm_dialog(frame, area, dialog);
    }
    if let ModalState::Help { ref keybindings } = state.modal {
        render_help_popup(frame, area, keybindings);
    }
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let view = &state.timeline;
    let mut tags = Vec::new();
    if view.is_group {
        tags.push("group");
    }
    if view.is_message_request {
        tags.push("request");
    }
    if view.is_blocked {
        tags.push("blocked");
    }
    let tags = if tags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", tags.join(", "))
    };

    let title_width = (area.width as usize).saturating_sub(tags.chars().count() + 1);
    let line = Line::from(vec![
        Span::styled(format!(" {}", truncate_to_width(&state.title, title_width)), Theme::title()),
        Span::styled(tags, Theme::text_muted()),
    ]);
    frame.render_widget(Paragraph::new(line).style(Theme::main_bg()), area);
}

fn render_timeline(frame: &mut Frame, area: Rect, state: &AppState) {
    let view = &state.timeline;

    if view.lines.is_empty() {
        let text = if view.loading.is_some() {
            "Loading messages..."
        } else {
            "No messages"
        };
        if area.height == 0 {
            return;
        }
        let centered = Rect::new(area.x, area.y + area.height / 2, area.width, 1);
        frame.render_widget(
            Paragraph::new(text)
                .style(Theme::text_muted())
                .alignment(Alignment::Center),
            centered,
        );
        return;
    }

    frame.render_widget(
        Paragraph::new(view.lines.clone()).style(Theme::main_bg()),
        area,
    );

    if let Some(button) = view.scroll_down {
        render_scroll_down_button(frame, area, button);
    }
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState, keys: &Hints) {
    if let Some(ref error) = state.status.error {
        error_bar(frame, area, error);
        return;
    }

    let view = &state.timeline;
    if state.modal.confirm().is_some() {
        help_bar(frame, area, &[("y", "confirm"), ("n", "cancel")]);
    } else if state.modal.is_help() || state.review_open() {
        help_bar(frame, area, &[("Esc", "close")]);
    } else if state.composer_focused() {
        help_bar(frame, area, &[("Tab", "back to timeline")]);
    } else if view.is_message_request {
        help_bar(
            frame,
            area,
            &[
                (keys.accept, "accept"),
                (keys.block, "block"),
                (keys.delete, "delete"),
                ("?", "help"),
            ],
        );
    } else if view.is_blocked {
        help_bar(
            frame,
            area,
            &[(keys.unblock, "unblock"), (keys.delete, "delete"), ("?", "help")],
        );
    } else {
        help_bar(
            frame,
            area,
            &[
                (keys.nav, "select"),
                (keys.newest, "newest"),
                ("Tab", "composer"),
                ("?", "help"),
            ],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::{ConfirmDialog, TimelineView};
    use ratatui::{Terminal, backend::TestBackend};

    fn draw(state: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        terminal.draw(|f| render(f, state)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_render_loading_placeholder() {
        let state = AppState {
            title: "Sam Rivera".to_string(),
            timeline: TimelineView {
                loading: Some(crate::timeline::MessageLoadingState::DoingInitialLoad),
                ..Default::default()
            },
            ..Default::default()
        };
        let screen = draw(&state);
        assert!(screen.contains("Sam Rivera"));
        assert!(screen.contains("Loading messages..."));
    }

    #[test]
    fn test_render_confirm_dialog_on_top() {
        let state = AppState {
            title: "Sam Rivera".to_string(),
            timeline: TimelineView {
                lines: vec![Line::from("hello")],
                is_blocked: true,
                ..Default::default()
            },
            modal: ModalState::Confirm(ConfirmDialog::Unblock),
            ..Default::default()
        };
        let screen = draw(&state);
        assert!(screen.contains("Unblock this conversation?"));
        assert!(screen.contains("[blocked]"));
    }

    #[test]
    fn test_arrow_mode_hints() {
        assert_eq!(hints(KeybindingMode::Arrows).review, "F2");
        assert_eq!(hints(KeybindingMode::Vim).nav, "j/k");
    }
}
