pub mod app;
mod banner;
mod dialogs;
mod status_bar;
pub mod theme;
pub mod timeline;
mod widgets;

use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub use app::render;
pub use timeline::ConversationRenderer;

/// Screen regions. Shared by the renderer and the event loop, which needs the
/// timeline size before anything is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub header: Rect,
    pub banner: Option<Rect>,
    pub timeline: Rect,
    pub status: Rect,
    pub footer: Rect,
}

pub fn screen_layout(area: Rect, has_banner: bool) -> ScreenLayout {
    let mut constraints = vec![Constraint::Length(1)]; // Header
    if has_banner {
        constraints.push(Constraint::Length(1)); // Warning banner
    }
    constraints.extend([
        Constraint::Min(0),    // Timeline
        Constraint::Length(1), // Status bar
        Constraint::Length(1), // Help bar or error
    ]);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    if has_banner {
        ScreenLayout {
            header: chunks[0],
            banner: Some(chunks[1]),
            timeline: chunks[2],
            status: chunks[3],
            footer: chunks[4],
        }
    } else {
        ScreenLayout {
            header: chunks[0],
            banner: None,
            timeline: chunks[1],
            status: chunks[2],
            footer: chunks[3],
        }
    }
}

/// Creates a centered rect with min/max constraints for width and height.
/// The actual size is clamped between min and max, then constrained to fit within area.
pub fn centered_rect_constrained(
    area: Rect,
    min_width: u16,
    max_width: u16,
    min_height: u16,
    max_height: u16,
) -> Rect {
    let w = max_width
        .min(area.width.saturating_sub(4))
        .max(min_width)
        .min(area.width);
    let h = max_height
        .min(area.height.saturating_sub(4))
        .max(min_height)
        .min(area.height);

    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}
