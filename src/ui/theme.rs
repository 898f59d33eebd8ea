//! Centralized theming for the convo TUI
//!
//! This module provides a single source of truth for all colors and styles
//! used throughout the application.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::BorderType;
use std::sync::RwLock;

use crate::config::ThemeVariant;

/// Global theme variant storage
static THEME_VARIANT: RwLock<ThemeVariant> = RwLock::new(ThemeVariant::Modern);

/// Initialize the theme variant (call once at startup)
pub fn init_theme(variant: ThemeVariant) {
    if let Ok(mut guard) = THEME_VARIANT.write() {
        *guard = variant;
    }
}

/// Get the current theme variant
pub fn current_theme() -> ThemeVariant {
    THEME_VARIANT.read().map(|g| *g).unwrap_or_default()
}

/// Catppuccin Mocha color palette for the Modern theme
#[allow(dead_code)]
mod catppuccin {
    use super::Color;

    // Background layers (darkest to lightest)
    pub const BASE: Color = Color::Rgb(30, 30, 46); // #1e1e2e - main background
    pub const MANTLE: Color = Color::Rgb(24, 24, 37); // #181825 - status bar, panels
    pub const SURFACE0: Color = Color::Rgb(49, 50, 68); // #313244 - borders
    pub const SURFACE1: Color = Color::Rgb(69, 71, 90); // #45475a - selection

    // Text colors
    pub const TEXT: Color = Color::Rgb(205, 214, 244); // #cdd6f4 - primary
    pub const SUBTEXT1: Color = Color::Rgb(186, 194, 222); // #bac2de - secondary
    pub const OVERLAY0: Color = Color::Rgb(108, 112, 134); // #6c7086 - muted/disabled

    // Accent colors
    pub const LAVENDER: Color = Color::Rgb(180, 190, 254); // #b4befe - focused borders
    pub const BLUE: Color = Color::Rgb(137, 180, 250); // #89b4fa - accent, own messages
    pub const GREEN: Color = Color::Rgb(166, 227, 161); // #a6e3a1 - at bottom
    pub const YELLOW: Color = Color::Rgb(249, 226, 175); // #f9e2af - warnings
    pub const PEACH: Color = Color::Rgb(250, 179, 135); // #fab387 - authors
    pub const RED: Color = Color::Rgb(243, 139, 168); // #f38ba8 - errors
    pub const MAUVE: Color = Color::Rgb(203, 166, 247); // #cba6f7 - unread marker
}

/// Border type helpers for different UI contexts
pub mod borders {
    use super::*;

    /// Border type for popups and modals (rounded for RGB themes)
    pub fn popup() -> BorderType {
        match current_theme() {
            ThemeVariant::Modern => BorderType::Rounded,
            _ => BorderType::Plain,
        }
    }
}

/// Color palette - colors that vary by theme
pub mod colors {
    use super::*;

    pub fn bg_selection() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::SURFACE1,
            ThemeVariant::Dark => Color::DarkGray,
            ThemeVariant::HighContrast => Color::Blue,
        }
    }

    pub fn bg_status() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::MANTLE,
            ThemeVariant::Dark => Color::DarkGray,
            ThemeVariant::HighContrast => Color::Black,
        }
    }

    pub fn bg_error() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::RED,
            _ => Color::Red,
        }
    }

    pub fn fg_primary() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::TEXT,
            _ => Color::White,
        }
    }

    pub fn fg_secondary() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::SUBTEXT1,
            ThemeVariant::Dark => Color::Gray,
            ThemeVariant::HighContrast => Color::White,
        }
    }

    pub fn fg_muted() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::OVERLAY0,
            ThemeVariant::Dark | ThemeVariant::HighContrast => Color::Gray,
        }
    }

    pub fn fg_accent() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::BLUE,
            ThemeVariant::Dark => Color::Cyan,
            ThemeVariant::HighContrast => Color::LightCyan,
        }
    }

    pub fn fg_warning() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::YELLOW,
            ThemeVariant::Dark => Color::Yellow,
            ThemeVariant::HighContrast => Color::LightYellow,
        }
    }

    pub fn fg_author() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::PEACH,
            ThemeVariant::Dark => Color::Yellow,
            ThemeVariant::HighContrast => Color::LightYellow,
        }
    }

    pub fn unread_indicator() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::MAUVE,
            ThemeVariant::Dark => Color::Magenta,
            ThemeVariant::HighContrast => Color::LightMagenta,
        }
    }

    pub fn border() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::SURFACE0,
            ThemeVariant::Dark => Color::DarkGray,
            ThemeVariant::HighContrast => Color::Gray,
        }
    }

    pub fn border_focused() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::LAVENDER,
            ThemeVariant::Dark => Color::Cyan,
            ThemeVariant::HighContrast => Color::LightCyan,
        }
    }

    pub fn status_ok() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::GREEN,
            ThemeVariant::Dark => Color::Green,
            ThemeVariant::HighContrast => Color::LightGreen,
        }
    }

    pub fn status_busy() -> Color {
        fg_warning()
    }

    /// Background for help bar (same as status bar)
    pub fn bg_help() -> Color {
        bg_status()
    }

    /// Main background color for the entire UI
    pub fn bg_main() -> Color {
        match current_theme() {
            ThemeVariant::Modern => catppuccin::BASE,
            // Basic themes use terminal default
            _ => Color::Reset,
        }
    }
}

/// UI symbols - centralized for consistency
pub mod symbols {
    pub const UNREAD: &str = "●";
    pub const AT_BOTTOM: &str = "●";
    pub const SCROLLED_UP: &str = "○";
    pub const SELECTED: &str = "▌";
    pub const WARNING: &str = "⚠";
    pub const JUMP_DOWN: &str = "↓";
    pub const TYPING: &str = "…";
}

/// Pre-composed styles for common UI elements
pub struct Theme;

impl Theme {
    // === Selection Styles ===

    pub fn selected() -> Style {
        Style::default()
            .bg(colors::bg_selection())
            .fg(colors::fg_primary())
    }

    // === Text Styles ===

    pub fn text() -> Style {
        Style::default()
            .fg(colors::fg_primary())
            .bg(colors::bg_main())
    }

    pub fn text_secondary() -> Style {
        Style::default()
            .fg(colors::fg_secondary())
            .bg(colors::bg_main())
    }

    pub fn text_muted() -> Style {
        Style::default()
            .fg(colors::fg_muted())
            .bg(colors::bg_main())
    }

    pub fn text_accent() -> Style {
        Style::default()
            .fg(colors::fg_accent())
            .bg(colors::bg_main())
    }

    pub fn title() -> Style {
        Self::text().add_modifier(Modifier::BOLD)
    }

    /// Message author line
    pub fn author() -> Style {
        Style::default()
            .fg(colors::fg_author())
            .bg(colors::bg_main())
            .add_modifier(Modifier::BOLD)
    }

    /// Author line for messages the user sent
    pub fn author_self() -> Style {
        Style::default()
            .fg(colors::fg_accent())
            .bg(colors::bg_main())
            .add_modifier(Modifier::BOLD)
    }

    // === Timeline ===

    pub fn unread_marker() -> Style {
        Style::default()
            .fg(colors::unread_indicator())
            .bg(colors::bg_main())
            .add_modifier(Modifier::BOLD)
    }

    pub fn typing() -> Style {
        Self::text_muted().add_modifier(Modifier::ITALIC)
    }

    pub fn warning_banner() -> Style {
        Style::default()
            .fg(colors::fg_warning())
            .bg(colors::bg_status())
    }

    pub fn scroll_down_button() -> Style {
        Style::default()
            .fg(colors::bg_main())
            .bg(colors::fg_accent())
            .add_modifier(Modifier::BOLD)
    }

    // === Status Bar ===

    pub fn status_bar() -> Style {
        Style::default()
            .bg(colors::bg_status())
            .fg(colors::fg_primary())
    }

    pub fn error_bar() -> Style {
        Style::default()
            .bg(colors::bg_error())
            .fg(colors::fg_primary())
    }

    pub fn status_ok() -> Style {
        Style::default()
            .bg(colors::bg_status())
            .fg(colors::status_ok())
    }

    pub fn status_busy() -> Style {
        Style::default()
            .bg(colors::bg_status())
            .fg(colors::status_busy())
    }

    pub fn status_error() -> Style {
        Style::default()
            .bg(colors::bg_status())
            .fg(colors::bg_error())
    }

    /// Low emphasis dividers and separators
    pub fn status_muted() -> Style {
        Style::default()
            .bg(colors::bg_status())
            .fg(colors::fg_muted())
    }

    pub fn status_info() -> Style {
        Style::default()
            .bg(colors::bg_status())
            .fg(colors::fg_primary())
    }

    pub fn status_badge() -> Style {
        Style::default()
            .bg(colors::bg_status())
            .fg(colors::unread_indicator())
    }

    // === Help Bar ===

    pub fn help_key() -> Style {
        Style::default()
            .bg(colors::bg_help())
            .fg(colors::fg_warning())
    }

    pub fn help_desc() -> Style {
        Style::default()
            .bg(colors::bg_help())
            .fg(colors::fg_muted())
    }

    // === Borders ===

    pub fn border() -> Style {
        Style::default().fg(colors::border()).bg(colors::bg_main())
    }

    pub fn border_focused() -> Style {
        Style::default()
            .fg(colors::border_focused())
            .bg(colors::bg_main())
    }

    /// Main background style - use to fill the entire frame
    pub fn main_bg() -> Style {
        Style::default().bg(colors::bg_main())
    }

    pub fn label() -> Style {
        Style::default()
            .fg(colors::fg_muted())
            .bg(colors::bg_main())
            .add_modifier(Modifier::BOLD)
    }
}

/// Merge a style with selection or main background.
/// This ensures the selection highlight covers the entire row.
pub fn with_selection_bg(style: Style, selected: bool) -> Style {
    if selected {
        style.bg(colors::bg_selection())
    } else {
        style.bg(colors::bg_main())
    }
}
