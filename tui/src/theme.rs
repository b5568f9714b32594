//! Theme and Colors
//!
//! A purple-to-blue palette on the terminal's own background.

use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// Palette
// ============================================================================

/// Title and figure accent - soft purple
pub const ACCENT_PURPLE: Color = Color::Rgb(167, 139, 250);

/// Secondary accent - cornflower blue
pub const ACCENT_BLUE: Color = Color::Rgb(100, 149, 237);

/// Selected row background
pub const HIGHLIGHT_BG: Color = Color::Rgb(55, 48, 90);

/// User messages
pub const USER_GREEN: Color = Color::Rgb(130, 220, 130);

/// Pending indicator
pub const PENDING_BLUE: Color = Color::Rgb(150, 180, 255);

/// Secondary text (era, descriptions, hints)
pub const DIM_GRAY: Color = Color::Rgb(120, 120, 120);

/// Disabled input
pub const DISABLED_GRAY: Color = Color::Rgb(80, 80, 80);

// ============================================================================
// Styles
// ============================================================================

/// Screen title
#[must_use]
pub fn title() -> Style {
    Style::default()
        .fg(ACCENT_PURPLE)
        .add_modifier(Modifier::BOLD)
}

/// Borders of focused boxes
#[must_use]
pub fn border() -> Style {
    Style::default().fg(ACCENT_BLUE)
}

/// Secondary text
#[must_use]
pub fn dim() -> Style {
    Style::default().fg(DIM_GRAY)
}

/// Highlighted list row
#[must_use]
pub fn selected() -> Style {
    Style::default()
        .bg(HIGHLIGHT_BG)
        .add_modifier(Modifier::BOLD)
}
