//! Dusk Ledger palette and semantic styling for the TUI.

use ratatui::style::{Color, Modifier, Style};

// ── Core Palette ──────────────────────────────────────────────────────

pub const HARBOR_BLUE: Color = Color::Rgb(94, 174, 227); // #5eaee3
pub const SAND: Color = Color::Rgb(229, 192, 123); // #e5c07b
pub const SAGE: Color = Color::Rgb(140, 194, 126); // #8cc27e
pub const BRICK: Color = Color::Rgb(224, 108, 97); // #e06c61
#[allow(dead_code)]
pub const LILAC: Color = Color::Rgb(187, 154, 211); // #bb9ad3

// ── Extended Palette ──────────────────────────────────────────────────

pub const DIM_WHITE: Color = Color::Rgb(171, 178, 191); // #abb2bf
pub const BORDER_GRAY: Color = Color::Rgb(92, 99, 112); // #5c6370
pub const BG_HIGHLIGHT: Color = Color::Rgb(44, 49, 58); // #2c313a
pub const BG_DARK: Color = Color::Rgb(30, 33, 39); // #1e2127

// ── Semantic Styles ───────────────────────────────────────────────────

/// Title text for blocks/panels.
pub fn title_style() -> Style {
    Style::default()
        .fg(HARBOR_BLUE)
        .add_modifier(Modifier::BOLD)
}

/// Border for a focused panel.
pub fn border_focused() -> Style {
    Style::default().fg(SAND)
}

/// Border for an unfocused panel.
pub fn border_default() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Table header row.
pub fn table_header() -> Style {
    Style::default()
        .fg(HARBOR_BLUE)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

/// Normal table row text.
pub fn table_row() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Selected / highlighted table row.
pub fn table_selected() -> Style {
    Style::default()
        .fg(SAND)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

/// Active tab in the tab bar.
pub fn tab_active() -> Style {
    Style::default().fg(SAND).add_modifier(Modifier::BOLD)
}

/// Inactive tab in the tab bar.
pub fn tab_inactive() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Status bar text.
pub fn status_bar() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Key hint text (e.g., "q quit  ? help").
pub fn key_hint() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Key hint key character.
pub fn key_hint_key() -> Style {
    Style::default()
        .fg(HARBOR_BLUE)
        .add_modifier(Modifier::BOLD)
}

/// Marker for a filter field whose draft differs from the applied value.
pub fn dirty_marker() -> Style {
    Style::default().fg(SAND).add_modifier(Modifier::BOLD)
}

/// Error text (failed fetches, parse errors).
pub fn error_text() -> Style {
    Style::default().fg(BRICK)
}

/// Success text (connection established, filters applied).
pub fn success_text() -> Style {
    Style::default().fg(SAGE)
}
