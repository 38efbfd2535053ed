//! Color theme and glyphs for the cordon TUI.
//!
//! Uses the Nord palette by default with an optional high-contrast override.

use ratatui::style::{Color, Modifier, Style};

/// Presentation toggles resolved from config and environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiOptions {
    pub ascii_only: bool,
    pub high_contrast: bool,
}

/// Nord color palette constants.
mod colors {
    use super::Color;

    // === Backgrounds (Polar Night) ===
    pub const BG_DARK: Color = Color::Rgb(46, 52, 64); // nord0
    pub const BG_PANEL: Color = Color::Rgb(59, 66, 82); // nord1
    pub const BG_HIGHLIGHT: Color = Color::Rgb(67, 76, 94); // nord2
    pub const BG_BORDER: Color = Color::Rgb(76, 86, 106); // nord3

    // === Foregrounds (Snow Storm) ===
    pub const TEXT_PRIMARY: Color = Color::Rgb(236, 239, 244); // nord6
    pub const TEXT_SECONDARY: Color = Color::Rgb(216, 222, 233); // nord4
    pub const TEXT_MUTED: Color = Color::Rgb(129, 133, 143); // dimmed nord3

    // === Frost ===
    pub const PRIMARY: Color = Color::Rgb(136, 192, 208); // nord8
    pub const ACCENT: Color = Color::Rgb(129, 161, 193); // nord9

    // === Aurora ===
    pub const SUCCESS: Color = Color::Rgb(163, 190, 140); // nord14
    pub const WARNING: Color = Color::Rgb(235, 203, 139); // nord13
    pub const ERROR: Color = Color::Rgb(191, 97, 106); // nord11
}

/// Resolved theme palette used by the UI.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg_dark: Color,
    pub bg_panel: Color,
    pub bg_highlight: Color,
    pub bg_border: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_muted: Color,
    pub primary: Color,
    pub accent: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
}

impl Palette {
    #[must_use]
    pub fn standard() -> Self {
        Self {
            bg_dark: colors::BG_DARK,
            bg_panel: colors::BG_PANEL,
            bg_highlight: colors::BG_HIGHLIGHT,
            bg_border: colors::BG_BORDER,
            text_primary: colors::TEXT_PRIMARY,
            text_secondary: colors::TEXT_SECONDARY,
            text_muted: colors::TEXT_MUTED,
            primary: colors::PRIMARY,
            accent: colors::ACCENT,
            success: colors::SUCCESS,
            warning: colors::WARNING,
            error: colors::ERROR,
        }
    }

    #[must_use]
    pub fn high_contrast() -> Self {
        Self {
            bg_dark: Color::Black,
            bg_panel: Color::Black,
            bg_highlight: Color::DarkGray,
            bg_border: Color::Gray,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            text_muted: Color::DarkGray,
            primary: Color::White,
            accent: Color::Cyan,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
        }
    }
}

#[must_use]
pub fn palette(options: UiOptions) -> Palette {
    if options.high_contrast {
        Palette::high_contrast()
    } else {
        Palette::standard()
    }
}

/// ASCII/Unicode glyphs for markers and separators.
#[derive(Debug, Clone, Copy)]
pub struct Glyphs {
    pub bullet: &'static str,
    pub ok: &'static str,
    pub fault: &'static str,
    pub shield: &'static str,
    pub separator: &'static str,
}

#[must_use]
pub fn glyphs(options: UiOptions) -> Glyphs {
    if options.ascii_only {
        Glyphs {
            bullet: "*",
            ok: "OK",
            fault: "X",
            shield: "#",
            separator: "|",
        }
    } else {
        Glyphs {
            bullet: "▪",
            ok: "✓",
            fault: "✗",
            shield: "◈",
            separator: "·",
        }
    }
}

/// Pre-defined styles for common UI elements.
pub mod styles {
    use super::{Modifier, Palette, Style};

    #[must_use]
    pub fn panel_title(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.primary)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn group_label(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.text_secondary)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn fault_text(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.error)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn status_ok(palette: &Palette) -> Style {
        Style::default().fg(palette.success)
    }

    #[must_use]
    pub fn key_hint(palette: &Palette) -> Style {
        Style::default().fg(palette.text_muted)
    }

    #[must_use]
    pub fn key_highlight(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.warning)
            .add_modifier(Modifier::BOLD)
    }
}
