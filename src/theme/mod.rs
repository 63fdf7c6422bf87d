//! Theme System for Codepad
//!
//! Colors and spacing for the application chrome and the code editor. The
//! `Theme` enum in `config::settings` (Light/Dark/System) selects which
//! palette is used at runtime; `ThemeManager` applies it to the egui context.
//!
//! - `visuals.rs` - converts a palette into egui `Visuals`
//! - `manager.rs` - theme switching and application

mod manager;
mod visuals;

pub use manager::ThemeManager;
pub use visuals::create_visuals;

use crate::config::Theme;
use eframe::egui::{Color32, Visuals};

// ─────────────────────────────────────────────────────────────────────────────
// Theme Colors
// ─────────────────────────────────────────────────────────────────────────────

/// All colors needed to draw the application.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeColors {
    /// Base UI colors (backgrounds, borders)
    pub base: BaseColors,
    /// Text colors for various contexts
    pub text: TextColors,
    /// Code editor colors (gutter, active line, invisibles)
    pub editor: EditorColors,
    /// Accent and feedback colors
    pub ui: UiColors,
}

impl ThemeColors {
    /// Create theme colors for the given theme variant.
    ///
    /// `System` resolves to light or dark using `visuals.dark_mode`.
    pub fn from_theme(theme: Theme, visuals: &Visuals) -> Self {
        match theme {
            Theme::Dark => Self::dark(),
            Theme::Light => Self::light(),
            Theme::System => {
                if visuals.dark_mode {
                    Self::dark()
                } else {
                    Self::light()
                }
            }
        }
    }

    pub fn light() -> Self {
        Self {
            base: BaseColors::light(),
            text: TextColors::light(),
            editor: EditorColors::light(),
            ui: UiColors::light(),
        }
    }

    pub fn dark() -> Self {
        Self {
            base: BaseColors::dark(),
            text: TextColors::dark(),
            editor: EditorColors::dark(),
            ui: UiColors::dark(),
        }
    }

    /// Check if this is a dark palette.
    pub fn is_dark(&self) -> bool {
        self.base.background.r() < 128
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Base Colors
// ─────────────────────────────────────────────────────────────────────────────

/// Base UI colors for backgrounds and borders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseColors {
    /// Primary background color
    pub background: Color32,
    /// Secondary/elevated background (panels, popovers)
    pub background_secondary: Color32,
    /// Tertiary background (text inputs)
    pub background_tertiary: Color32,
    /// Primary border color
    pub border: Color32,
    /// Subtle border color (dividers)
    pub border_subtle: Color32,
    /// Hover state background
    pub hover: Color32,
    /// Selected/active state background
    pub selected: Color32,
}

impl BaseColors {
    pub fn light() -> Self {
        Self {
            background: Color32::from_rgb(255, 255, 255),
            background_secondary: Color32::from_rgb(250, 250, 250),
            background_tertiary: Color32::from_rgb(245, 245, 245),
            border: Color32::from_rgb(200, 200, 200),
            border_subtle: Color32::from_rgb(230, 230, 230),
            hover: Color32::from_rgb(240, 240, 240),
            selected: Color32::from_rgb(230, 240, 255),
        }
    }

    pub fn dark() -> Self {
        Self {
            background: Color32::from_rgb(30, 30, 30),
            background_secondary: Color32::from_rgb(37, 37, 37),
            background_tertiary: Color32::from_rgb(45, 45, 45),
            border: Color32::from_rgb(60, 60, 60),
            border_subtle: Color32::from_rgb(50, 50, 50),
            hover: Color32::from_rgb(50, 50, 50),
            selected: Color32::from_rgb(40, 60, 80),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Text Colors
// ─────────────────────────────────────────────────────────────────────────────

/// Text colors for various contexts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextColors {
    /// Primary text color (buffer contents)
    pub primary: Color32,
    /// Secondary text color (labels)
    pub secondary: Color32,
    /// Muted text color (hints, status line)
    pub muted: Color32,
}

impl TextColors {
    pub fn light() -> Self {
        Self {
            primary: Color32::from_rgb(30, 30, 30),
            secondary: Color32::from_rgb(80, 80, 80),
            muted: Color32::from_rgb(120, 120, 120),
        }
    }

    pub fn dark() -> Self {
        Self {
            primary: Color32::from_rgb(220, 220, 220),
            secondary: Color32::from_rgb(180, 180, 180),
            muted: Color32::from_rgb(140, 140, 140),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Editor Colors
// ─────────────────────────────────────────────────────────────────────────────

/// Colors specific to the code editor surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorColors {
    /// Line-number gutter background
    pub gutter_bg: Color32,
    /// Line numbers
    pub gutter_text: Color32,
    /// Line number of the row holding the cursor
    pub gutter_text_active: Color32,
    /// Background of the row holding the cursor
    pub active_line: Color32,
    /// Visible whitespace glyphs
    pub invisible: Color32,
}

impl EditorColors {
    pub fn light() -> Self {
        Self {
            gutter_bg: Color32::from_rgb(245, 245, 245),
            gutter_text: Color32::from_rgb(150, 150, 150),
            gutter_text_active: Color32::from_rgb(60, 60, 60),
            active_line: Color32::from_rgba_unmultiplied(0, 0, 0, 12),
            invisible: Color32::from_rgb(191, 191, 191),
        }
    }

    pub fn dark() -> Self {
        Self {
            gutter_bg: Color32::from_rgb(35, 35, 35),
            gutter_text: Color32::from_rgb(110, 110, 110),
            gutter_text_active: Color32::from_rgb(200, 200, 200),
            active_line: Color32::from_rgba_unmultiplied(255, 255, 255, 10),
            invisible: Color32::from_rgb(80, 80, 80),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// UI Colors
// ─────────────────────────────────────────────────────────────────────────────

/// Colors for interactive elements and feedback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UiColors {
    /// Primary accent color (buttons, active elements)
    pub accent: Color32,
    /// Accent color for hover state
    pub accent_hover: Color32,
    /// Warning color
    pub warning: Color32,
    /// Error color
    pub error: Color32,
}

impl UiColors {
    pub fn light() -> Self {
        Self {
            accent: Color32::from_rgb(0, 120, 212),
            accent_hover: Color32::from_rgb(0, 100, 180),
            warning: Color32::from_rgb(255, 193, 7),
            error: Color32::from_rgb(220, 53, 69),
        }
    }

    pub fn dark() -> Self {
        Self {
            accent: Color32::from_rgb(100, 180, 255),
            accent_hover: Color32::from_rgb(130, 200, 255),
            warning: Color32::from_rgb(255, 210, 50),
            error: Color32::from_rgb(255, 100, 100),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Theme Spacing
// ─────────────────────────────────────────────────────────────────────────────

/// Spacing values for consistent layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeSpacing {
    /// Small spacing (4px)
    pub sm: f32,
    /// Medium spacing (8px)
    pub md: f32,
    /// Large spacing (16px)
    pub lg: f32,
}

impl Default for ThemeSpacing {
    fn default() -> Self {
        Self {
            sm: 4.0,
            md: 8.0,
            lg: 16.0,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_colors_light() {
        let colors = ThemeColors::light();
        assert!(colors.base.background.r() > 200);
        assert!(!colors.is_dark());
    }

    #[test]
    fn test_theme_colors_dark() {
        let colors = ThemeColors::dark();
        assert!(colors.base.background.r() < 50);
        assert!(colors.is_dark());
    }

    #[test]
    fn test_theme_colors_from_theme() {
        assert!(ThemeColors::from_theme(Theme::Dark, &Visuals::light()).is_dark());
        assert!(!ThemeColors::from_theme(Theme::Light, &Visuals::dark()).is_dark());
    }

    #[test]
    fn test_system_theme_follows_visuals() {
        assert!(ThemeColors::from_theme(Theme::System, &Visuals::dark()).is_dark());
        assert!(!ThemeColors::from_theme(Theme::System, &Visuals::light()).is_dark());
    }

    #[test]
    fn test_text_colors_contrast() {
        assert!(TextColors::light().primary.r() < 50);
        assert!(TextColors::dark().primary.r() > 200);
    }

    #[test]
    fn test_editor_colors_distinct() {
        for colors in [EditorColors::light(), EditorColors::dark()] {
            assert_ne!(colors.gutter_text, colors.gutter_text_active);
            assert_ne!(colors.gutter_text_active, colors.gutter_bg);
        }
    }

    #[test]
    fn test_invisibles_are_subdued() {
        // Whitespace glyphs sit between background and text in brightness
        let light = ThemeColors::light();
        assert!(light.editor.invisible.r() < light.base.background.r());
        assert!(light.editor.invisible.r() > light.text.primary.r());

        let dark = ThemeColors::dark();
        assert!(dark.editor.invisible.r() > dark.base.background.r());
        assert!(dark.editor.invisible.r() < dark.text.primary.r());
    }

    #[test]
    fn test_spacing_default() {
        let spacing = ThemeSpacing::default();
        assert_eq!(spacing.sm, 4.0);
        assert_eq!(spacing.md, 8.0);
        assert_eq!(spacing.lg, 16.0);
    }
}
