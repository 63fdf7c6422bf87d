//! egui Visuals for the light and dark palettes
//!
//! Both palettes share the same widget layout; they differ in the base
//! egui visuals they start from and in shadow strength.

use eframe::egui::{self, epaint::Shadow, Color32, Rounding, Stroke, Visuals};

use super::{ThemeColors, ThemeSpacing};

/// Create egui Visuals from a palette.
pub fn create_visuals(colors: &ThemeColors) -> Visuals {
    let spacing = ThemeSpacing::default();
    let dark = colors.is_dark();
    let mut visuals = if dark { Visuals::dark() } else { Visuals::light() };

    // ─────────────────────────────────────────────────────────────────────────
    // Window & Panel Background
    // ─────────────────────────────────────────────────────────────────────────
    visuals.panel_fill = colors.base.background;
    visuals.window_fill = colors.base.background_secondary;
    visuals.extreme_bg_color = colors.base.background;
    visuals.faint_bg_color = colors.base.background_secondary;
    visuals.code_bg_color = colors.editor.gutter_bg;

    // ─────────────────────────────────────────────────────────────────────────
    // Text & Selection
    // ─────────────────────────────────────────────────────────────────────────
    visuals.override_text_color = None;
    visuals.warn_fg_color = colors.ui.warning;
    visuals.error_fg_color = colors.ui.error;
    visuals.hyperlink_color = colors.ui.accent;
    visuals.selection.bg_fill = colors.base.selected;
    visuals.selection.stroke = Stroke::new(1.0, colors.ui.accent);
    visuals.text_cursor.stroke = Stroke::new(2.0, colors.text.primary);

    // ─────────────────────────────────────────────────────────────────────────
    // Widget Styling
    // ─────────────────────────────────────────────────────────────────────────
    let widgets = &mut visuals.widgets;

    widgets.noninteractive.bg_fill = colors.base.background_secondary;
    widgets.noninteractive.weak_bg_fill = colors.base.background_tertiary;
    widgets.noninteractive.bg_stroke = Stroke::new(1.0, colors.base.border_subtle);
    widgets.noninteractive.fg_stroke = Stroke::new(1.0, colors.text.primary);

    widgets.inactive.bg_fill = colors.base.background_secondary;
    widgets.inactive.weak_bg_fill = colors.base.background_tertiary;
    widgets.inactive.bg_stroke = Stroke::new(1.0, colors.base.border);
    widgets.inactive.fg_stroke = Stroke::new(1.0, colors.text.secondary);

    widgets.hovered.bg_fill = colors.base.hover;
    widgets.hovered.weak_bg_fill = colors.base.hover;
    widgets.hovered.bg_stroke = Stroke::new(1.0, colors.ui.accent);
    widgets.hovered.fg_stroke = Stroke::new(1.5, colors.text.primary);

    widgets.active.bg_fill = colors.ui.accent;
    widgets.active.weak_bg_fill = colors.base.selected;
    widgets.active.bg_stroke = Stroke::new(1.0, colors.ui.accent_hover);
    widgets.active.fg_stroke = Stroke::new(2.0, Color32::WHITE);

    widgets.open.bg_fill = colors.base.selected;
    widgets.open.weak_bg_fill = colors.base.selected;
    widgets.open.bg_stroke = Stroke::new(1.0, colors.ui.accent);
    widgets.open.fg_stroke = Stroke::new(1.0, colors.text.primary);

    for style in [
        &mut widgets.noninteractive,
        &mut widgets.inactive,
        &mut widgets.hovered,
        &mut widgets.active,
        &mut widgets.open,
    ] {
        style.rounding = Rounding::same(spacing.sm);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Window & Popup Styling
    // ─────────────────────────────────────────────────────────────────────────
    let shadow_alpha = if dark { 100 } else { 30 };
    visuals.window_rounding = Rounding::same(spacing.md);
    visuals.window_stroke = Stroke::new(1.0, colors.base.border);
    visuals.window_shadow = Shadow {
        offset: egui::vec2(0.0, 4.0),
        blur: 16.0,
        spread: 0.0,
        color: Color32::from_black_alpha(shadow_alpha),
    };
    visuals.popup_shadow = Shadow {
        offset: egui::vec2(0.0, 4.0),
        blur: 12.0,
        spread: 0.0,
        color: Color32::from_black_alpha(shadow_alpha),
    };
    visuals.menu_rounding = Rounding::same(spacing.sm);

    visuals.button_frame = true;
    visuals.interact_cursor = Some(egui::CursorIcon::PointingHand);
    visuals.dark_mode = dark;

    visuals
}
