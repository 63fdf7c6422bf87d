//! Editor Settings Popover for Codepad
//!
//! A small popover anchored to the settings button of the editor options
//! bar. It toggles the three editor preferences that apply live: automatic
//! indentation, active-line highlighting and invisible characters.
//!
//! The popover is toggled by its button and hidden by a click anywhere
//! outside of it (or Escape).

use crate::config::Settings;
use eframe::egui::{self, Pos2, Rect, RichText};

/// The three editor toggles shown by the popover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorToggles {
    pub auto_indent: bool,
    pub highlight_active_line: bool,
    pub show_invisibles: bool,
}

impl EditorToggles {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            auto_indent: settings.auto_indent,
            highlight_active_line: settings.highlight_active_line,
            show_invisibles: settings.show_invisibles,
        }
    }

    /// Changes needed to go from `self` to `other`.
    pub fn diff(&self, other: &EditorToggles) -> Vec<SettingChange> {
        let mut changes = Vec::new();
        if self.auto_indent != other.auto_indent {
            changes.push(SettingChange::AutoIndent(other.auto_indent));
        }
        if self.highlight_active_line != other.highlight_active_line {
            changes.push(SettingChange::HighlightActiveLine(other.highlight_active_line));
        }
        if self.show_invisibles != other.show_invisibles {
            changes.push(SettingChange::ShowInvisibles(other.show_invisibles));
        }
        changes
    }
}

/// A single preference flipped in the popover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingChange {
    AutoIndent(bool),
    HighlightActiveLine(bool),
    ShowInvisibles(bool),
}

impl SettingChange {
    /// Write the change into `settings`.
    pub fn apply_to(self, settings: &mut Settings) {
        match self {
            SettingChange::AutoIndent(on) => settings.auto_indent = on,
            SettingChange::HighlightActiveLine(on) => settings.highlight_active_line = on,
            SettingChange::ShowInvisibles(on) => settings.show_invisibles = on,
        }
    }
}

/// Result of showing the popover for one frame.
#[derive(Debug, Clone, Default)]
pub struct SettingsPopoverOutput {
    /// Preferences flipped this frame
    pub changes: Vec<SettingChange>,
    /// Whether the popover asked to be hidden
    pub close_requested: bool,
}

/// Whether a press at `click_pos` should hide the popover.
///
/// Presses on the anchor button are left to the button, which toggles.
pub fn should_close(click_pos: Pos2, popover_rect: Rect, anchor_rect: Rect) -> bool {
    !popover_rect.contains(click_pos) && !anchor_rect.contains(click_pos)
}

/// Popover state.
#[derive(Debug, Clone, Default)]
pub struct SettingsPopover {
    open: bool,
}

impl SettingsPopover {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Flip visibility (the settings button's click handler).
    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    /// Show the popover below `anchor_rect` if it is open.
    ///
    /// `id` should be unique per editor.
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        id: egui::Id,
        settings: &Settings,
        anchor_rect: Rect,
    ) -> SettingsPopoverOutput {
        let mut output = SettingsPopoverOutput::default();
        if !self.open {
            return output;
        }

        let before = EditorToggles::from_settings(settings);
        let mut toggles = before;

        let area = egui::Area::new(id)
            .order(egui::Order::Foreground)
            .fixed_pos(anchor_rect.left_bottom() + egui::vec2(0.0, 4.0))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_min_width(200.0);
                    ui.label(RichText::new("Editor settings").strong());
                    ui.separator();

                    ui.checkbox(&mut toggles.auto_indent, "Autoindent code")
                        .on_hover_text("Re-indent the whole file after you stop typing");
                    ui.checkbox(
                        &mut toggles.highlight_active_line,
                        "Highlight Active Line",
                    );
                    ui.checkbox(&mut toggles.show_invisibles, "Show invisible characters")
                        .on_hover_text("Draw spaces as · and tabs as →");
                });
            });

        output.changes = before.diff(&toggles);

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            output.close_requested = true;
        }

        let popover_rect = area.response.rect;
        let press = ctx.input(|i| {
            if i.pointer.any_pressed() {
                i.pointer.interact_pos()
            } else {
                None
            }
        });
        if let Some(pos) = press {
            if should_close(pos, popover_rect, anchor_rect) {
                output.close_requested = true;
            }
        }

        if output.close_requested {
            self.close();
        }

        output
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
