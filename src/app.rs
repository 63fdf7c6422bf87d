//! Main application module for Codepad
//!
//! This module implements the eframe App trait for the main application,
//! handling the editor options bar, the code editor, the settings popover
//! and the frame-by-frame driving of background re-indentation.

use crate::config::{Settings, Theme, WindowSize};
use crate::editor::CodeEditor;
use crate::ids::EditorIdFactory;
use crate::indent::{Clock, SystemClock};
use crate::layout::editor_height;
use crate::state::{AppState, TOAST_DURATION};
use crate::theme::{ThemeColors, ThemeManager, ThemeSpacing};
use crate::ui::SettingsPopover;
use eframe::egui;
use log::{debug, info, warn};
use std::rc::Rc;

/// Font size step for the zoom shortcuts and buttons.
const FONT_SIZE_STEP: f32 = 1.0;

/// Keyboard shortcut actions that need to be deferred.
///
/// These actions are detected in the input handling closure and executed
/// afterwards to avoid borrow conflicts.
#[derive(Debug, Clone, Copy, PartialEq)]
enum KeyboardAction {
    /// Re-indent the whole file (Ctrl+Shift+I)
    ReindentNow,
    /// Toggle the editor settings popover (Ctrl+,)
    ToggleSettings,
    /// Cycle theme (Ctrl+Shift+T)
    CycleTheme,
    /// Increase font size (Ctrl+= / Ctrl++)
    IncreaseFontSize,
    /// Decrease font size (Ctrl+-)
    DecreaseFontSize,
}

/// The main application struct that holds all state and implements eframe::App.
pub struct CodepadApp {
    /// Central application state
    state: AppState,
    /// Theme manager for handling theme switching
    theme_manager: ThemeManager,
    /// The code editor
    editor: CodeEditor,
    /// Editor settings popover
    settings_popover: SettingsPopover,
    /// Settings button rect from the last frame (popover anchor)
    settings_button_rect: egui::Rect,
    /// Caret position reported by the editor last frame (0-indexed)
    cursor: Option<(usize, usize)>,
    /// Last known window size (for detecting changes)
    last_window_size: Option<egui::Vec2>,
    /// Application start time for timing toast messages
    start_time: std::time::Instant,
}

impl CodepadApp {
    /// Create a new CodepadApp instance from loaded settings.
    pub fn new(cc: &eframe::CreationContext<'_>, settings: Settings) -> Self {
        info!("Initializing Codepad");

        let state = AppState::with_settings(settings);

        let mut theme_manager = ThemeManager::new(state.settings.theme);
        theme_manager.apply(&cc.egui_ctx);
        info!("Applied initial theme: {:?}", state.settings.theme);

        let mut ids = EditorIdFactory::default();
        let clock: Rc<dyn Clock> = Rc::new(SystemClock);
        let editor = CodeEditor::new(ids.next_id(), &state.settings, &state.view_model, clock);

        Self {
            state,
            theme_manager,
            editor,
            settings_popover: SettingsPopover::new(),
            settings_button_rect: egui::Rect::NOTHING,
            cursor: None,
            last_window_size: None,
            start_time: std::time::Instant::now(),
        }
    }

    /// Get elapsed time since app start in seconds.
    fn get_app_time(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    /// Update window size in settings if changed.
    fn update_window_state(&mut self, ctx: &egui::Context) {
        let Some(rect) = ctx.input(|i| i.viewport().inner_rect) else {
            return;
        };
        let size = rect.size();
        let changed = self
            .last_window_size
            .map(|s| (s - size).length() > 1.0)
            .unwrap_or(true);
        if !changed {
            return;
        }

        self.last_window_size = Some(size);
        let maximized = ctx.input(|i| i.viewport().maximized.unwrap_or(false));
        self.state.settings.window_size = WindowSize {
            width: size.x,
            height: size.y,
            maximized,
        };
        debug!(
            "Window state updated: {}x{}, maximized: {}",
            size.x, size.y, maximized
        );
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Keyboard
    // ─────────────────────────────────────────────────────────────────────────

    fn handle_keyboard_shortcuts(&mut self, ctx: &egui::Context) {
        let action = ctx.input(|i| {
            // Ctrl+Shift+I: Re-indent now
            if i.modifiers.ctrl && i.modifiers.shift && i.key_pressed(egui::Key::I) {
                debug!("Keyboard shortcut: Ctrl+Shift+I (Reindent)");
                return Some(KeyboardAction::ReindentNow);
            }

            // Ctrl+Shift+T: Cycle Theme
            if i.modifiers.ctrl && i.modifiers.shift && i.key_pressed(egui::Key::T) {
                debug!("Keyboard shortcut: Ctrl+Shift+T (Cycle Theme)");
                return Some(KeyboardAction::CycleTheme);
            }

            // Ctrl+,: Editor settings
            if i.modifiers.ctrl && i.key_pressed(egui::Key::Comma) {
                debug!("Keyboard shortcut: Ctrl+, (Settings)");
                return Some(KeyboardAction::ToggleSettings);
            }

            // Ctrl+= / Ctrl++: Larger font
            if i.modifiers.ctrl && (i.key_pressed(egui::Key::Equals) || i.key_pressed(egui::Key::Plus))
            {
                return Some(KeyboardAction::IncreaseFontSize);
            }

            // Ctrl+-: Smaller font
            if i.modifiers.ctrl && i.key_pressed(egui::Key::Minus) {
                return Some(KeyboardAction::DecreaseFontSize);
            }

            None
        });

        if let Some(action) = action {
            self.handle_action(action);
        }
    }

    fn handle_action(&mut self, action: KeyboardAction) {
        match action {
            KeyboardAction::ReindentNow => self.handle_reindent_now(),
            KeyboardAction::ToggleSettings => self.settings_popover.toggle(),
            KeyboardAction::CycleTheme => {
                let next = self.state.view_model.theme.get().cycle();
                self.state.view_model.theme.set(next);
            }
            KeyboardAction::IncreaseFontSize => self.handle_adjust_font_size(FONT_SIZE_STEP),
            KeyboardAction::DecreaseFontSize => self.handle_adjust_font_size(-FONT_SIZE_STEP),
        }
    }

    fn handle_adjust_font_size(&mut self, delta: f32) {
        let size = (*self.state.view_model.font_size.get() + delta)
            .clamp(Settings::MIN_FONT_SIZE, Settings::MAX_FONT_SIZE);
        self.state.view_model.font_size.set(size);
    }

    /// The manual "Reindent" command.
    fn handle_reindent_now(&mut self) {
        let now = self.get_app_time();
        match self.editor.reindent_now() {
            Ok(report) => {
                info!(
                    "Reindented {} row(s), {} changed",
                    report.rows_visited, report.rows_changed
                );
                self.state.show_toast(
                    format!("Reindented: {} line(s) changed", report.rows_changed),
                    now,
                    TOAST_DURATION,
                );
            }
            Err(e) => {
                warn!("Manual reindent failed: {}", e);
                self.state
                    .show_toast(format!("Reindent failed: {}", e), now, TOAST_DURATION);
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Frame Steps
    // ─────────────────────────────────────────────────────────────────────────

    /// Push view-model changes into the editor, settings and theme.
    fn sync_view_model(&mut self) {
        let AppState {
            settings,
            view_model,
            ..
        } = &mut self.state;
        if self.editor.sync_view_model(view_model, settings) {
            self.theme_manager.set_theme(self.editor.theme());
            self.state.mark_settings_dirty();
        }
    }

    /// Run a due background pass. A failed pass only surfaces as a toast.
    fn poll_reindent(&mut self) {
        match self.editor.poll() {
            Some(Ok(report)) => debug!(
                "Background reindent: {} row(s) changed",
                report.rows_changed
            ),
            Some(Err(e)) => {
                warn!("Background reindent failed: {}", e);
                let now = self.get_app_time();
                self.state
                    .show_toast(format!("Auto-indent failed: {}", e), now, TOAST_DURATION);
            }
            None => {}
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────────

    /// Editor options bar: theme, font size and the settings button.
    ///
    /// Returns the bar height.
    fn render_options_bar(&mut self, ctx: &egui::Context, spacing: &ThemeSpacing) -> f32 {
        let response = egui::TopBottomPanel::top("editor_options_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Theme");
                let mut theme = *self.state.view_model.theme.get();
                egui::ComboBox::from_id_source("theme_selector")
                    .selected_text(theme.label())
                    .show_ui(ui, |ui| {
                        for option in Theme::all() {
                            ui.selectable_value(&mut theme, *option, option.label());
                        }
                    });
                self.state.view_model.theme.set(theme);

                ui.add_space(spacing.lg);

                ui.label("Font size");
                if ui.small_button("−").on_hover_text("Smaller (Ctrl+-)").clicked() {
                    self.handle_adjust_font_size(-FONT_SIZE_STEP);
                }
                let mut size = *self.state.view_model.font_size.get();
                let drag = ui.add(
                    egui::DragValue::new(&mut size)
                        .speed(0.5)
                        .clamp_range(Settings::MIN_FONT_SIZE..=Settings::MAX_FONT_SIZE),
                );
                if drag.changed() {
                    self.state.view_model.font_size.set(size);
                }
                if ui.small_button("+").on_hover_text("Larger (Ctrl+=)").clicked() {
                    self.handle_adjust_font_size(FONT_SIZE_STEP);
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let button = ui
                        .selectable_label(self.settings_popover.is_open(), "⚙")
                        .on_hover_text("Editor settings (Ctrl+,)");
                    if button.clicked() {
                        self.settings_popover.toggle();
                    }
                    self.settings_button_rect = button.rect;

                    if ui
                        .button("Reindent")
                        .on_hover_text("Re-indent the whole file (Ctrl+Shift+I)")
                        .clicked()
                    {
                        self.handle_reindent_now();
                    }
                });
            });
        });
        response.response.rect.height()
    }

    /// Status bar: caret position, mode, auto-indent state and toasts.
    ///
    /// Returns the bar height.
    fn render_status_bar(&mut self, ctx: &egui::Context, colors: &ThemeColors) -> f32 {
        let response = egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some((line, col)) = self.cursor {
                    ui.label(
                        egui::RichText::new(format!("Ln {}, Col {}", line + 1, col + 1))
                            .color(colors.text.secondary),
                    );
                    ui.separator();
                }
                ui.label(egui::RichText::new(self.editor.mode_name()).color(colors.text.muted));
                ui.separator();
                ui.label(
                    egui::RichText::new(format!("{} lines", self.editor.line_count()))
                        .color(colors.text.muted),
                );
                ui.separator();

                let enabled = self.editor.background_auto_indent();
                let indent_label = if enabled {
                    "Auto-indent: on"
                } else {
                    "Auto-indent: off"
                };
                let label =
                    egui::Label::new(egui::RichText::new(indent_label).color(colors.text.muted))
                        .sense(egui::Sense::click());
                if ui.add(label).on_hover_text("Click to toggle").clicked() {
                    self.editor.set_background_auto_indent(!enabled);
                    self.state.update_settings(|s| s.auto_indent = !enabled);
                }

                if let Some(message) = &self.state.ui.toast_message {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(egui::RichText::new(message).color(colors.ui.warning));
                    });
                }
            });
        });
        response.response.rect.height()
    }

    fn render_editor(&mut self, ctx: &egui::Context, colors: ThemeColors, bar_heights: &[f32]) {
        let container_height = ctx.screen_rect().height();
        let height = editor_height(container_height, bar_heights);

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(colors.base.background))
            .show(ctx, |ui| {
                let size = egui::vec2(ui.available_width(), height);
                ui.allocate_ui(size, |ui| {
                    ui.set_min_size(size);
                    let output = self.editor.show(ui, colors);
                    if let Some(cursor) = output.cursor {
                        self.cursor = Some((cursor.row, cursor.column));
                    }
                });
            });
    }

    fn render_settings_popover(&mut self, ctx: &egui::Context) {
        let output = self.settings_popover.show(
            ctx,
            self.editor.id().child("settings"),
            &self.state.settings,
            self.settings_button_rect,
        );
        if output.changes.is_empty() {
            return;
        }

        for change in output.changes {
            debug!("Editor setting changed: {:?}", change);
            self.state.update_settings(|s| change.apply_to(s));
        }
        self.editor.apply_settings(&self.state.settings);
    }
}

impl eframe::App for CodepadApp {
    /// Called each time the UI needs repainting.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply theme if needed (handles System theme changes)
        self.theme_manager.apply_if_needed(ctx);

        let current_time = self.get_app_time();
        self.state.update_toast(current_time);

        self.update_window_state(ctx);
        self.handle_keyboard_shortcuts(ctx);

        let spacing = ThemeSpacing::default();
        let options_height = self.render_options_bar(ctx, &spacing);

        // Theme/font edits from the bar or shortcuts reach the editor here.
        self.sync_view_model();
        self.theme_manager.apply_if_needed(ctx);
        self.poll_reindent();

        let colors = self.theme_manager.colors(ctx);
        let status_height = self.render_status_bar(ctx, &colors);
        self.render_editor(ctx, colors, &[options_height, status_height]);
        self.render_settings_popover(ctx);

        if let Some(wait) = self.editor.time_until_pass() {
            ctx.request_repaint_after(wait);
        }
        if let Some(expires_at) = self.state.ui.toast_expires_at {
            let remaining = (expires_at - current_time).max(0.0);
            ctx.request_repaint_after(std::time::Duration::from_secs_f64(remaining));
        }
    }

    /// Called when the application is about to close.
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Application exiting");
        self.state.save_settings_if_dirty();
    }

    /// Save persistent state.
    fn save(&mut self, _storage: &mut dyn eframe::Storage) {
        debug!("Saving application state");
        self.state.save_settings_if_dirty();
    }

    /// Auto-save interval in seconds.
    fn auto_save_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(30)
    }
}

