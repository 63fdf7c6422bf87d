//! Code editor adapter
//!
//! [`CodeEditor`] ties one editing surface together: the text session and
//! its re-indentation engine, the egui widget showing it, the display
//! preferences and the view-model subscriptions. The engine only sees the
//! editor through `poll` and `reindent_now`.
//!
//! The widget edits a `String` mirror of the session. User edits are pushed
//! into the session (which schedules a re-indent); session changes made
//! elsewhere (a pass, `set_text`) are pulled back into the mirror together
//! with the session's cursor.
//!
//! Annotations are kept as given and mapped to gutter rows when drawn.

use super::annotations::Annotation;
use super::widget::{CodeEditorWidget, EditorOutput};
use crate::config::{Settings, Theme};
use crate::error::Result;
use crate::ids::EditorId;
use crate::indent::{
    CStyleMode, Clock, CursorPosition, IndentConfig, Mode, PassReport, ReindentEngine, Session,
    TextSession,
};
use crate::theme::ThemeColors;
use crate::view_model::{Subscription, ViewModel};
use eframe::egui::Ui;
use log::{debug, info};
use std::rc::Rc;
use std::time::Duration;

/// Display options of the editor surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorOptions {
    pub show_line_numbers: bool,
    pub highlight_active_line: bool,
    pub show_invisibles: bool,
}

impl EditorOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            show_line_numbers: settings.show_line_numbers,
            highlight_active_line: settings.highlight_active_line,
            show_invisibles: settings.show_invisibles,
        }
    }
}

/// View-model subscriptions held by one editor.
#[derive(Debug, Clone, Copy)]
struct ViewModelSubscriptions {
    theme: Subscription,
    font_size: Subscription,
    editor_text: Subscription,
    annotations: Subscription,
}

/// One code editor instance.
pub struct CodeEditor {
    id: EditorId,
    engine: ReindentEngine<TextSession>,
    /// Text shown by the widget
    buffer: String,
    /// Session revision the buffer mirrors
    synced_revision: u64,
    /// Caret to push into the widget on the next frame
    pending_cursor: Option<CursorPosition>,
    theme: Theme,
    font_size: f32,
    options: EditorOptions,
    annotations: Vec<Annotation>,
    subscriptions: ViewModelSubscriptions,
}

impl CodeEditor {
    /// Create an editor configured from `settings`, subscribed to `view_model`.
    ///
    /// The session starts empty in the C/C++ mode.
    pub fn new(id: EditorId, settings: &Settings, view_model: &ViewModel, clock: Rc<dyn Clock>) -> Self {
        let mode: Rc<dyn Mode> = Rc::new(CStyleMode::new());
        let mut session = TextSession::new("", Rc::clone(&mode));
        session.set_tab_size(usize::from(settings.tab_size));
        session.set_use_soft_tabs(settings.use_spaces);

        let engine = ReindentEngine::new(session, mode, settings.indent_config(), clock);
        let synced_revision = engine.session().revision();

        info!(
            "Created {} (mode {}, auto-indent {})",
            id,
            engine.mode().name(),
            settings.auto_indent
        );

        Self {
            id,
            engine,
            buffer: String::new(),
            synced_revision,
            pending_cursor: None,
            theme: *view_model.theme.get(),
            font_size: *view_model.font_size.get(),
            options: EditorOptions::from_settings(settings),
            annotations: Vec::new(),
            subscriptions: ViewModelSubscriptions {
                theme: view_model.theme.subscribe(),
                font_size: view_model.font_size.subscribe(),
                editor_text: view_model.editor_text.subscribe(),
                annotations: view_model.annotations.subscribe(),
            },
        }
    }

    pub fn id(&self) -> EditorId {
        self.id
    }

    pub fn engine(&self) -> &ReindentEngine<TextSession> {
        &self.engine
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Text & Mode
    // ─────────────────────────────────────────────────────────────────────────

    pub fn get_text(&self) -> String {
        self.engine.session().text()
    }

    /// Replace the whole buffer. Schedules a background re-indent.
    pub fn set_text(&mut self, text: &str) {
        self.engine.session_mut().set_text(text);
    }

    pub fn line_count(&self) -> usize {
        self.engine.session().line_count()
    }

    /// Switch the language mode used for indentation.
    pub fn set_mode(&mut self, mode: Rc<dyn Mode>) {
        debug!("{}: mode set to {}", self.id, mode.name());
        self.engine.set_mode(mode);
    }

    pub fn mode_name(&self) -> &str {
        self.engine.mode().name()
    }

    pub fn set_tab_size(&mut self, tab_size: usize) {
        self.engine.session_mut().set_tab_size(tab_size);
    }

    pub fn set_use_soft_tabs(&mut self, soft: bool) {
        self.engine.session_mut().set_use_soft_tabs(soft);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Appearance
    // ─────────────────────────────────────────────────────────────────────────

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn set_font_size(&mut self, size: f32) {
        self.font_size = size.clamp(Settings::MIN_FONT_SIZE, Settings::MAX_FONT_SIZE);
    }

    pub fn options(&self) -> EditorOptions {
        self.options
    }

    pub fn set_highlight_active_line(&mut self, highlight: bool) {
        self.options.highlight_active_line = highlight;
    }

    pub fn set_show_invisibles(&mut self, show: bool) {
        self.options.show_invisibles = show;
    }

    pub fn set_show_line_numbers(&mut self, show: bool) {
        self.options.show_line_numbers = show;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Annotations
    // ─────────────────────────────────────────────────────────────────────────

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Replace the gutter annotations. Rows past the end of the buffer are
    /// kept but not drawn.
    pub fn set_annotations(&mut self, annotations: Vec<Annotation>) {
        debug!("{}: {} annotation(s)", self.id, annotations.len());
        self.annotations = annotations;
    }

    pub fn clear_annotations(&mut self) {
        self.annotations.clear();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Re-indentation
    // ─────────────────────────────────────────────────────────────────────────

    pub fn background_auto_indent(&self) -> bool {
        self.engine.scheduler().is_enabled()
    }

    /// Turn background re-indentation on or off. Turning it off drops a
    /// pending pass.
    pub fn set_background_auto_indent(&mut self, enabled: bool) {
        self.engine.scheduler().set_enabled(enabled);
    }

    pub fn configure_indent(&mut self, config: IndentConfig) {
        self.engine.configure(config);
    }

    /// Re-indent the whole buffer now.
    pub fn reindent_now(&mut self) -> Result<PassReport> {
        self.engine.reindent_now()
    }

    /// Run the background pass if its quiet period has elapsed.
    pub fn poll(&mut self) -> Option<Result<PassReport>> {
        self.engine.poll()
    }

    /// Time until the scheduled background pass, if one is pending.
    pub fn time_until_pass(&self) -> Option<Duration> {
        self.engine.scheduler().time_until_due()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Settings & View Model
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply every editor-related field of `settings`.
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.set_show_line_numbers(settings.show_line_numbers);
        self.set_highlight_active_line(settings.highlight_active_line);
        self.set_show_invisibles(settings.show_invisibles);
        self.configure_indent(settings.indent_config());
        self.set_tab_size(usize::from(settings.tab_size));
        self.set_use_soft_tabs(settings.use_spaces);
    }

    /// React to view-model changes since the last call.
    ///
    /// Theme and font-size changes are applied and written to `settings`;
    /// text and annotation changes replace the editor's copies. Returns
    /// whether `settings` changed.
    pub fn sync_view_model(&mut self, view_model: &ViewModel, settings: &mut Settings) -> bool {
        let mut settings_changed = false;

        if let Some(&theme) = view_model.theme.changed(&mut self.subscriptions.theme) {
            self.set_theme(theme);
            settings.theme = theme;
            settings_changed = true;
        }

        if let Some(&size) = view_model.font_size.changed(&mut self.subscriptions.font_size) {
            self.set_font_size(size);
            settings.font_size = self.font_size;
            settings_changed = true;
        }

        if let Some(text) = view_model
            .editor_text
            .changed(&mut self.subscriptions.editor_text)
        {
            self.set_text(text);
        }

        if let Some(annotations) = view_model
            .annotations
            .changed(&mut self.subscriptions.annotations)
        {
            self.set_annotations(annotations.clone());
        }

        settings_changed
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────────

    /// Pull session changes into the widget buffer.
    fn refresh_buffer(&mut self) {
        let revision = self.engine.session().revision();
        if revision == self.synced_revision {
            return;
        }
        self.buffer = self.engine.session().text();
        self.synced_revision = revision;
        self.pending_cursor = Some(self.engine.session().cursor_position());
    }

    /// Push a widget edit into the session.
    fn commit_buffer(&mut self) {
        let session = self.engine.session_mut();
        session.set_text(&self.buffer);
        // The session drops `\r`; keep the mirror stale so it is refreshed.
        if !self.buffer.contains('\r') {
            self.synced_revision = session.revision();
        }
    }

    /// Show the editor in `ui`.
    pub fn show(&mut self, ui: &mut Ui, colors: ThemeColors) -> EditorOutput {
        self.refresh_buffer();

        let fallback_row = self.engine.session().cursor_position().row;
        let output = CodeEditorWidget::new(&mut self.buffer, self.id.child("text"))
            .font_size(self.font_size)
            .show_line_numbers(self.options.show_line_numbers)
            .highlight_active_line(self.options.highlight_active_line)
            .show_invisibles(self.options.show_invisibles)
            .theme_colors(colors)
            .restore_cursor(self.pending_cursor.take())
            .fallback_row(fallback_row)
            .annotations(&self.annotations)
            .show(ui);

        if output.changed {
            self.commit_buffer();
        }

        let session = self.engine.session_mut();
        if let Some(cursor) = output.cursor {
            session.set_cursor_position(cursor);
        }
        session.set_selection(output.selection);

        output
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
