//! Code editor widget for Codepad
//!
//! Wraps egui's `TextEdit` in code-editor mode (monospace, no wrapping, tab
//! key inserts) and draws on top of it:
//! - a line-number gutter aligned with the laid-out rows
//! - an active-line band behind the cursor row
//! - visible whitespace (`·` for spaces, `→` for tabs)
//! - annotation markers in the gutter, with the messages on hover
//!
//! The widget edits a plain `String`; the owner syncs it with the session.

use super::annotations::{gutter_markers, Annotation, AnnotationKind};
use super::line_numbers::{count_lines, gutter_width};
use crate::indent::{CursorPosition, Selection};
use crate::theme::ThemeColors;
use eframe::egui::{self, text::CCursor, text_selection::CCursorRange, FontId, ScrollArea, TextEdit, Ui};
use log::trace;
use std::sync::Arc;

/// Glyph drawn over a space when invisibles are shown.
const SPACE_MARK: &str = "·";
/// Glyph drawn over a tab when invisibles are shown.
const TAB_MARK: &str = "→";
/// Extra gutter width reserved for annotation markers.
const MARKER_LANE: f32 = 12.0;

/// Result of showing the editor widget.
#[derive(Debug, Clone, Default)]
pub struct EditorOutput {
    /// Whether the user modified the text this frame
    pub changed: bool,
    /// Caret position, if the text edit has one
    pub cursor: Option<CursorPosition>,
    /// Non-empty selection, if any
    pub selection: Option<Selection>,
}

/// A code editor over a text buffer.
///
/// # Example
///
/// ```ignore
/// CodeEditorWidget::new(&mut buffer, editor_id.child("text"))
///     .font_size(settings.font_size)
///     .show_line_numbers(true)
///     .restore_cursor(Some(cursor))
///     .show(ui);
/// ```
pub struct CodeEditorWidget<'a> {
    text: &'a mut String,
    id: egui::Id,
    font_size: f32,
    show_line_numbers: bool,
    highlight_active_line: bool,
    show_invisibles: bool,
    theme_colors: Option<ThemeColors>,
    /// Caret to force before the text edit runs (after external edits)
    restore_cursor: Option<CursorPosition>,
    /// Row to highlight when the text edit reports no caret
    fallback_row: usize,
    annotations: &'a [Annotation],
}

impl<'a> CodeEditorWidget<'a> {
    pub fn new(text: &'a mut String, id: egui::Id) -> Self {
        Self {
            text,
            id,
            font_size: 12.0,
            show_line_numbers: true,
            highlight_active_line: true,
            show_invisibles: false,
            theme_colors: None,
            restore_cursor: None,
            fallback_row: 0,
            annotations: &[],
        }
    }

    #[must_use]
    pub fn font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    #[must_use]
    pub fn show_line_numbers(mut self, show: bool) -> Self {
        self.show_line_numbers = show;
        self
    }

    #[must_use]
    pub fn highlight_active_line(mut self, highlight: bool) -> Self {
        self.highlight_active_line = highlight;
        self
    }

    #[must_use]
    pub fn show_invisibles(mut self, show: bool) -> Self {
        self.show_invisibles = show;
        self
    }

    #[must_use]
    pub fn theme_colors(mut self, colors: ThemeColors) -> Self {
        self.theme_colors = Some(colors);
        self
    }

    /// Move the caret to `position` before showing (clamped to the text).
    #[must_use]
    pub fn restore_cursor(mut self, position: Option<CursorPosition>) -> Self {
        self.restore_cursor = position;
        self
    }

    /// Row to treat as active when the text edit has no caret yet.
    #[must_use]
    pub fn fallback_row(mut self, row: usize) -> Self {
        self.fallback_row = row;
        self
    }

    /// Diagnostics to mark in the gutter (needs line numbers shown).
    #[must_use]
    pub fn annotations(mut self, annotations: &'a [Annotation]) -> Self {
        self.annotations = annotations;
        self
    }

    /// Show the editor widget and return the output.
    pub fn show(self, ui: &mut Ui) -> EditorOutput {
        let id = self.id;

        if let Some(position) = self.restore_cursor {
            let index = line_col_to_char_index(self.text, position.row, position.column);
            let mut state = TextEdit::load_state(ui.ctx(), id).unwrap_or_default();
            state
                .cursor
                .set_char_range(Some(CCursorRange::one(CCursor::new(index))));
            TextEdit::store_state(ui.ctx(), id, state);
            trace!("Restored caret to {:?} (char {})", position, index);
        }

        let original_content = self.text.clone();
        let font_size = self.font_size;
        let font_id = FontId::monospace(font_size);
        let colors = self
            .theme_colors
            .clone()
            .unwrap_or_else(|| ThemeColors::from_theme(crate::config::Theme::System, ui.visuals()));
        let has_annotations = self.show_line_numbers && !self.annotations.is_empty();
        let gutter = if self.show_line_numbers {
            let lane = if has_annotations { MARKER_LANE } else { 0.0 };
            gutter_width(count_lines(self.text), font_size) + lane
        } else {
            0.0
        };

        let layout_font = font_id.clone();
        let mut layouter = move |ui: &Ui, text: &str, _wrap_width: f32| -> Arc<egui::Galley> {
            let job = egui::text::LayoutJob::simple_singleline(
                text.to_owned(),
                layout_font.clone(),
                ui.visuals().text_color(),
            );
            ui.fonts(|f| f.layout_job(job))
        };

        let text = self.text;
        let scroll_output = ScrollArea::both()
            .id_source(id.with("scroll"))
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.horizontal_top(|ui| {
                    ui.spacing_mut().item_spacing.x = 0.0;

                    let gutter_rect = if gutter > 0.0 {
                        let line_height = ui.fonts(|f| f.row_height(&font_id));
                        let total_height = count_lines(text) as f32 * line_height;
                        let (rect, _) = ui.allocate_exact_size(
                            egui::vec2(gutter, total_height.max(ui.available_height())),
                            egui::Sense::hover(),
                        );
                        Some(rect)
                    } else {
                        None
                    };

                    let text_output = TextEdit::multiline(&mut *text)
                        .id(id)
                        .code_editor()
                        .lock_focus(true)
                        .frame(false)
                        .font(font_id.clone())
                        .desired_width(f32::INFINITY)
                        .desired_rows(1)
                        .layouter(&mut layouter)
                        .show(ui);

                    (gutter_rect, text_output)
                })
                .inner
            });

        let (gutter_rect, text_output) = scroll_output.inner;
        let galley = &text_output.galley;
        let galley_pos = text_output.galley_pos;
        let painter = ui.painter_at(scroll_output.inner_rect);

        let (cursor, selection) = match text_output.cursor_range {
            Some(range) => {
                let primary = range.primary.ccursor.index;
                let secondary = range.secondary.ccursor.index;
                let (row, column) = char_index_to_line_col(text, primary);
                let head = CursorPosition::new(row, column);
                let selection = (primary != secondary).then(|| {
                    let (row, column) = char_index_to_line_col(text, secondary);
                    Selection {
                        anchor: CursorPosition::new(row, column),
                        head,
                    }
                });
                (Some(head), selection)
            }
            None => (None, None),
        };
        let active_row = cursor.map_or(self.fallback_row, |c| c.row);

        // Rows are laid out without wrapping, but track logical lines the
        // same way the gutter does in case a row is ever split.
        let mut logical_line = 0usize;
        let mut first_row_of_line = true;
        let text_right = text_output.response.rect.right();
        let markers = if has_annotations {
            gutter_markers(self.annotations, count_lines(text))
        } else {
            Default::default()
        };

        if let Some(gutter_rect) = gutter_rect {
            painter.rect_filled(gutter_rect, 0.0, colors.editor.gutter_bg);
            painter.line_segment(
                [
                    gutter_rect.right_top() + egui::vec2(-1.0, 0.0),
                    gutter_rect.right_bottom() + egui::vec2(-1.0, 0.0),
                ],
                egui::Stroke::new(1.0, colors.base.border_subtle),
            );
        }

        for row in galley.rows.iter() {
            let row_rect = row.rect.translate(galley_pos.to_vec2());
            let is_active = logical_line == active_row;

            if self.highlight_active_line && is_active {
                let band = egui::Rect::from_min_max(
                    egui::pos2(galley_pos.x, row_rect.min.y),
                    egui::pos2(text_right.max(row_rect.max.x), row_rect.max.y),
                );
                painter.rect_filled(band, 0.0, colors.editor.active_line);
            }

            if self.show_invisibles {
                for glyph in &row.glyphs {
                    let mark = match glyph.chr {
                        ' ' => SPACE_MARK,
                        '\t' => TAB_MARK,
                        _ => continue,
                    };
                    let center = egui::pos2(
                        galley_pos.x + glyph.pos.x + glyph.size.x / 2.0,
                        row_rect.center().y,
                    );
                    painter.text(
                        center,
                        egui::Align2::CENTER_CENTER,
                        mark,
                        font_id.clone(),
                        colors.editor.invisible,
                    );
                }
            }

            if let (Some(gutter_rect), true) = (gutter_rect, first_row_of_line) {
                let color = if is_active {
                    colors.editor.gutter_text_active
                } else {
                    colors.editor.gutter_text
                };
                painter.text(
                    egui::pos2(gutter_rect.right() - 12.0, row_rect.min.y),
                    egui::Align2::RIGHT_TOP,
                    (logical_line + 1).to_string(),
                    font_id.clone(),
                    color,
                );

                if let Some(marker) = markers.get(&logical_line) {
                    let center = egui::pos2(gutter_rect.left() + MARKER_LANE / 2.0, row_rect.center().y);
                    let radius = (row_rect.height() / 4.0).clamp(2.0, 4.0);
                    painter.circle_filled(center, radius, marker_color(marker.kind, &colors));

                    let hit = egui::Rect::from_center_size(center, egui::vec2(MARKER_LANE, row_rect.height()));
                    if scroll_output.inner_rect.intersects(hit) {
                        ui.interact(hit, id.with(("annotation", logical_line)), egui::Sense::hover())
                            .on_hover_text(marker.text.as_str());
                    }
                }
            }
            first_row_of_line = false;

            if row.ends_with_newline {
                logical_line += 1;
                first_row_of_line = true;
            }
        }

        EditorOutput {
            changed: *text != original_content,
            cursor,
            selection,
        }
    }
}

fn marker_color(kind: AnnotationKind, colors: &ThemeColors) -> egui::Color32 {
    match kind {
        AnnotationKind::Error => colors.ui.error,
        AnnotationKind::Warning => colors.ui.warning,
        AnnotationKind::Info => colors.ui.accent,
    }
}

/// Convert a character index to (line, column) position.
///
/// Both line and column are 0-indexed.
pub fn char_index_to_line_col(text: &str, char_index: usize) -> (usize, usize) {
    let mut line = 0;
    let mut col = 0;

    for (i, ch) in text.chars().enumerate() {
        if i >= char_index {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 0;
        } else {
            col += 1;
        }
    }

    (line, col)
}

/// Convert (line, column) position to a character index.
///
/// Both line and column are 0-indexed. A column past the end of its line
/// maps to the end of that line; a line past the end maps to the end of
/// the text.
pub fn line_col_to_char_index(text: &str, line: usize, col: usize) -> usize {
    let mut current_line = 0;
    let mut current_col = 0;

    for (i, ch) in text.chars().enumerate() {
        if current_line == line && current_col == col {
            return i;
        }
        if ch == '\n' {
            if current_line == line {
                return i;
            }
            current_line += 1;
            current_col = 0;
        } else if current_line == line {
            current_col += 1;
        }
    }

    text.chars().count()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
