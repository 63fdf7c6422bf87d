//! Editing sessions
//!
//! A session is the live text buffer of one editing surface together with
//! per-line lexical state tracking. The [`Session`] trait is the line-level
//! capability the re-indentation engine consumes; [`TextSession`] is the
//! concrete buffer used by the editor widget.

use super::mode::{LineState, Mode};
use crate::error::{Error, Result};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

// ─────────────────────────────────────────────────────────────────────────────
// Cursor & Selection
// ─────────────────────────────────────────────────────────────────────────────

/// A caret location as (row, column), both 0-indexed.
///
/// The column counts characters, not bytes. It may point past the end of
/// its line; the widget clamps it when placing the caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CursorPosition {
    pub row: usize,
    pub column: usize,
}

impl CursorPosition {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// A text selection between an anchor and the caret (head).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: CursorPosition,
    pub head: CursorPosition,
}

// ─────────────────────────────────────────────────────────────────────────────
// Change Events
// ─────────────────────────────────────────────────────────────────────────────

/// What kind of mutation a [`ChangeEvent`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Lines were inserted
    Insert,
    /// Lines were removed
    Remove,
    /// The whole buffer was replaced
    Replace,
}

/// A buffer mutation, delivered to every subscribed listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    /// First affected row (inclusive)
    pub first_row: usize,
    /// Last affected row (inclusive)
    pub last_row: usize,
}

/// Callback invoked synchronously on every buffer mutation.
pub type ChangeListener = Box<dyn FnMut(&ChangeEvent)>;

/// Source of buffer change notifications.
pub trait ChangeSource {
    /// Register a listener called after every mutation.
    fn subscribe(&mut self, listener: ChangeListener);
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Capability
// ─────────────────────────────────────────────────────────────────────────────

/// Line-level access to a text buffer.
pub trait Session {
    /// Text of `row`, without its line terminator.
    fn line(&self, row: usize) -> Result<&str>;

    /// Number of lines in the buffer.
    fn line_count(&self) -> usize;

    /// Lexical state at the start of `row`.
    fn lexical_state(&self, row: usize) -> Result<LineState>;

    /// Whitespace inserted for one indentation level.
    fn tab_string(&self) -> &str;

    /// Insert `lines` before `row` (`row == line_count()` appends).
    fn insert_lines(&mut self, row: usize, lines: Vec<String>) -> Result<()>;

    /// Remove rows `first_row..=last_row`.
    fn remove_lines(&mut self, first_row: usize, last_row: usize) -> Result<()>;

    fn cursor_position(&self) -> CursorPosition;

    fn set_cursor_position(&mut self, position: CursorPosition);

    fn clear_selection(&mut self);

    /// Replace the content of a single row in place.
    ///
    /// Implemented as remove-then-insert so listeners observe the same
    /// events as any other line mutation.
    fn replace_line(&mut self, row: usize, text: String) -> Result<()> {
        self.remove_lines(row, row)?;
        self.insert_lines(row, vec![text])
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Text Session
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory line buffer with cached lexical states.
///
/// Lexical states are computed lazily from the top of the buffer and cached;
/// any mutation drops the cached states from the first touched row down.
pub struct TextSession {
    lines: Vec<String>,
    mode: Rc<dyn Mode>,
    /// `states[i]` is the state at the start of row `i`; only a valid prefix is kept
    states: RefCell<Vec<LineState>>,
    tab_size: usize,
    use_soft_tabs: bool,
    tab_string: String,
    cursor: CursorPosition,
    selection: Option<Selection>,
    listeners: Vec<ChangeListener>,
    /// Incremented on every mutation
    revision: u64,
}

impl TextSession {
    /// Default number of columns per indentation level.
    pub const DEFAULT_TAB_SIZE: usize = 4;

    /// Create a session from text. Lines are split on `\n`; a trailing `\r`
    /// on each line is dropped.
    pub fn new(text: &str, mode: Rc<dyn Mode>) -> Self {
        Self::from_lines(split_lines(text), mode)
    }

    /// Create a session from pre-split lines. An empty vector is a buffer
    /// with no lines at all.
    pub fn from_lines(lines: Vec<String>, mode: Rc<dyn Mode>) -> Self {
        Self {
            lines,
            mode,
            states: RefCell::new(Vec::new()),
            tab_size: Self::DEFAULT_TAB_SIZE,
            use_soft_tabs: true,
            tab_string: " ".repeat(Self::DEFAULT_TAB_SIZE),
            cursor: CursorPosition::default(),
            selection: None,
            listeners: Vec::new(),
            revision: 0,
        }
    }

    /// Full buffer contents joined with `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Replace the whole buffer.
    ///
    /// The selection is cleared; the cursor is kept as is.
    pub fn set_text(&mut self, text: &str) {
        let previous_count = self.lines.len();
        self.lines = split_lines(text);
        self.selection = None;
        self.states.get_mut().clear();
        let last_row = previous_count.max(self.lines.len()).saturating_sub(1);
        self.emit(ChangeEvent {
            kind: ChangeKind::Replace,
            first_row: 0,
            last_row,
        });
    }

    /// The mode used to tokenize lines.
    pub fn mode(&self) -> &Rc<dyn Mode> {
        &self.mode
    }

    /// Switch the language mode. Cached lexical states are discarded.
    pub fn set_mode(&mut self, mode: Rc<dyn Mode>) {
        self.mode = mode;
        self.states.get_mut().clear();
    }

    pub fn tab_size(&self) -> usize {
        self.tab_size
    }

    pub fn set_tab_size(&mut self, tab_size: usize) {
        self.tab_size = tab_size.max(1);
        self.rebuild_tab_string();
    }

    pub fn use_soft_tabs(&self) -> bool {
        self.use_soft_tabs
    }

    pub fn set_use_soft_tabs(&mut self, soft: bool) {
        self.use_soft_tabs = soft;
        self.rebuild_tab_string();
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Set the selection. An empty selection (anchor == head) clears it.
    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection.filter(|s| s.anchor != s.head);
    }

    /// Mutation counter, incremented on every change event.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn rebuild_tab_string(&mut self) {
        self.tab_string = if self.use_soft_tabs {
            " ".repeat(self.tab_size)
        } else {
            "\t".to_string()
        };
    }

    fn invalid_row(&self, row: usize) -> Error {
        Error::InvalidRowAccess {
            row,
            line_count: self.lines.len(),
        }
    }

    fn emit(&mut self, event: ChangeEvent) {
        self.revision = self.revision.wrapping_add(1);
        for listener in &mut self.listeners {
            listener(&event);
        }
    }
}

impl Session for TextSession {
    fn line(&self, row: usize) -> Result<&str> {
        self.lines
            .get(row)
            .map(String::as_str)
            .ok_or_else(|| self.invalid_row(row))
    }

    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn lexical_state(&self, row: usize) -> Result<LineState> {
        if row >= self.lines.len() {
            return Err(self.invalid_row(row));
        }

        let mut states = self.states.borrow_mut();
        if states.is_empty() {
            states.push(LineState::START);
        }
        while states.len() <= row {
            let previous = states.len() - 1;
            let next = self.mode.next_state(states[previous], &self.lines[previous]);
            states.push(next);
        }
        Ok(states[row])
    }

    fn tab_string(&self) -> &str {
        &self.tab_string
    }

    fn insert_lines(&mut self, row: usize, lines: Vec<String>) -> Result<()> {
        if row > self.lines.len() {
            return Err(self.invalid_row(row));
        }
        if lines.is_empty() {
            return Ok(());
        }

        let count = lines.len();
        self.lines.splice(row..row, lines);
        self.states.get_mut().truncate(row);
        self.emit(ChangeEvent {
            kind: ChangeKind::Insert,
            first_row: row,
            last_row: row + count - 1,
        });
        Ok(())
    }

    fn remove_lines(&mut self, first_row: usize, last_row: usize) -> Result<()> {
        if last_row >= self.lines.len() {
            return Err(self.invalid_row(last_row));
        }
        if first_row > last_row {
            return Err(self.invalid_row(first_row));
        }

        self.lines.drain(first_row..=last_row);
        self.states.get_mut().truncate(first_row);
        self.emit(ChangeEvent {
            kind: ChangeKind::Remove,
            first_row,
            last_row,
        });
        Ok(())
    }

    fn cursor_position(&self) -> CursorPosition {
        self.cursor
    }

    fn set_cursor_position(&mut self, position: CursorPosition) {
        self.cursor = position;
    }

    fn clear_selection(&mut self) {
        self.selection = None;
    }
}

impl ChangeSource for TextSession {
    fn subscribe(&mut self, listener: ChangeListener) {
        self.listeners.push(listener);
    }
}

impl fmt::Debug for TextSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextSession")
            .field("lines", &self.lines.len())
            .field("mode", &self.mode.name())
            .field("tab_string", &self.tab_string)
            .field("cursor", &self.cursor)
            .field("selection", &self.selection)
            .field("listeners", &self.listeners.len())
            .field("revision", &self.revision)
            .finish()
    }
}

/// Split text into lines on `\n`, dropping a trailing `\r` from each line.
fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
