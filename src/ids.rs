//! Editor identifiers
//!
//! Every editor instance gets an [`EditorId`] from an [`EditorIdFactory`]
//! owned by the application. Widget ids (egui `Id`s) are derived from it so
//! two editors never share text-edit or popover state.

use eframe::egui;
use std::fmt;

/// Identifier of one editor instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EditorId(u64);

impl EditorId {
    pub fn raw(self) -> u64 {
        self.0
    }

    /// Root egui id for all widgets of this editor.
    pub fn egui_id(self) -> egui::Id {
        egui::Id::new(("codepad_editor", self.0))
    }

    /// egui id of a named child widget (e.g. `"settings"`).
    pub fn child(self, name: &str) -> egui::Id {
        self.egui_id().with(name)
    }
}

impl fmt::Display for EditorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "editor{}", self.0)
    }
}

/// Hands out sequential editor ids.
#[derive(Debug, Clone)]
pub struct EditorIdFactory {
    next: u64,
}

impl EditorIdFactory {
    /// Create a factory whose first id is `start`.
    pub fn new(start: u64) -> Self {
        Self { next: start }
    }

    pub fn next_id(&mut self) -> EditorId {
        let id = EditorId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

impl Default for EditorIdFactory {
    fn default() -> Self {
        Self::new(0)
    }
}
