//! Editor module for Codepad
//!
//! This module contains the code editor widget and the adapter that binds
//! it to a text session with background re-indentation.

mod annotations;
mod binding;
mod line_numbers;
mod widget;

pub use annotations::Annotation;
pub use binding::CodeEditor;
