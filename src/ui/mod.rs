//! UI components for Codepad
//!
//! This module contains reusable UI widgets and components.

mod settings;

pub use settings::SettingsPopover;
