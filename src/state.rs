//! Application state management for Codepad
//!
//! This module defines the central `AppState` struct that holds the user
//! settings, the observable view model and transient UI state.

use crate::config::{save_config_silent, Settings};
use crate::view_model::ViewModel;
use log::{debug, info, warn};

/// Default time a toast stays visible, in seconds.
pub const TOAST_DURATION: f64 = 3.0;

// ─────────────────────────────────────────────────────────────────────────────
// UI State
// ─────────────────────────────────────────────────────────────────────────────

/// Transient UI state (never persisted).
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Temporary toast message (shown in the status bar)
    pub toast_message: Option<String>,
    /// When the toast message should expire (as seconds since app start)
    pub toast_expires_at: Option<f64>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Application State
// ─────────────────────────────────────────────────────────────────────────────

/// Central application state.
#[derive(Debug)]
pub struct AppState {
    /// User settings (loaded from config)
    pub settings: Settings,
    /// Observable state shared with the editor
    pub view_model: ViewModel,
    /// UI-related state
    pub ui: UiState,
    /// Whether settings have been modified and need saving
    settings_dirty: bool,
}

impl AppState {
    /// Create AppState from already loaded settings.
    ///
    /// The view model starts from the persisted theme and font size.
    pub fn with_settings(settings: Settings) -> Self {
        debug!(
            "Theme: {:?}, font size: {}",
            settings.theme, settings.font_size
        );
        let view_model = ViewModel::new(settings.theme, settings.font_size);
        Self {
            settings,
            view_model,
            ui: UiState::default(),
            settings_dirty: false,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Settings Management
    // ─────────────────────────────────────────────────────────────────────────

    /// Update settings and mark as dirty.
    pub fn update_settings<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        f(&mut self.settings);
        self.settings_dirty = true;
    }

    /// Mark settings as dirty (needing to be saved).
    pub fn mark_settings_dirty(&mut self) {
        self.settings_dirty = true;
    }

    pub fn settings_dirty(&self) -> bool {
        self.settings_dirty
    }

    /// Save settings to config file if modified.
    ///
    /// Returns `true` if settings were saved.
    pub fn save_settings_if_dirty(&mut self) -> bool {
        if self.settings_dirty {
            if save_config_silent(&self.settings) {
                self.settings_dirty = false;
                info!("Settings saved");
                return true;
            }
            warn!("Failed to save settings");
        }
        false
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Toasts
    // ─────────────────────────────────────────────────────────────────────────

    /// Show a temporary toast message (disappears after duration).
    ///
    /// `current_time` should be the current app time in seconds.
    /// `duration` is how long to show the message in seconds.
    pub fn show_toast(&mut self, message: impl Into<String>, current_time: f64, duration: f64) {
        self.ui.toast_message = Some(message.into());
        self.ui.toast_expires_at = Some(current_time + duration);
    }

    /// Update toast state - clears expired toasts.
    ///
    /// Call this each frame with the current time.
    pub fn update_toast(&mut self, current_time: f64) {
        if let Some(expires_at) = self.ui.toast_expires_at {
            if current_time >= expires_at {
                self.clear_toast();
            }
        }
    }

    /// Clear any active toast message.
    pub fn clear_toast(&mut self) {
        self.ui.toast_message = None;
        self.ui.toast_expires_at = None;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Theme;

    #[test]
    fn test_appstate_with_settings() {
        let settings = Settings {
            theme: Theme::Dark,
            font_size: 16.0,
            ..Settings::default()
        };
        let state = AppState::with_settings(settings);
        assert_eq!(*state.view_model.theme.get(), Theme::Dark);
        assert_eq!(*state.view_model.font_size.get(), 16.0);
        assert!(!state.settings_dirty());
    }

    #[test]
    fn test_appstate_update_settings() {
        let mut state = AppState::with_settings(Settings::default());
        assert!(!state.settings_dirty);

        state.update_settings(|s| {
            s.theme = Theme::Dark;
        });

        assert_eq!(state.settings.theme, Theme::Dark);
        assert!(state.settings_dirty);
    }

    #[test]
    fn test_mark_settings_dirty() {
        let mut state = AppState::with_settings(Settings::default());
        state.mark_settings_dirty();
        assert!(state.settings_dirty());
    }

    #[test]
    fn test_save_settings_if_clean_is_noop() {
        let mut state = AppState::with_settings(Settings::default());
        assert!(!state.save_settings_if_dirty());
    }

    #[test]
    fn test_ui_state_default() {
        let ui = UiState::default();
        assert!(ui.toast_message.is_none());
        assert!(ui.toast_expires_at.is_none());
    }

    #[test]
    fn test_toast_expires() {
        let mut state = AppState::with_settings(Settings::default());
        state.show_toast("Reindent failed", 10.0, 2.0);
        assert_eq!(state.ui.toast_message.as_deref(), Some("Reindent failed"));

        state.update_toast(11.0);
        assert!(state.ui.toast_message.is_some());

        state.update_toast(12.0);
        assert!(state.ui.toast_message.is_none());
        assert!(state.ui.toast_expires_at.is_none());
    }

    #[test]
    fn test_clear_toast() {
        let mut state = AppState::with_settings(Settings::default());
        state.show_toast("x", 0.0, TOAST_DURATION);
        state.clear_toast();
        assert!(state.ui.toast_message.is_none());
    }
}
