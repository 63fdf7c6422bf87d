//! Observable view state
//!
//! A [`Property`] holds a value and a revision counter that moves on every
//! real change. Consumers keep a [`Subscription`] (the last revision they
//! saw) and poll for changes once per frame. This keeps the whole model on
//! the UI thread with plain ownership and no callbacks.

use crate::config::Theme;
use crate::editor::Annotation;

/// An observable value.
#[derive(Debug, Clone)]
pub struct Property<T> {
    value: T,
    revision: u64,
}

/// Read cursor into a [`Property`]'s change history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    seen: u64,
}

impl<T: PartialEq> Property<T> {
    pub fn new(value: T) -> Self {
        Self { value, revision: 0 }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Update the value. Setting an equal value is not a change.
    ///
    /// Returns whether the value changed.
    pub fn set(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        self.revision += 1;
        true
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Subscribe to future changes (the current value counts as seen).
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            seen: self.revision,
        }
    }

    /// The current value if it changed since `subscription` last looked.
    ///
    /// Several changes between two polls are reported once, with the latest
    /// value.
    pub fn changed(&self, subscription: &mut Subscription) -> Option<&T> {
        if subscription.seen == self.revision {
            return None;
        }
        subscription.seen = self.revision;
        Some(&self.value)
    }
}

impl<T: PartialEq + Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// View state shared between the application chrome and the editor.
#[derive(Debug, Clone)]
pub struct ViewModel {
    /// Selected color theme
    pub theme: Property<Theme>,
    /// Editor font size in points
    pub font_size: Property<f32>,
    /// Text to load into the editor
    pub editor_text: Property<String>,
    /// Diagnostics to mark in the editor gutter
    pub annotations: Property<Vec<Annotation>>,
}

impl ViewModel {
    pub fn new(theme: Theme, font_size: f32) -> Self {
        Self {
            theme: Property::new(theme),
            font_size: Property::new(font_size),
            editor_text: Property::default(),
            annotations: Property::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_bumps_revision_only_on_change() {
        let mut prop = Property::new(12.0_f32);
        assert!(!prop.set(12.0));
        assert_eq!(prop.revision(), 0);
        assert!(prop.set(14.0));
        assert_eq!(prop.revision(), 1);
        assert_eq!(*prop.get(), 14.0);
    }

    #[test]
    fn test_subscription_sees_each_change_once() {
        let mut prop = Property::new(Theme::Light);
        let mut sub = prop.subscribe();
        assert!(prop.changed(&mut sub).is_none());

        prop.set(Theme::Dark);
        assert_eq!(prop.changed(&mut sub), Some(&Theme::Dark));
        assert!(prop.changed(&mut sub).is_none());
    }

    #[test]
    fn test_changes_between_polls_coalesce() {
        let mut prop = Property::new(String::new());
        let mut sub = prop.subscribe();
        prop.set("a".to_string());
        prop.set("b".to_string());
        assert_eq!(prop.changed(&mut sub).map(String::as_str), Some("b"));
        assert!(prop.changed(&mut sub).is_none());
    }

    #[test]
    fn test_subscriptions_are_independent() {
        let mut prop = Property::new(1);
        let mut first = prop.subscribe();
        prop.set(2);
        let mut second = prop.subscribe();

        assert_eq!(prop.changed(&mut first), Some(&2));
        assert!(prop.changed(&mut second).is_none());
    }

    #[test]
    fn test_view_model_new() {
        let vm = ViewModel::new(Theme::Dark, 16.0);
        assert_eq!(*vm.theme.get(), Theme::Dark);
        assert_eq!(*vm.font_size.get(), 16.0);
        assert!(vm.editor_text.get().is_empty());
        assert!(vm.annotations.get().is_empty());
    }
}
