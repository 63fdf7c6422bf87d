//! Editor layout
//!
//! The editor fills the code container below (or above) a number of fixed
//! bars: the tab bar, the editor options bar and so on.

/// Vertical space taken by the editor's top and bottom border.
pub const EDITOR_BORDER_HEIGHT: f32 = 2.0;

/// Height available to the editor inside a container.
///
/// `container_height` minus every bar in `bar_heights` minus the border.
/// Never negative.
pub fn editor_height(container_height: f32, bar_heights: &[f32]) -> f32 {
    let bars: f32 = bar_heights.iter().sum();
    (container_height - bars - EDITOR_BORDER_HEIGHT).max(0.0)
}
