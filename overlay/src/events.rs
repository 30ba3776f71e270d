//! Input events delivered to an overlay by its host page

use delight_core::state::FocusTarget;
use delight_types::Preferences;

/// Everything that can cause a re-render
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer moved to viewport coordinates
    PointerMove { x: f32, y: f32 },
    /// Focus moved to an element, or back to the document
    Focus(FocusTarget),
    /// Focus left the current element
    Blur,
    /// Host viewport changed size
    Resize { width: u32, height: u32 },
    /// New preferences arrived for this page's host
    Preferences(Preferences),
}
