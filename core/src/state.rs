//! Overlay state: what is lit and how
//!
//! `OverlayState` is plain data. Input handlers mutate it; the owning overlay
//! re-renders after every mutation. Preferences start out unresolved and the
//! renderer draws nothing until they arrive.

use delight_types::Preferences;

use crate::geometry::{Point, Rect};

/// Target of a focus event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FocusTarget {
    /// The document root itself gained focus (treated as "nothing focused")
    Document,
    /// A concrete element with its current layout rectangle
    Element(Rect),
}

/// The things the mask lights up around
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LitTargets {
    /// Last pointer location; `None` until the first pointer move
    pub hover_point: Option<Point>,
    /// Bounding box of the focused element
    pub focus_box: Option<Rect>,
}

impl LitTargets {
    pub fn is_empty(&self) -> bool {
        self.hover_point.is_none() && self.focus_box.is_none()
    }
}

/// Single source of truth for the overlay
#[derive(Debug, Clone, Default)]
pub struct OverlayState {
    preferences: Option<Preferences>,
    targets: LitTargets,
}

impl OverlayState {
    /// State with preferences still loading
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preferences(preferences: Preferences) -> Self {
        Self {
            preferences: Some(preferences),
            targets: LitTargets::default(),
        }
    }

    /// `None` while preferences are still loading
    pub fn preferences(&self) -> Option<&Preferences> {
        self.preferences.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.preferences.is_some()
    }

    /// Enabled and loaded
    pub fn is_enabled(&self) -> bool {
        self.preferences.is_some_and(|p| p.enabled)
    }

    pub fn targets(&self) -> &LitTargets {
        &self.targets
    }

    pub fn hover_point(&self) -> Option<Point> {
        self.targets.hover_point
    }

    pub fn focus_box(&self) -> Option<Rect> {
        self.targets.focus_box
    }

    /// Replace preferences wholesale, returning the previous value.
    ///
    /// Lit targets are kept so toggling `enabled` restores the same frame.
    pub fn set_preferences(&mut self, preferences: Preferences) -> Option<Preferences> {
        self.preferences.replace(preferences)
    }

    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        self.targets.hover_point = Some(Point::new(x, y));
    }

    pub fn on_focus(&mut self, target: FocusTarget) {
        match target {
            FocusTarget::Element(rect) => self.targets.focus_box = Some(rect),
            FocusTarget::Document => self.on_blur(),
        }
    }

    pub fn on_blur(&mut self) {
        self.targets.focus_box = None;
    }
}
