//! Per-page overlay context
//!
//! An [`Overlay`] ties one page's [`OverlayState`] to the renderer that owns
//! its surface. Every input handler mutates state and then renders the whole
//! frame. [`OverlayHost`] keeps at most one overlay alive per page.

use delight_core::state::{FocusTarget, OverlayState};
use delight_types::Preferences;

use crate::error::OverlayError;
use crate::events::InputEvent;
use crate::renderer::{OverlayRenderer, RenderOutcome};
use crate::surface::DrawingSurface;

/// A live overlay for one page
pub struct Overlay<S> {
    host: String,
    state: OverlayState,
    renderer: OverlayRenderer<S>,
}

impl<S: DrawingSurface> Overlay<S> {
    /// Wrap `surface` in a new overlay. The surface stays detached until the
    /// overlay is installed in an [`OverlayHost`] or enabled preferences
    /// arrive; nothing is drawn before then.
    pub fn create(host: impl Into<String>, surface: S) -> Result<Self, OverlayError> {
        let host = host.into();
        let renderer = OverlayRenderer::new(surface)?;
        tracing::info!(%host, "Overlay created");

        Ok(Self {
            host,
            state: OverlayState::new(),
            renderer,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn surface(&self) -> &S {
        self.renderer.surface()
    }

    /// Apply one input event and render
    pub fn dispatch(&mut self, event: InputEvent) -> RenderOutcome {
        match event {
            InputEvent::PointerMove { x, y } => self.on_pointer_move(x, y),
            InputEvent::Focus(target) => self.on_focus(target),
            InputEvent::Blur => self.on_blur(),
            InputEvent::Resize { width, height } => self.on_resize(width, height),
            InputEvent::Preferences(prefs) => self.set_preferences(prefs),
        }
    }

    pub fn on_pointer_move(&mut self, x: f32, y: f32) -> RenderOutcome {
        self.state.on_pointer_move(x, y);
        self.render()
    }

    pub fn on_focus(&mut self, target: FocusTarget) -> RenderOutcome {
        self.state.on_focus(target);
        self.render()
    }

    pub fn on_blur(&mut self) -> RenderOutcome {
        self.state.on_blur();
        self.render()
    }

    pub fn on_resize(&mut self, width: u32, height: u32) -> RenderOutcome {
        self.renderer.surface_mut().viewport_changed(width, height);
        self.render()
    }

    /// Replace preferences, attach or detach the surface to match
    /// `enabled`, then render.
    pub fn set_preferences(&mut self, prefs: Preferences) -> RenderOutcome {
        let previous = self.state.set_preferences(prefs);
        let was_enabled = previous.is_some_and(|p| p.enabled);
        if prefs.enabled != was_enabled {
            tracing::debug!(host = %self.host, enabled = prefs.enabled, "Overlay toggled");
        }

        if prefs.enabled {
            self.attach();
        } else if self.renderer.surface().is_attached() {
            self.renderer.surface_mut().detach();
            tracing::info!(host = %self.host, "Overlay detached");
        }

        self.render()
    }

    /// Put the surface on screen unless preferences say the effect is off
    fn attach(&mut self) {
        let wanted = self.state.preferences().is_none_or(|p| p.enabled);
        let surface = self.renderer.surface_mut();
        if wanted && !surface.is_attached() {
            surface.attach();
            tracing::info!(host = %self.host, "Overlay attached");
        }
    }

    fn render(&mut self) -> RenderOutcome {
        let outcome = self.renderer.render(&self.state);
        tracing::debug!(host = %self.host, ?outcome, "Render");
        outcome
    }

    /// Detach and give the surface back
    pub fn destroy(self) -> S {
        let mut surface = self.renderer.into_surface();
        surface.detach();
        tracing::info!(host = %self.host, "Overlay removed");
        surface
    }
}

/// Holds the single overlay for a page
pub struct OverlayHost<S> {
    active: Option<Overlay<S>>,
}

impl<S> Default for OverlayHost<S> {
    fn default() -> Self {
        Self { active: None }
    }
}

impl<S: DrawingSurface> OverlayHost<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove any prior instance, then create and attach a new overlay on
    /// `surface`.
    pub fn create(
        &mut self,
        host: impl Into<String>,
        surface: S,
    ) -> Result<&mut Overlay<S>, OverlayError> {
        let host = host.into();
        if self.remove().is_some() {
            tracing::info!(%host, "Removed existing overlay");
        }
        let overlay = Overlay::create(host, surface)?;
        Ok(self.activate(overlay))
    }

    /// Install `overlay`, removing any prior instance before attaching it.
    /// Returns the prior instance's surface.
    pub fn install(&mut self, overlay: Overlay<S>) -> Option<S> {
        let previous = self.remove();
        if previous.is_some() {
            tracing::info!(host = %overlay.host(), "Replaced existing overlay");
        }
        self.activate(overlay);
        previous
    }

    fn activate(&mut self, mut overlay: Overlay<S>) -> &mut Overlay<S> {
        overlay.attach();
        self.active.insert(overlay)
    }

    /// Remove the active overlay, if any
    pub fn remove(&mut self) -> Option<S> {
        self.active.take().map(Overlay::destroy)
    }

    pub fn active(&self) -> Option<&Overlay<S>> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut Overlay<S>> {
        self.active.as_mut()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::surface::HeadlessSurface;
    use delight_core::geometry::Rect;
    use delight_types::{DEFAULT_PREFERENCES, LitRegion, OverlayColor};

    fn overlay(width: u32, height: u32) -> Overlay<HeadlessSurface> {
        Overlay::create("example.com", HeadlessSurface::new(width, height).unwrap()).unwrap()
    }

    fn small_prefs() -> Preferences {
        Preferences {
            lit_region: LitRegion::new(40, 40),
            ..DEFAULT_PREFERENCES
        }
    }

    #[test]
    fn create_neither_attaches_nor_draws() {
        let mut overlay = overlay(64, 64);
        assert!(!overlay.surface().is_attached());
        assert_eq!(overlay.on_pointer_move(10.0, 10.0), RenderOutcome::Pending);
        assert_eq!(overlay.surface().frames(), 0);

        overlay.set_preferences(small_prefs());
        assert!(overlay.surface().is_attached());
    }

    #[test]
    fn events_before_preferences_are_kept() {
        let mut overlay = overlay(64, 64);
        overlay.on_pointer_move(1.0, 1.0);
        overlay.on_pointer_move(30.0, 20.0);

        let outcome = overlay.set_preferences(small_prefs());
        assert_eq!(outcome, RenderOutcome::Drawn { cutouts: 1 });
        assert_eq!(
            overlay.state().hover_point(),
            Some(delight_core::geometry::Point::new(30.0, 20.0))
        );
    }

    #[test]
    fn toggling_reproduces_the_frame() {
        let mut overlay = overlay(96, 64);
        overlay.set_preferences(small_prefs());
        overlay.on_pointer_move(40.0, 30.0);
        overlay.on_focus(FocusTarget::Element(Rect::new(5.0, 5.0, 30.0, 20.0)));
        let before = overlay.surface().pixmap().clone();

        assert_eq!(
            overlay.set_preferences(small_prefs().with_enabled(false)),
            RenderOutcome::Disabled
        );
        assert!(!overlay.surface().is_attached());

        assert_eq!(
            overlay.set_preferences(small_prefs()),
            RenderOutcome::Drawn { cutouts: 2 }
        );
        assert!(overlay.surface().is_attached());
        assert_eq!(overlay.surface().pixmap(), &before);
    }

    #[test]
    fn document_focus_clears_focus_cutout() {
        let mut overlay = overlay(64, 64);
        overlay.set_preferences(small_prefs());
        assert_eq!(
            overlay.on_focus(FocusTarget::Element(Rect::new(5.0, 5.0, 30.0, 20.0))),
            RenderOutcome::Drawn { cutouts: 1 }
        );
        assert_eq!(
            overlay.dispatch(InputEvent::Focus(FocusTarget::Document)),
            RenderOutcome::Drawn { cutouts: 0 }
        );
    }

    #[test]
    fn resize_event_resizes_surface() {
        let mut overlay = overlay(80, 60);
        overlay.set_preferences(small_prefs());
        overlay.dispatch(InputEvent::Resize {
            width: 192,
            height: 108,
        });
        assert_eq!(overlay.surface().width(), 192);
        assert_eq!(overlay.surface().height(), 108);
    }

    #[test]
    fn preference_event_changes_color() {
        let mut overlay = overlay(8, 8);
        overlay.set_preferences(small_prefs());
        assert_eq!(overlay.surface().alpha_at(0, 0), Some(230));

        let dim = Preferences {
            overlay_color: OverlayColor::new(0, 0, 0, 0.2),
            ..small_prefs()
        };
        overlay.dispatch(InputEvent::Preferences(dim));
        assert_eq!(overlay.surface().alpha_at(0, 0), Some(51));
    }

    /// Surface that tracks how many surfaces sharing its counters are on
    /// screen at once
    struct CountedSurface {
        inner: HeadlessSurface,
        attached: Rc<Cell<u32>>,
        peak: Rc<Cell<u32>>,
    }

    impl CountedSurface {
        fn new(attached: &Rc<Cell<u32>>, peak: &Rc<Cell<u32>>) -> Self {
            Self {
                inner: HeadlessSurface::new(8, 8).unwrap(),
                attached: Rc::clone(attached),
                peak: Rc::clone(peak),
            }
        }
    }

    impl DrawingSurface for CountedSurface {
        fn viewport(&self) -> (u32, u32) {
            self.inner.viewport()
        }

        fn resize(&mut self, width: u32, height: u32) -> Result<(), crate::SurfaceError> {
            self.inner.resize(width, height)
        }

        fn pixmap_mut(&mut self) -> Option<tiny_skia::PixmapMut<'_>> {
            self.inner.pixmap_mut()
        }

        fn attach(&mut self) {
            if !self.inner.is_attached() {
                self.attached.set(self.attached.get() + 1);
                self.peak.set(self.peak.get().max(self.attached.get()));
            }
            self.inner.attach();
        }

        fn detach(&mut self) {
            if self.inner.is_attached() {
                self.attached.set(self.attached.get() - 1);
            }
            self.inner.detach();
        }

        fn is_attached(&self) -> bool {
            self.inner.is_attached()
        }

        fn commit(&mut self) {
            self.inner.commit();
        }
    }

    #[test]
    fn replacing_an_overlay_never_shows_two_masks() {
        let attached = Rc::new(Cell::new(0));
        let peak = Rc::new(Cell::new(0));
        let mut host = OverlayHost::new();

        host.create("example.com", CountedSurface::new(&attached, &peak))
            .unwrap()
            .set_preferences(small_prefs());
        assert_eq!(attached.get(), 1);

        let replacement = host
            .create("example.com", CountedSurface::new(&attached, &peak))
            .unwrap();
        assert!(replacement.surface().is_attached());
        assert_eq!(attached.get(), 1);

        // A replacement built outside the host stays hidden until installed
        let standalone = Overlay::create("example.com", CountedSurface::new(&attached, &peak))
            .unwrap();
        assert!(!standalone.surface().is_attached());
        let previous = host.install(standalone).unwrap();
        assert!(!previous.is_attached());
        assert!(host.active().unwrap().surface().is_attached());

        assert_eq!(attached.get(), 1);
        assert_eq!(peak.get(), 1);
    }

    #[test]
    fn install_keeps_disabled_overlay_hidden() {
        let mut overlay = overlay(8, 8);
        overlay.set_preferences(small_prefs().with_enabled(false));

        let mut host = OverlayHost::new();
        host.install(overlay);
        assert!(!host.active().unwrap().surface().is_attached());
    }

    #[test]
    fn host_keeps_a_single_overlay() {
        let mut host = OverlayHost::new();
        assert!(host.install(overlay(8, 8)).is_none());
        assert!(host.active().unwrap().surface().is_attached());

        let previous = host.install(overlay(16, 16)).unwrap();
        assert!(!previous.is_attached());
        assert_eq!(host.active().unwrap().surface().width(), 16);

        host.active_mut().unwrap().set_preferences(small_prefs());
        let removed = host.remove().unwrap();
        assert!(!removed.is_attached());
        assert_eq!(removed.frames(), 1);
        assert!(!host.is_active());
        assert!(host.remove().is_none());
    }
}
