//! Mask renderer using tiny-skia
//!
//! Every render redraws the whole surface from scratch:
//!
//! 1. resize the surface to the viewport (this clears it)
//! 2. fill it with the overlay color
//! 3. punch the focus cutout, then the hover cutout, with destination-out
//!
//! A cutout is a rectangle filled with a radial gradient (opaque white at the
//! center, transparent at half the larger side). Drawn with destination-out
//! the gradient's alpha is subtracted from the mask, leaving a soft lit hole.
//! The hover cutout is blurred on its own layer before being composited.

use delight_core::geometry::{Point, Rect};
use delight_core::state::{LitTargets, OverlayState};
use delight_types::{LitRegion, OverlayColor, Preferences};
use tiny_skia::{
    BlendMode, Color, GradientStop, Paint, Pixmap, PixmapMut, PixmapPaint, RadialGradient,
    SpreadMode, Transform,
};

use crate::blur;
use crate::error::OverlayError;
use crate::surface::DrawingSurface;
use crate::utils::color_from_overlay;

/// Focus cutout center is nudged up and left by this much
pub const FOCUS_OFFSET: f32 = 5.0;
/// Added to both focus cutout dimensions
pub const FOCUS_PADDING: f32 = 20.0;
/// Element height beyond which the focus cutout stops growing
pub const FOCUS_MAX_HEIGHT: f32 = 400.0;

/// Blur deviation as a fraction of the hover region's larger side
pub const BLUR_SCALE: f32 = 0.02;
pub const BLUR_MIN: f32 = 10.0;
pub const BLUR_MAX: f32 = 100.0;

// ─────────────────────────────────────────────────────────────────────────────
// Cutout Geometry
// ─────────────────────────────────────────────────────────────────────────────

/// A lit hole in the mask
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cutout {
    /// Rectangle the gradient is filled into
    pub bounds: Rect,
    /// Gaussian blur deviation applied before compositing
    pub blur: Option<f32>,
}

impl Cutout {
    /// Cutout around a focused element; `None` for empty boxes
    pub fn for_focus(focus: Rect) -> Option<Self> {
        if focus.is_empty() {
            return None;
        }
        let center = Point::new(
            focus.x + focus.width / 2.0 - FOCUS_OFFSET,
            focus.y + focus.height / 2.0 - FOCUS_OFFSET,
        );
        let bounds = Rect::centered(
            center,
            focus.width + FOCUS_PADDING,
            focus.height.min(FOCUS_MAX_HEIGHT) + FOCUS_PADDING,
        );
        Some(Self { bounds, blur: None })
    }

    /// Cutout under the pointer; `None` for an empty region
    pub fn for_hover(point: Point, region: LitRegion) -> Option<Self> {
        if region.is_empty() || !point.is_finite() {
            return None;
        }
        let bounds = Rect::centered(point, region.width as f32, region.height as f32);
        Some(Self {
            bounds,
            blur: Some(hover_blur(region)),
        })
    }

    pub fn center(&self) -> Point {
        self.bounds.center()
    }

    /// Gradient radius: half of the larger side
    pub fn radius(&self) -> f32 {
        self.bounds.width.max(self.bounds.height) / 2.0
    }

    /// Fraction of mask alpha removed at `p`, before blur
    #[cfg(test)]
    fn coverage_at(&self, p: Point) -> f32 {
        if !self.bounds.contains(p) {
            return 0.0;
        }
        let c = self.center();
        let distance = (p.x - c.x).hypot(p.y - c.y);
        (1.0 - distance / self.radius()).clamp(0.0, 1.0)
    }
}

/// Blur deviation for a hover region, in whole pixels
pub fn hover_blur(region: LitRegion) -> f32 {
    (BLUR_SCALE * region.max_dimension() as f32)
        .clamp(BLUR_MIN, BLUR_MAX)
        .floor()
}

/// Cutouts for the current targets, focus first
pub fn cutouts_for(targets: &LitTargets, prefs: &Preferences) -> Vec<Cutout> {
    let focus = targets.focus_box.and_then(Cutout::for_focus);
    let hover = targets
        .hover_point
        .and_then(|p| Cutout::for_hover(p, prefs.lit_region));
    focus.into_iter().chain(hover).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Renderer
// ─────────────────────────────────────────────────────────────────────────────

/// Result of a render pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Preferences have not arrived; nothing drawn
    Pending,
    /// Effect is switched off; surface left alone
    Disabled,
    /// Surface could not be sized or accessed; nothing drawn
    Skipped,
    /// A full frame was drawn and committed
    Drawn { cutouts: usize },
}

/// Sole owner and writer of the overlay surface
pub struct OverlayRenderer<S> {
    surface: S,
}

impl<S: DrawingSurface> OverlayRenderer<S> {
    /// Take ownership of a surface. Fails if it has no drawing context.
    pub fn new(mut surface: S) -> Result<Self, OverlayError> {
        if surface.pixmap_mut().is_none() {
            let (width, height) = surface.viewport();
            return Err(OverlayError::InitializationFailure { width, height });
        }
        Ok(Self { surface })
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Reconcile `state` into pixels
    pub fn render(&mut self, state: &OverlayState) -> RenderOutcome {
        let Some(prefs) = state.preferences() else {
            tracing::trace!("Preferences pending, skipping render");
            return RenderOutcome::Pending;
        };
        if !prefs.enabled {
            return RenderOutcome::Disabled;
        }

        let (width, height) = self.surface.viewport();
        if let Err(e) = self.surface.resize(width, height) {
            tracing::warn!(width, height, error = %e, "Failed to size overlay surface");
            return RenderOutcome::Skipped;
        }

        let cutouts = cutouts_for(state.targets(), prefs);
        {
            let Some(mut pixmap) = self.surface.pixmap_mut() else {
                tracing::warn!("Overlay surface lost its drawing context");
                return RenderOutcome::Skipped;
            };

            fill_mask(&mut pixmap, prefs.overlay_color);
            for cutout in &cutouts {
                punch(&mut pixmap, cutout);
            }
        }
        self.surface.commit();

        tracing::trace!(width, height, cutouts = cutouts.len(), "Rendered overlay");
        RenderOutcome::Drawn {
            cutouts: cutouts.len(),
        }
    }
}

/// Fill the whole pixmap with the mask color (source-over)
fn fill_mask(pixmap: &mut PixmapMut, color: OverlayColor) {
    let Some(rect) =
        tiny_skia::Rect::from_xywh(0.0, 0.0, pixmap.width() as f32, pixmap.height() as f32)
    else {
        return;
    };

    let mut paint = Paint::default();
    paint.set_color(color_from_overlay(color));
    paint.anti_alias = false;

    pixmap.fill_rect(rect, &paint, Transform::identity(), None);
}

/// White-to-transparent radial gradient paint centered on `center`
fn gradient_paint(center: Point, radius: f32) -> Option<Paint<'static>> {
    let center = tiny_skia::Point::from_xy(center.x, center.y);
    let shader = RadialGradient::new(
        center,
        center,
        radius,
        vec![
            GradientStop::new(0.0, Color::WHITE),
            GradientStop::new(1.0, Color::from_rgba8(255, 255, 255, 0)),
        ],
        SpreadMode::Pad,
        Transform::identity(),
    )?;

    Some(Paint {
        shader,
        anti_alias: true,
        ..Default::default()
    })
}

/// Subtract a cutout from the mask
fn punch(pixmap: &mut PixmapMut, cutout: &Cutout) {
    match cutout.blur {
        Some(sigma) if sigma > 0.0 => punch_blurred(pixmap, cutout, sigma),
        _ => punch_sharp(pixmap, cutout),
    }
}

fn punch_sharp(pixmap: &mut PixmapMut, cutout: &Cutout) {
    let b = cutout.bounds;
    let Some(rect) = tiny_skia::Rect::from_xywh(b.x, b.y, b.width, b.height) else {
        return;
    };
    let Some(mut paint) = gradient_paint(cutout.center(), cutout.radius()) else {
        return;
    };
    paint.blend_mode = BlendMode::DestinationOut;

    pixmap.fill_rect(rect, &paint, Transform::identity(), None);
}

/// Draw the gradient on a private layer, blur it, then composite the layer
/// with destination-out. The layer is clipped to the surface plus the blur
/// margin so huge regions stay cheap.
fn punch_blurred(pixmap: &mut PixmapMut, cutout: &Cutout, sigma: f32) {
    let b = cutout.bounds;
    let margin = (sigma * 3.0).ceil() as i64;
    let surface_w = pixmap.width() as i64;
    let surface_h = pixmap.height() as i64;

    let left = (b.x.floor() as i64 - margin).max(-margin);
    let top = (b.y.floor() as i64 - margin).max(-margin);
    let right = (b.right().ceil() as i64 + margin).min(surface_w + margin);
    let bottom = (b.bottom().ceil() as i64 + margin).min(surface_h + margin);
    if right <= left || bottom <= top {
        return;
    }

    let Some(mut layer) = Pixmap::new((right - left) as u32, (bottom - top) as u32) else {
        return;
    };

    let (ox, oy) = (left as f32, top as f32);
    let Some(rect) = tiny_skia::Rect::from_xywh(b.x - ox, b.y - oy, b.width, b.height) else {
        return;
    };
    let local_center = Point::new(cutout.center().x - ox, cutout.center().y - oy);
    let Some(paint) = gradient_paint(local_center, cutout.radius()) else {
        return;
    };
    layer.fill_rect(rect, &paint, Transform::identity(), None);

    blur::gaussian_blur(&mut layer, sigma);

    let paint = PixmapPaint {
        blend_mode: BlendMode::DestinationOut,
        ..Default::default()
    };
    pixmap.draw_pixmap(
        left as i32,
        top as i32,
        layer.as_ref(),
        &paint,
        Transform::identity(),
        None,
    );
}
