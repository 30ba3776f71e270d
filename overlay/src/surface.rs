//! Drawing surface abstraction
//!
//! A surface is the full-viewport layer the mask is drawn into. Backends own
//! the pixel buffer and report the host viewport; the renderer is the only
//! writer. `HeadlessSurface` keeps the frame in a tiny-skia pixmap and is
//! what the CLI and the tests render into.

use std::path::Path;

use thiserror::Error;
use tiny_skia::{Pixmap, PixmapMut};

/// Errors that can occur in surface operations
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// No pixel buffer can be allocated for these dimensions
    #[error("no drawing context available for a {width}x{height} surface")]
    ContextUnavailable { width: u32, height: u32 },

    #[error("failed to encode frame: {0}")]
    Encode(String),
}

/// Trait that all surface backends must implement
pub trait DrawingSurface {
    /// Current viewport size of the host, in device pixels
    fn viewport(&self) -> (u32, u32);

    /// The host reported a new viewport size
    fn viewport_changed(&mut self, _width: u32, _height: u32) {}

    /// Resize the backing buffer, discarding its contents
    fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError>;

    /// Mutable view of the pixel buffer (premultiplied RGBA).
    /// Returns None if no drawing context is available.
    fn pixmap_mut(&mut self) -> Option<PixmapMut<'_>>;

    /// Put the surface into the visible tree
    fn attach(&mut self);

    /// Remove the surface from the visible tree, keeping its buffer
    fn detach(&mut self);

    fn is_attached(&self) -> bool;

    /// Present the current buffer
    fn commit(&mut self);
}

/// Off-screen surface backed by a tiny-skia pixmap
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    pixmap: Pixmap,
    viewport: (u32, u32),
    attached: bool,
    frames: u64,
}

impl HeadlessSurface {
    /// Create a detached surface sized to the given viewport
    pub fn new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        let pixmap =
            Pixmap::new(width, height).ok_or(SurfaceError::ContextUnavailable { width, height })?;
        Ok(Self {
            pixmap,
            viewport: (width, height),
            attached: false,
            frames: 0,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// The last drawn frame
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Number of committed frames
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Alpha of the pixel at (x, y), if inside the buffer
    pub fn alpha_at(&self, x: u32, y: u32) -> Option<u8> {
        self.pixmap.pixel(x, y).map(|p| p.alpha())
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), SurfaceError> {
        self.pixmap
            .save_png(path)
            .map_err(|e| SurfaceError::Encode(e.to_string()))
    }
}

impl DrawingSurface for HeadlessSurface {
    fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    fn viewport_changed(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        self.pixmap =
            Pixmap::new(width, height).ok_or(SurfaceError::ContextUnavailable { width, height })?;
        Ok(())
    }

    fn pixmap_mut(&mut self) -> Option<PixmapMut<'_>> {
        Some(self.pixmap.as_mut())
    }

    fn attach(&mut self) {
        self.attached = true;
    }

    fn detach(&mut self) {
        self.attached = false;
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn commit(&mut self) {
        self.frames += 1;
    }
}
