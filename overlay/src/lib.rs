//! Delight Overlay Library
//!
//! Darkening mask with soft lit cutouts around the pointer and the focused
//! element.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    session                          │
//! │     run_page: prefs fetch + updates + input events  │
//! ├─────────────────────────────────────────────────────┤
//! │                    overlay                          │
//! │              Overlay, OverlayHost                   │
//! │       (state + renderer, one per page)              │
//! ├─────────────────────────────────────────────────────┤
//! │                    renderer                         │
//! │     fill mask, punch cutouts (destination-out)      │
//! │            tiny-skia + box-blur                     │
//! ├─────────────────────────────────────────────────────┤
//! │                    surface                          │
//! │       DrawingSurface trait, HeadlessSurface         │
//! └─────────────────────────────────────────────────────┘
//! ```

mod blur;
pub mod error;
pub mod events;
pub mod overlay;
pub mod renderer;
pub mod session;
pub mod surface;
pub mod utils;

// Re-export commonly used types
pub use error::OverlayError;
pub use events::InputEvent;
pub use overlay::{Overlay, OverlayHost};
pub use renderer::{Cutout, OverlayRenderer, RenderOutcome};
pub use session::run_page;
pub use surface::{DrawingSurface, HeadlessSurface, SurfaceError};
