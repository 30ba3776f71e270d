use thiserror::Error;

use crate::surface::SurfaceError;

/// Errors that can occur while setting up or driving an overlay
#[derive(Debug, Error)]
pub enum OverlayError {
    /// The surface offered no drawing context
    #[error("overlay initialization failed: no drawing context for {width}x{height} surface")]
    InitializationFailure { width: u32, height: u32 },

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}
