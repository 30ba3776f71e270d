//! Conversions between preference values and tiny-skia types

use delight_types::OverlayColor;
use tiny_skia::Color;

/// Convert [u8; 4] RGBA array to tiny_skia Color
#[inline]
pub fn color_from_rgba(rgba: [u8; 4]) -> Color {
    Color::from_rgba8(rgba[0], rgba[1], rgba[2], rgba[3])
}

/// Mask color as drawn: alpha quantized to 8 bits
#[inline]
pub fn color_from_overlay(color: OverlayColor) -> Color {
    color_from_rgba(color.to_rgba8())
}
