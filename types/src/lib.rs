//! Shared preference types for Delight
//!
//! This crate contains the serializable preference values exchanged between
//! the preferences store, the settings surface and the page overlay.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Overlay Color
// ─────────────────────────────────────────────────────────────────────────────

/// Errors produced while parsing a CSS color string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("color string is empty")]
    Empty,

    #[error("unrecognized color format '{0}'")]
    UnknownFormat(String),

    #[error("invalid color component '{0}'")]
    InvalidComponent(String),

    #[error("expected 3 or 4 color components, found {0}")]
    ComponentCount(usize),
}

/// Fill color of the dark mask.
///
/// Channels are straight (not premultiplied) sRGB; `alpha` is in `0.0..=1.0`
/// and controls how dark the mask is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OverlayColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: f32,
}

impl OverlayColor {
    pub const fn new(red: u8, green: u8, blue: u8, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Straight RGBA bytes, alpha scaled to 0..=255
    pub fn to_rgba8(&self) -> [u8; 4] {
        [
            self.red,
            self.green,
            self.blue,
            (self.alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
        ]
    }

    fn parse_functional(body: &str) -> Result<Self, ColorParseError> {
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        if parts.len() != 3 && parts.len() != 4 {
            return Err(ColorParseError::ComponentCount(parts.len()));
        }

        let channel = |s: &str| -> Result<u8, ColorParseError> {
            let v: f32 = s
                .parse()
                .map_err(|_| ColorParseError::InvalidComponent(s.to_string()))?;
            if !v.is_finite() {
                return Err(ColorParseError::InvalidComponent(s.to_string()));
            }
            Ok(v.round().clamp(0.0, 255.0) as u8)
        };

        let alpha = match parts.get(3) {
            Some(s) => {
                let v: f32 = s
                    .parse()
                    .map_err(|_| ColorParseError::InvalidComponent(s.to_string()))?;
                if !v.is_finite() {
                    return Err(ColorParseError::InvalidComponent(s.to_string()));
                }
                v.clamp(0.0, 1.0)
            }
            None => 1.0,
        };

        Ok(Self::new(
            channel(parts[0])?,
            channel(parts[1])?,
            channel(parts[2])?,
            alpha,
        ))
    }

    fn parse_hex(digits: &str) -> Result<Self, ColorParseError> {
        let nibble = |c: char| -> Result<u8, ColorParseError> {
            c.to_digit(16)
                .map(|d| d as u8)
                .ok_or_else(|| ColorParseError::InvalidComponent(c.to_string()))
        };
        let chars: Vec<char> = digits.chars().collect();

        let bytes: Vec<u8> = match chars.len() {
            3 | 4 => chars
                .iter()
                .map(|&c| nibble(c).map(|n| n * 17))
                .collect::<Result<_, _>>()?,
            6 | 8 => chars
                .chunks(2)
                .map(|pair| Ok::<u8, ColorParseError>(nibble(pair[0])? * 16 + nibble(pair[1])?))
                .collect::<Result<_, _>>()?,
            _ => return Err(ColorParseError::UnknownFormat(format!("#{digits}"))),
        };

        let alpha = bytes.get(3).map_or(1.0, |&a| a as f32 / 255.0);
        Ok(Self::new(bytes[0], bytes[1], bytes[2], alpha))
    }
}

impl Default for OverlayColor {
    fn default() -> Self {
        DEFAULT_OVERLAY_COLOR
    }
}

impl FromStr for OverlayColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if s.is_empty() {
            return Err(ColorParseError::Empty);
        }

        if let Some(hex) = s.strip_prefix('#') {
            return Self::parse_hex(hex);
        }

        let body = s
            .strip_prefix("rgba(")
            .or_else(|| s.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| ColorParseError::UnknownFormat(s.clone()))?;

        Self::parse_functional(body)
    }
}

impl fmt::Display for OverlayColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rgba({}, {}, {}, {})",
            self.red, self.green, self.blue, self.alpha
        )
    }
}

impl TryFrom<String> for OverlayColor {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OverlayColor> for String {
    fn from(color: OverlayColor) -> Self {
        color.to_string()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Preferences
// ─────────────────────────────────────────────────────────────────────────────

/// Size of the lit area under the pointer, in surface pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LitRegion {
    pub width: u32,
    pub height: u32,
}

impl LitRegion {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A region with a zero dimension lights nothing
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Largest dimension, used to size the gradient and the blur
    pub fn max_dimension(&self) -> u32 {
        self.width.max(self.height)
    }
}

impl Default for LitRegion {
    fn default() -> Self {
        DEFAULT_LIT_REGION
    }
}

/// User preferences for one host.
///
/// Field aliases accept the names used by the first release of the
/// extension (`isON`, `lightbox`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(alias = "isON")]
    pub enabled: bool,
    pub overlay_color: OverlayColor,
    #[serde(alias = "lightbox")]
    pub lit_region: LitRegion,
}

impl Preferences {
    /// Copy with a different on/off state
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl Default for Preferences {
    fn default() -> Self {
        DEFAULT_PREFERENCES
    }
}

pub const DEFAULT_OVERLAY_COLOR: OverlayColor = OverlayColor::new(30, 0, 0, 0.9);
pub const DEFAULT_LIT_REGION: LitRegion = LitRegion::new(800, 800);

/// Used when the store has no entry for a host
pub const DEFAULT_PREFERENCES: Preferences = Preferences {
    enabled: true,
    overlay_color: DEFAULT_OVERLAY_COLOR,
    lit_region: DEFAULT_LIT_REGION,
};
