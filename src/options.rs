//! Rendering options: everything about a conversion except the input file
//! and the collaborators that carry it out.
//!
//! [`RenderOptions`] is plain data. It is what [`crate::RenderRequest`]
//! mutates through its setters, and what the CLI loads from a JSON file with
//! `--options`. Each field's type only admits values Ghostscript accepts, so
//! a deserialised `RenderOptions` is as valid as one built by hand.

use crate::device::Device;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use thiserror::Error;

/// Options for a Ghostscript rasterisation.
///
/// # Example
/// ```rust
/// use gs_raster::{AntiAliasing, Device, RenderOptions, Resolution};
///
/// let options = RenderOptions {
///     resolution: Resolution::new(150),
///     text_antialiasing: AntiAliasing::High,
///     device: Device::from_name("jpeg").unwrap(),
///     ..RenderOptions::default()
/// };
/// assert_eq!(options.papersize, "letter");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Output file name without extension. Default: `"output"`.
    ///
    /// May contain a page placeholder such as `%d` or `%03d`; Ghostscript
    /// substitutes the page number. Relative names are resolved against the
    /// input file's directory.
    pub output_file: String,

    /// Rendering resolution in pixels per inch. Default: 72.
    pub resolution: Resolution,

    /// Ghostscript paper size name, passed through verbatim. Default: `"letter"`.
    pub papersize: String,

    /// Subsample antialiasing for text. Default: none.
    pub text_antialiasing: AntiAliasing,

    /// Subsample antialiasing for graphics. Default: none.
    pub graphics_antialiasing: AntiAliasing,

    /// Use the CIE colour map for CMYK/RGB conversion. Default: false.
    pub use_cie: bool,

    /// Output device. Default: PNG.
    pub device: Device,
}

impl RenderOptions {
    pub const DEFAULT_OUTPUT_FILE: &'static str = "output";
    pub const DEFAULT_PAPERSIZE: &'static str = "letter";
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            output_file: Self::DEFAULT_OUTPUT_FILE.to_string(),
            resolution: Resolution::default(),
            papersize: Self::DEFAULT_PAPERSIZE.to_string(),
            text_antialiasing: AntiAliasing::default(),
            graphics_antialiasing: AntiAliasing::default(),
            use_cie: false,
            device: Device::default(),
        }
    }
}

// ── Antialiasing ─────────────────────────────────────────────────────────

/// Alpha-bit levels Ghostscript understands for `-dTextAlphaBits` and
/// `-dGraphicsAlphaBits`.
///
/// Only 1, 2 and 4 bits exist; 3 is not a valid setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AntiAliasing {
    /// No antialiasing; the flag is omitted entirely. (default)
    #[default]
    None = 0,
    Low = 1,
    Medium = 2,
    High = 4,
}

impl AntiAliasing {
    /// Whether this level adds a flag to the command line.
    pub fn is_set(self) -> bool {
        self > AntiAliasing::None
    }

    pub fn bits(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for AntiAliasing {
    type Error = InvalidAntiAliasing;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(AntiAliasing::None),
            1 => Ok(AntiAliasing::Low),
            2 => Ok(AntiAliasing::Medium),
            4 => Ok(AntiAliasing::High),
            other => Err(InvalidAntiAliasing(other.into())),
        }
    }
}

impl TryFrom<i32> for AntiAliasing {
    type Error = InvalidAntiAliasing;

    fn try_from(level: i32) -> Result<Self, Self::Error> {
        u8::try_from(level)
            .map_err(|_| InvalidAntiAliasing(level.into()))
            .and_then(AntiAliasing::try_from)
    }
}

impl From<AntiAliasing> for u8 {
    fn from(level: AntiAliasing) -> Self {
        level.bits()
    }
}

impl fmt::Display for AntiAliasing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

/// A raw antialiasing level outside `{0, 1, 2, 4}`, as the caller gave it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("antialiasing level must be 0, 1, 2 or 4, got {0}")]
pub struct InvalidAntiAliasing(pub i64);

// ── Resolution ───────────────────────────────────────────────────────────

/// Horizontal and optional vertical resolution, rendered as `"h"` or `"hxv"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub horizontal: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical: Option<u32>,
}

impl Resolution {
    /// Ghostscript's default when `-r` is not given.
    pub const DEFAULT_DPI: u32 = 72;

    /// Same resolution on both axes.
    pub fn new(dpi: u32) -> Self {
        Self {
            horizontal: dpi,
            vertical: None,
        }
    }

    pub fn with_vertical(horizontal: u32, vertical: u32) -> Self {
        Self {
            horizontal,
            vertical: Some(vertical),
        }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DPI)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.vertical {
            Some(v) => write!(f, "{}x{}", self.horizontal, v),
            None => write!(f, "{}", self.horizontal),
        }
    }
}

/// A resolution string that is not `"h"` or `"hxv"` with integer parts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid resolution '{input}', expected e.g. 96 or 96x150: {source}")]
pub struct InvalidResolution {
    pub input: String,
    #[source]
    pub source: ParseIntError,
}

impl FromStr for Resolution {
    type Err = InvalidResolution;

    /// Parse `"96"` or `"96x150"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|source| InvalidResolution {
                    input: s.to_string(),
                    source,
                })
        };
        match s.trim().split_once(['x', 'X']) {
            Some((h, v)) => Ok(Self::with_vertical(parse(h)?, parse(v)?)),
            None => Ok(Self::new(parse(s)?)),
        }
    }
}
