//! Output devices: the raster format Ghostscript writes.
//!
//! A [`Device`] contributes two things to the command line: the file ending
//! appended to the output name, and the device-specific flags that select
//! the Ghostscript driver (plus its knobs, such as JPEG quality).
//!
//! Devices form a closed enum. Name-based construction goes through
//! [`DEVICE_REGISTRY`], an explicit table of `(name, constructor)` pairs, so
//! adding a variant means adding one row there.

use crate::error::GsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An output raster format and its format-specific parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Device {
    /// 24-bit colour PNG (`png16m`).
    #[default]
    Png,
    /// Baseline colour JPEG.
    Jpeg(Jpeg),
}

/// Name-to-constructor table used by [`Device::from_name`].
///
/// Names are matched case-insensitively. Several names may share a
/// constructor.
pub const DEVICE_REGISTRY: &[(&str, fn() -> Device)] = &[
    ("png", || Device::Png),
    ("jpeg", || Device::Jpeg(Jpeg::default())),
    ("jpg", || Device::Jpeg(Jpeg::default())),
];

impl Device {
    /// Look up a device by name and default-construct it.
    ///
    /// # Errors
    /// [`GsError::UnknownDevice`] if no registry entry matches.
    pub fn from_name(name: &str) -> Result<Self, GsError> {
        let wanted = name.trim();
        DEVICE_REGISTRY
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(wanted))
            .map(|(_, make)| make())
            .ok_or_else(|| GsError::UnknownDevice {
                name: name.to_string(),
                known: known_names(),
            })
    }

    /// Extension appended to the output file name, without the dot.
    pub fn file_ending(&self) -> &'static str {
        match self {
            Device::Png => "png",
            Device::Jpeg(_) => "jpeg",
        }
    }

    /// Device-specific argument tokens, in command-line order.
    pub fn parameters(&self) -> Vec<String> {
        match self {
            Device::Png => vec!["-sDEVICE=png16m".to_string()],
            Device::Jpeg(j) => vec![
                "-sDEVICE=jpeg".to_string(),
                format!("-dJPEGQ={}", j.quality()),
            ],
        }
    }

    /// The device fragment as it appears in the render string: every
    /// parameter preceded by a single space.
    pub fn parameter_string(&self) -> String {
        self.parameters()
            .iter()
            .map(|p| format!(" {p}"))
            .collect()
    }

    /// Borrow the JPEG settings, if this is a JPEG device.
    pub fn as_jpeg_mut(&mut self) -> Option<&mut Jpeg> {
        match self {
            Device::Jpeg(j) => Some(j),
            _ => None,
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_ending())
    }
}

impl FromStr for Device {
    type Err = GsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Device::from_name(s)
    }
}

impl From<Jpeg> for Device {
    fn from(j: Jpeg) -> Self {
        Device::Jpeg(j)
    }
}

fn known_names() -> String {
    DEVICE_REGISTRY
        .iter()
        .map(|(n, _)| *n)
        .collect::<Vec<_>>()
        .join(", ")
}

// ── JPEG settings ────────────────────────────────────────────────────────

/// JPEG output with a quality setting in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jpeg {
    #[serde(default = "Jpeg::default_quality", deserialize_with = "de_quality")]
    quality: u8,
}

impl Jpeg {
    /// Highest accepted quality.
    pub const MAX_QUALITY: u8 = 100;

    /// Ghostscript's own default for `-dJPEGQ`.
    pub const DEFAULT_QUALITY: u8 = 75;

    fn default_quality() -> u8 {
        Self::DEFAULT_QUALITY
    }

    /// A JPEG device with the given quality, clamped to `0..=100`.
    pub fn with_quality(quality: u32) -> Self {
        let mut j = Self::default();
        j.set_quality(quality);
        j
    }

    /// Set the quality. Values above 100 are clamped to 100.
    pub fn set_quality(&mut self, quality: u32) -> &mut Self {
        self.quality = quality.min(u32::from(Self::MAX_QUALITY)) as u8;
        self
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }
}

impl Default for Jpeg {
    fn default() -> Self {
        Self {
            quality: Self::DEFAULT_QUALITY,
        }
    }
}

fn de_quality<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = u32::deserialize(deserializer)?;
    Ok(Jpeg::with_quality(raw).quality)
}
