//! Error types for the gs-raster library.
//!
//! Errors fall into two groups that surface at different times:
//!
//! * **Configuration errors** are returned immediately by the setters on
//!   [`crate::RenderRequest`]: an input file of the wrong type
//!   ([`GsError::UnsupportedInput`]) or a device name nobody registered
//!   ([`GsError::UnknownDevice`]).
//!
//! * **Render errors** come out of [`crate::RenderRequest::try_render`]:
//!   nothing to render, no Ghostscript on the host, the process could not be
//!   started, or it exited non-zero. [`crate::RenderRequest::render`] folds
//!   all of these into a plain `false`.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the gs-raster library.
#[derive(Debug, Error)]
pub enum GsError {
    // ── Configuration errors ──────────────────────────────────────────────
    /// The input file was sniffed and its MIME type is not one Ghostscript
    /// can rasterise.
    #[error(
        "The provided file '{path}' seems not to be of a supported MIME type (detected {mime}).\n\
         Supported: application/pdf, application/ps, application/eps"
    )]
    UnsupportedInput { path: PathBuf, mime: String },

    /// The input file could not be read for type detection.
    #[error("Cannot read input file '{path}': {source}")]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A device name did not resolve to a known device.
    #[error("Unknown output device '{name}'. Known devices: {known}")]
    UnknownDevice { name: String, known: String },

    // ── Render errors ─────────────────────────────────────────────────────
    /// `render` was called before an input file was set.
    #[error("No input file set; nothing to render")]
    NoInputFile,

    /// No Ghostscript executable was found or configured.
    #[error(
        "Ghostscript executable not found.\n\
         Install Ghostscript, or set GHOSTSCRIPT_PATH=/path/to/gs to use an existing copy."
    )]
    ToolMissing,

    /// The Ghostscript process could not be started.
    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Ghostscript ran and exited unsuccessfully.
    ///
    /// `code` is `None` when the process was terminated by a signal.
    #[error("Ghostscript exited with {}{}", fmt_code(.code), fmt_stderr(.stderr))]
    SubprocessFailed { code: Option<i32>, stderr: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn fmt_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {c}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

fn fmt_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}
