//! # gs-raster
//!
//! Rasterise PDF, PostScript and EPS documents by driving the Ghostscript
//! executable.
//!
//! All rendering happens inside Ghostscript. This crate only assembles a
//! correct command line from typed options, checks the input is something
//! Ghostscript can read, runs the process and reports whether it succeeded.
//!
//! ## Flow
//!
//! ```text
//! RenderRequest
//!  │
//!  ├─ 1. Locate   find gs on PATH or via GHOSTSCRIPT_PATH (gs-locate)
//!  ├─ 2. Input    sniff the MIME type: pdf / ps / eps only
//!  ├─ 3. Options  resolution, paper size, antialiasing, CIE, device
//!  ├─ 4. Command  fixed-order argv + the quoted render string
//!  └─ 5. Execute  spawn gs, wait, exit code 0 = success
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gs_raster::{AntiAliasing, RenderRequest};
//!
//! let mut gs = RenderRequest::new();
//! gs.set_input_file("document.pdf")?
//!     .set_output_file("page-%02d")
//!     .set_resolution(150, None)
//!     .set_text_antialiasing(AntiAliasing::High);
//!
//! println!("{}", gs.render_string());
//! gs.try_render()?;
//! # Ok::<(), gs_raster::GsError>(())
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `gsraster` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! gs-raster = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod command;
pub mod device;
pub mod error;
pub mod options;
pub mod pipeline;
pub mod request;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use command::{Arg, RenderCommand};
pub use device::{Device, Jpeg, DEVICE_REGISTRY};
pub use error::GsError;
pub use options::{
    AntiAliasing, InvalidAntiAliasing, InvalidResolution, RenderOptions, Resolution,
};
pub use pipeline::execute::{CommandExecutor, ExecOutput, SystemExecutor};
pub use pipeline::input::{MagicSniffer, MimeSniffer, NoSniffer, SUPPORTED_MIME_TYPES};
pub use request::RenderRequest;
