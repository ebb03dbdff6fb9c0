//! # gs-locate
//!
//! Find the [Ghostscript](https://ghostscript.com/) executable on the host,
//! the way `which gs` would, so callers never have to hard-code an install
//! location.
//!
//! ## Resolution order
//!
//! 1. `GHOSTSCRIPT_PATH` — an explicit path to the executable. When set it
//!    must name an existing file; a dangling override is reported as
//!    [`LocateError::OverrideMissing`] rather than silently ignored.
//! 2. Every directory of `PATH`, in order, probing the platform's
//!    executable names (see [`CANDIDATE_NAMES`]).
//!
//! The first match is returned as an absolute path. Nothing is cached: the
//! caller decides how long a resolved path stays valid.
//!
//! ```rust,no_run
//! match gs_locate::locate() {
//!     Ok(Some(path)) => println!("ghostscript at {}", path.display()),
//!     Ok(None) => eprintln!("ghostscript not installed"),
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use thiserror::Error;

// ── Public constants ─────────────────────────────────────────────────────────

/// Environment variable naming an explicit Ghostscript executable.
pub const ENV_OVERRIDE: &str = "GHOSTSCRIPT_PATH";

/// Executable names probed in each `PATH` directory, in priority order.
#[cfg(windows)]
pub const CANDIDATE_NAMES: &[&str] = &["gswin64c.exe", "gswin32c.exe", "gs.exe"];

/// Executable names probed in each `PATH` directory, in priority order.
#[cfg(not(windows))]
pub const CANDIDATE_NAMES: &[&str] = &["gs"];

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned by gs-locate operations.
#[derive(Error, Debug)]
pub enum LocateError {
    /// `GHOSTSCRIPT_PATH` is set but does not point at a file.
    #[error("{var} is set to '{path}', but no file exists there")]
    OverrideMissing { var: &'static str, path: PathBuf },

    /// The current working directory could not be read while absolutising a
    /// relative match.
    #[error("Cannot resolve relative path '{path}': {source}")]
    Absolutise {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ── Public API ───────────────────────────────────────────────────────────────

/// Locate Ghostscript using the process environment.
///
/// Returns `Ok(None)` when no override is set and nothing on `PATH` matches.
pub fn locate() -> Result<Option<PathBuf>, LocateError> {
    let override_path = std::env::var_os(ENV_OVERRIDE);
    let path_var = std::env::var_os("PATH");
    locate_from(override_path.as_deref(), path_var.as_deref())
}

/// Locate Ghostscript from explicit inputs instead of the environment.
///
/// `override_path` plays the role of `GHOSTSCRIPT_PATH`, `path_var` the role
/// of `PATH`. An empty override counts as unset.
pub fn locate_from(
    override_path: Option<&OsStr>,
    path_var: Option<&OsStr>,
) -> Result<Option<PathBuf>, LocateError> {
    if let Some(raw) = override_path.filter(|p| !p.is_empty()) {
        let p = PathBuf::from(raw);
        if !p.is_file() {
            return Err(LocateError::OverrideMissing {
                var: ENV_OVERRIDE,
                path: p,
            });
        }
        return absolutise(p).map(Some);
    }

    match path_var.and_then(|dirs| search_path(dirs, CANDIDATE_NAMES)) {
        Some(found) => absolutise(found).map(Some),
        None => Ok(None),
    }
}

/// Search the directories of a `PATH`-style list for the first executable
/// matching one of `names`.
///
/// Names are tried in order within each directory, so an earlier directory
/// always wins over a better-ranked name in a later one.
pub fn search_path(path_var: &OsStr, names: &[&str]) -> Option<PathBuf> {
    std::env::split_paths(path_var)
        .filter(|dir| !dir.as_os_str().is_empty())
        .find_map(|dir| {
            names
                .iter()
                .map(|name| dir.join(name))
                .find(|candidate| is_executable(candidate))
        })
}

// ── Internal helpers ─────────────────────────────────────────────────────────

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

fn absolutise(path: PathBuf) -> Result<PathBuf, LocateError> {
    if path.is_absolute() {
        return Ok(path);
    }
    std::path::absolute(&path).map_err(|source| LocateError::Absolutise { path, source })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
