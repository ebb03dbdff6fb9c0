//! The assembled Ghostscript invocation.
//!
//! A [`RenderCommand`] keeps the argument vector in two forms:
//!
//! * [`RenderCommand::argv`]: raw tokens handed to the OS unchanged when
//!   the process is spawned (no shell involved).
//! * `Display`: the render string, one line in the exact layout
//!   Ghostscript users know:
//!
//! ```text
//! gs -dSAFER -dQUIET -dNOPLATFONTS -dNOPAUSE -dBATCH -sPaperSize=letter
//!    -sOutputFile="<out>.<ext>" <device params> -r<res>
//!    [-dTextAlphaBits=n] [-dGraphicsAlphaBits=n] "<in>"
//! ```
//!
//! Paths in the render string are double-quoted with `"`, `$` and `` ` ``
//! escaped, plus `\` outside Windows, so on Unix the line can be pasted into
//! a POSIX shell as-is.

use serde::Serialize;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Flags that open every invocation, in this order.
pub const FIXED_FLAGS: &[&str] = &["-dSAFER", "-dQUIET", "-dNOPLATFONTS", "-dNOPAUSE", "-dBATCH"];

/// One argument token, remembering whether it carries a path that must be
/// quoted in the render string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Arg {
    /// Emitted verbatim.
    Plain { value: String },
    /// `prefix` followed by a path; the path part is quoted.
    Path { prefix: String, path: PathBuf },
}

impl Arg {
    pub fn plain(value: impl Into<String>) -> Self {
        Arg::Plain {
            value: value.into(),
        }
    }

    pub fn path(prefix: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Arg::Path {
            prefix: prefix.into(),
            path: path.into(),
        }
    }

    /// The token as the spawned process receives it.
    pub fn raw(&self) -> String {
        match self {
            Arg::Plain { value } => value.clone(),
            Arg::Path { prefix, path } => format!("{prefix}{}", path.display()),
        }
    }

    /// Like [`Arg::raw`], but keeps non-UTF-8 paths intact.
    pub fn to_os_string(&self) -> OsString {
        match self {
            Arg::Plain { value } => OsString::from(value),
            Arg::Path { prefix, path } => {
                let mut s = OsString::from(prefix);
                s.push(path.as_os_str());
                s
            }
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Plain { value } => f.write_str(value),
            Arg::Path { prefix, path } => write!(f, "{prefix}{}", quote(path)),
        }
    }
}

/// A complete invocation: the Ghostscript executable plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderCommand {
    /// Executable path; `None` when discovery found nothing.
    pub program: Option<PathBuf>,
    pub args: Vec<Arg>,
}

impl RenderCommand {
    pub fn new(program: Option<PathBuf>) -> Self {
        Self {
            program,
            args: Vec::new(),
        }
    }

    pub fn push(&mut self, arg: Arg) -> &mut Self {
        self.args.push(arg);
        self
    }

    /// Raw argv tokens, excluding the program.
    pub fn argv(&self) -> Vec<String> {
        self.args.iter().map(Arg::raw).collect()
    }

    /// Argv tokens for spawning, excluding the program.
    pub fn argv_os(&self) -> Vec<OsString> {
        self.args.iter().map(Arg::to_os_string).collect()
    }

    pub fn program(&self) -> Option<&Path> {
        self.program.as_deref()
    }
}

impl fmt::Display for RenderCommand {
    /// The render string. A missing program leaves an empty leading token.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(p) = &self.program {
            write!(f, "{}", p.display())?;
        }
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Characters escaped with a backslash inside the quotes. On Windows `\\`
/// is the path separator and stays as is.
#[cfg(not(windows))]
const ESCAPED: &[char] = &['"', '\\', '$', '`'];
#[cfg(windows)]
const ESCAPED: &[char] = &['"', '$', '`'];

/// Double-quote a path for the render string.
pub fn quote(path: &Path) -> String {
    let text = path.to_string_lossy();
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        if ESCAPED.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}
