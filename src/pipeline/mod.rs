//! Collaborators at the edges of a render.
//!
//! The request itself is pure configuration; these modules are where it
//! touches the host:
//!
//! ```text
//! set_input_file ──▶ input (sniff MIME type)
//! render         ──▶ execute (spawn Ghostscript, wait, collect exit code)
//! ```
//!
//! 1. [`input`]: decide whether a file is PDF / PostScript / EPS
//! 2. [`execute`]: run the command synchronously; the only stage that
//!    spawns a process
//!
//! Both are traits with a default implementation, so tests and embedders
//! can substitute their own.

pub mod execute;
pub mod input;
