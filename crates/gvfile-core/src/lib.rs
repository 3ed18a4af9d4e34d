//! # gvfile-core
//!
//! Core types for gvfile buffered descriptor channels.
//!
//! This crate contains no syscalls. Everything that touches a descriptor
//! lives in `gvfile-runtime`.
//!
//! ## Modules
//!
//! - `buffer` - Fixed-capacity input/output buffers with validated cursors
//! - `deadline` - Absolute deadlines for suspending operations
//! - `kind` - Descriptor classification (regular file, directory, other)
//! - `traits` - The `FdWaiter` seam to the cooperative scheduler
//! - `error` - Error types
//! - `kprint` - Kernel-style debug printing macros
//! - `env` - Environment variable utilities

pub mod buffer;
pub mod deadline;
pub mod kind;
pub mod traits;
pub mod error;
pub mod kprint;
pub mod env;

// Re-exports for convenience
pub use buffer::{InputBuffer, OutputBuffer};
pub use deadline::Deadline;
pub use kind::FdKind;
pub use traits::{FdWaiter, Interest, Readiness};
pub use error::{FileError, FileResult};
pub use env::{env_get, env_get_bool, env_get_octal, env_get_opt};

/// Build-time constants
pub mod constants {
    // BUF_LEN: capacity shared by the input and output buffer of every
    // channel. Resolved by build.rs (GVF_FILE_BUFLEN / large-buffers).
    include!(concat!(env!("OUT_DIR"), "/gvf_buflen.rs"));
}
