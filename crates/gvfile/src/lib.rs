//! # gvfile - Buffered descriptor channels for green threads
//!
//! `GvtFile` gives byte-stream semantics (exact-length reads, buffered
//! writes, flush, seek) over a descriptor in non-blocking mode. When the
//! descriptor is not ready the calling task is suspended through an
//! `FdWaiter` instead of blocking the worker thread.
//!
//! ## Quick Start
//!
//! ```ignore
//! use gvfile::{Deadline, GvtFile, Mode, OFlag};
//!
//! let mut f = GvtFile::open("/tmp/data", OFlag::O_RDWR | OFlag::O_CREAT, Mode::from_bits_truncate(0o644))?;
//! f.write(b"hello", Deadline::NONE)?;
//! f.flush(Deadline::NONE)?;
//! f.seek(0)?;
//!
//! let mut buf = [0u8; 5];
//! let n = f.read(&mut buf, Deadline::after_ms(100))?;
//! f.close();
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         GvtFile                             │
//! │   read / read_watermark / write / flush / seek / tell      │
//! │   InputBuffer (read-ahead)     OutputBuffer (write-behind) │
//! └──────────────┬─────────────────────────────┬────────────────┘
//!                │ non-blocking syscall        │ EAGAIN
//!                ▼                             ▼
//!        ┌───────────────┐           ┌────────────────────┐
//!        │  sys (nix)    │           │  FdWaiter          │
//!        │  read/write   │           │  regular: retry    │
//!        │  lseek/fstat  │           │  other: suspend    │
//!        └───────────────┘           └────────────────────┘
//! ```
//!
//! ## Caller contract
//!
//! `seek`, `detach` and drop discard buffered state: unflushed output is
//! lost and read-ahead input (already consumed from the descriptor) is
//! gone. Flush before any of them if the bytes matter.

mod file;
mod read;
mod write;
mod seek;
mod io_impls;

#[cfg(test)]
mod test_util;

pub use file::GvtFile;

// Re-export core types
pub use gvfile_core::{
    Deadline,
    FdKind,
    FdWaiter,
    FileError,
    FileResult,
    Interest,
    Readiness,
};
pub use gvfile_core::constants::BUF_LEN;

// Re-export kprint macros and controls
pub use gvfile_core::{kprintln, kerror, kwarn, kinfo, kdebug, ktrace, fatal_assert};
pub use gvfile_core::kprint::{LogLevel, init as init_logging, set_log_level, set_flush_enabled, set_time_enabled};

// Re-export runtime types
pub use gvfile_runtime::{global_registry, FileConfig, ConfigError, FdRegistry, PollWaiter};

// Open flags and permission bits
pub use nix::fcntl::OFlag;
pub use nix::sys::stat::Mode;
