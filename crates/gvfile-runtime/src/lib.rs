//! # gvfile-runtime
//!
//! Platform-specific half of gvfile.
//!
//! This crate provides:
//! - Raw descriptor syscalls with EAGAIN classified (`sys`)
//! - `PollWaiter`, the default `FdWaiter` that blocks the OS thread in poll(2)
//! - `FdRegistry`, bookkeeping of descriptors owned by channels
//! - `FileConfig`, runtime configuration with env overrides

pub mod config;
pub mod sys;
pub mod poll;
pub mod registry;

// Re-exports
pub use config::{ConfigError, FileConfig};
pub use poll::{global_registry, PollWaiter};
pub use registry::FdRegistry;
pub use sys::Transfer;
