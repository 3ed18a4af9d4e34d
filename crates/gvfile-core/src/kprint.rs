//! Kernel-style print macros for gvfile
//!
//! Leveled, line-atomic stderr output in the spirit of printk. Also home
//! of `fatal_assert!`, used for invariants whose violation means a bug
//! (a failing close, a waiter reporting the wrong direction).
//!
//! # Environment Variables
//!
//! - `GVF_LOG_LEVEL=<level>` - off, error, warn, info, debug, trace (or 0-5)
//! - `GVF_FLUSH_EPRINT=1` - Flush stderr after each line
//! - `GVF_LOG_TIME=1` - Prefix lines with milliseconds since logging init
//!
//! # Usage
//!
//! ```ignore
//! use gvfile_core::{kdebug, kwarn, fatal_assert};
//!
//! kdebug!("fd {} attached", fd);
//! kwarn!("seek dropped {} pending bytes", n);
//! fatal_assert!(rc == 0, "close({}) failed", fd);
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

/// Log levels
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => LogLevel::Off,
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    /// Parse a level name or digit. Unknown strings give `None`.
    pub fn parse(s: &str) -> Option<Self> {
        let level = match s.trim().to_lowercase().as_str() {
            "off" | "0" => LogLevel::Off,
            "error" | "1" => LogLevel::Error,
            "warn" | "2" => LogLevel::Warn,
            "info" | "3" => LogLevel::Info,
            "debug" | "4" => LogLevel::Debug,
            "trace" | "5" => LogLevel::Trace,
            _ => return None,
        };
        Some(level)
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            LogLevel::Off => "",
            LogLevel::Error => "[ERROR]",
            LogLevel::Warn => "[WARN] ",
            LogLevel::Info => "[INFO] ",
            LogLevel::Debug => "[DEBUG]",
            LogLevel::Trace => "[TRACE]",
        }
    }
}

static FLUSH_ENABLED: AtomicBool = AtomicBool::new(false);
static TIME_ENABLED: AtomicBool = AtomicBool::new(false);
static LOG_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);
static INITIALIZED: AtomicBool = AtomicBool::new(false);
static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Initialize logging from environment variables.
///
/// Runs on first log; call it explicitly for a deterministic epoch.
pub fn init() {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }
    EPOCH.get_or_init(Instant::now);

    if let Ok(val) = std::env::var("GVF_FLUSH_EPRINT") {
        FLUSH_ENABLED.store(truthy(&val), Ordering::Relaxed);
    }
    if let Ok(val) = std::env::var("GVF_LOG_TIME") {
        TIME_ENABLED.store(truthy(&val), Ordering::Relaxed);
    }
    if let Ok(val) = std::env::var("GVF_LOG_LEVEL") {
        let level = LogLevel::parse(&val).unwrap_or(LogLevel::Info);
        LOG_LEVEL.store(level as u8, Ordering::Relaxed);
    }
}

fn truthy(val: &str) -> bool {
    matches!(val.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[inline]
fn ensure_init() {
    if !INITIALIZED.load(Ordering::Relaxed) {
        init();
    }
}

#[inline]
pub fn flush_enabled() -> bool {
    ensure_init();
    FLUSH_ENABLED.load(Ordering::Relaxed)
}

#[inline]
pub fn log_level() -> LogLevel {
    ensure_init();
    LogLevel::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

/// Set log level programmatically (overrides GVF_LOG_LEVEL).
pub fn set_log_level(level: LogLevel) {
    ensure_init();
    LOG_LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn set_flush_enabled(enabled: bool) {
    ensure_init();
    FLUSH_ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn set_time_enabled(enabled: bool) {
    ensure_init();
    TIME_ENABLED.store(enabled, Ordering::Relaxed);
}

#[inline]
pub fn level_enabled(level: LogLevel) -> bool {
    level != LogLevel::Off && level <= log_level()
}

fn finish_line(handle: &mut std::io::StderrLock<'_>) {
    let _ = handle.write_all(b"\n");
    if flush_enabled() {
        let _ = handle.flush();
    }
}

#[doc(hidden)]
pub fn _kprintln_impl(args: std::fmt::Arguments<'_>) {
    let mut handle = std::io::stderr().lock();
    let _ = handle.write_fmt(args);
    finish_line(&mut handle);
}

#[doc(hidden)]
pub fn _klog_impl(level: LogLevel, args: std::fmt::Arguments<'_>) {
    if !level_enabled(level) {
        return;
    }
    let mut handle = std::io::stderr().lock();
    if TIME_ENABLED.load(Ordering::Relaxed) {
        let ms = EPOCH.get_or_init(Instant::now).elapsed().as_millis();
        let _ = write!(handle, "{:>8}ms ", ms);
    }
    let _ = write!(handle, "{} gvfile: ", level.prefix());
    let _ = handle.write_fmt(args);
    finish_line(&mut handle);
}

#[doc(hidden)]
pub fn _fatal_impl(args: std::fmt::Arguments<'_>) -> ! {
    {
        let mut handle = std::io::stderr().lock();
        let _ = write!(handle, "{} gvfile: fatal: ", LogLevel::Error.prefix());
        let _ = handle.write_fmt(args);
        let _ = handle.write_all(b"\n");
        let _ = handle.flush();
    }
    std::process::abort()
}

// ============================================================================
// Public Macros
// ============================================================================

/// Print to stderr with newline (unleveled)
#[macro_export]
macro_rules! kprintln {
    () => {{
        $crate::kprint::_kprintln_impl(format_args!(""));
    }};
    ($($arg:tt)*) => {{
        $crate::kprint::_kprintln_impl(format_args!($($arg)*));
    }};
}

#[macro_export]
macro_rules! kerror {
    ($($arg:tt)*) => {{
        $crate::kprint::_klog_impl($crate::kprint::LogLevel::Error, format_args!($($arg)*));
    }};
}

#[macro_export]
macro_rules! kwarn {
    ($($arg:tt)*) => {{
        $crate::kprint::_klog_impl($crate::kprint::LogLevel::Warn, format_args!($($arg)*));
    }};
}

#[macro_export]
macro_rules! kinfo {
    ($($arg:tt)*) => {{
        $crate::kprint::_klog_impl($crate::kprint::LogLevel::Info, format_args!($($arg)*));
    }};
}

#[macro_export]
macro_rules! kdebug {
    ($($arg:tt)*) => {{
        $crate::kprint::_klog_impl($crate::kprint::LogLevel::Debug, format_args!($($arg)*));
    }};
}

#[macro_export]
macro_rules! ktrace {
    ($($arg:tt)*) => {{
        $crate::kprint::_klog_impl($crate::kprint::LogLevel::Trace, format_args!($($arg)*));
    }};
}

/// Abort the process if `cond` is false. Always logs, whatever the level.
#[macro_export]
macro_rules! fatal_assert {
    ($cond:expr $(,)?) => {{
        if !$cond {
            $crate::kprint::_fatal_impl(format_args!("assertion failed: {}", stringify!($cond)));
        }
    }};
    ($cond:expr, $($arg:tt)+) => {{
        if !$cond {
            $crate::kprint::_fatal_impl(format_args!($($arg)+));
        }
    }};
}
