//! Environment variable utilities
//!
//! Runtime overrides for `FileConfig` are read through these helpers.
//! Unset or unparsable values fall back to the default.
//!
//! ```ignore
//! use gvfile_core::env::{env_get, env_get_bool, env_get_octal};
//!
//! let mode: u32 = env_get_octal("GVF_OPEN_MODE", 0o644);
//! let cloexec = env_get_bool("GVF_CLOEXEC", true);
//! ```

use std::str::FromStr;

/// Parse `key` as `T`, or return `default`.
#[inline]
pub fn env_get<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    env_get_opt(key).unwrap_or(default)
}

/// Boolean flag: "1", "true", "yes", "on" (any case) are true, any other
/// set value is false, unset gives `default`.
#[inline]
pub fn env_get_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => matches!(val.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

/// `Some(T)` if set and parsable.
#[inline]
pub fn env_get_opt<T>(key: &str) -> Option<T>
where
    T: FromStr,
{
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Octal permission bits such as "644" or "0o600".
pub fn env_get_octal(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| parse_octal(&v))
        .unwrap_or(default)
}

fn parse_octal(raw: &str) -> Option<u32> {
    let digits = raw.trim();
    let digits = digits.strip_prefix("0o").unwrap_or(digits);
    u32::from_str_radix(digits, 8).ok()
}
