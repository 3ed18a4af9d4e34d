//! Build script for gvfile-core
//!
//! Resolves the channel buffer capacity at compile time:
//! 1. `GVF_FILE_BUFLEN` env var (bytes), if set and valid
//! 2. `large-buffers` feature (64KB)
//! 3. Library default (4KB)
//!
//! Generates OUT_DIR/gvf_buflen.rs with `pub const BUF_LEN: usize`.

use std::env;
use std::fs;
use std::path::Path;

const DEFAULT_BUF_LEN: usize = 4096;
const LARGE_BUF_LEN: usize = 64 * 1024;
const MAX_BUF_LEN: usize = 16 * 1024 * 1024;

fn main() {
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set");
    let dest_path = Path::new(&out_dir).join("gvf_buflen.rs");

    println!("cargo:rerun-if-env-changed=GVF_FILE_BUFLEN");

    let mut buf_len = if env::var("CARGO_FEATURE_LARGE_BUFFERS").is_ok() {
        LARGE_BUF_LEN
    } else {
        DEFAULT_BUF_LEN
    };

    if let Ok(raw) = env::var("GVF_FILE_BUFLEN") {
        match parse_buf_len(&raw) {
            Some(len) => {
                buf_len = len;
                println!("cargo:warning=Using GVF_FILE_BUFLEN={}", len);
            }
            None => {
                println!(
                    "cargo:warning=Ignoring GVF_FILE_BUFLEN={:?} (must be 1..={})",
                    raw, MAX_BUF_LEN
                );
            }
        }
    }

    let output = format!(
        "// Auto-generated by build.rs - do not edit\n\
         pub const BUF_LEN: usize = {};\n",
        buf_len
    );
    fs::write(&dest_path, output).expect("Failed to write gvf_buflen.rs");
}

/// Accepts plain decimal with optional `_` separators.
fn parse_buf_len(raw: &str) -> Option<usize> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != '_').collect();
    let len: usize = cleaned.parse().ok()?;
    if len == 0 || len > MAX_BUF_LEN {
        return None;
    }
    Some(len)
}
