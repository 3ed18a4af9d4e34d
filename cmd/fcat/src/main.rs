//! fcat - concatenate files to stdout through gvfile channels
//!
//! Usage: fcat [FILE]...
//!
//! With no FILE, or when FILE is `-`, reads stdin.
//!
//! # Environment Variables
//!
//! - `GVF_LOG_LEVEL=debug` - Set log level (off, error, warn, info, debug, trace)
//! - `GVF_LOG_LIFECYCLE=1` - Log every open/attach/close at info
//! - `GVF_FLUSH_EPRINT=1` - Flush log output immediately

use gvfile::{init_logging, kerror, kinfo, kwarn, Deadline, FileResult, GvtFile, Mode, OFlag, BUF_LEN};

use nix::fcntl::{fcntl, FcntlArg};

use std::os::unix::io::RawFd;
use std::process::ExitCode;

const STDIN: RawFd = 0;
const STDOUT: RawFd = 1;

/// Puts a descriptor's status flags back on drop.
///
/// stdin/stdout share their open file description with the parent shell;
/// attaching switches it to O_NONBLOCK, which must not outlive fcat.
struct FlagGuard {
    fd: RawFd,
    saved: Option<OFlag>,
}

impl FlagGuard {
    fn save(fd: RawFd) -> Self {
        let saved = fcntl(fd, FcntlArg::F_GETFL).ok().map(OFlag::from_bits_truncate);
        Self { fd, saved }
    }
}

impl Drop for FlagGuard {
    fn drop(&mut self) {
        if let Some(flags) = self.saved {
            if let Err(e) = fcntl(self.fd, FcntlArg::F_SETFL(flags)) {
                kwarn!("restoring flags on fd {}: {}", self.fd, e);
            }
        }
    }
}

// GVF_LOG_LEVEL=debug cargo run -p gvfile-fcat -- Cargo.toml
fn main() -> ExitCode {
    init_logging();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        args.push("-".to_string());
    }

    let _stdout_flags = FlagGuard::save(STDOUT);
    let mut out = match GvtFile::attach(STDOUT) {
        Ok(f) => f,
        Err(e) => {
            kerror!("stdout: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut buf = vec![0u8; BUF_LEN];
    let mut status = ExitCode::SUCCESS;
    for name in &args {
        match copy_one(name, &mut out, &mut buf) {
            Ok(n) => kinfo!("{}: {} bytes", name, n),
            Err(e) => {
                kerror!("{}: {}", name, e);
                status = ExitCode::FAILURE;
            }
        }
    }

    if let Err(e) = out.flush(Deadline::NONE) {
        kerror!("stdout: {}", e);
        status = ExitCode::FAILURE;
    }
    // stdout belongs to the process, not the channel.
    out.detach();
    status
}

fn copy_one(name: &str, out: &mut GvtFile, buf: &mut [u8]) -> FileResult<u64> {
    if name == "-" {
        let _stdin_flags = FlagGuard::save(STDIN);
        let mut input = GvtFile::attach(STDIN)?;
        let copied = pump(&mut input, out, buf);
        input.detach();
        copied
    } else {
        let mut input = GvtFile::open(name, OFlag::O_RDONLY, Mode::empty())?;
        let copied = pump(&mut input, out, buf);
        input.close();
        copied
    }
}

/// Forward whatever arrives, at least one byte at a time, until end-of-stream.
fn pump(input: &mut GvtFile, out: &mut GvtFile, buf: &mut [u8]) -> FileResult<u64> {
    let high = buf.len();
    let mut total = 0u64;
    while !input.eof() {
        let n = input.read_watermark(buf, 1, high, Deadline::NONE)?;
        out.write(&buf[..n], Deadline::NONE)?;
        total += n as u64;
    }
    Ok(total)
}
