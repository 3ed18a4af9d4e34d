//! Shared helpers for channel tests

use gvfile_core::{Deadline, FdWaiter, Interest, Readiness};
use gvfile_runtime::PollWaiter;

use std::cell::Cell;
use std::os::unix::io::RawFd;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

/// Unique path under the temp dir, removed on drop. Not created.
pub struct TempFile {
    path: PathBuf,
}

impl TempFile {
    pub fn new(tag: &str) -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        let name = format!("gvfile-{}-{}-{}", std::process::id(), tag, id);
        Self { path: std::env::temp_dir().join(name) }
    }

    /// Temp file pre-filled with `contents`.
    pub fn with_contents(tag: &str, contents: &[u8]) -> Self {
        let tmp = Self::new(tag);
        std::fs::write(&tmp.path, contents).unwrap();
        tmp
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// (read end, write end), both blocking.
pub fn pipe() -> (RawFd, RawFd) {
    let mut fds = [0 as RawFd; 2];
    let rc = unsafe { libc::pipe(fds.as_mut_ptr()) };
    assert_eq!(rc, 0);
    (fds[0], fds[1])
}

pub fn raw_write(fd: RawFd, data: &[u8]) -> usize {
    let rc = unsafe { libc::write(fd, data.as_ptr() as *const libc::c_void, data.len()) };
    assert!(rc >= 0, "raw write failed");
    rc as usize
}

/// Read everything currently available on a non-blocking fd.
pub fn raw_drain(fd: RawFd) -> Vec<u8> {
    let mut out = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        let rc = unsafe { libc::read(fd, chunk.as_mut_ptr() as *mut libc::c_void, chunk.len()) };
        if rc <= 0 {
            return out;
        }
        out.extend_from_slice(&chunk[..rc as usize]);
    }
}

pub fn set_nonblocking(fd: RawFd) {
    unsafe {
        let flags = libc::fcntl(fd, libc::F_GETFL);
        assert!(libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) == 0);
    }
}

/// Deterministic, non-repeating-at-capacity byte pattern.
pub fn pattern(n: usize) -> Vec<u8> {
    (0..n).map(|i| (i % 251) as u8).collect()
}

/// `PollWaiter` that counts how often a channel suspended.
#[derive(Default)]
pub struct CountingWaiter {
    inner: PollWaiter,
    waits: Cell<usize>,
}

impl CountingWaiter {
    pub fn waits(&self) -> usize {
        self.waits.get()
    }
}

impl FdWaiter for CountingWaiter {
    fn wait(&self, fd: RawFd, interest: Interest, deadline: Deadline) -> Readiness {
        self.waits.set(self.waits.get() + 1);
        self.inner.wait(fd, interest, deadline)
    }

    fn register(&self, fd: RawFd) {
        self.inner.register(fd);
    }

    fn unregister(&self, fd: RawFd) {
        self.inner.unregister(fd);
    }
}
