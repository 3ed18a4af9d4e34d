//! # PollWaiter: poll(2)-backed `FdWaiter`
//!
//! The degenerate scheduler: "suspending the task" means blocking the
//! calling OS thread in poll(2) on one descriptor until it is ready or the
//! deadline passes. Correct for a single task per thread, and what the
//! channel uses when no green-thread scheduler is plugged in.
//!
//! The poll timeout is recomputed from the absolute deadline on every
//! EINTR, so signals do not stretch the wait.

use gvfile_core::{ktrace, kwarn, Deadline, FdWaiter, Interest, Readiness};

use crate::registry::FdRegistry;

use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};

use std::os::unix::io::{BorrowedFd, RawFd};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// Registry shared by every default waiter - lazily initialized
static GLOBAL_REGISTRY: OnceLock<Arc<FdRegistry>> = OnceLock::new();

/// The process-wide descriptor registry.
pub fn global_registry() -> &'static Arc<FdRegistry> {
    GLOBAL_REGISTRY.get_or_init(|| Arc::new(FdRegistry::new()))
}

/// Blocks the current OS thread in poll(2).
///
/// Default waiters all report into `global_registry()`, so two channels
/// claiming one descriptor are caught wherever they were created.
#[derive(Debug, Clone)]
pub struct PollWaiter {
    registry: Arc<FdRegistry>,
}

impl Default for PollWaiter {
    fn default() -> Self {
        Self::with_registry(Arc::clone(global_registry()))
    }
}

impl PollWaiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waiter reporting into an existing registry.
    pub fn with_registry(registry: Arc<FdRegistry>) -> Self {
        Self { registry }
    }

    /// Waiter with a private registry of its own.
    pub fn isolated() -> Self {
        Self::with_registry(Arc::new(FdRegistry::new()))
    }

    pub fn registry(&self) -> &Arc<FdRegistry> {
        &self.registry
    }
}

/// Milliseconds left until the deadline, rounded up so poll never wakes
/// before it. `None` means wait forever.
fn timeout_ms(remaining: Option<Duration>) -> Option<i32> {
    remaining.map(|d| {
        let mut ms = d.as_millis();
        if Duration::from_millis(ms as u64) < d {
            ms += 1;
        }
        i32::try_from(ms).unwrap_or(i32::MAX)
    })
}

fn poll_timeout(remaining: Option<Duration>) -> PollTimeout {
    match timeout_ms(remaining) {
        None => PollTimeout::NONE,
        Some(ms) => PollTimeout::try_from(ms).unwrap_or(PollTimeout::MAX),
    }
}

impl FdWaiter for PollWaiter {
    fn wait(&self, fd: RawFd, interest: Interest, deadline: Deadline) -> Readiness {
        let events = match interest {
            Interest::Readable => PollFlags::POLLIN,
            Interest::Writable => PollFlags::POLLOUT,
        };
        // Safety: the channel owns `fd` for the whole call.
        let borrowed = unsafe { BorrowedFd::borrow_raw(fd) };

        loop {
            let mut fds = [PollFd::new(borrowed, events)];
            let timeout = poll_timeout(deadline.remaining());
            ktrace!("poll fd {} {:?} deadline {:?}", fd, interest, deadline);

            match poll(&mut fds, timeout) {
                Ok(0) => return Readiness::TimedOut,
                Ok(_) => {
                    // POLLERR/POLLHUP/POLLNVAL count as ready: the retried
                    // syscall reports the actual condition.
                    return Readiness::Ready(interest);
                }
                Err(Errno::EINTR) => {
                    if deadline.has_expired() {
                        return Readiness::TimedOut;
                    }
                    continue;
                }
                Err(e) => {
                    kwarn!("poll on fd {} failed: {}", fd, e);
                    return Readiness::Ready(interest);
                }
            }
        }
    }

    fn register(&self, fd: RawFd) {
        self.registry.register(fd);
    }

    fn unregister(&self, fd: RawFd) {
        self.registry.unregister(fd);
    }
}
