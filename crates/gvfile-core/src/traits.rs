//! Scheduler seam
//!
//! A channel never blocks on its own. When a non-blocking syscall reports
//! EAGAIN it asks an `FdWaiter` to suspend the current task until the
//! descriptor is ready or the deadline passes. A green-thread scheduler
//! parks the task and runs others; `gvfile_runtime::PollWaiter` simply
//! blocks the calling OS thread in poll(2).

use std::os::unix::io::RawFd;

use crate::deadline::Deadline;

/// Readiness class being awaited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interest {
    Readable,
    Writable,
}

/// Outcome of a wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Descriptor became ready for the given direction.
    ///
    /// Error and hangup conditions are reported as ready too; the retried
    /// syscall surfaces the real error.
    Ready(Interest),
    /// Deadline elapsed first
    TimedOut,
}

/// Descriptor readiness and bookkeeping, provided by the scheduler.
///
/// Implementations must only return `Ready` with the interest that was
/// asked for. A channel treats anything else as a fatal bug.
pub trait FdWaiter {
    /// Suspend the current task until `fd` is ready for `interest` or
    /// `deadline` passes.
    fn wait(&self, fd: RawFd, interest: Interest, deadline: Deadline) -> Readiness;

    /// Called once when a channel takes ownership of `fd`.
    fn register(&self, fd: RawFd) {
        let _ = fd;
    }

    /// Called when a channel gives up `fd` (close, detach, drop).
    /// The scheduler must forget any readiness state it holds for it.
    fn unregister(&self, fd: RawFd) {
        let _ = fd;
    }
}

impl<W: FdWaiter + ?Sized> FdWaiter for &W {
    fn wait(&self, fd: RawFd, interest: Interest, deadline: Deadline) -> Readiness {
        (**self).wait(fd, interest, deadline)
    }

    fn register(&self, fd: RawFd) {
        (**self).register(fd)
    }

    fn unregister(&self, fd: RawFd) {
        (**self).unregister(fd)
    }
}
