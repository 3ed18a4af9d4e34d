//! Descriptor syscalls
//!
//! Thin wrappers that classify results the way a channel needs them:
//! EAGAIN/EWOULDBLOCK is a distinct outcome, EINTR is retried in place,
//! everything else is an errno.

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        mod unix;
        pub use unix::*;
    } else {
        compile_error!("gvfile supports unix targets only");
    }
}

/// Outcome of one non-blocking read or write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    /// Moved this many bytes. Zero on read means end-of-stream.
    Done(usize),
    /// EAGAIN / EWOULDBLOCK
    WouldBlock,
    /// Any other errno
    Failed(i32),
}

#[inline]
pub(crate) fn is_would_block(errno: i32) -> bool {
    errno == libc::EAGAIN || errno == libc::EWOULDBLOCK
}
