//! Error types for gvfile channels
//!
//! Every transfer error carries the number of bytes that were moved
//! before the operation stopped, so a caller never loses count of data
//! that already reached (or left) the descriptor.

use core::fmt;
use std::io;

/// Result type for channel operations
pub type FileResult<T> = Result<T, FileError>;

/// Errors that can occur in channel operations
///
/// Would-block never appears here: it is absorbed by the channel and
/// turned into a retry or a suspension. End-of-stream is not an error
/// either; it shows up as a short `Ok(n)` plus the channel's eof flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileError {
    /// Deadline elapsed before the requested amount completed
    TimedOut { transferred: usize },

    /// A syscall failed with something other than EAGAIN/EWOULDBLOCK
    Os { errno: i32, transferred: usize },

    /// Buffer allocation failed during open/attach
    OutOfMemory,

    /// Operation not meaningful for this descriptor kind
    Unsupported,

    /// Caller passed arguments that violate an operation's preconditions
    InvalidArgument(&'static str),
}

impl FileError {
    /// OS error with no bytes transferred.
    #[inline]
    pub fn os(errno: i32) -> Self {
        FileError::Os { errno, transferred: 0 }
    }

    /// Bytes moved before the error. Zero for non-transfer errors.
    #[inline]
    pub fn transferred(&self) -> usize {
        match self {
            FileError::TimedOut { transferred } => *transferred,
            FileError::Os { transferred, .. } => *transferred,
            _ => 0,
        }
    }

    /// Same error, with the partial-progress count replaced.
    ///
    /// Used when an inner operation's progress does not count toward the
    /// caller's request (a failed flush inside `write`).
    pub fn with_transferred(self, n: usize) -> Self {
        match self {
            FileError::TimedOut { .. } => FileError::TimedOut { transferred: n },
            FileError::Os { errno, .. } => FileError::Os { errno, transferred: n },
            other => other,
        }
    }

    /// Raw errno for OS errors.
    pub fn errno(&self) -> Option<i32> {
        match self {
            FileError::Os { errno, .. } => Some(*errno),
            _ => None,
        }
    }

    #[inline]
    pub fn is_timeout(&self) -> bool {
        matches!(self, FileError::TimedOut { .. })
    }
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::TimedOut { transferred } => {
                write!(f, "operation timed out after {} bytes", transferred)
            }
            FileError::Os { errno, transferred } => {
                write!(f, "OS error: errno {}", errno)?;
                if *transferred > 0 {
                    write!(f, " after {} bytes", transferred)?;
                }
                Ok(())
            }
            FileError::OutOfMemory => write!(f, "out of memory allocating channel buffers"),
            FileError::Unsupported => write!(f, "operation not supported for this descriptor"),
            FileError::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
        }
    }
}

impl std::error::Error for FileError {}

impl From<FileError> for io::Error {
    fn from(e: FileError) -> Self {
        match e {
            FileError::Os { errno, .. } => io::Error::from_raw_os_error(errno),
            FileError::TimedOut { .. } => io::Error::new(io::ErrorKind::TimedOut, e),
            FileError::OutOfMemory => io::Error::new(io::ErrorKind::OutOfMemory, e),
            FileError::Unsupported => io::Error::new(io::ErrorKind::Unsupported, e),
            FileError::InvalidArgument(_) => io::Error::new(io::ErrorKind::InvalidInput, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Same value on every unix target.
    const ENOENT: i32 = 2;

    #[test]
    fn test_error_display() {
        let e = FileError::TimedOut { transferred: 12 };
        assert_eq!(format!("{}", e), "operation timed out after 12 bytes");

        let e = FileError::os(2);
        assert_eq!(format!("{}", e), "OS error: errno 2");

        let e = FileError::Os { errno: 32, transferred: 7 };
        assert_eq!(format!("{}", e), "OS error: errno 32 after 7 bytes");
    }

    #[test]
    fn test_transferred_accounting() {
        assert_eq!(FileError::TimedOut { transferred: 5 }.transferred(), 5);
        assert_eq!(FileError::Unsupported.transferred(), 0);

        let e = FileError::Os { errno: 5, transferred: 100 }.with_transferred(0);
        assert_eq!(e, FileError::Os { errno: 5, transferred: 0 });

        // Non-transfer errors pass through unchanged
        assert_eq!(FileError::OutOfMemory.with_transferred(9), FileError::OutOfMemory);
    }

    #[test]
    fn test_io_conversion() {
        let io_err: io::Error = FileError::TimedOut { transferred: 0 }.into();
        assert_eq!(io_err.kind(), io::ErrorKind::TimedOut);

        let io_err: io::Error = FileError::os(ENOENT).into();
        assert_eq!(io_err.raw_os_error(), Some(ENOENT));

        let io_err: io::Error = FileError::InvalidArgument("low > high").into();
        assert_eq!(io_err.kind(), io::ErrorKind::InvalidInput);
    }
}
