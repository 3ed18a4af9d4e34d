//! Descriptor classification
//!
//! Captured once when a channel is opened. Regular files and directories
//! are always "ready" as far as poll/epoll are concerned, so waiting on
//! them is pointless; a would-block on those is retried immediately.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FdKind {
    /// S_IFREG
    Regular,
    /// S_IFDIR
    Directory,
    /// Pipe, socket, character device, or not classified (attach)
    Other,
}

impl FdKind {
    /// Whether a would-block is retried without suspending.
    #[inline]
    pub fn retries_immediately(self) -> bool {
        matches!(self, FdKind::Regular | FdKind::Directory)
    }

    /// Whether the size query is supported.
    #[inline]
    pub fn is_regular(self) -> bool {
        self == FdKind::Regular
    }
}

impl Default for FdKind {
    fn default() -> Self {
        FdKind::Other
    }
}

impl fmt::Display for FdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FdKind::Regular => write!(f, "regular"),
            FdKind::Directory => write!(f, "directory"),
            FdKind::Other => write!(f, "other"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy() {
        assert!(FdKind::Regular.retries_immediately());
        assert!(FdKind::Directory.retries_immediately());
        assert!(!FdKind::Other.retries_immediately());
    }

    #[test]
    fn test_only_regular_has_size() {
        assert!(FdKind::Regular.is_regular());
        assert!(!FdKind::Directory.is_regular());
        assert!(!FdKind::default().is_regular());
    }
}
