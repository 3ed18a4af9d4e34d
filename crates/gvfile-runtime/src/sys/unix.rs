//! Unix syscalls via nix and libc

use super::{is_would_block, Transfer};

use gvfile_core::{fatal_assert, FdKind, FileError, FileResult};

use nix::errno::Errno;
use nix::fcntl::{fcntl, FcntlArg, OFlag};
use nix::sys::stat::{fstat, Mode};
use nix::unistd::{lseek, Whence};

use std::os::unix::io::RawFd;
use std::path::Path;

/// Open `path` with `flags | O_NONBLOCK`.
pub fn open_nonblocking(path: &Path, flags: OFlag, mode: Mode) -> FileResult<RawFd> {
    nix::fcntl::open(path, flags | OFlag::O_NONBLOCK, mode)
        .map_err(|e| FileError::os(e as i32))
}

/// Put `fd` into non-blocking mode.
///
/// A failing F_GETFL is treated as "no flags set". A failing F_SETFL
/// means the descriptor is unusable for this adapter and is fatal.
pub fn set_nonblocking(fd: RawFd) {
    let bits = fcntl(fd, FcntlArg::F_GETFL).unwrap_or(0);
    let flags = OFlag::from_bits_truncate(bits) | OFlag::O_NONBLOCK;
    let rc = fcntl(fd, FcntlArg::F_SETFL(flags));
    fatal_assert!(rc.is_ok(), "fcntl(F_SETFL, O_NONBLOCK) on fd {} failed: {:?}", fd, rc);
}

/// Whether O_NONBLOCK is set on `fd`.
pub fn is_nonblocking(fd: RawFd) -> bool {
    fcntl(fd, FcntlArg::F_GETFL)
        .map(|bits| OFlag::from_bits_truncate(bits).contains(OFlag::O_NONBLOCK))
        .unwrap_or(false)
}

/// Classify `fd` from its st_mode.
pub fn classify(fd: RawFd) -> FileResult<FdKind> {
    let st = fstat(fd).map_err(|e| FileError::os(e as i32))?;
    Ok(kind_from_mode(st.st_mode))
}

pub fn kind_from_mode(mode: libc::mode_t) -> FdKind {
    match mode & libc::S_IFMT {
        libc::S_IFREG => FdKind::Regular,
        libc::S_IFDIR => FdKind::Directory,
        _ => FdKind::Other,
    }
}

/// One non-blocking read into `buf`.
pub fn read(fd: RawFd, buf: &mut [u8]) -> Transfer {
    loop {
        let rc = unsafe { libc::read(fd, buf.as_mut_ptr() as *mut libc::c_void, buf.len()) };
        if rc >= 0 {
            return Transfer::Done(rc as usize);
        }
        match classify_errno() {
            Some(t) => return t,
            None => continue,
        }
    }
}

/// One non-blocking write from `buf`.
pub fn write(fd: RawFd, buf: &[u8]) -> Transfer {
    loop {
        let rc = unsafe { libc::write(fd, buf.as_ptr() as *const libc::c_void, buf.len()) };
        if rc >= 0 {
            return Transfer::Done(rc as usize);
        }
        match classify_errno() {
            Some(t) => return t,
            None => continue,
        }
    }
}

/// `None` for EINTR (retry), otherwise the transfer outcome.
fn classify_errno() -> Option<Transfer> {
    let errno = Errno::last() as i32;
    if errno == libc::EINTR {
        None
    } else if is_would_block(errno) {
        Some(Transfer::WouldBlock)
    } else {
        Some(Transfer::Failed(errno))
    }
}

/// Convert an absolute offset to `off_t`, rejecting what does not fit.
pub fn to_offset(offset: u64) -> FileResult<libc::off_t> {
    libc::off_t::try_from(offset).map_err(|_| FileError::InvalidArgument("seek offset exceeds off_t"))
}

/// Reposition to an absolute offset.
pub fn seek_set(fd: RawFd, offset: u64) -> FileResult<u64> {
    seek(fd, to_offset(offset)?, Whence::SeekSet)
}

/// Current physical offset.
pub fn seek_cur(fd: RawFd) -> FileResult<u64> {
    seek(fd, 0, Whence::SeekCur)
}

/// Move to end-of-file, returning its offset.
pub fn seek_end(fd: RawFd) -> FileResult<u64> {
    seek(fd, 0, Whence::SeekEnd)
}

fn seek(fd: RawFd, off: libc::off_t, whence: Whence) -> FileResult<u64> {
    let pos = lseek(fd, off, whence).map_err(|e| FileError::os(e as i32))?;
    Ok(pos as u64)
}

/// close(2). Returns the errno on failure.
pub fn close(fd: RawFd) -> Result<(), i32> {
    nix::unistd::close(fd).map_err(|e| e as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipe_pair() -> (RawFd, RawFd) {
        let mut fds = [0 as RawFd; 2];
        let rc = unsafe { libc::pipe(fds.as_mut_ptr()) };
        assert_eq!(rc, 0);
        (fds[0], fds[1])
    }

    #[test]
    fn test_kind_from_mode() {
        assert_eq!(kind_from_mode(libc::S_IFREG | 0o644), FdKind::Regular);
        assert_eq!(kind_from_mode(libc::S_IFDIR | 0o755), FdKind::Directory);
        assert_eq!(kind_from_mode(libc::S_IFIFO | 0o600), FdKind::Other);
        assert_eq!(kind_from_mode(libc::S_IFCHR), FdKind::Other);
    }

    #[test]
    fn test_empty_pipe_would_block() {
        let (r, w) = pipe_pair();
        assert!(!is_nonblocking(r));
        set_nonblocking(r);
        assert!(is_nonblocking(r));

        let mut buf = [0u8; 8];
        assert_eq!(read(r, &mut buf), Transfer::WouldBlock);

        assert_eq!(write(w, b"abc"), Transfer::Done(3));
        assert_eq!(read(r, &mut buf), Transfer::Done(3));
        assert_eq!(&buf[..3], b"abc");

        close(w).unwrap();
        assert_eq!(read(r, &mut buf), Transfer::Done(0));
        close(r).unwrap();
    }

    #[test]
    fn test_pipe_is_classified_other_and_unseekable() {
        let (r, w) = pipe_pair();
        assert_eq!(classify(r).unwrap(), FdKind::Other);
        assert_eq!(seek_cur(r), Err(FileError::os(libc::ESPIPE)));
        close(r).unwrap();
        close(w).unwrap();
    }

    #[test]
    fn test_bad_fd() {
        let mut buf = [0u8; 1];
        assert_eq!(read(-1, &mut buf), Transfer::Failed(libc::EBADF));
        assert_eq!(close(-1), Err(libc::EBADF));
    }

    #[test]
    fn test_open_missing_path() {
        let err = open_nonblocking(
            Path::new("/nonexistent/gvfile/path"),
            OFlag::O_RDONLY,
            Mode::empty(),
        )
        .unwrap_err();
        assert_eq!(err.errno(), Some(libc::ENOENT));
    }
}
