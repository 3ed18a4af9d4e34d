//! `GvtFile` lifecycle and shared plumbing
//!
//! Construction (open/attach), teardown (close/detach/drop), accessors,
//! and the would-block policy used by every transfer loop.

use gvfile_core::constants::BUF_LEN;
use gvfile_core::{
    fatal_assert, kdebug, kinfo, kwarn, Deadline, FdKind, FdWaiter, FileResult, InputBuffer,
    Interest, OutputBuffer, Readiness,
};
use gvfile_runtime::{sys, FileConfig, PollWaiter};

use nix::fcntl::OFlag;
use nix::sys::stat::Mode;

use std::os::unix::io::RawFd;
use std::path::Path;

/// Buffered channel over one non-blocking descriptor.
///
/// Owns the descriptor until `close`, `detach` or drop. All operations
/// take `&mut self`: a channel serves one task at a time.
pub struct GvtFile<W: FdWaiter = PollWaiter> {
    pub(crate) fd: RawFd,
    /// false once close/detach handed the descriptor off
    owned: bool,
    pub(crate) kind: FdKind,
    pub(crate) input: InputBuffer,
    pub(crate) output: OutputBuffer,
    pub(crate) eof: bool,
    verbose: bool,
    waiter: W,
}

impl GvtFile<PollWaiter> {
    /// Open `path` (O_NONBLOCK is always added) with the default waiter
    /// and env-derived config.
    pub fn open<P: AsRef<Path>>(path: P, flags: OFlag, mode: Mode) -> FileResult<Self> {
        Self::open_with(path, flags, mode, &FileConfig::from_env(), PollWaiter::new())
    }

    /// Create or truncate `path` for writing, using the configured mode.
    pub fn create<P: AsRef<Path>>(path: P) -> FileResult<Self> {
        let config = FileConfig::from_env();
        let mode = Mode::from_bits_truncate(config.open_mode as _);
        Self::open_with(
            path,
            OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
            mode,
            &config,
            PollWaiter::new(),
        )
    }

    /// Adopt `fd` with the default waiter. See `attach_with`.
    pub fn attach(fd: RawFd) -> FileResult<Self> {
        Self::attach_with(fd, &FileConfig::from_env(), PollWaiter::new())
    }
}

impl<W: FdWaiter> GvtFile<W> {
    /// Open `path` with an explicit config and waiter.
    ///
    /// The descriptor is registered with `waiter` before classification;
    /// if fstat or buffer allocation fails it is unregistered and closed
    /// again before the error is returned.
    pub fn open_with<P: AsRef<Path>>(
        path: P,
        flags: OFlag,
        mode: Mode,
        config: &FileConfig,
        waiter: W,
    ) -> FileResult<Self> {
        config.validate()?;
        let flags = if config.cloexec { flags | OFlag::O_CLOEXEC } else { flags };

        let fd = sys::open_nonblocking(path.as_ref(), flags, mode)?;
        waiter.register(fd);

        let setup = sys::classify(fd).and_then(|kind| {
            let (input, output) = alloc_buffers()?;
            Ok((kind, input, output))
        });
        let (kind, input, output) = match setup {
            Ok(parts) => parts,
            Err(e) => {
                waiter.unregister(fd);
                close_logged(fd, "after failed open");
                return Err(e);
            }
        };

        let file = Self {
            fd,
            owned: true,
            kind,
            input,
            output,
            eof: false,
            verbose: config.log_lifecycle,
            waiter,
        };
        file.log_lifecycle(format_args!("opened {} as fd {} ({})", path.as_ref().display(), fd, kind));
        Ok(file)
    }

    /// Adopt a caller-owned descriptor and switch it to non-blocking mode.
    ///
    /// The kind is not queried: it is always `FdKind::Other`, so a
    /// would-block always suspends. On `OutOfMemory` the descriptor is
    /// left open and untouched; the caller still owns it.
    pub fn attach_with(fd: RawFd, config: &FileConfig, waiter: W) -> FileResult<Self> {
        let (input, output) = alloc_buffers()?;
        sys::set_nonblocking(fd);
        waiter.register(fd);

        let file = Self {
            fd,
            owned: true,
            kind: FdKind::Other,
            input,
            output,
            eof: false,
            verbose: config.log_lifecycle,
            waiter,
        };
        file.log_lifecycle(format_args!("attached fd {}", fd));
        Ok(file)
    }

    /// Give the raw descriptor back without closing it.
    ///
    /// Unflushed output is discarded. Buffered read-ahead is lost too:
    /// those bytes were already consumed from the descriptor.
    pub fn detach(mut self) -> RawFd {
        self.warn_discard("detach");
        self.waiter.unregister(self.fd);
        self.owned = false;
        self.log_lifecycle(format_args!("detached fd {}", self.fd));
        self.fd
    }

    /// Unregister and close the descriptor. Pending output is not flushed.
    ///
    /// A failing close means the channel lost track of its descriptor,
    /// which is fatal.
    pub fn close(mut self) {
        self.waiter.unregister(self.fd);
        self.owned = false;
        let rc = sys::close(self.fd);
        fatal_assert!(rc.is_ok(), "close(fd {}) failed: errno {:?}", self.fd, rc.err());
        self.log_lifecycle(format_args!("closed fd {}", self.fd));
    }

    // Accessors

    #[inline]
    pub fn fd(&self) -> RawFd {
        self.fd
    }

    #[inline]
    pub fn kind(&self) -> FdKind {
        self.kind
    }

    /// Sticky end-of-stream flag: set when a read hit a zero-byte result,
    /// cleared only by `seek`.
    #[inline]
    pub fn eof(&self) -> bool {
        self.eof
    }

    /// Read-ahead bytes held but not yet returned to the caller.
    #[inline]
    pub fn buffered_input(&self) -> usize {
        self.input.len()
    }

    /// Written bytes not yet sent to the descriptor.
    #[inline]
    pub fn pending_output(&self) -> usize {
        self.output.len()
    }

    /// Capacity of each of the two buffers.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.output.capacity()
    }

    pub fn waiter(&self) -> &W {
        &self.waiter
    }

    /// Would-block policy. Returns false once the deadline has passed.
    ///
    /// Regular files and directories never suspend; the caller retries
    /// the syscall straight away.
    pub(crate) fn await_ready(&self, interest: Interest, deadline: Deadline) -> bool {
        if self.kind.retries_immediately() {
            return true;
        }
        match self.waiter.wait(self.fd, interest, deadline) {
            Readiness::Ready(got) => {
                fatal_assert!(
                    got == interest,
                    "fd {}: waited for {:?}, woke for {:?}",
                    self.fd,
                    interest,
                    got
                );
                true
            }
            Readiness::TimedOut => false,
        }
    }

    pub(crate) fn warn_discard(&self, op: &str) {
        if !self.output.is_empty() {
            kwarn!("fd {}: {} discarded {} unflushed bytes", self.fd, op, self.output.len());
        }
        if !self.input.is_empty() {
            kdebug!("fd {}: {} dropped {} read-ahead bytes", self.fd, op, self.input.len());
        }
    }

    fn log_lifecycle(&self, args: std::fmt::Arguments<'_>) {
        if self.verbose {
            kinfo!("{}", args);
        } else {
            kdebug!("{}", args);
        }
    }
}

fn alloc_buffers() -> FileResult<(InputBuffer, OutputBuffer)> {
    Ok((InputBuffer::new(BUF_LEN)?, OutputBuffer::new(BUF_LEN)?))
}

/// Close `fd` where a failure can only be reported, not returned.
fn close_logged(fd: RawFd, context: &str) -> bool {
    match sys::close(fd) {
        Ok(()) => true,
        Err(errno) => {
            kwarn!("close(fd {}) {} failed: errno {}", fd, context, errno);
            false
        }
    }
}

impl<W: FdWaiter> Drop for GvtFile<W> {
    fn drop(&mut self) {
        if !self.owned {
            return;
        }
        self.warn_discard("drop");
        self.waiter.unregister(self.fd);
        close_logged(self.fd, "on drop");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{pipe, TempFile};
    use gvfile_core::FileError;
    use gvfile_runtime::global_registry;
    use std::sync::Arc;

    fn rw() -> OFlag {
        OFlag::O_RDWR | OFlag::O_CREAT
    }

    fn mode() -> Mode {
        Mode::from_bits_truncate(0o644)
    }

    #[test]
    fn test_open_missing_file() {
        let err = GvtFile::open("/nonexistent/gvfile/missing", OFlag::O_RDONLY, Mode::empty())
            .err()
            .unwrap();
        assert_eq!(err, FileError::os(libc::ENOENT));
    }

    #[test]
    fn test_open_classifies_regular_file() {
        let tmp = TempFile::new("open-regular");
        let waiter = PollWaiter::isolated();
        let f = GvtFile::open_with(tmp.path(), rw(), mode(), &FileConfig::new(), waiter.clone()).unwrap();

        assert_eq!(f.kind(), FdKind::Regular);
        assert_eq!(f.capacity(), BUF_LEN);
        assert!(!f.eof());
        assert!(waiter.registry().contains(f.fd()));

        f.close();
        assert!(waiter.registry().is_empty());
    }

    #[test]
    fn test_open_classifies_directory() {
        let dir = std::env::temp_dir();
        let f = GvtFile::open(&dir, OFlag::O_RDONLY | OFlag::O_DIRECTORY, Mode::empty()).unwrap();
        assert_eq!(f.kind(), FdKind::Directory);
        assert!(f.kind().retries_immediately());
        f.close();
    }

    #[test]
    fn test_attach_pipe_sets_nonblocking() {
        let (r, w) = pipe();
        let waiter = PollWaiter::isolated();
        let f = GvtFile::attach_with(r, &FileConfig::new(), waiter.clone()).unwrap();

        assert_eq!(f.kind(), FdKind::Other);
        assert!(sys::is_nonblocking(r));
        assert!(waiter.registry().contains(r));

        f.close();
        unsafe { libc::close(w) };
    }

    #[test]
    fn test_detach_returns_open_descriptor() {
        let (r, w) = pipe();
        let waiter = PollWaiter::isolated();
        let f = GvtFile::attach_with(w, &FileConfig::new(), waiter.clone()).unwrap();

        let fd = f.detach();
        assert_eq!(fd, w);
        assert!(waiter.registry().is_empty());
        // Still open: F_GETFD succeeds
        assert!(unsafe { libc::fcntl(fd, libc::F_GETFD) } >= 0);

        unsafe {
            libc::close(r);
            libc::close(w);
        }
    }

    #[test]
    fn test_detach_discards_pending_output() {
        let tmp = TempFile::new("detach-discard");
        let mut f = GvtFile::open(tmp.path(), rw(), mode()).unwrap();
        f.write(b"lost", Deadline::NONE).unwrap();
        assert_eq!(f.pending_output(), 4);

        let fd = f.detach();
        unsafe { libc::close(fd) };
        assert_eq!(std::fs::metadata(tmp.path()).unwrap().len(), 0);
    }

    #[test]
    fn test_drop_closes_descriptor() {
        let (r, w) = pipe();
        let waiter = PollWaiter::isolated();
        {
            let _f = GvtFile::attach_with(w, &FileConfig::new(), waiter.clone()).unwrap();
        }
        assert!(waiter.registry().is_empty());

        // The read side sees end-of-stream once the only writer is gone.
        let mut buf = [0u8; 1];
        let n = unsafe { libc::read(r, buf.as_mut_ptr() as *mut libc::c_void, 1) };
        assert_eq!(n, 0);
        unsafe { libc::close(r) };
    }

    #[test]
    fn test_default_channels_detect_shared_descriptor() {
        let (r, w) = pipe();
        let a = GvtFile::attach(r).unwrap();
        let b = GvtFile::attach(r).unwrap();

        assert!(Arc::ptr_eq(a.waiter().registry(), b.waiter().registry()));
        assert_eq!(global_registry().owners(r), 2);
        assert!(!global_registry().register(r));
        global_registry().unregister(r);

        b.detach();
        assert_eq!(global_registry().owners(r), 1);
        a.close();
        assert!(!global_registry().contains(r));
        unsafe { libc::close(w) };
    }

    #[test]
    fn test_close_logged_reports_failure() {
        let (r, w) = pipe();
        assert!(close_logged(r, "in test"));
        assert!(close_logged(w, "in test"));
        // Invalid descriptor: EBADF is logged, not raised.
        assert!(!close_logged(-1, "in test"));
    }

    #[test]
    fn test_create_truncates() {
        let tmp = TempFile::new("create");
        std::fs::write(tmp.path(), b"old contents").unwrap();

        let mut f = GvtFile::create(tmp.path()).unwrap();
        f.write(b"new", Deadline::NONE).unwrap();
        f.flush(Deadline::NONE).unwrap();
        f.close();

        assert_eq!(std::fs::read(tmp.path()).unwrap(), b"new");
    }

    #[test]
    fn test_invalid_config_rejected_before_open() {
        let tmp = TempFile::new("bad-config");
        let config = FileConfig::new().open_mode(0o77777);
        let err = GvtFile::open_with(tmp.path(), rw(), mode(), &config, PollWaiter::new())
            .err()
            .unwrap();
        assert!(matches!(err, FileError::InvalidArgument(_)));
        assert!(!tmp.path().exists());
    }
}
