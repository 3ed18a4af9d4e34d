//! Positioning: seek, tell, size

use gvfile_core::{kdebug, FdWaiter, FileError, FileResult};
use gvfile_runtime::sys;

use crate::file::GvtFile;

impl<W: FdWaiter> GvtFile<W> {
    /// Reposition to absolute `offset` and return it.
    ///
    /// Both buffers are discarded and the end-of-stream flag cleared.
    /// Unflushed output is lost; flush first if it matters. An offset
    /// that cannot be represented is rejected with the channel untouched.
    pub fn seek(&mut self, offset: u64) -> FileResult<u64> {
        sys::to_offset(offset)?;
        self.warn_discard("seek");
        self.input.clear();
        self.output.clear();
        self.eof = false;
        sys::seek_set(self.fd, offset)
    }

    /// Logical read position: the descriptor offset minus read-ahead not
    /// yet returned. Pending output is not counted.
    pub fn tell(&self) -> FileResult<u64> {
        let physical = sys::seek_cur(self.fd)?;
        Ok(physical - self.input.len() as u64)
    }

    /// File length plus pending output. Regular files only.
    ///
    /// Probes the end offset and restores the current one; the buffers are
    /// untouched.
    pub fn size(&self) -> FileResult<u64> {
        if !self.kind.is_regular() {
            kdebug!("fd {}: size unsupported on {} descriptor", self.fd, self.kind);
            return Err(FileError::Unsupported);
        }
        let here = sys::seek_cur(self.fd)?;
        let end = sys::seek_end(self.fd)?;
        sys::seek_set(self.fd, here)?;
        Ok(end + self.output.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_util::{pattern, pipe, TempFile};
    use crate::GvtFile;
    use gvfile_core::{Deadline, FileError};

    use nix::fcntl::OFlag;
    use nix::sys::stat::Mode;

    fn open_rw(tmp: &TempFile) -> GvtFile {
        GvtFile::open(tmp.path(), OFlag::O_RDWR | OFlag::O_CREAT, Mode::from_bits_truncate(0o644)).unwrap()
    }

    #[test]
    fn test_tell_subtracts_read_ahead() {
        let tmp = TempFile::with_contents("tell", &pattern(500));
        let mut f = open_rw(&tmp);

        assert_eq!(f.tell().unwrap(), 0);
        let mut buf = [0u8; 7];
        f.read(&mut buf, Deadline::NONE).unwrap();
        assert_eq!(f.tell().unwrap(), 7);
        f.read(&mut buf, Deadline::NONE).unwrap();
        assert_eq!(f.tell().unwrap(), 14);
    }

    #[test]
    fn test_seek_then_read_lands_at_offset() {
        let data = pattern(300);
        let tmp = TempFile::with_contents("seek-read", &data);
        let mut f = open_rw(&tmp);

        let mut buf = [0u8; 10];
        f.read(&mut buf, Deadline::NONE).unwrap();
        assert_eq!(f.seek(200).unwrap(), 200);
        assert_eq!(f.buffered_input(), 0);
        assert_eq!(f.tell().unwrap(), 200);

        f.read(&mut buf, Deadline::NONE).unwrap();
        assert_eq!(&buf[..], &data[200..210]);
    }

    #[test]
    fn test_size_counts_pending_output() {
        let tmp = TempFile::with_contents("size", b"12345");
        let mut f = open_rw(&tmp);

        assert_eq!(f.size().unwrap(), 5);
        f.seek(5).unwrap();
        f.write(b"678", Deadline::NONE).unwrap();
        assert_eq!(f.size().unwrap(), 8);
        // The probe restored the position.
        assert_eq!(f.tell().unwrap(), 5);

        f.flush(Deadline::NONE).unwrap();
        assert_eq!(f.size().unwrap(), 8);
        assert_eq!(std::fs::read(tmp.path()).unwrap(), b"12345678");
    }

    #[test]
    fn test_seek_discards_pending_output() {
        let tmp = TempFile::new("seek-discard");
        let mut f = open_rw(&tmp);

        f.write(b"gone", Deadline::NONE).unwrap();
        f.seek(0).unwrap();
        assert_eq!(f.pending_output(), 0);
        f.flush(Deadline::NONE).unwrap();
        assert_eq!(f.size().unwrap(), 0);
    }

    #[test]
    fn test_size_unsupported_on_pipe_and_directory() {
        let (r, w) = pipe();
        let f = GvtFile::attach(r).unwrap();
        assert_eq!(f.size(), Err(FileError::Unsupported));
        f.close();
        unsafe { libc::close(w) };

        let dir = GvtFile::open(std::env::temp_dir(), OFlag::O_RDONLY | OFlag::O_DIRECTORY, Mode::empty()).unwrap();
        assert_eq!(dir.size(), Err(FileError::Unsupported));
    }

    #[test]
    fn test_seek_on_pipe_fails_with_espipe() {
        let (r, w) = pipe();
        let mut f = GvtFile::attach(r).unwrap();
        assert_eq!(f.seek(0), Err(FileError::os(libc::ESPIPE)));
        f.close();
        unsafe { libc::close(w) };
    }

    #[test]
    fn test_unrepresentable_offset_leaves_state_intact() {
        let tmp = TempFile::with_contents("seek-huge", b"abcdef");
        let mut f = open_rw(&tmp);

        let mut buf = [0u8; 2];
        f.read(&mut buf, Deadline::NONE).unwrap();
        f.write(b"xy", Deadline::NONE).unwrap();
        let buffered = f.buffered_input();

        let err = f.seek(u64::MAX).unwrap_err();
        assert!(matches!(err, FileError::InvalidArgument(_)));
        assert_eq!(f.buffered_input(), buffered);
        assert_eq!(f.pending_output(), 2);
        assert_eq!(f.tell().unwrap(), 2);
    }
}
