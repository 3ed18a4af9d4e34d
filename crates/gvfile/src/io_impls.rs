//! `std::io` adapters
//!
//! Plain blocking semantics: no deadline. The inherent methods share names
//! with the trait methods and win method resolution, so reach these through
//! generic code, `io::copy`, or fully qualified calls such as
//! `io::Read::read(&mut file, buf)`.

use gvfile_core::{Deadline, FdWaiter};

use crate::file::GvtFile;

use std::io::{self, Read, Seek, SeekFrom, Write};

impl<W: FdWaiter> Read for GvtFile<W> {
    /// At least one byte unless at end-of-stream.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let len = buf.len();
        Ok(Self::read_watermark(self, buf, 1, len, Deadline::NONE)?)
    }
}

impl<W: FdWaiter> Write for GvtFile<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(Self::write(self, buf, Deadline::NONE)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(Self::flush(self, Deadline::NONE)?)
    }
}

impl<W: FdWaiter> Seek for GvtFile<W> {
    /// Pending output is flushed before repositioning.
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        Self::flush(self, Deadline::NONE)?;
        let target = match pos {
            SeekFrom::Start(n) => Some(n),
            SeekFrom::Current(delta) => self.tell()?.checked_add_signed(delta),
            SeekFrom::End(delta) => self.size()?.checked_add_signed(delta),
        };
        let target = target.ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "seek to a negative or overflowing position")
        })?;
        Ok(Self::seek(self, target)?)
    }
}
