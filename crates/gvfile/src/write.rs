//! Buffered writes and flush

use gvfile_core::{ktrace, Deadline, FdWaiter, FileError, FileResult, Interest};
use gvfile_runtime::{sys, Transfer};

use crate::file::GvtFile;

impl<W: FdWaiter> GvtFile<W> {
    /// Accept all of `data` or fail.
    ///
    /// Data that fits in the output buffer is only copied there. Otherwise
    /// the buffer is flushed first, and if it still does not fit the bytes
    /// go straight to the descriptor. If that pre-flush fails the error
    /// reports 0 bytes transferred: none of `data` was taken.
    pub fn write(&mut self, data: &[u8], deadline: Deadline) -> FileResult<usize> {
        if self.output.fits(data.len()) {
            self.output.push(data);
            return Ok(data.len());
        }

        self.flush(deadline).map_err(|e| e.with_transferred(0))?;

        if self.output.fits(data.len()) {
            self.output.push(data);
            return Ok(data.len());
        }

        ktrace!("fd {}: direct write of {} bytes", self.fd, data.len());
        let mut sent = 0;
        while sent < data.len() {
            match sys::write(self.fd, &data[sent..]) {
                Transfer::Done(n) => sent += n,
                Transfer::WouldBlock => {
                    if !self.await_ready(Interest::Writable, deadline) {
                        return Err(FileError::TimedOut { transferred: sent });
                    }
                }
                Transfer::Failed(errno) => {
                    return Err(FileError::Os { errno, transferred: sent });
                }
            }
        }
        Ok(sent)
    }

    /// Send every pending byte to the descriptor.
    ///
    /// An empty buffer is a no-op. If interrupted, the error carries the
    /// bytes sent and exactly the unsent tail stays pending for the next
    /// flush.
    pub fn flush(&mut self, deadline: Deadline) -> FileResult<()> {
        if self.output.is_empty() {
            return Ok(());
        }

        let total = self.output.len();
        let mut sent = 0;
        while sent < total {
            let failure = match sys::write(self.fd, &self.output.pending()[sent..]) {
                Transfer::Done(n) => {
                    sent += n;
                    continue;
                }
                Transfer::WouldBlock => {
                    if self.await_ready(Interest::Writable, deadline) {
                        continue;
                    }
                    FileError::TimedOut { transferred: sent }
                }
                Transfer::Failed(errno) => FileError::Os { errno, transferred: sent },
            };
            self.output.consume(sent);
            return Err(failure);
        }

        self.output.clear();
        ktrace!("fd {}: flushed {} bytes", self.fd, total);
        Ok(())
    }
}
