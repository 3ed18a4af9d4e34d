//! Exact-length and watermark reads

use gvfile_core::{ktrace, Deadline, FdWaiter, FileError, FileResult, Interest};
use gvfile_runtime::{sys, Transfer};

use crate::file::GvtFile;

/// Outcome of one non-blocking read attempt.
enum Step {
    Delivered(usize),
    Eof,
    WouldBlock,
    Failed(i32),
}

impl<W: FdWaiter> GvtFile<W> {
    /// One read syscall toward `dst`. Requires an empty input buffer.
    ///
    /// Needs larger than the buffer go straight into `dst`; anything else
    /// refills the buffer and copies out, keeping the surplus buffered.
    fn read_step(&mut self, dst: &mut [u8]) -> Step {
        let transfer = if dst.len() > self.input.capacity() {
            ktrace!("fd {}: direct read of {} bytes", self.fd, dst.len());
            sys::read(self.fd, dst)
        } else {
            match sys::read(self.fd, self.input.refill_slot()) {
                Transfer::Done(n) => {
                    self.input.set_filled(n);
                    Transfer::Done(self.input.take_into(dst))
                }
                other => other,
            }
        };

        match transfer {
            Transfer::Done(0) => {
                self.eof = true;
                Step::Eof
            }
            Transfer::Done(n) => Step::Delivered(n),
            Transfer::WouldBlock => Step::WouldBlock,
            Transfer::Failed(errno) => Step::Failed(errno),
        }
    }

    /// Read exactly `buf.len()` bytes unless end-of-stream or the deadline
    /// cuts it short.
    ///
    /// A short `Ok(n)` means end-of-stream; `eof()` is then set. On
    /// timeout or error the first `transferred()` bytes of `buf` hold the
    /// data received so far.
    pub fn read(&mut self, buf: &mut [u8], deadline: Deadline) -> FileResult<usize> {
        if self.input.len() >= buf.len() {
            return Ok(self.input.take_into(buf));
        }

        let mut pos = self.input.take_into(buf);
        while pos < buf.len() {
            match self.read_step(&mut buf[pos..]) {
                Step::Delivered(n) => pos += n,
                Step::Eof => break,
                Step::WouldBlock => {
                    if !self.await_ready(Interest::Readable, deadline) {
                        return Err(FileError::TimedOut { transferred: pos });
                    }
                }
                Step::Failed(errno) => {
                    return Err(FileError::Os { errno, transferred: pos });
                }
            }
        }
        Ok(pos)
    }

    /// Read between `low` and `high` bytes into `buf[..high]`.
    ///
    /// Never returns more than `high`; bytes read past it stay buffered
    /// for the next call. Fewer than `low` only on end-of-stream (short
    /// `Ok`) or timeout. Rejects `low > high` and `high > buf.len()`
    /// without touching the channel.
    pub fn read_watermark(
        &mut self,
        buf: &mut [u8],
        low: usize,
        high: usize,
        deadline: Deadline,
    ) -> FileResult<usize> {
        if low > high {
            return Err(FileError::InvalidArgument("low watermark above high watermark"));
        }
        if high > buf.len() {
            return Err(FileError::InvalidArgument("high watermark exceeds buffer length"));
        }

        let buffered = self.input.len();
        if buffered >= low {
            // Covers both the in-range and the above-high case.
            return Ok(self.input.take_into(&mut buf[..high]));
        }

        let mut received = self.input.take_into(&mut buf[..high]);
        while received < low {
            match self.read_step(&mut buf[received..high]) {
                Step::Delivered(n) => received += n,
                Step::Eof => break,
                Step::WouldBlock => {
                    if !self.await_ready(Interest::Readable, deadline) {
                        return Err(FileError::TimedOut { transferred: received });
                    }
                }
                Step::Failed(errno) => {
                    return Err(FileError::Os { errno, transferred: received });
                }
            }
        }
        Ok(received)
    }
}
