//! Fixed-capacity channel buffers
//!
//! Both buffers own a heap block of exactly `capacity` bytes allocated
//! once at channel creation. Allocation goes through `try_reserve_exact`
//! so a failure surfaces as `FileError::OutOfMemory` instead of aborting.
//!
//! ```text
//!  InputBuffer                       OutputBuffer
//!  ┌──────┬────────────┬──────┐      ┌────────────┬──────────────┐
//!  │ used │ live bytes │ free │      │  pending   │     free     │
//!  └──────┴────────────┴──────┘      └────────────┴──────────────┘
//!  0    start     start+len   cap    0           len            cap
//! ```
//!
//! Every cursor mutation is checked against capacity. A violation is a
//! channel bug, not a caller error, so it panics.

use crate::error::{FileError, FileResult};

fn alloc_block(capacity: usize) -> FileResult<Box<[u8]>> {
    let mut v: Vec<u8> = Vec::new();
    v.try_reserve_exact(capacity)
        .map_err(|_| FileError::OutOfMemory)?;
    v.resize(capacity, 0);
    Ok(v.into_boxed_slice())
}

/// Read-ahead buffer: bytes already pulled from the descriptor but not
/// yet handed to the caller.
pub struct InputBuffer {
    data: Box<[u8]>,
    start: usize,
    len: usize,
}

impl InputBuffer {
    pub fn new(capacity: usize) -> FileResult<Self> {
        Ok(Self {
            data: alloc_block(capacity)?,
            start: 0,
            len: 0,
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Number of buffered, unconsumed bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Move up to `dst.len()` buffered bytes into `dst`, oldest first.
    /// Returns the count moved. Empties the buffer when it runs dry.
    pub fn take_into(&mut self, dst: &mut [u8]) -> usize {
        let n = self.len.min(dst.len());
        dst[..n].copy_from_slice(&self.data[self.start..self.start + n]);
        self.advance(n);
        n
    }

    /// Whole backing block, for a refill read.
    ///
    /// Only valid while empty: a refill overwrites from offset 0.
    pub fn refill_slot(&mut self) -> &mut [u8] {
        assert!(self.is_empty(), "input refill over {} live bytes", self.len);
        self.start = 0;
        &mut self.data[..]
    }

    /// Record that a refill read placed `n` bytes at offset 0.
    pub fn set_filled(&mut self, n: usize) {
        assert!(n <= self.capacity(), "input fill {} exceeds capacity {}", n, self.capacity());
        self.start = 0;
        self.len = n;
    }

    /// Drop all buffered bytes.
    #[inline]
    pub fn clear(&mut self) {
        self.start = 0;
        self.len = 0;
    }

    fn advance(&mut self, n: usize) {
        assert!(n <= self.len, "input advance {} past {} live bytes", n, self.len);
        self.len -= n;
        self.start = if self.len == 0 { 0 } else { self.start + n };
        debug_assert!(self.start + self.len <= self.capacity());
    }
}

/// Write-behind buffer: bytes accepted from the caller but not yet sent.
pub struct OutputBuffer {
    data: Box<[u8]>,
    len: usize,
}

impl OutputBuffer {
    pub fn new(capacity: usize) -> FileResult<Self> {
        Ok(Self {
            data: alloc_block(capacity)?,
            len: 0,
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Number of pending bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether `n` more bytes fit without a flush.
    #[inline]
    pub fn fits(&self, n: usize) -> bool {
        n <= self.capacity() - self.len
    }

    /// Append `src`. Caller checks `fits` first.
    pub fn push(&mut self, src: &[u8]) {
        assert!(self.fits(src.len()), "output push {} over {}/{}", src.len(), self.len, self.capacity());
        self.data[self.len..self.len + src.len()].copy_from_slice(src);
        self.len += src.len();
    }

    /// Pending bytes, in submission order.
    #[inline]
    pub fn pending(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Remove the first `n` pending bytes (already sent), keeping the
    /// unsent remainder at the front.
    pub fn consume(&mut self, n: usize) {
        assert!(n <= self.len, "output consume {} past {} pending bytes", n, self.len);
        self.data.copy_within(n..self.len, 0);
        self.len -= n;
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_advances_start() {
        let mut b = InputBuffer::new(8).unwrap();
        b.refill_slot()[..5].copy_from_slice(b"hello");
        b.set_filled(5);

        let mut dst = [0u8; 2];
        assert_eq!(b.take_into(&mut dst), 2);
        assert_eq!(&dst, b"he");
        assert_eq!(b.len(), 3);

        let mut rest = [0u8; 10];
        assert_eq!(b.take_into(&mut rest), 3);
        assert_eq!(&rest[..3], b"llo");
        assert!(b.is_empty());
    }

    #[test]
    #[should_panic]
    fn test_refill_over_live_bytes_panics() {
        let mut b = InputBuffer::new(4).unwrap();
        b.set_filled(1);
        b.refill_slot();
    }

    #[test]
    #[should_panic]
    fn test_fill_past_capacity_panics() {
        let mut b = InputBuffer::new(4).unwrap();
        b.set_filled(5);
    }

    #[test]
    fn test_output_fits_and_consume() {
        let mut o = OutputBuffer::new(8).unwrap();
        assert!(o.fits(8));
        o.push(b"abcdef");
        assert!(o.fits(2));
        assert!(!o.fits(3));

        o.consume(4);
        assert_eq!(o.pending(), b"ef");
        assert!(o.fits(6));

        o.clear();
        assert!(o.is_empty());
    }

    #[test]
    #[should_panic]
    fn test_output_overflow_panics() {
        let mut o = OutputBuffer::new(4).unwrap();
        o.push(b"12345");
    }

    #[test]
    fn test_oversized_allocation_reports_oom() {
        assert_eq!(InputBuffer::new(usize::MAX).err(), Some(FileError::OutOfMemory));
    }
}
