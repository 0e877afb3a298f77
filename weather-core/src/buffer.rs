//! Fixed-capacity receive buffer paired with its valid-length count.

use std::io;

/// Reusable byte buffer that tracks how many of its bytes are valid.
///
/// The storage is allocated once; `clear` only resets the count. The valid
/// length never exceeds the capacity.
#[derive(Debug)]
pub struct ResponseBuffer {
    storage: Box<[u8]>,
    len: usize,
}

impl ResponseBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: vec![0; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.storage.len()
    }

    /// The received bytes; nothing past the valid length is exposed.
    pub fn filled(&self) -> &[u8] {
        &self.storage[..self.len]
    }

    /// Space after the valid bytes, for the transport to write into.
    pub fn unfilled_mut(&mut self) -> &mut [u8] {
        &mut self.storage[self.len..]
    }

    /// Marks `n` more bytes as valid after a write into `unfilled_mut`.
    pub fn commit(&mut self, n: usize) -> io::Result<()> {
        let remaining = self.storage.len() - self.len;
        if n > remaining {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("transport reported {n} bytes but only {remaining} were available"),
            ));
        }
        self.len += n;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_tracks_valid_length() {
        let mut buf = ResponseBuffer::with_capacity(8);
        buf.unfilled_mut()[..3].copy_from_slice(b"abc");
        buf.commit(3).unwrap();

        assert_eq!(buf.filled(), b"abc");
        assert_eq!(buf.unfilled_mut().len(), 5);
        assert!(!buf.is_full());
    }

    #[test]
    fn commit_past_capacity_is_rejected() {
        let mut buf = ResponseBuffer::with_capacity(4);
        buf.commit(2).unwrap();

        let err = buf.commit(3).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn clear_keeps_storage() {
        let mut buf = ResponseBuffer::with_capacity(4);
        buf.commit(4).unwrap();
        assert!(buf.is_full());

        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), 4);
    }
}
