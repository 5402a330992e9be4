use arrayvec::ArrayVec;

/// Room for a couple of complete GridConnect frames.
const CAPACITY: usize = 64;

#[derive(Debug, Default)]
pub(crate) struct Buffer {
    data: ArrayVec<u8, CAPACITY>,
    read_pos: usize,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.len() - self.read_pos
    }

    pub fn consume(&mut self, len: usize) {
        assert!(len <= self.len());
        self.read_pos += len;
    }

    /// Append as many received bytes as fit and return how many were taken.
    /// Non-ASCII bytes are mapped to NUL, which the frame parser treats as
    /// garbage.
    ///
    /// Consumed bytes are reclaimed first. If the buffer is still full, its
    /// contents are a single unterminated frame and are dropped.
    pub fn write(&mut self, bytes: &[u8]) -> usize {
        if bytes.len() > self.data.remaining_capacity() {
            self.compact();
        }
        if self.data.is_full() && !bytes.is_empty() {
            log::warn!("Input buffer overflow, dropping {} bytes", self.len());
            self.clear();
        }
        let len = bytes.len().min(self.data.remaining_capacity());
        for &byte in &bytes[..len] {
            self.data.push(if byte > 0x7f { 0 } else { byte });
        }
        len
    }

    pub fn clear(&mut self) {
        self.data.clear();
        self.read_pos = 0;
    }

    fn compact(&mut self) {
        self.data.drain(..self.read_pos);
        self.read_pos = 0;
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        &self.data[self.read_pos..]
    }
}
