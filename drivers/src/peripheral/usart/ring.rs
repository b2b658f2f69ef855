//! Fixed-capacity byte FIFO shared between one ISR and the foreground.

/// Byte ring with explicit head/tail/used accounting.
///
/// `used() + free() == N` at all times.
#[derive(Debug)]
pub struct RingBuffer<const N: usize> {
    buf: [u8; N],
    /// Next slot to fill.
    head: usize,
    /// Next slot to drain.
    tail: usize,
    used: usize,
}

impl<const N: usize> RingBuffer<N> {
    pub const fn new() -> Self {
        Self {
            buf: [0; N],
            head: 0,
            tail: 0,
            used: 0,
        }
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.used = 0;
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn free(&self) -> usize {
        N - self.used
    }

    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    pub fn is_full(&self) -> bool {
        self.used == N
    }

    /// Append one byte; `false` when full.
    pub fn push(&mut self, byte: u8) -> bool {
        if self.is_full() {
            return false;
        }
        self.buf[self.head] = byte;
        self.head = (self.head + 1) % N;
        self.used += 1;
        true
    }

    pub fn pop(&mut self) -> Option<u8> {
        if self.is_empty() {
            return None;
        }
        let byte = self.buf[self.tail];
        self.tail = (self.tail + 1) % N;
        self.used -= 1;
        Some(byte)
    }

    /// Append as many leading bytes of `data` as fit. Returns the count.
    pub fn write_from(&mut self, data: &[u8]) -> usize {
        let count = data.len().min(self.free());
        for &byte in &data[..count] {
            self.buf[self.head] = byte;
            self.head = (self.head + 1) % N;
        }
        self.used += count;
        count
    }

    /// Drain up to `out.len()` bytes into `out`. Returns the count.
    pub fn read_into(&mut self, out: &mut [u8]) -> usize {
        let count = out.len().min(self.used);
        for slot in &mut out[..count] {
            *slot = self.buf[self.tail];
            self.tail = (self.tail + 1) % N;
        }
        self.used -= count;
        count
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
