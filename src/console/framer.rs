//! Byte-stream to command-line framing.
//!
//! [`LineFramer`] accumulates printable bytes into a bounded buffer and
//! yields one line per line-feed. Carriage returns are dropped, backspace
//! and delete erase the last buffered byte, and other control bytes are
//! ignored. When the buffer is full further printable bytes are discarded
//! until the next line-feed.

/// Default accumulation capacity in bytes.
pub const DEFAULT_CAPACITY: usize = 128;

const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7F;

/// Bounded line accumulator for one session.
#[derive(Debug, Clone)]
pub struct LineFramer {
    buffer: Vec<u8>,
    capacity: usize,
}

impl LineFramer {
    /// Creates a framer holding at most `capacity` bytes per line.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Feeds one byte. Returns the completed, trimmed line on line-feed.
    ///
    /// Every line-feed yields exactly one line, possibly empty, and leaves
    /// the buffer empty.
    pub fn push(&mut self, byte: u8) -> Option<String> {
        match byte {
            b'\r' => None,
            b'\n' => {
                let line = String::from_utf8_lossy(&self.buffer).trim().to_string();
                self.buffer.clear();
                Some(line)
            }
            BACKSPACE | DELETE => {
                self.buffer.pop();
                None
            }
            b' '..=b'~' if self.buffer.len() < self.capacity => {
                self.buffer.push(byte);
                None
            }
            _ => None,
        }
    }

    /// Feeds a chunk of bytes, returning every line it completes.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        bytes.iter().filter_map(|b| self.push(*b)).collect()
    }

    /// Discards any partially accumulated input.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Number of bytes currently buffered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` if nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Maximum bytes held per line.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
