// Output Buffer - append-only byte container owned by one Command

/// Append-only growable byte buffer.
///
/// Capacity doubles whenever the next append would not fit, so a long-running
/// command reallocates O(log n) times rather than once per chunk.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    data: Vec<u8>,
}

impl OutputBuffer {
    /// Create a buffer with `capacity` bytes reserved up front
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Append `bytes` to the end of the buffer
    pub fn append(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }

        let needed = self.data.len() + bytes.len();
        if needed > self.data.capacity() {
            let mut target = self.data.capacity().max(1);
            while target < needed {
                target = target.saturating_mul(2);
            }
            self.data.reserve_exact(target - self.data.len());
        }

        self.data.extend_from_slice(bytes);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Drop the contents and give the allocation back
    pub fn free(&mut self) {
        self.data = Vec::new();
    }
}
