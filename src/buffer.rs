//! Growable response buffer
//!
//! The transport feeds received data into a [`ResponseBuffer`] one chunk at a
//! time. Growth uses `try_reserve` so an allocation failure aborts collection
//! instead of taking the process down.

use std::collections::TryReserveError;

/// Accumulates a response body chunk by chunk
#[derive(Debug, Default)]
pub struct ResponseBuffer {
    data: Vec<u8>,
}

impl ResponseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a received chunk, growing the buffer as needed
    pub fn append(&mut self, chunk: &[u8]) -> Result<(), TryReserveError> {
        self.data.try_reserve(chunk.len())?;
        self.data.extend_from_slice(chunk);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Hand the collected bytes to the caller
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
