//! Main RAM backend.

use crate::common::BusReply;

use super::Backend;

/// Byte-addressable RAM.
#[derive(Debug)]
pub struct Ram {
    bytes: Vec<u8>,
    latency: u32,
}

impl Ram {
    /// Creates a zeroed RAM of `size` bytes.
    pub fn new(size: usize, latency: u32) -> Self {
        Self {
            bytes: vec![0; size],
            latency,
        }
    }

    /// Copies `data` to `local`; used by the loader only.
    ///
    /// Returns false when the slice does not fit.
    pub fn load(&mut self, local: u32, data: &[u8]) -> bool {
        let start = local as usize;
        let Some(end) = start.checked_add(data.len()) else {
            return false;
        };
        if end > self.bytes.len() {
            return false;
        }
        self.bytes[start..end].copy_from_slice(data);
        true
    }

    /// Reads a word without bus timing; test and debugger access.
    pub fn peek_word(&self, local: u32) -> Option<u32> {
        let start = local as usize;
        let slice = self.bytes.get(start..start + 4)?;
        let mut word = [0u8; 4];
        word.copy_from_slice(slice);
        Some(u32::from_le_bytes(word))
    }
}

impl Backend for Ram {
    fn name(&self) -> &'static str {
        "ram"
    }

    fn latency(&self) -> u32 {
        self.latency
    }

    fn read(&mut self, local: u32, _select: u8) -> BusReply {
        let start = local as usize;
        if start >= self.bytes.len() {
            return BusReply::fault();
        }
        let mut word = [0u8; 4];
        for (i, b) in word.iter_mut().enumerate() {
            *b = self.bytes.get(start + i).copied().unwrap_or(0);
        }
        BusReply::ok(u32::from_le_bytes(word))
    }

    fn write(&mut self, local: u32, select: u8, data: u32) -> BusReply {
        let start = local as usize;
        let count = select.count_ones() as usize;
        if start + count > self.bytes.len() {
            return BusReply::fault();
        }
        let src = data.to_le_bytes();
        self.bytes[start..start + count].copy_from_slice(&src[..count]);
        BusReply::ok(0)
    }
}
