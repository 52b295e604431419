//! Read-only program flash.

use crate::common::BusReply;

use super::Backend;

/// Flash backend holding the program image.
///
/// Reads beyond the image capacity fault; all writes fault (the router
/// already rejects them, this is the backstop).
#[derive(Debug)]
pub struct Flash {
    bytes: Vec<u8>,
    latency: u32,
}

impl Flash {
    /// Creates an erased (zeroed) flash of `size` bytes.
    pub fn new(size: usize, latency: u32) -> Self {
        Self {
            bytes: vec![0; size],
            latency,
        }
    }

    /// Programs `data` at `local`; used by the loader only.
    ///
    /// Returns false when the slice does not fit.
    pub fn program(&mut self, local: u32, data: &[u8]) -> bool {
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
}

impl Backend for Flash {
    fn name(&self) -> &'static str {
        "flash"
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

    fn write(&mut self, _local: u32, _select: u8, _data: u32) -> BusReply {
        BusReply::fault()
    }
}
