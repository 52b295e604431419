//! Byte-exact program image builder.
//!
//! Lays out a mix of 32-bit and 16-bit (compressed) encodings the way they
//! would sit in flash, little-endian, with no alignment padding.

/// Accumulates an instruction stream into a flat byte image.
#[derive(Debug, Default)]
pub struct ProgramImage {
    bytes: Vec<u8>,
}

impl ProgramImage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a 32-bit encoding.
    pub fn word(mut self, inst: u32) -> Self {
        self.bytes.extend_from_slice(&inst.to_le_bytes());
        self
    }

    /// Appends a 16-bit compressed encoding.
    pub fn half(mut self, inst: u16) -> Self {
        self.bytes.extend_from_slice(&inst.to_le_bytes());
        self
    }

    /// Byte offset the next instruction would land at.
    pub fn offset(&self) -> u32 {
        self.bytes.len() as u32
    }

    /// The finished image.
    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}
