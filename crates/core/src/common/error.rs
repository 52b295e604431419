//! Host-side error types.
//!
//! Architectural traps are not host errors; they are modeled by
//! [`crate::common::trap`] and flow through the trap-entry machine. This
//! module covers everything that can go wrong on the host instead: reading
//! images, parsing ELF files, and deserializing configuration.

use thiserror::Error;

/// Errors produced by the loader and the configuration layer.
#[derive(Debug, Error)]
pub enum SimError {
    /// Underlying I/O failure while reading an image or config file.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The image could not be parsed as an ELF object.
    #[error("elf parse error: {0}")]
    Elf(#[from] object::Error),

    /// An ELF segment or flat image falls outside the flash and RAM windows.
    #[error("image segment at {addr:#010x} ({len} bytes) is outside loadable memory")]
    SegmentOutOfRange {
        /// Segment start address.
        addr: u32,
        /// Segment length in bytes.
        len: usize,
    },

    /// The ELF entry point is not inside a mapped window.
    #[error("entry point {0:#010x} is not a mapped address")]
    BadEntryPoint(u32),

    /// Configuration file failed to deserialize.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}
