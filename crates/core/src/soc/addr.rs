//! Memory-space layout and address decoding.
//!
//! This module defines the global address map and the decoder that splits a
//! global address into a backend identity plus a local offset. It provides:
//! 1. **Windows:** Flash, RAM, I/O block, and the CSR window.
//! 2. **Decoder:** Global address to `(Resource, local)` resolution; gaps
//!    decode to `None` and become faulted acknowledgements in the router.

/// Base of the flash window. Also the reset PC.
pub const FLASH_BASE: u32 = 0x0060_0000;
/// Last byte of the flash window (inclusive).
pub const FLASH_END: u32 = 0x00FF_FFFF;
/// Base of the CSR backend window.
pub const CSR_BASE: u32 = 0x4000_0000;
/// Size of the CSR window in bytes; local offset is the 12-bit CSR number.
pub const CSR_SIZE: u32 = 0x1000;
/// Base of main RAM.
pub const RAM_BASE: u32 = 0x8000_0000;
/// Base of the I/O block.
pub const IO_BASE: u32 = 0xC000_0000;
/// Size of the I/O window in bytes.
pub const IO_SIZE: u32 = 0x0100_0000;

/// Reset value of `mtvec`; taking a trap while it still holds this sentinel
/// halts the simulation instead of vectoring.
pub const TRAP_VECTOR_UNSET: u32 = 0xFFFF_FFFF;

/// The four backends behind the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// Read-only program flash.
    Flash,
    /// Main RAM.
    Ram,
    /// UART and machine timer block.
    Io,
    /// CSR bank window; only CSR-tagged transactions may enter.
    Csr,
}

impl Resource {
    /// Busy-table slot index for this backend.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Resource::Flash => 0,
            Resource::Ram => 1,
            Resource::Io => 2,
            Resource::Csr => 3,
        }
    }
}

/// Splits global addresses into backend identity plus local offset.
#[derive(Debug, Clone, Copy)]
pub struct AddressDecoder {
    ram_end: u32,
}

impl AddressDecoder {
    /// Builds a decoder for a RAM of `ram_size` bytes at [`RAM_BASE`].
    pub fn new(ram_size: usize) -> Self {
        Self {
            ram_end: RAM_BASE.wrapping_add(ram_size as u32),
        }
    }

    /// Resolves a global address to its backend and local offset.
    ///
    /// Returns `None` for addresses in no window; the router acknowledges
    /// such transactions with the fault flag set.
    pub fn decode(&self, addr: u32) -> Option<(Resource, u32)> {
        match addr {
            FLASH_BASE..=FLASH_END => Some((Resource::Flash, addr - FLASH_BASE)),
            a if (CSR_BASE..CSR_BASE + CSR_SIZE).contains(&a) => {
                Some((Resource::Csr, addr - CSR_BASE))
            }
            a if a >= RAM_BASE && a < self.ram_end => Some((Resource::Ram, addr - RAM_BASE)),
            a if (IO_BASE..IO_BASE + IO_SIZE).contains(&a) => Some((Resource::Io, addr - IO_BASE)),
            _ => None,
        }
    }
}
