//! Bus backends behind the memory-space router.
//!
//! This module defines the backend interface and the concrete backends. It
//! provides:
//! 1. **Trait:** [`Backend`], the read/write/latency surface the router
//!    drives once a transaction's wait completes.
//! 2. **Backends:** Flash, RAM, and the I/O block (UART + machine timer).
//!    The CSR bank also implements [`Backend`] but lives with the core.

pub mod flash;
pub mod io;
pub mod ram;
pub mod timer;
pub mod uart;

pub use flash::Flash;
pub use io::IoBlock;
pub use ram::Ram;
pub use timer::Timer;
pub use uart::Uart;

use crate::common::BusReply;

/// A memory-space backend as seen by the router.
///
/// The router owns all arbitration and timing; a backend only performs the
/// data movement when asked. Transfer semantics by backend class:
/// bulk memories (flash, RAM) return a little-endian word starting at the
/// local offset and write the low `select.count_ones()` bytes there;
/// register blocks (I/O, CSR) decode the local offset exactly.
pub trait Backend {
    /// Short name for trace output.
    fn name(&self) -> &'static str;

    /// Access latency in ticks; the router counts this down before the
    /// access is performed.
    fn latency(&self) -> u32;

    /// Performs a read at `local`.
    fn read(&mut self, local: u32, select: u8) -> BusReply;

    /// Performs a write of the low selected bytes of `data` at `local`.
    fn write(&mut self, local: u32, select: u8, data: u32) -> BusReply;
}
