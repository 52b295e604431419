//! Bus transaction vocabulary.
//!
//! This module defines the handshake types exchanged between the two bus
//! masters and the memory-space router. It provides:
//! 1. **Masters:** The core (fetch + trap entry) and data (execute) ports.
//! 2. **Requests:** Address, payload, byte select, and transaction kind.
//! 3. **Replies:** Acknowledgements carrying data and a fault flag.

use std::fmt;

/// Identifies which master port a transaction belongs to.
///
/// Each master has a one-deep submission queue in the router and at most one
/// transaction in flight at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasterId {
    /// Instruction fetch and trap-entry CSR traffic.
    Core,
    /// Loads, stores, AMOs, and execute-stage CSR accesses.
    Data,
}

impl MasterId {
    /// Queue/reply slot index for this master.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            MasterId::Core => 0,
            MasterId::Data => 1,
        }
    }
}

/// What a transaction is for, from the issuing master's point of view.
///
/// The router uses the kind to police the CSR window (only CSR-tagged
/// transactions may enter it) and the masters use it to discard stale
/// replies after a flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    /// Instruction fetch (always a word read).
    Fetch,
    /// Data load.
    Load,
    /// Data store.
    Store,
    /// CSR read through the CSR backend window.
    CsrRead,
    /// CSR write through the CSR backend window.
    CsrWrite,
}

/// A single bus transaction as submitted by a master.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusRequest {
    /// Global byte address.
    pub addr: u32,
    /// Write payload in the low `select.count_ones()` bytes; ignored on reads.
    pub data: u32,
    /// Byte lane select, low-aligned (`0b0001`, `0b0011`, or `0b1111`).
    pub select: u8,
    /// True for stores and CSR writes.
    pub write: bool,
    /// Transaction kind tag.
    pub kind: AccessKind,
}

impl BusRequest {
    /// Builds a read request of `select` width at `addr`.
    pub fn read(addr: u32, select: u8, kind: AccessKind) -> Self {
        Self {
            addr,
            data: 0,
            select,
            write: false,
            kind,
        }
    }

    /// Builds a write request carrying `data` in the low selected bytes.
    pub fn write(addr: u32, data: u32, select: u8, kind: AccessKind) -> Self {
        Self {
            addr,
            data,
            select,
            write: true,
            kind,
        }
    }
}

impl fmt::Display for BusRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:?} @ {:#010x} sel={:#06b}",
            if self.write { "W:" } else { "R:" },
            self.kind,
            self.addr,
            self.select
        )
    }
}

/// Acknowledgement returned by the router once a transaction completes.
///
/// Illegal targets (unmapped addresses, writes to flash, non-CSR traffic in
/// the CSR window) are acknowledged with the fault flag set rather than
/// stalling the bus; the master maps the flag to the access-fault class of
/// its own transaction kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusReply {
    /// Read data, little-endian, starting at the requested address.
    pub data: u32,
    /// Set when the transaction targeted an illegal or out-of-range location.
    pub fault: bool,
}

impl BusReply {
    /// A successful acknowledgement carrying `data`.
    #[inline]
    pub fn ok(data: u32) -> Self {
        Self { data, fault: false }
    }

    /// A faulting acknowledgement.
    #[inline]
    pub fn fault() -> Self {
        Self {
            data: 0,
            fault: true,
        }
    }
}
