//! Trap taxonomy and cause encoding.
//!
//! This module defines the architectural trap vocabulary. It provides:
//! 1. **Exceptions:** The synchronous causes the core can raise, with their
//!    `mcause` codes.
//! 2. **Trap causes:** The union of exceptions and the two interrupt lines,
//!    encoded the way the trap-entry state machine writes `mcause`.

use std::fmt;

/// Interrupt bit of `mcause` (set for asynchronous causes).
pub const MCAUSE_INTERRUPT: u32 = 0x8000_0000;

/// Synchronous exceptions raised by the core.
///
/// At most one synchronous cause reaches the trap controller per
/// instruction: a fetch-path fault suppresses execute, and the execute
/// stage raises its first failure only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exception {
    /// Fetch address with bit 0 set.
    InstructionAddressMisaligned,
    /// Faulted acknowledgement on a fetch transaction.
    InstructionAccessFault,
    /// Unrecognized or unsupported encoding reached execute.
    IllegalInstruction,
    /// `ebreak` executed.
    Breakpoint,
    /// Load effective address not aligned to the access width.
    LoadAddressMisaligned,
    /// Faulted acknowledgement on a load transaction.
    LoadAccessFault,
    /// Store/AMO effective address not aligned to the access width.
    StoreAddressMisaligned,
    /// Faulted acknowledgement on a store/AMO transaction.
    StoreAccessFault,
    /// `ecall` executed.
    EnvironmentCall,
}

impl Exception {
    /// The `mcause` exception code for this cause.
    pub fn code(self) -> u32 {
        match self {
            Exception::InstructionAddressMisaligned => 0,
            Exception::InstructionAccessFault => 1,
            Exception::IllegalInstruction => 2,
            Exception::Breakpoint => 3,
            Exception::LoadAddressMisaligned => 4,
            Exception::LoadAccessFault => 5,
            Exception::StoreAddressMisaligned => 6,
            Exception::StoreAccessFault => 7,
            Exception::EnvironmentCall => 11,
        }
    }

    /// Whether trap entry writes `mtval` for this cause.
    ///
    /// All the synchronous causes here carry a meaningful value (a faulting
    /// address, the raw encoding, or the breakpoint PC); `ecall` does not.
    pub fn writes_mtval(self) -> bool {
        !matches!(self, Exception::EnvironmentCall)
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Exception::InstructionAddressMisaligned => "InstructionAddressMisaligned",
            Exception::InstructionAccessFault => "InstructionAccessFault",
            Exception::IllegalInstruction => "IllegalInstruction",
            Exception::Breakpoint => "Breakpoint",
            Exception::LoadAddressMisaligned => "LoadAddressMisaligned",
            Exception::LoadAccessFault => "LoadAccessFault",
            Exception::StoreAddressMisaligned => "StoreAddressMisaligned",
            Exception::StoreAccessFault => "StoreAccessFault",
            Exception::EnvironmentCall => "EnvironmentCall",
        };
        f.write_str(name)
    }
}

/// A cause accepted by the trap-entry state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapCause {
    /// Synchronous exception raised by an instruction or a fetch.
    Exception(Exception),
    /// Machine timer interrupt (`mtime >= mtimecmp`).
    TimerInterrupt,
    /// Machine external interrupt (UART receive line).
    ExternalInterrupt,
}

impl TrapCause {
    /// The value the trap-entry machine writes to `mcause`.
    pub fn mcause(self) -> u32 {
        match self {
            TrapCause::Exception(e) => e.code(),
            TrapCause::TimerInterrupt => MCAUSE_INTERRUPT | 7,
            TrapCause::ExternalInterrupt => MCAUSE_INTERRUPT | 11,
        }
    }
}

impl fmt::Display for TrapCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrapCause::Exception(e) => write!(f, "{e}"),
            TrapCause::TimerInterrupt => write!(f, "TimerInterrupt"),
            TrapCause::ExternalInterrupt => write!(f, "ExternalInterrupt"),
        }
    }
}
