//! Pipeline ring-buffer slots.

use crate::common::Exception;
use crate::isa::DecodedOp;

/// Lifecycle of a slot, in stage order.
///
/// States only ever advance while a slot is occupied; `Empty` is reached
/// again when the instruction commits or the pipeline flushes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SlotState {
    /// No instruction.
    Empty,
    /// Fetch transaction outstanding.
    FetchPending,
    /// Raw encoding present, not yet decoded.
    Fetched,
    /// Decode in progress.
    DecodePending,
    /// Decoded, operands not yet read.
    Decoded,
    /// Register-file read outstanding.
    RegReadPending,
    /// Operands resident; ready for execute.
    RegRead,
    /// Execution in progress.
    Executing,
}

/// One slot of the pipeline ring.
#[derive(Debug, Clone, Copy)]
pub struct PipelineSlot {
    /// Lifecycle state.
    pub state: SlotState,
    /// Fetch address.
    pub addr: u32,
    /// Raw 32-bit encoding (expanded if compressed).
    pub raw: u32,
    /// Whether the original encoding was 16-bit.
    pub compressed: bool,
    /// Decoded fields, once decode has run or the decode cache hit.
    pub decoded: Option<DecodedOp>,
    /// First operand value.
    pub rs1_val: u32,
    /// Second operand value.
    pub rs2_val: u32,
    /// Fetch-path exception latched against this slot, if any. The slot is
    /// marked ready so the trap is raised when it becomes the oldest.
    pub fault: Option<Exception>,
}

impl PipelineSlot {
    /// An empty slot.
    pub fn empty() -> Self {
        Self {
            state: SlotState::Empty,
            addr: 0,
            raw: 0,
            compressed: false,
            decoded: None,
            rs1_val: 0,
            rs2_val: 0,
            fault: None,
        }
    }

    /// Recycles the slot after commit or flush.
    pub fn clear(&mut self) {
        *self = Self::empty();
    }
}
