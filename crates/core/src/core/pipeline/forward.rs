//! Hazard forwarding.
//!
//! The register file samples operands at issue time and delivers them a tick
//! later, so a writeback can land in either window. The forwarding unit
//! closes both: when an instruction commits, the new value is substituted
//! into the in-flight register-file read and into any younger slot whose
//! operands are already resident. Values are patched in place; nothing ever
//! re-issues a read.

use crate::core::regfile::RegFile;

use super::slot::{PipelineSlot, SlotState};

/// Same-tick writeback forwarding.
#[derive(Debug, Default)]
pub struct ForwardingUnit {
    writeback: Option<(u8, u32)>,
}

impl ForwardingUnit {
    /// Creates an idle unit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the recorded writeback at the start of a tick.
    pub fn begin_tick(&mut self) {
        self.writeback = None;
    }

    /// Records a writeback and patches every consumer that already holds a
    /// stale copy of `reg`: the register file's pending read and any slot
    /// with resident operands.
    pub fn record(&mut self, reg: u8, value: u32, slots: &mut [PipelineSlot], regfile: &mut RegFile) {
        if reg == 0 {
            return;
        }
        self.writeback = Some((reg, value));
        regfile.patch_pending(reg, value);
        for slot in slots.iter_mut() {
            if !matches!(slot.state, SlotState::RegRead | SlotState::RegReadPending) {
                continue;
            }
            let Some(d) = slot.decoded else { continue };
            if d.op.reads_rs1() && d.rs1 == reg {
                slot.rs1_val = value;
            }
            if d.op.reads_rs2() && d.rs2 == reg {
                slot.rs2_val = value;
            }
        }
    }

    /// Substitutes this tick's writeback into a value read for `reg`.
    ///
    /// Used when a register-file read delivers in the same tick as the
    /// writeback it raced against.
    pub fn patch(&self, reg: u8, sampled: u32) -> u32 {
        match self.writeback {
            Some((wreg, value)) if wreg == reg && reg != 0 => value,
            _ => sampled,
        }
    }
}
