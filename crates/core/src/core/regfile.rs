//! Integer register file.
//!
//! 32 x 32-bit registers with `x0` hardwired to zero and a single rs1/rs2
//! read port pair with one-tick latency. A read samples the register values
//! at issue time; the write-then-read-same-tick hazard is deliberately left
//! to the forwarding unit, which patches the pending read when a writeback
//! lands in the delivery tick.

/// An in-flight register-file read.
#[derive(Debug, Clone, Copy)]
pub struct PendingRead {
    /// First source register number.
    pub rs1: u8,
    /// Second source register number.
    pub rs2: u8,
    /// Value of `rs1` sampled at issue.
    pub rs1_val: u32,
    /// Value of `rs2` sampled at issue.
    pub rs2_val: u32,
}

/// The integer register file and its read port.
#[derive(Debug)]
pub struct RegFile {
    regs: [u32; 32],
    pending: Option<PendingRead>,
}

impl Default for RegFile {
    fn default() -> Self {
        Self::new()
    }
}

impl RegFile {
    /// Creates a zeroed register file.
    pub fn new() -> Self {
        Self {
            regs: [0; 32],
            pending: None,
        }
    }

    /// Reads a register directly; combinational paths and tests.
    #[inline]
    pub fn read(&self, reg: u8) -> u32 {
        self.regs[reg as usize]
    }

    /// Writes `value` to `reg`; writes to `x0` are dropped.
    #[inline]
    pub fn write(&mut self, reg: u8, value: u32) {
        if reg != 0 {
            self.regs[reg as usize] = value;
        }
    }

    /// Whether the read port can accept an issue this tick.
    pub fn port_free(&self) -> bool {
        self.pending.is_none()
    }

    /// Issues a read of `rs1`/`rs2`; values are sampled now and delivered on
    /// the next tick's [`RegFile::take_read`].
    pub fn issue_read(&mut self, rs1: u8, rs2: u8) {
        debug_assert!(self.pending.is_none());
        self.pending = Some(PendingRead {
            rs1,
            rs2,
            rs1_val: self.read(rs1),
            rs2_val: self.read(rs2),
        });
    }

    /// Delivers the read issued last tick, if any.
    pub fn take_read(&mut self) -> Option<PendingRead> {
        self.pending.take()
    }

    /// Substitutes `value` for `reg` in the pending read, if it reads it.
    pub fn patch_pending(&mut self, reg: u8, value: u32) {
        if reg == 0 {
            return;
        }
        if let Some(p) = &mut self.pending {
            if p.rs1 == reg {
                p.rs1_val = value;
            }
            if p.rs2 == reg {
                p.rs2_val = value;
            }
        }
    }

    /// Drops any in-flight read; called on flush.
    pub fn cancel_read(&mut self) {
        self.pending = None;
    }
}
