//! Machine timer.
//!
//! Register layout within the I/O block:
//!
//! | offset | register       |
//! |--------|----------------|
//! | 0x4000 | `mtime` low    |
//! | 0x4004 | `mtime` high   |
//! | 0x4008 | `mtimecmp` low |
//! | 0x400C | `mtimecmp` high|
//!
//! `mtime` advances once every `divider` ticks. The timer interrupt line is
//! level: high while `mtime >= mtimecmp`.

use crate::common::BusReply;

/// Offset of the timer registers within the I/O block.
pub const TIMER_OFFSET: u32 = 0x4000;

/// Machine timer with a tick divider.
#[derive(Debug)]
pub struct Timer {
    mtime: u64,
    mtimecmp: u64,
    divider: u32,
    countdown: u32,
}

impl Timer {
    /// Creates a timer; `mtimecmp` starts at the maximum so the line is low.
    pub fn new(divider: u32) -> Self {
        let divider = divider.max(1);
        Self {
            mtime: 0,
            mtimecmp: u64::MAX,
            divider,
            countdown: divider,
        }
    }

    /// Advances one simulator tick.
    pub fn tick(&mut self) {
        self.countdown -= 1;
        if self.countdown == 0 {
            self.countdown = self.divider;
            self.mtime = self.mtime.wrapping_add(1);
        }
    }

    /// Timer interrupt line level.
    pub fn irq_line(&self) -> bool {
        self.mtime >= self.mtimecmp
    }

    /// Current `mtime` value.
    pub fn mtime(&self) -> u64 {
        self.mtime
    }

    /// Register read at `local` (offset within the timer block).
    pub fn read(&mut self, local: u32) -> BusReply {
        match local {
            0x0 => BusReply::ok(self.mtime as u32),
            0x4 => BusReply::ok((self.mtime >> 32) as u32),
            0x8 => BusReply::ok(self.mtimecmp as u32),
            0xC => BusReply::ok((self.mtimecmp >> 32) as u32),
            _ => BusReply::fault(),
        }
    }

    /// Register write at `local` (offset within the timer block).
    pub fn write(&mut self, local: u32, data: u32) -> BusReply {
        match local {
            0x0 => self.mtime = (self.mtime & 0xFFFF_FFFF_0000_0000) | u64::from(data),
            0x4 => self.mtime = (self.mtime & 0xFFFF_FFFF) | (u64::from(data) << 32),
            0x8 => self.mtimecmp = (self.mtimecmp & 0xFFFF_FFFF_0000_0000) | u64::from(data),
            0xC => self.mtimecmp = (self.mtimecmp & 0xFFFF_FFFF) | (u64::from(data) << 32),
            _ => return BusReply::fault(),
        }
        BusReply::ok(0)
    }
}
