//! The I/O block backend: UART registers at the bottom of the window, timer
//! registers at [`TIMER_OFFSET`]. Everything else in the window faults.

use crate::common::BusReply;

use super::timer::TIMER_OFFSET;
use super::{Backend, Timer, Uart};

/// Composite backend routing the I/O window to the UART and the timer.
#[derive(Debug)]
pub struct IoBlock {
    /// Serial port.
    pub uart: Uart,
    /// Machine timer.
    pub timer: Timer,
    latency: u32,
}

impl IoBlock {
    /// Builds the block with a timer at the given divider.
    pub fn new(timer_divider: u32, latency: u32) -> Self {
        Self {
            uart: Uart::new(),
            timer: Timer::new(timer_divider),
            latency,
        }
    }

    /// Advances the devices one simulator tick.
    pub fn tick(&mut self) {
        self.timer.tick();
    }
}

impl Backend for IoBlock {
    fn name(&self) -> &'static str {
        "io"
    }

    fn latency(&self) -> u32 {
        self.latency
    }

    fn read(&mut self, local: u32, _select: u8) -> BusReply {
        if local < TIMER_OFFSET {
            self.uart.read(local)
        } else if local < TIMER_OFFSET + 0x10 {
            self.timer.read(local - TIMER_OFFSET)
        } else {
            BusReply::fault()
        }
    }

    fn write(&mut self, local: u32, _select: u8, data: u32) -> BusReply {
        if local < TIMER_OFFSET {
            self.uart.write(local, data)
        } else if local < TIMER_OFFSET + 0x10 {
            self.timer.write(local - TIMER_OFFSET, data)
        } else {
            BusReply::fault()
        }
    }
}
