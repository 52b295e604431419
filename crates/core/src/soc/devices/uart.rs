//! UART model.
//!
//! Register layout within the I/O block:
//!
//! | offset | read                    | write         |
//! |--------|-------------------------|---------------|
//! | 0      | status (bit 0: rx avail)| transmit byte |
//! | 1      | receive byte (pops)     | ignored       |
//!
//! Transmitted bytes are captured in an output buffer which the simulator
//! shell drains to stdout. The receive line doubles as the external
//! interrupt source: it is high while the receive queue is non-empty.

use std::collections::VecDeque;

use crate::common::BusReply;

/// UART transmit/receive model.
#[derive(Debug, Default)]
pub struct Uart {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
}

impl Uart {
    /// Creates an idle UART.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a byte on the receive side (host input).
    pub fn push_rx(&mut self, byte: u8) {
        self.rx.push_back(byte);
    }

    /// Drains everything transmitted so far.
    pub fn take_tx(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.tx)
    }

    /// External interrupt line level: receive data available.
    pub fn irq_line(&self) -> bool {
        !self.rx.is_empty()
    }

    /// Register read at `local` (0 = status, 1 = receive data).
    pub fn read(&mut self, local: u32) -> BusReply {
        match local {
            0 => BusReply::ok(u32::from(!self.rx.is_empty())),
            1 => BusReply::ok(u32::from(self.rx.pop_front().unwrap_or(0))),
            _ => BusReply::fault(),
        }
    }

    /// Register write at `local` (0 = transmit).
    pub fn write(&mut self, local: u32, data: u32) -> BusReply {
        match local {
            0 => {
                self.tx.push(data as u8);
                BusReply::ok(0)
            }
            1 => BusReply::ok(0),
            _ => BusReply::fault(),
        }
    }
}
