//! Tick orchestration.
//!
//! One simulator tick runs, in order: the router's completion phase, the
//! core, the router's dispatch phase, and the devices. Completing before the
//! core and dispatching after it gives every bus transaction its backend
//! latency in whole ticks while still letting both masters dispatch in the
//! tick they submit.

use crate::common::SimError;
use crate::config::Config;
use crate::core::Core;
use crate::soc::Router;
use crate::stats::SimStats;

use super::loader;

/// Why a run loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunExit {
    /// The core halted (trap with `mtvec` unset, or a fatal entry fault).
    Halted,
    /// The tick limit was reached first.
    TickLimit,
}

/// The assembled machine.
#[derive(Debug)]
pub struct Simulator {
    core: Core,
    router: Router,
    stats: SimStats,
}

impl Simulator {
    /// Builds a machine from `config` with empty flash.
    pub fn new(config: &Config) -> Self {
        Self {
            core: Core::new(config),
            router: Router::new(config),
            stats: SimStats::default(),
        }
    }

    /// Loads a program image and redirects fetch to its start PC.
    ///
    /// # Errors
    ///
    /// See [`loader::load_image`].
    pub fn load(&mut self, config: &Config, data: &[u8]) -> Result<(), SimError> {
        let entry = loader::load_image(&mut self.router, config, data)?;
        self.core.set_pc(entry);
        Ok(())
    }

    /// Advances the machine one tick.
    pub fn tick(&mut self) {
        self.router.complete_phase(&mut self.stats);
        self.core.tick(&mut self.router, &mut self.stats);
        self.router.dispatch_phase(&mut self.stats);
        self.router.tick_devices();
        self.router.csr.cycle_tick();
        self.stats.cycles += 1;
    }

    /// Runs until the core halts or `max_ticks` elapse.
    pub fn run(&mut self, max_ticks: u64) -> RunExit {
        for _ in 0..max_ticks {
            if self.core.halted() {
                return RunExit::Halted;
            }
            self.tick();
        }
        if self.core.halted() {
            RunExit::Halted
        } else {
            RunExit::TickLimit
        }
    }

    /// The core, for register and state inspection.
    pub fn core(&self) -> &Core {
        &self.core
    }

    /// Redirects fetch to `pc`, discarding in-flight work.
    pub fn set_pc(&mut self, pc: u32) {
        self.core.set_pc(pc);
    }

    /// The router, for memory and device access.
    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    /// Collected statistics.
    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Drains the UART transmit buffer.
    pub fn take_uart_tx(&mut self) -> Vec<u8> {
        self.router.io.uart.take_tx()
    }

    /// Queues a byte on the UART receive side.
    pub fn push_uart_rx(&mut self, byte: u8) {
        self.router.io.uart.push_rx(byte);
    }
}
