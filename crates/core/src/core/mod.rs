//! The CPU core.
//!
//! Ties the pipeline, register file, execution unit, and trap-entry machine
//! together. One call to [`Core::tick`] advances every stage once; stages
//! run oldest-first (commit, register read, decode, fetch) so an instruction
//! spends at least one tick in each stage and the forwarding unit sees
//! writebacks before younger consumers run.

pub mod csr;
pub mod exec;
pub mod pipeline;
pub mod regfile;
pub mod trap;

use tracing::debug;

use crate::common::TrapCause;
use crate::config::Config;
use crate::soc::addr::TRAP_VECTOR_UNSET;
use crate::soc::{Resource, Router};
use crate::stats::SimStats;

use csr::CounterEvent;
use exec::{ExecOutcome, ExecView, ExecutionUnit};
use pipeline::{ForwardingUnit, PipelineController, SlotState};
use regfile::RegFile;
use trap::{TrapController, TrapStep};

/// Top-level core state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreState {
    /// Executing instructions.
    Running,
    /// Trap entry in progress; the pipeline is held.
    Trapping,
    /// Stopped: trap taken with `mtvec` unset, or a fatal entry fault.
    Halted,
}

/// The CPU core.
#[derive(Debug)]
pub struct Core {
    pipeline: PipelineController,
    regfile: RegFile,
    exec: ExecutionUnit,
    trap: TrapController,
    fwd: ForwardingUnit,
    state: CoreState,
    timer_line: bool,
    external_line: bool,
    timer_pending: bool,
    external_pending: bool,
}

impl Core {
    /// Creates a core at reset, fetching from the configured start PC.
    pub fn new(config: &Config) -> Self {
        Self {
            pipeline: PipelineController::new(
                config.pipeline.slots,
                config.pipeline.cache_lines,
                config.general.start_pc,
            ),
            regfile: RegFile::new(),
            exec: ExecutionUnit::new(config.timing.mul_latency, config.timing.div_latency),
            trap: TrapController::new(),
            fwd: ForwardingUnit::new(),
            state: CoreState::Running,
            timer_line: false,
            external_line: false,
            timer_pending: false,
            external_pending: false,
        }
    }

    /// Current top-level state.
    pub fn state(&self) -> CoreState {
        self.state
    }

    /// Whether the core has halted.
    pub fn halted(&self) -> bool {
        self.state == CoreState::Halted
    }

    /// Reads an integer register; trace and test access.
    pub fn reg(&self, reg: u8) -> u32 {
        self.regfile.read(reg)
    }

    /// Redirects fetch to `pc`, discarding in-flight work; loader use.
    pub fn set_pc(&mut self, pc: u32) {
        self.pipeline.flush(pc, &mut self.regfile);
    }

    /// Advances the core one tick.
    pub fn tick(&mut self, router: &mut Router, stats: &mut SimStats) {
        self.sample_irq_lines(router);
        self.fwd.begin_tick();

        match self.state {
            CoreState::Halted => {}
            CoreState::Trapping => match self.trap.step(router) {
                TrapStep::Busy => {}
                TrapStep::Fatal => {
                    debug!("fatal fault during trap entry");
                    self.state = CoreState::Halted;
                }
                TrapStep::Resume(vector) => {
                    if vector == TRAP_VECTOR_UNSET {
                        debug!("trap with unset vector; halting");
                        self.state = CoreState::Halted;
                    } else {
                        router.csr.trap_enter();
                        stats.flushes += 1;
                        self.pipeline.flush(vector, &mut self.regfile);
                        self.state = CoreState::Running;
                    }
                }
            },
            CoreState::Running => {
                self.commit_step(router, stats);
                if self.state == CoreState::Running {
                    self.pipeline.regread_step(&mut self.regfile, &self.fwd);
                    self.pipeline.decode_step();
                    self.pipeline
                        .fetch_step(router, &mut self.regfile, stats);
                }
            }
        }
    }

    /// Commit stage: drives the execution unit for the oldest slot.
    fn commit_step(&mut self, router: &mut Router, stats: &mut SimStats) {
        let i = self.pipeline.oldest_index();
        match self.pipeline.slot(i).state {
            SlotState::Executing => {
                if let Some(outcome) = self.exec.tick(router) {
                    self.finish(i, outcome, router, stats);
                }
            }
            SlotState::RegRead => {
                let slot = *self.pipeline.slot(i);
                if let Some(exc) = slot.fault {
                    // Latched fetch-path exception; a pending interrupt
                    // still outranks it.
                    let cause = self
                        .pending_irq(router)
                        .unwrap_or(TrapCause::Exception(exc));
                    self.enter_trap(cause, slot.addr, slot.addr, router, stats);
                    return;
                }
                if let Some(cause) = self.pending_irq(router) {
                    // Interrupt at an instruction boundary: the instruction
                    // has not started, so it restarts after the handler.
                    self.enter_trap(cause, slot.addr, 0, router, stats);
                    return;
                }
                let Some(d) = slot.decoded else { return };
                let view = ExecView {
                    addr: slot.addr,
                    raw: slot.raw,
                    compressed: slot.compressed,
                    op: d,
                    rs1: slot.rs1_val,
                    rs2: slot.rs2_val,
                };
                self.pipeline.slot_mut(i).state = SlotState::Executing;
                if let Some(outcome) = self.exec.start(view, router) {
                    self.finish(i, outcome, router, stats);
                }
            }
            _ => {}
        }
    }

    /// Resolves a finished instruction: trap, or writeback and retire.
    fn finish(&mut self, i: usize, outcome: ExecOutcome, router: &mut Router, stats: &mut SimStats) {
        let slot = *self.pipeline.slot(i);

        if let Some((exc, tval)) = outcome.trap {
            let (cause, tval) = match self.pending_irq(router) {
                Some(irq) => (irq, 0),
                None => (TrapCause::Exception(exc), tval),
            };
            self.enter_trap(cause, slot.addr, tval, router, stats);
            return;
        }

        if let Some(d) = slot.decoded {
            if let Some(value) = outcome.result {
                if d.op.writes_rd() && d.rd != 0 {
                    self.regfile.write(d.rd, value);
                    self.fwd
                        .record(d.rd, value, self.pipeline.slots_mut(), &mut self.regfile);
                }
            }
        }
        router.csr.retire();
        match router.classify(slot.addr) {
            Some(Resource::Flash) => router.csr.pulse(CounterEvent::RetiredFromFlash),
            Some(Resource::Ram) => router.csr.pulse(CounterEvent::RetiredFromRam),
            _ => {}
        }
        stats.instructions_retired += 1;
        self.pipeline.commit_recycle();

        // mret restores MIE here, so an interrupt held off by the handler
        // can be taken immediately after it.
        let next_pc = if outcome.trap_return {
            router.csr.trap_return()
        } else {
            outcome.next_pc
        };

        if outcome.fence_i {
            self.pipeline.invalidate_caches();
        }

        if let Some(cause) = self.pending_irq(router) {
            // Interrupt after completion: the instruction retired, so the
            // handler returns to its successor.
            self.enter_trap(cause, next_pc, 0, router, stats);
            return;
        }

        if outcome.jump {
            stats.flushes += 1;
            self.pipeline.flush(next_pc, &mut self.regfile);
        }
    }

    fn enter_trap(
        &mut self,
        cause: TrapCause,
        epc: u32,
        tval: u32,
        router: &mut Router,
        stats: &mut SimStats,
    ) {
        stats.traps_taken += 1;
        match cause {
            TrapCause::TimerInterrupt => {
                stats.timer_interrupts += 1;
                router.csr.pulse(CounterEvent::TimerIrq);
                self.timer_pending = false;
            }
            TrapCause::ExternalInterrupt => {
                stats.external_interrupts += 1;
                router.csr.pulse(CounterEvent::ExternalIrq);
                self.external_pending = false;
            }
            TrapCause::Exception(_) => {}
        }
        self.trap.begin(cause, epc, tval);
        self.state = CoreState::Trapping;
    }

    /// The highest-priority takeable interrupt, external before timer.
    fn pending_irq(&self, router: &Router) -> Option<TrapCause> {
        if self.external_pending && router.csr.external_irq_enabled() {
            Some(TrapCause::ExternalInterrupt)
        } else if self.timer_pending && router.csr.timer_irq_enabled() {
            Some(TrapCause::TimerInterrupt)
        } else {
            None
        }
    }

    /// Rising-edge detection on the interrupt lines, sampled once per tick.
    fn sample_irq_lines(&mut self, router: &mut Router) {
        let lines = router.irq_lines();
        if lines.timer && !self.timer_line {
            self.timer_pending = true;
        }
        if lines.external && !self.external_line {
            self.external_pending = true;
        }
        self.timer_line = lines.timer;
        self.external_line = lines.external;
        router.csr.set_irq_lines(lines.timer, lines.external);
    }
}
