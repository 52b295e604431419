//! Trap-entry state machine.
//!
//! Trap entry is not instantaneous: the controller walks the CSR bank over
//! the bus, one transaction per phase, using the core master (fetch is
//! suspended for the duration, so the port is free):
//! 1. Write `mepc`.
//! 2. Write `mtval` (skipped for interrupts and `ecall`).
//! 3. Write `mcause`.
//! 4. Read `mtvec` and hand the vector back to the core.
//!
//! The core resumes at the vector, or halts when `mtvec` still holds the
//! unset sentinel. A faulted acknowledgement during entry is unrecoverable
//! and reported as fatal.

use tracing::{debug, trace};

use crate::common::{AccessKind, BusRequest, MasterId, TrapCause};
use crate::core::csr::csr_num;
use crate::soc::addr::CSR_BASE;
use crate::soc::Router;

/// Progress report from one tick of trap entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapStep {
    /// Still walking the CSR writes.
    Busy,
    /// Entry complete; resume fetching at the vector.
    Resume(u32),
    /// A CSR transaction faulted during entry.
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    WriteMepc,
    WaitMepc,
    WriteMtval,
    WaitMtval,
    WriteMcause,
    WaitMcause,
    ReadVector,
    WaitVector,
}

/// The trap-entry controller.
#[derive(Debug)]
pub struct TrapController {
    phase: Phase,
    cause: TrapCause,
    epc: u32,
    tval: u32,
}

impl TrapController {
    /// Creates an idle controller.
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            cause: TrapCause::TimerInterrupt,
            epc: 0,
            tval: 0,
        }
    }

    /// Starts entry for `cause` with the given `mepc`/`mtval` payloads.
    pub fn begin(&mut self, cause: TrapCause, epc: u32, tval: u32) {
        debug!(%cause, epc = format_args!("{epc:#010x}"), "trap entry");
        self.phase = Phase::WriteMepc;
        self.cause = cause;
        self.epc = epc;
        self.tval = tval;
    }

    /// Advances entry one tick.
    pub fn step(&mut self, router: &mut Router) -> TrapStep {
        match self.phase {
            Phase::Idle => TrapStep::Busy,
            Phase::WriteMepc => self.submit_write(router, csr_num::MEPC, self.epc, Phase::WaitMepc),
            Phase::WaitMepc => {
                let next = if self.writes_mtval() {
                    Phase::WriteMtval
                } else {
                    Phase::WriteMcause
                };
                self.wait_write(router, next)
            }
            Phase::WriteMtval => {
                self.submit_write(router, csr_num::MTVAL, self.tval, Phase::WaitMtval)
            }
            Phase::WaitMtval => self.wait_write(router, Phase::WriteMcause),
            Phase::WriteMcause => self.submit_write(
                router,
                csr_num::MCAUSE,
                self.cause.mcause(),
                Phase::WaitMcause,
            ),
            Phase::WaitMcause => self.wait_write(router, Phase::ReadVector),
            Phase::ReadVector => {
                if router.master_busy(MasterId::Core) {
                    return TrapStep::Busy;
                }
                router.submit(
                    MasterId::Core,
                    BusRequest::read(CSR_BASE + csr_num::MTVEC, 0b1111, AccessKind::CsrRead),
                );
                self.phase = Phase::WaitVector;
                TrapStep::Busy
            }
            Phase::WaitVector => {
                let Some((req, reply)) = router.take_reply(MasterId::Core) else {
                    return TrapStep::Busy;
                };
                if req.kind != AccessKind::CsrRead {
                    // Stale fetch acknowledgement from before the trap.
                    return TrapStep::Busy;
                }
                self.phase = Phase::Idle;
                if reply.fault {
                    return TrapStep::Fatal;
                }
                trace!(vector = format_args!("{:#010x}", reply.data), "trap vector");
                TrapStep::Resume(reply.data)
            }
        }
    }

    fn writes_mtval(&self) -> bool {
        match self.cause {
            TrapCause::Exception(e) => e.writes_mtval(),
            _ => false,
        }
    }

    fn submit_write(&mut self, router: &mut Router, csr: u32, data: u32, next: Phase) -> TrapStep {
        if router.master_busy(MasterId::Core) {
            // An old fetch is still in flight; its acknowledgement will be
            // dropped by the wait phases.
            return TrapStep::Busy;
        }
        router.submit(
            MasterId::Core,
            BusRequest::write(CSR_BASE + csr, data, 0b1111, AccessKind::CsrWrite),
        );
        self.phase = next;
        TrapStep::Busy
    }

    fn wait_write(&mut self, router: &mut Router, next: Phase) -> TrapStep {
        let Some((req, reply)) = router.take_reply(MasterId::Core) else {
            return TrapStep::Busy;
        };
        if req.kind != AccessKind::CsrWrite {
            // Stale fetch acknowledgement; stay in this phase.
            return TrapStep::Busy;
        }
        if reply.fault {
            self.phase = Phase::Idle;
            return TrapStep::Fatal;
        }
        self.phase = next;
        TrapStep::Busy
    }
}

impl Default for TrapController {
    fn default() -> Self {
        Self::new()
    }
}
