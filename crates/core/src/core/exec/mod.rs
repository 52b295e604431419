//! Execution unit.
//!
//! Executes one instruction at a time on behalf of the oldest pipeline slot.
//! It provides:
//! 1. **Single-cycle ops:** ALU, branches, jumps, fences, and system
//!    instructions resolve directly in [`ExecutionUnit::start`].
//! 2. **Multi-cycle ops:** loads, stores, AMOs, and CSR accesses hold a
//!    small wait state machine around the data master; multiplies and
//!    divides wait on the [`MulDivUnit`].
//! 3. **Trap detection:** alignment checks before any bus traffic, faulted
//!    acknowledgements mapped to the access-fault class of the transaction,
//!    and illegal encodings raised here.

pub mod alu;
pub mod muldiv;

use crate::common::{AccessKind, BusRequest, Exception, MasterId};
use crate::isa::{DecodedOp, OpCode};
use crate::soc::addr::CSR_BASE;
use crate::soc::Router;

pub use muldiv::MulDivUnit;

/// Everything the execution unit needs from a slot.
#[derive(Debug, Clone, Copy)]
pub struct ExecView {
    /// Fetch address of the instruction.
    pub addr: u32,
    /// Raw 32-bit encoding (expanded if compressed).
    pub raw: u32,
    /// Whether the original encoding was 16-bit.
    pub compressed: bool,
    /// Decoded fields.
    pub op: DecodedOp,
    /// First operand value.
    pub rs1: u32,
    /// Second operand value.
    pub rs2: u32,
}

impl ExecView {
    /// Address of the next sequential instruction.
    #[inline]
    pub fn seq_pc(&self) -> u32 {
        self.addr.wrapping_add(if self.compressed { 2 } else { 4 })
    }
}

/// Result of executing one instruction.
#[derive(Debug, Clone, Copy)]
pub struct ExecOutcome {
    /// Value to write back to `rd`, if any.
    pub result: Option<u32>,
    /// Next program counter (sequential unless `jump`).
    pub next_pc: u32,
    /// Redirect fetch to `next_pc` (taken branch, jump, `mret`, `fence.i`).
    pub jump: bool,
    /// `mret`: commit resolves `next_pc` through the CSR bank.
    pub trap_return: bool,
    /// `fence.i`: commit invalidates the fetch caches before redirecting.
    pub fence_i: bool,
    /// Synchronous exception with its `mtval` payload.
    pub trap: Option<(Exception, u32)>,
}

impl ExecOutcome {
    fn advance(view: &ExecView, result: Option<u32>) -> Self {
        Self {
            result,
            next_pc: view.seq_pc(),
            jump: false,
            trap_return: false,
            fence_i: false,
            trap: None,
        }
    }

    fn jump(target: u32, result: Option<u32>) -> Self {
        Self {
            result,
            next_pc: target,
            jump: true,
            trap_return: false,
            fence_i: false,
            trap: None,
        }
    }

    fn trap(view: &ExecView, cause: Exception, tval: u32) -> Self {
        Self {
            result: None,
            next_pc: view.addr,
            jump: false,
            trap_return: false,
            fence_i: false,
            trap: Some((cause, tval)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum ExecState {
    Idle,
    LoadWait { ea: u32 },
    StoreWait { ea: u32, sc: bool },
    AmoLoadWait { ea: u32 },
    AmoStoreWait { loaded: u32, ea: u32 },
    CsrReadWait,
    CsrWriteWait { old: u32 },
    MulDivWait,
}

/// The execution unit state machine.
#[derive(Debug)]
pub struct ExecutionUnit {
    state: ExecState,
    view: Option<ExecView>,
    muldiv: MulDivUnit,
}

impl ExecutionUnit {
    /// Creates an idle unit.
    pub fn new(mul_latency: u32, div_latency: u32) -> Self {
        Self {
            state: ExecState::Idle,
            view: None,
            muldiv: MulDivUnit::new(mul_latency, div_latency),
        }
    }

    /// Whether an instruction is in flight.
    pub fn busy(&self) -> bool {
        !matches!(self.state, ExecState::Idle)
    }

    /// Begins executing `view`.
    ///
    /// Returns `Some` when the instruction resolves this tick; otherwise the
    /// unit goes busy and [`ExecutionUnit::tick`] finishes it.
    pub fn start(&mut self, view: ExecView, router: &mut Router) -> Option<ExecOutcome> {
        debug_assert!(!self.busy());
        let d = view.op;
        match d.op {
            OpCode::Lui => Some(ExecOutcome::advance(&view, Some(d.imm))),
            OpCode::Auipc => Some(ExecOutcome::advance(
                &view,
                Some(view.addr.wrapping_add(d.imm)),
            )),
            OpCode::Jal => Some(ExecOutcome::jump(
                view.addr.wrapping_add(d.imm),
                Some(view.seq_pc()),
            )),
            OpCode::Jalr => Some(ExecOutcome::jump(
                view.rs1.wrapping_add(d.imm) & !1,
                Some(view.seq_pc()),
            )),
            OpCode::Beq
            | OpCode::Bne
            | OpCode::Blt
            | OpCode::Bge
            | OpCode::Bltu
            | OpCode::Bgeu => {
                if alu::branch_taken(d.op, view.rs1, view.rs2) {
                    Some(ExecOutcome::jump(view.addr.wrapping_add(d.imm), None))
                } else {
                    Some(ExecOutcome::advance(&view, None))
                }
            }
            OpCode::Addi
            | OpCode::Slti
            | OpCode::Sltiu
            | OpCode::Xori
            | OpCode::Ori
            | OpCode::Andi
            | OpCode::Slli
            | OpCode::Srli
            | OpCode::Srai => Some(ExecOutcome::advance(
                &view,
                Some(alu::alu(d.op, view.rs1, d.imm)),
            )),
            OpCode::Add
            | OpCode::Sub
            | OpCode::Sll
            | OpCode::Slt
            | OpCode::Sltu
            | OpCode::Xor
            | OpCode::Srl
            | OpCode::Sra
            | OpCode::Or
            | OpCode::And => Some(ExecOutcome::advance(
                &view,
                Some(alu::alu(d.op, view.rs1, view.rs2)),
            )),
            OpCode::Lb | OpCode::Lh | OpCode::Lw | OpCode::Lbu | OpCode::Lhu | OpCode::LrW => {
                let ea = view.rs1.wrapping_add(d.imm);
                let width = load_width(d.op);
                if ea & (width - 1) != 0 {
                    return Some(ExecOutcome::trap(
                        &view,
                        Exception::LoadAddressMisaligned,
                        ea,
                    ));
                }
                router.submit(
                    MasterId::Data,
                    BusRequest::read(ea, select_for(width), AccessKind::Load),
                );
                self.go_busy(view, ExecState::LoadWait { ea });
                None
            }
            OpCode::Sb | OpCode::Sh | OpCode::Sw | OpCode::ScW => {
                let ea = view.rs1.wrapping_add(d.imm);
                let width = store_width(d.op);
                if ea & (width - 1) != 0 {
                    return Some(ExecOutcome::trap(
                        &view,
                        Exception::StoreAddressMisaligned,
                        ea,
                    ));
                }
                router.submit(
                    MasterId::Data,
                    BusRequest::write(ea, view.rs2, select_for(width), AccessKind::Store),
                );
                // The reservation is always valid: there is a single data
                // master, so sc.w cannot lose it.
                let sc = d.op == OpCode::ScW;
                self.go_busy(view, ExecState::StoreWait { ea, sc });
                None
            }
            OpCode::AmoSwapW
            | OpCode::AmoAddW
            | OpCode::AmoXorW
            | OpCode::AmoAndW
            | OpCode::AmoOrW
            | OpCode::AmoMinW
            | OpCode::AmoMaxW
            | OpCode::AmoMinuW
            | OpCode::AmoMaxuW => {
                let ea = view.rs1;
                if ea & 3 != 0 {
                    return Some(ExecOutcome::trap(
                        &view,
                        Exception::StoreAddressMisaligned,
                        ea,
                    ));
                }
                router.submit(
                    MasterId::Data,
                    BusRequest::read(ea, 0b1111, AccessKind::Load),
                );
                self.go_busy(view, ExecState::AmoLoadWait { ea });
                None
            }
            OpCode::Csrrw
            | OpCode::Csrrs
            | OpCode::Csrrc
            | OpCode::Csrrwi
            | OpCode::Csrrsi
            | OpCode::Csrrci => {
                let csr = d.imm & 0xFFF;
                router.submit(
                    MasterId::Data,
                    BusRequest::read(CSR_BASE + csr, 0b1111, AccessKind::CsrRead),
                );
                self.go_busy(view, ExecState::CsrReadWait);
                None
            }
            OpCode::Mul
            | OpCode::Mulh
            | OpCode::Mulhsu
            | OpCode::Mulhu
            | OpCode::Div
            | OpCode::Divu
            | OpCode::Rem
            | OpCode::Remu => {
                self.muldiv.start(d.op, view.rs1, view.rs2);
                self.go_busy(view, ExecState::MulDivWait);
                None
            }
            OpCode::Fence | OpCode::Wfi => Some(ExecOutcome::advance(&view, None)),
            OpCode::FenceI => Some(ExecOutcome {
                fence_i: true,
                ..ExecOutcome::jump(view.seq_pc(), None)
            }),
            OpCode::Ecall => Some(ExecOutcome::trap(&view, Exception::EnvironmentCall, 0)),
            OpCode::Ebreak => Some(ExecOutcome::trap(&view, Exception::Breakpoint, view.addr)),
            OpCode::Mret => Some(ExecOutcome {
                trap_return: true,
                ..ExecOutcome::jump(0, None)
            }),
            OpCode::Illegal => Some(ExecOutcome::trap(
                &view,
                Exception::IllegalInstruction,
                view.raw,
            )),
        }
    }

    /// Advances a busy instruction one tick.
    ///
    /// Returns `Some` when it resolves.
    pub fn tick(&mut self, router: &mut Router) -> Option<ExecOutcome> {
        let view = self.view?;
        let d = view.op;
        let outcome = match self.state {
            ExecState::Idle => None,
            ExecState::MulDivWait => self
                .muldiv
                .tick()
                .map(|v| ExecOutcome::advance(&view, Some(v))),
            ExecState::LoadWait { ea } => {
                let (_, reply) = router.take_reply(MasterId::Data)?;
                if reply.fault {
                    Some(ExecOutcome::trap(&view, Exception::LoadAccessFault, ea))
                } else {
                    Some(ExecOutcome::advance(
                        &view,
                        Some(extract_load(d.op, reply.data)),
                    ))
                }
            }
            ExecState::StoreWait { ea, sc } => {
                let (_, reply) = router.take_reply(MasterId::Data)?;
                if reply.fault {
                    Some(ExecOutcome::trap(&view, Exception::StoreAccessFault, ea))
                } else {
                    Some(ExecOutcome::advance(&view, sc.then_some(0)))
                }
            }
            ExecState::AmoLoadWait { ea } => {
                let (_, reply) = router.take_reply(MasterId::Data)?;
                if reply.fault {
                    Some(ExecOutcome::trap(&view, Exception::StoreAccessFault, ea))
                } else {
                    let new = alu::amo(d.op, reply.data, view.rs2);
                    router.submit(
                        MasterId::Data,
                        BusRequest::write(ea, new, 0b1111, AccessKind::Store),
                    );
                    self.state = ExecState::AmoStoreWait {
                        loaded: reply.data,
                        ea,
                    };
                    None
                }
            }
            ExecState::AmoStoreWait { loaded, ea } => {
                let (_, reply) = router.take_reply(MasterId::Data)?;
                if reply.fault {
                    Some(ExecOutcome::trap(&view, Exception::StoreAccessFault, ea))
                } else {
                    Some(ExecOutcome::advance(&view, Some(loaded)))
                }
            }
            ExecState::CsrReadWait => {
                let (_, reply) = router.take_reply(MasterId::Data)?;
                if reply.fault {
                    Some(ExecOutcome::trap(
                        &view,
                        Exception::IllegalInstruction,
                        view.raw,
                    ))
                } else {
                    let old = reply.data;
                    match csr_write_value(d, view.rs1, old) {
                        Some(new) => {
                            let csr = d.imm & 0xFFF;
                            router.submit(
                                MasterId::Data,
                                BusRequest::write(
                                    CSR_BASE + csr,
                                    new,
                                    0b1111,
                                    AccessKind::CsrWrite,
                                ),
                            );
                            self.state = ExecState::CsrWriteWait { old };
                            None
                        }
                        None => Some(ExecOutcome::advance(&view, Some(old))),
                    }
                }
            }
            ExecState::CsrWriteWait { old } => {
                let (_, reply) = router.take_reply(MasterId::Data)?;
                if reply.fault {
                    Some(ExecOutcome::trap(
                        &view,
                        Exception::IllegalInstruction,
                        view.raw,
                    ))
                } else {
                    Some(ExecOutcome::advance(&view, Some(old)))
                }
            }
        };
        if outcome.is_some() {
            self.state = ExecState::Idle;
            self.view = None;
        }
        outcome
    }

    fn go_busy(&mut self, view: ExecView, state: ExecState) {
        self.view = Some(view);
        self.state = state;
    }
}

fn load_width(op: OpCode) -> u32 {
    match op {
        OpCode::Lb | OpCode::Lbu => 1,
        OpCode::Lh | OpCode::Lhu => 2,
        _ => 4,
    }
}

fn store_width(op: OpCode) -> u32 {
    match op {
        OpCode::Sb => 1,
        OpCode::Sh => 2,
        _ => 4,
    }
}

fn select_for(width: u32) -> u8 {
    match width {
        1 => 0b0001,
        2 => 0b0011,
        _ => 0b1111,
    }
}

fn extract_load(op: OpCode, data: u32) -> u32 {
    match op {
        OpCode::Lb => data as u8 as i8 as i32 as u32,
        OpCode::Lbu => data & 0xFF,
        OpCode::Lh => data as u16 as i16 as i32 as u32,
        OpCode::Lhu => data & 0xFFFF,
        _ => data,
    }
}

/// Computes the value a CSR instruction writes, or `None` when the ISA says
/// the write is suppressed (`csrrs`/`csrrc` with a zero source).
fn csr_write_value(d: DecodedOp, rs1_val: u32, old: u32) -> Option<u32> {
    let src = match d.op {
        OpCode::Csrrw | OpCode::Csrrs | OpCode::Csrrc => rs1_val,
        _ => u32::from(d.rs1),
    };
    match d.op {
        OpCode::Csrrw | OpCode::Csrrwi => Some(src),
        OpCode::Csrrs | OpCode::Csrrsi if d.rs1 != 0 => Some(old | src),
        OpCode::Csrrc | OpCode::Csrrci if d.rs1 != 0 => Some(old & !src),
        _ => None,
    }
}
