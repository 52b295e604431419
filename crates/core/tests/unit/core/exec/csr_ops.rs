//! Zicsr instruction tests: read/write, set/clear, immediate forms, and the
//! write-suppression rules.

use pretty_assertions::assert_eq;

use rv32sim_core::core::csr::csr_num;

use crate::common::builder::instruction::*;
use crate::common::TestContext;

#[test]
fn csrrw_swaps_old_for_new() {
    let mut ctx = TestContext::new();
    let mut program = Vec::new();
    program.extend_from_slice(&li(1, 0xDEAD_BEEF));
    program.extend_from_slice(&li(2, 0x1234_5678));
    program.extend_from_slice(&[
        csrrw(0, csr_num::MSCRATCH, 1),
        csrrw(3, csr_num::MSCRATCH, 2), // x3 = old value
        ecall(),
    ]);
    ctx.load_program(&program);
    ctx.run_to_halt();
    assert_eq!(ctx.reg(3), 0xDEAD_BEEF);
    assert_eq!(ctx.csr(csr_num::MSCRATCH), 0x1234_5678);
}

#[test]
fn csrrs_and_csrrc_mask_bits() {
    let mut ctx = TestContext::new();
    let mut program = Vec::new();
    program.extend_from_slice(&li(1, 0xF0)); // set bits 4..8
    program.extend_from_slice(&li(2, 0x30)); // then clear bits 4..6
    program.extend_from_slice(&[
        csrrs(0, csr_num::MSCRATCH, 1),
        csrrc(3, csr_num::MSCRATCH, 2), // x3 = 0xF0
        csrrs(4, csr_num::MSCRATCH, 0), // read-only: x4 = 0xC0
        ecall(),
    ]);
    ctx.load_program(&program);
    ctx.run_to_halt();
    assert_eq!(ctx.reg(3), 0xF0);
    assert_eq!(ctx.reg(4), 0xC0);
    assert_eq!(ctx.csr(csr_num::MSCRATCH), 0xC0);
}

#[test]
fn immediate_forms_use_zimm() {
    let mut ctx = TestContext::new();
    ctx.load_program(&[
        csrrwi(0, csr_num::MSCRATCH, 0x15),
        csrrsi(1, csr_num::MSCRATCH, 0x0A), // x1 = 0x15
        csrrci(2, csr_num::MSCRATCH, 0x01), // x2 = 0x1F
        csrrsi(3, csr_num::MSCRATCH, 0),    // zimm 0: pure read, x3 = 0x1E
        ecall(),
    ]);
    ctx.run_to_halt();
    assert_eq!(ctx.reg(1), 0x15);
    assert_eq!(ctx.reg(2), 0x1F);
    assert_eq!(ctx.reg(3), 0x1E);
    assert_eq!(ctx.csr(csr_num::MSCRATCH), 0x1E);
}

#[test]
fn csrrs_with_x0_never_writes_even_read_only_csrs() {
    let mut ctx = TestContext::new();
    // mhartid is read-only; a suppressed write must not fault.
    ctx.load_program(&[csrrs(1, csr_num::MHARTID, 0), addi(2, 0, 7), ecall()]);
    ctx.run_to_halt();
    assert_eq!(ctx.reg(1), 0);
    assert_eq!(ctx.reg(2), 7, "no trap was taken on the way here");
    assert_eq!(ctx.csr(csr_num::MCAUSE), 11, "only the final ecall trapped");
}

#[test]
fn csr_write_to_a_read_only_register_traps_illegal() {
    let mut ctx = TestContext::new();
    ctx.load_program(&[csrrwi(1, csr_num::MHARTID, 1), addi(2, 0, 7), ecall()]);
    ctx.run_to_halt();
    assert_eq!(ctx.csr(csr_num::MCAUSE), 2, "illegal instruction");
    assert_eq!(ctx.reg(2), 0, "the trap preempted the rest of the program");
}

#[test]
fn unknown_csr_number_traps_illegal() {
    let mut ctx = TestContext::new();
    ctx.load_program(&[csrrs(1, 0x7C0, 0), ecall()]);
    ctx.run_to_halt();
    assert_eq!(ctx.csr(csr_num::MCAUSE), 2);
}

#[test]
fn cycle_counter_is_reachable_through_the_window() {
    let mut ctx = TestContext::new();
    ctx.load_program(&[csrrs(1, csr_num::MCYCLE, 0), ecall()]);
    ctx.run_to_halt();
    assert!(ctx.reg(1) > 0, "mcycle has been ticking since reset");
    assert!(u64::from(ctx.reg(1)) <= ctx.sim.stats().cycles);
}
