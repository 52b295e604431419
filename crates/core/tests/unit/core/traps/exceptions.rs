//! Synchronous exception tests: vectoring, mepc/mcause/mtval contents, and
//! the mret round trip.
//!
//! Programs that expect to halt leave `mtvec` at its reset value; the first
//! trap then stops the simulation with the trap CSRs already written, so the
//! assertions read them back afterwards.

use pretty_assertions::assert_eq;

use rv32sim_core::core::csr::csr_num;
use rv32sim_core::soc::addr::{FLASH_BASE, RAM_BASE};

use crate::common::builder::instruction::*;
use crate::common::TestContext;

#[test]
fn ecall_vectors_to_the_handler() {
    let mut ctx = TestContext::new();
    let handler = FLASH_BASE + 6 * 4;
    let mut program = Vec::new();
    program.extend_from_slice(&li(5, handler)); // words 0..2
    program.extend_from_slice(&[
        csrrw(0, csr_num::MTVEC, 5), // word 2
        ecall(),                     // word 3, the trapping instruction
        addi(9, 0, 1),               // never reached
        ecall(),
    ]);
    // Handler: capture the trap CSRs, then unset mtvec and halt.
    program.extend_from_slice(&[
        csrrs(20, csr_num::MCAUSE, 0),
        csrrs(21, csr_num::MEPC, 0),
        addi(8, 0, -1),
        csrrw(0, csr_num::MTVEC, 8),
        ecall(),
    ]);
    ctx.load_program(&program);
    ctx.run_to_halt();
    assert_eq!(ctx.reg(20), 11, "environment call from M-mode");
    assert_eq!(ctx.reg(21), FLASH_BASE + 3 * 4, "mepc is the ecall itself");
    assert_eq!(ctx.reg(9), 0, "the instruction after the ecall never ran");
}

#[test]
fn mret_resumes_past_the_trap() {
    let mut ctx = TestContext::new();
    let handler = FLASH_BASE + 8 * 4;
    let mut program = Vec::new();
    program.extend_from_slice(&li(5, handler));
    program.extend_from_slice(&[
        csrrw(0, csr_num::MTVEC, 5),
        ecall(),          // word 3
        addi(2, 0, 7),    // word 4, resumed here
        ecall(),          // halts, mtvec unset again by the handler
        addi(0, 0, 0),
        addi(0, 0, 0),
    ]);
    // Handler: bump mepc past the ecall, unset mtvec, return.
    program.extend_from_slice(&[
        csrrs(21, csr_num::MEPC, 0),
        addi(21, 21, 4),
        csrrw(0, csr_num::MEPC, 21),
        addi(8, 0, -1),
        csrrw(0, csr_num::MTVEC, 8),
        mret(),
    ]);
    ctx.load_program(&program);
    ctx.run_to_halt();
    assert_eq!(ctx.reg(2), 7, "execution resumed at mepc + 4");
    assert_eq!(ctx.reg(21), FLASH_BASE + 4 * 4);
    assert_eq!(ctx.csr(csr_num::MCAUSE), 11, "the halting ecall");
}

#[test]
fn misaligned_load_reports_the_effective_address() {
    let mut ctx = TestContext::new();
    let mut program = Vec::new();
    program.extend_from_slice(&li(5, RAM_BASE + 1));
    program.push(lw(6, 5, 0));
    program.push(ecall());
    ctx.load_program(&program);
    ctx.run_to_halt();
    assert_eq!(ctx.csr(csr_num::MCAUSE), 4);
    assert_eq!(ctx.csr(csr_num::MTVAL), RAM_BASE + 1);
    assert_eq!(ctx.csr(csr_num::MEPC), FLASH_BASE + 2 * 4);
}

#[test]
fn misaligned_halfword_store_traps() {
    let mut ctx = TestContext::new();
    let mut program = Vec::new();
    program.extend_from_slice(&li(5, RAM_BASE));
    program.push(sh(6, 5, 1));
    program.push(ecall());
    ctx.load_program(&program);
    ctx.run_to_halt();
    assert_eq!(ctx.csr(csr_num::MCAUSE), 6);
    assert_eq!(ctx.csr(csr_num::MTVAL), RAM_BASE + 1);
}

#[test]
fn store_to_flash_is_an_access_fault() {
    let mut ctx = TestContext::new();
    let mut program = Vec::new();
    program.extend_from_slice(&li(5, FLASH_BASE));
    program.extend_from_slice(&li(6, 1));
    program.push(sw(6, 5, 0));
    program.push(ecall());
    ctx.load_program(&program);
    ctx.run_to_halt();
    assert_eq!(ctx.csr(csr_num::MCAUSE), 7);
    assert_eq!(ctx.csr(csr_num::MTVAL), FLASH_BASE);
}

#[test]
fn load_from_an_unmapped_address_is_an_access_fault() {
    let mut ctx = TestContext::new();
    let mut program = Vec::new();
    program.extend_from_slice(&li(5, 0x1000_0000));
    program.push(lw(6, 5, 0));
    program.push(ecall());
    ctx.load_program(&program);
    ctx.run_to_halt();
    assert_eq!(ctx.csr(csr_num::MCAUSE), 5);
    assert_eq!(ctx.csr(csr_num::MTVAL), 0x1000_0000);
}

#[test]
fn illegal_encoding_traps_with_the_raw_word() {
    let mut ctx = TestContext::new();
    ctx.load_program(&[addi(1, 0, 3), 0xFFFF_FFFF, ecall()]);
    ctx.run_to_halt();
    assert_eq!(ctx.csr(csr_num::MCAUSE), 2);
    assert_eq!(ctx.csr(csr_num::MTVAL), 0xFFFF_FFFF);
    assert_eq!(ctx.reg(1), 3, "instructions before the trap still retired");
}

#[test]
fn ebreak_reports_its_own_address() {
    let mut ctx = TestContext::new();
    ctx.load_program(&[addi(1, 0, 1), ebreak(), ecall()]);
    ctx.run_to_halt();
    assert_eq!(ctx.csr(csr_num::MCAUSE), 3);
    assert_eq!(ctx.csr(csr_num::MTVAL), FLASH_BASE + 4);
    assert_eq!(ctx.csr(csr_num::MEPC), FLASH_BASE + 4);
}

#[test]
fn ecall_leaves_mtval_alone() {
    let mut ctx = TestContext::new();
    ctx.load_program(&[ecall()]);
    ctx.run_to_halt();
    assert_eq!(ctx.csr(csr_num::MCAUSE), 11);
    assert_eq!(ctx.csr(csr_num::MTVAL), 0, "untouched since reset");
}
