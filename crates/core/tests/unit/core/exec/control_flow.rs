//! Control-flow tests: branches, jumps, and their link values.

use pretty_assertions::assert_eq;
use rstest::rstest;

use rv32sim_core::soc::addr::FLASH_BASE;

use crate::common::builder::instruction::*;
use crate::common::TestContext;

/// Runs `branch x1, x2, +8` over a marker instruction; returns whether the
/// marker was skipped.
fn branch_skips(encode: fn(u32, u32, i32) -> u32, a: u32, b: u32) -> bool {
    let mut ctx = TestContext::new();
    let mut program = Vec::new();
    program.extend_from_slice(&li(1, a));
    program.extend_from_slice(&li(2, b));
    program.extend_from_slice(&[
        encode(1, 2, 8),
        addi(3, 0, 99), // skipped when the branch is taken
        ecall(),
    ]);
    ctx.load_program(&program);
    ctx.run_to_halt();
    ctx.reg(3) == 0
}

#[rstest]
#[case(beq, 5, 5, true)]
#[case(beq, 5, 6, false)]
#[case(bne, 5, 6, true)]
#[case(bne, 5, 5, false)]
#[case(blt, 0xFFFF_FFFF, 0, true)] // -1 < 0
#[case(blt, 0, 0xFFFF_FFFF, false)]
#[case(bge, 0, 0xFFFF_FFFF, true)]
#[case(bltu, 0, 0xFFFF_FFFF, true)] // unsigned flips it
#[case(bltu, 0xFFFF_FFFF, 0, false)]
#[case(bgeu, 0xFFFF_FFFF, 0, true)]
fn branch_conditions(
    #[case] encode: fn(u32, u32, i32) -> u32,
    #[case] a: u32,
    #[case] b: u32,
    #[case] taken: bool,
) {
    assert_eq!(branch_skips(encode, a, b), taken);
}

#[test]
fn backward_branch_loops() {
    let mut ctx = TestContext::new();
    ctx.load_program(&[
        addi(1, 0, 0),
        addi(2, 0, 5),
        addi(1, 1, 1),   // loop body
        blt(1, 2, -4),   // back to the body
        ecall(),
    ]);
    ctx.run_to_halt();
    assert_eq!(ctx.reg(1), 5);
}

#[test]
fn jal_links_past_the_jump() {
    let mut ctx = TestContext::new();
    ctx.load_program(&[
        jal(1, 8),      // to FLASH_BASE + 8
        addi(3, 0, 99), // skipped
        addi(4, 0, 1),
        ecall(),
    ]);
    ctx.run_to_halt();
    assert_eq!(ctx.reg(1), FLASH_BASE + 4);
    assert_eq!(ctx.reg(3), 0);
    assert_eq!(ctx.reg(4), 1);
}

#[test]
fn jalr_clears_bit_zero_of_the_target() {
    let mut ctx = TestContext::new();
    ctx.load_program(&[
        auipc(5, 0),        // FLASH_BASE
        addi(5, 5, 0x11),   // odd target; jalr must land on 0x10
        jalr(6, 5, 0),
        addi(3, 0, 99),     // at 0xC, skipped
        addi(4, 0, 1),      // at 0x10
        ecall(),
    ]);
    ctx.run_to_halt();
    assert_eq!(ctx.reg(4), 1);
    assert_eq!(ctx.reg(3), 0);
    assert_eq!(ctx.reg(6), FLASH_BASE + 0xC);
}

#[test]
fn fence_and_wfi_are_no_ops() {
    let mut ctx = TestContext::new();
    ctx.load_program(&[addi(1, 0, 1), fence(), wfi(), addi(2, 0, 2), ecall()]);
    ctx.run_to_halt();
    assert_eq!(ctx.reg(1), 1);
    assert_eq!(ctx.reg(2), 2);
}

#[test]
fn fence_i_refetches_the_stream_and_continues() {
    let mut ctx = TestContext::new();
    ctx.load_program(&[addi(1, 0, 1), fence_i(), addi(2, 0, 2), ecall()]);
    ctx.run_to_halt();
    assert_eq!(ctx.reg(1), 1);
    assert_eq!(ctx.reg(2), 2);
    assert!(ctx.sim.stats().flushes >= 1, "fence.i flushes the pipeline");
}
