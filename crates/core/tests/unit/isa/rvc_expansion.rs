//! RVC expansion tests.
//!
//! Each case pairs a hand-assembled 16-bit encoding with the 32-bit
//! instruction it must expand to. Reserved and RV64-only encodings must
//! return `None`.

use pretty_assertions::assert_eq;
use rstest::rstest;

use rv32sim_core::isa::rvc::expand;

use crate::common::builder::instruction::*;

// ──────────────────────────────────────────────────────────
// 1. Quadrant 0
// ──────────────────────────────────────────────────────────

#[rstest]
#[case(0x1020, addi(8, 2, 40))] // c.addi4spn x8, 40
#[case(0x4044, lw(9, 8, 4))] // c.lw x9, 4(x8)
#[case(0xC404, sw(9, 8, 8))] // c.sw x9, 8(x8)
fn quadrant0_expands(#[case] inst: u16, #[case] expected: u32) {
    assert_eq!(expand(inst), Some(expected));
}

#[test]
fn addi4spn_with_zero_immediate_is_reserved() {
    assert_eq!(expand(0x0000), None);
}

// ──────────────────────────────────────────────────────────
// 2. Quadrant 1
// ──────────────────────────────────────────────────────────

#[rstest]
#[case(0x4095, addi(1, 0, 5))] // c.li x1, 5
#[case(0x0089, addi(1, 1, 2))] // c.addi x1, 2
#[case(0x0001, addi(0, 0, 0))] // c.nop
#[case(0x6285, lui(5, 1))] // c.lui x5, 1
#[case(0x72FD, lui(5, 0xFFFFF))] // c.lui x5, -1
#[case(0x8009, srli(8, 8, 2))] // c.srli x8, 2
#[case(0x986D, andi(8, 8, -5))] // c.andi x8, -5
#[case(0x8C05, sub(8, 8, 9))] // c.sub x8, x9
#[case(0xA011, jal(0, 4))] // c.j +4
#[case(0xC801, beq(8, 0, 16))] // c.beqz x8, +16
fn quadrant1_expands(#[case] inst: u16, #[case] expected: u32) {
    assert_eq!(expand(inst), Some(expected));
}

#[test]
fn addi16sp_with_zero_immediate_is_reserved() {
    // funct3=011, rd=x2, all immediate bits clear.
    assert_eq!(expand(0x6101), None);
}

#[test]
fn lui_with_zero_immediate_is_reserved() {
    assert_eq!(expand(0x6281), None);
}

// ──────────────────────────────────────────────────────────
// 3. Quadrant 2
// ──────────────────────────────────────────────────────────

#[rstest]
#[case(0x028E, slli(5, 5, 3))] // c.slli x5, 3
#[case(0x42A2, lw(5, 2, 8))] // c.lwsp x5, 8
#[case(0xC616, sw(5, 2, 12))] // c.swsp x5, 12
#[case(0x8082, jalr(0, 1, 0))] // c.jr x1 (ret)
#[case(0x852E, add(10, 0, 11))] // c.mv x10, x11
#[case(0x952E, add(10, 10, 11))] // c.add x10, x11
#[case(0x9082, jalr(1, 1, 0))] // c.jalr x1
#[case(0x9002, ebreak())] // c.ebreak
fn quadrant2_expands(#[case] inst: u16, #[case] expected: u32) {
    assert_eq!(expand(inst), Some(expected));
}

#[rstest]
#[case(0x1282)] // c.slli with shamt bit 5 set is RV64-only
#[case(0x4002)] // c.lwsp with rd=x0 is reserved
#[case(0x8002)] // c.jr with rs1=x0 is reserved
fn reserved_quadrant2_encodings_fail(#[case] inst: u16) {
    assert_eq!(expand(inst), None);
}

// ──────────────────────────────────────────────────────────
// 4. Floating-point quadrant slots are not implemented
// ──────────────────────────────────────────────────────────

#[rstest]
#[case(0x2000)] // c.fld
#[case(0xA000)] // c.fsd
#[case(0x2002)] // c.fldsp
fn float_encodings_fail(#[case] inst: u16) {
    assert_eq!(expand(inst), None);
}
