//! Load/store tests: widths, sign extension, partial stores, and I/O-space
//! accesses.

use pretty_assertions::assert_eq;

use rv32sim_core::soc::addr::{IO_BASE, RAM_BASE};

use crate::common::builder::instruction::*;
use crate::common::TestContext;

#[test]
fn load_widths_and_sign_extension() {
    let mut ctx = TestContext::new();
    let mut program = Vec::new();
    program.extend_from_slice(&li(5, RAM_BASE));
    program.extend_from_slice(&li(6, 0x89AB_CDEF));
    program.extend_from_slice(&[
        sw(6, 5, 0),
        lw(7, 5, 0),
        lb(8, 5, 0),   // 0xEF sign-extends
        lbu(9, 5, 1),  // 0xCD zero-extends
        lh(10, 5, 2),  // 0x89AB sign-extends
        lhu(11, 5, 2), // 0x89AB zero-extends
        ecall(),
    ]);
    ctx.load_program(&program);
    ctx.run_to_halt();
    assert_eq!(ctx.reg(7), 0x89AB_CDEF);
    assert_eq!(ctx.reg(8), 0xFFFF_FFEF);
    assert_eq!(ctx.reg(9), 0x0000_00CD);
    assert_eq!(ctx.reg(10), 0xFFFF_89AB);
    assert_eq!(ctx.reg(11), 0x0000_89AB);
}

#[test]
fn partial_stores_merge_into_the_word() {
    let mut ctx = TestContext::new();
    let mut program = Vec::new();
    program.extend_from_slice(&li(5, RAM_BASE));
    program.extend_from_slice(&li(6, 0x1122_3344));
    program.extend_from_slice(&li(7, 0xAA));
    program.extend_from_slice(&li(8, 0xBBCC));
    program.extend_from_slice(&[
        sw(6, 5, 0),
        sb(7, 5, 0),
        sh(8, 5, 2),
        ecall(),
    ]);
    ctx.load_program(&program);
    ctx.run_to_halt();
    assert_eq!(
        ctx.sim.router_mut().peek_word(RAM_BASE),
        Some(0xBBCC_33AA)
    );
}

#[test]
fn negative_offsets_address_backwards() {
    let mut ctx = TestContext::new();
    let mut program = Vec::new();
    program.extend_from_slice(&li(5, RAM_BASE + 16));
    program.extend_from_slice(&li(6, 77));
    program.extend_from_slice(&[
        sw(6, 5, -8),
        lw(7, 5, -8),
        ecall(),
    ]);
    ctx.load_program(&program);
    ctx.run_to_halt();
    assert_eq!(ctx.reg(7), 77);
    assert_eq!(ctx.sim.router_mut().peek_word(RAM_BASE + 8), Some(77));
}

#[test]
fn loads_from_flash_read_the_program_image() {
    let mut ctx = TestContext::new();
    let mut program = Vec::new();
    program.extend_from_slice(&li(5, 0x0060_0000));
    program.extend_from_slice(&[
        lw(6, 5, 0), // first word of this very program
        ecall(),
    ]);
    ctx.load_program(&program);
    ctx.run_to_halt();
    assert_eq!(ctx.reg(6), li(5, 0x0060_0000)[0]);
}

#[test]
fn uart_reads_and_writes_go_through_the_io_window() {
    let mut ctx = TestContext::new();
    ctx.sim.push_uart_rx(b'Z');
    let mut program = Vec::new();
    program.extend_from_slice(&li(5, IO_BASE));
    program.extend_from_slice(&[
        lbu(6, 5, 0), // status: rx available
        lbu(7, 5, 1), // pop the byte
        sb(7, 5, 0),  // echo it back out
        lbu(8, 5, 0), // status: drained
        ecall(),
    ]);
    ctx.load_program(&program);
    ctx.run_to_halt();
    assert_eq!(ctx.reg(6), 1);
    assert_eq!(ctx.reg(7), u32::from(b'Z'));
    assert_eq!(ctx.reg(8), 0);
    assert_eq!(ctx.sim.take_uart_tx(), b"Z");
}

#[test]
fn timer_registers_are_loadable_from_the_io_window() {
    let mut ctx = TestContext::new();
    let mut program = Vec::new();
    program.extend_from_slice(&li(5, IO_BASE + 0x4000));
    program.extend_from_slice(&li(6, 500));
    program.extend_from_slice(&[
        sw(0, 5, 12), // mtimecmp high = 0
        sw(6, 5, 8),  // mtimecmp low = 500
        lw(7, 5, 8),
        lw(8, 5, 0), // mtime low, small this early
        ecall(),
    ]);
    ctx.load_program(&program);
    ctx.run_to_halt();
    assert_eq!(ctx.reg(7), 500);
    assert!(ctx.reg(8) < 500, "mtime is still early in the run");
}
