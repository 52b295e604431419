//! Whole-machine program runs: cache behavior over loops, the architectural
//! counters, and mixed compressed streams.

use pretty_assertions::assert_eq;

use rv32sim_core::config::Config;
use rv32sim_core::core::csr::csr_num;
use rv32sim_core::sim::RunExit;
use rv32sim_core::soc::addr::{FLASH_BASE, RAM_BASE};

use crate::common::builder::instruction::*;
use crate::common::builder::program::ProgramImage;
use crate::common::TestContext;

#[test]
fn loop_body_hits_the_decode_cache_on_later_passes() {
    let mut ctx = TestContext::new();
    ctx.load_program(&[
        addi(1, 0, 0),
        addi(2, 0, 4),
        addi(1, 1, 1), // loop body
        blt(1, 2, -4),
        ecall(),
    ]);
    ctx.run_to_halt();
    assert_eq!(ctx.reg(1), 4);
    let stats = ctx.sim.stats();
    assert!(
        stats.dcache_hits > 0,
        "refetched body comes out of the decode cache"
    );
    assert!(stats.flushes >= 3, "each taken branch flushes");
}

#[test]
fn architectural_counters_track_the_run() {
    let mut ctx = TestContext::new();
    ctx.load_program(&[
        addi(1, 0, 1),
        addi(2, 0, 2),
        add(3, 1, 2),
        ecall(),
    ]);
    ctx.run_to_halt();
    let stats = ctx.sim.stats().clone();
    assert_eq!(u64::from(ctx.csr(csr_num::MCYCLE)), stats.cycles);
    assert_eq!(
        u64::from(ctx.csr(csr_num::MINSTRET)),
        stats.instructions_retired
    );
    // Event 0 of the wired counters: instructions retired from flash. The
    // whole program lives there.
    assert_eq!(
        u64::from(ctx.csr(csr_num::MHPMCOUNTER3)),
        stats.instructions_retired
    );
    assert_eq!(stats.instructions_retired, 3, "the ecall itself trapped");
}

#[test]
fn compressed_stream_executes_in_place() {
    let mut ctx = TestContext::new();
    let image = ProgramImage::new()
        .half(0x4095) // c.li x1, 5
        .half(0x0089) // c.addi x1, 2
        .word(ecall())
        .build();
    ctx.load_bytes(FLASH_BASE, &image);
    ctx.run_to_halt();
    assert_eq!(ctx.reg(1), 7);
    assert_eq!(
        ctx.csr(csr_num::MEPC),
        FLASH_BASE + 4,
        "the ecall sits after two halfword encodings"
    );
}

#[test]
fn fence_i_publishes_stores_into_the_instruction_stream() {
    let mut ctx = TestContext::new();
    let mut program = Vec::new();
    // Stage a two-instruction routine in RAM: set x10, return through x1.
    program.extend_from_slice(&li(5, RAM_BASE));
    program.extend_from_slice(&li(6, addi(10, 0, 1)));
    program.push(sw(6, 5, 0));
    program.extend_from_slice(&li(7, jalr(0, 1, 0)));
    program.push(sw(7, 5, 4));
    // First call pulls the routine into the fetch caches.
    program.push(jalr(1, 5, 0));
    program.push(addi(11, 10, 0));
    // Patch the routine in place. The caches still hold the old encoding,
    // so the second call must not run until fence.i invalidates them.
    program.extend_from_slice(&li(8, addi(10, 0, 2)));
    program.push(sw(8, 5, 0));
    program.push(fence_i());
    program.push(jalr(1, 5, 0));
    program.push(ecall());
    ctx.load_program(&program);
    ctx.run_to_halt();
    assert_eq!(ctx.reg(11), 1, "first call ran the staged encoding");
    assert_eq!(ctx.reg(10), 2, "second call ran the patched encoding");
}

#[test]
fn cache_geometry_never_changes_architectural_results() {
    // A loop with memory traffic and taken branches, run under wildly
    // different cache geometries. Caches may change the timing, never the
    // registers or the retire count.
    fn run_with_lines(lines: usize) -> ([u32; 4], u32) {
        let mut config = Config::default();
        config.pipeline.cache_lines = lines;
        let mut ctx = TestContext::with_config(config);
        let mut program = Vec::new();
        program.extend_from_slice(&li(1, 0));
        program.extend_from_slice(&li(2, 5));
        program.extend_from_slice(&li(5, RAM_BASE));
        program.extend_from_slice(&[
            addi(1, 1, 1), // loop body
            sw(1, 5, 0),
            lw(3, 5, 0),
            add(4, 4, 3),
            blt(1, 2, -16),
            ecall(),
        ]);
        ctx.load_program(&program);
        ctx.run_to_halt();
        (
            [ctx.reg(1), ctx.reg(2), ctx.reg(3), ctx.reg(4)],
            ctx.csr(csr_num::MINSTRET),
        )
    }

    let reference = run_with_lines(64);
    assert_eq!(reference.0, [5, 5, 5, 15]);
    assert_eq!(run_with_lines(2), reference, "two-line cache thrashes");
    assert_eq!(run_with_lines(8), reference);
}

#[test]
fn spin_loop_runs_out_the_tick_budget() {
    let mut ctx = TestContext::new();
    ctx.load_program(&[jal(0, 0)]);
    assert_eq!(ctx.run(1_000), RunExit::TickLimit);
    assert_eq!(ctx.sim.stats().cycles, 1_000);
    assert!(ctx.sim.stats().instructions_retired > 0);
}
