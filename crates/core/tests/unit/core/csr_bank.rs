//! CSR bank tests: reset state, write masks, the MIE/MPIE stack, and the
//! wired performance counters.

use pretty_assertions::assert_eq;

use rv32sim_core::core::csr::{csr_num, CounterEvent, CsrFile};
use rv32sim_core::soc::addr::TRAP_VECTOR_UNSET;
use rv32sim_core::soc::devices::Backend;

#[test]
fn mtvec_resets_to_the_unset_sentinel() {
    let csr = CsrFile::new(1);
    assert_eq!(csr.read_raw(csr_num::MTVEC), Some(TRAP_VECTOR_UNSET));
}

#[test]
fn mstatus_write_keeps_only_mie_and_mpie() {
    let mut csr = CsrFile::new(1);
    assert!(!csr.write(csr_num::MSTATUS, 0b1111, 0xFFFF_FFFF).fault);
    assert_eq!(csr.read_raw(csr_num::MSTATUS), Some((1 << 3) | (1 << 7)));
}

#[test]
fn mie_write_keeps_only_machine_timer_and_external_bits() {
    let mut csr = CsrFile::new(1);
    assert!(!csr.write(csr_num::MIE, 0b1111, 0xFFFF_FFFF).fault);
    assert_eq!(csr.read_raw(csr_num::MIE), Some((1 << 7) | (1 << 11)));
}

#[test]
fn mepc_write_clears_bit_zero() {
    let mut csr = CsrFile::new(1);
    assert!(!csr.write(csr_num::MEPC, 0b1111, 0x0060_0005).fault);
    assert_eq!(csr.read_raw(csr_num::MEPC), Some(0x0060_0004));
}

#[test]
fn mip_is_line_driven_and_write_ignored() {
    let mut csr = CsrFile::new(1);
    csr.set_irq_lines(true, false);
    assert_eq!(csr.read_raw(csr_num::MIP), Some(1 << 7));

    assert!(!csr.write(csr_num::MIP, 0b1111, 0).fault, "write is acked");
    assert_eq!(csr.read_raw(csr_num::MIP), Some(1 << 7), "but ignored");

    csr.set_irq_lines(false, true);
    assert_eq!(csr.read_raw(csr_num::MIP), Some(1 << 11));
}

#[test]
fn unknown_csr_numbers_fault() {
    let mut csr = CsrFile::new(1);
    assert!(csr.read(0x7C0, 0b1111).fault);
    assert!(csr.write(0x7C0, 0b1111, 1).fault);
}

#[test]
fn read_only_ids_accept_reads_but_not_writes() {
    let mut csr = CsrFile::new(1);
    assert_eq!(csr.read_raw(csr_num::MHARTID), Some(0));
    assert!(csr.write(csr_num::MVENDORID, 0b1111, 5).fault);
}

// ──────────────────────────────────────────────────────────
// Trap entry and return
// ──────────────────────────────────────────────────────────

#[test]
fn trap_enter_stacks_mie_into_mpie() {
    let mut csr = CsrFile::new(1);
    assert!(!csr.write(csr_num::MSTATUS, 0b1111, 1 << 3).fault);
    assert!(!csr.write(csr_num::MIE, 0b1111, 1 << 7).fault);
    assert!(csr.timer_irq_enabled());

    csr.trap_enter();
    assert!(!csr.timer_irq_enabled(), "MIE cleared during the handler");
    assert_eq!(csr.read_raw(csr_num::MSTATUS), Some(1 << 7));
}

#[test]
fn trap_return_restores_mie_and_yields_mepc() {
    let mut csr = CsrFile::new(1);
    assert!(!csr.write(csr_num::MSTATUS, 0b1111, 1 << 3).fault);
    assert!(!csr.write(csr_num::MEPC, 0b1111, 0x0060_0010).fault);
    csr.trap_enter();

    let resume = csr.trap_return();
    assert_eq!(resume, 0x0060_0010);
    assert_eq!(
        csr.read_raw(csr_num::MSTATUS),
        Some((1 << 3) | (1 << 7)),
        "MIE back from MPIE, MPIE set"
    );
}

// ──────────────────────────────────────────────────────────
// Counters
// ──────────────────────────────────────────────────────────

#[test]
fn cycle_and_instret_tick_independently() {
    let mut csr = CsrFile::new(1);
    csr.cycle_tick();
    csr.cycle_tick();
    csr.retire();
    assert_eq!(csr.read_raw(csr_num::MCYCLE), Some(2));
    assert_eq!(csr.read_raw(csr_num::MINSTRET), Some(1));
}

#[test]
fn event_pulses_land_in_their_wired_counter() {
    let mut csr = CsrFile::new(1);
    csr.pulse(CounterEvent::CacheHit);
    csr.pulse(CounterEvent::CacheHit);
    csr.pulse(CounterEvent::StoreRam);

    // CacheHit is event 2 -> mhpmcounter5; StoreRam is event 5 -> mhpmcounter8.
    assert_eq!(csr.read_raw(csr_num::MHPMCOUNTER3 + 2), Some(2));
    assert_eq!(csr.read_raw(csr_num::MHPMCOUNTER3 + 5), Some(1));
    assert_eq!(csr.read_raw(csr_num::MHPMCOUNTER3), Some(0));
}

#[test]
fn counters_are_writable_in_halves() {
    let mut csr = CsrFile::new(1);
    assert!(!csr.write(csr_num::MCYCLEH, 0b1111, 1).fault);
    assert!(!csr.write(csr_num::MCYCLE, 0b1111, 5).fault);
    csr.cycle_tick();
    assert_eq!(csr.read_raw(csr_num::MCYCLE), Some(6));
    assert_eq!(csr.read_raw(csr_num::MCYCLEH), Some(1));
}
