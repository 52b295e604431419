//! Machine-mode CSR bank.
//!
//! The bank is a bus backend: software reaches it only through the router's
//! CSR window, where the local offset is the 12-bit CSR number. It provides:
//! 1. **Trap registers:** `mstatus` (MIE/MPIE), `mie`, `mip`, `mtvec`,
//!    `mscratch`, `mepc`, `mcause`, `mtval`.
//! 2. **Counters:** `mcycle`, `minstret`, and `mhpmcounter3..14` wired to
//!    fixed event sources.
//! 3. **Side channels:** interrupt line levels into `mip`, the MIE/MPIE
//!    stack for trap entry and `mret`, and counter event pulses. These model
//!    dedicated hardware paths and do not go through the bus.

use crate::common::BusReply;
use crate::soc::addr::TRAP_VECTOR_UNSET;
use crate::soc::devices::Backend;

/// CSR numbers the bank decodes.
#[allow(missing_docs)]
pub mod csr_num {
    pub const MSTATUS: u32 = 0x300;
    pub const MISA: u32 = 0x301;
    pub const MIE: u32 = 0x304;
    pub const MTVEC: u32 = 0x305;
    pub const MSCRATCH: u32 = 0x340;
    pub const MEPC: u32 = 0x341;
    pub const MCAUSE: u32 = 0x342;
    pub const MTVAL: u32 = 0x343;
    pub const MIP: u32 = 0x344;
    pub const MCYCLE: u32 = 0xB00;
    pub const MINSTRET: u32 = 0xB02;
    pub const MHPMCOUNTER3: u32 = 0xB03;
    pub const MCYCLEH: u32 = 0xB80;
    pub const MINSTRETH: u32 = 0xB82;
    pub const MHPMCOUNTER3H: u32 = 0xB83;
    pub const MVENDORID: u32 = 0xF11;
    pub const MARCHID: u32 = 0xF12;
    pub const MIMPID: u32 = 0xF13;
    pub const MHARTID: u32 = 0xF14;
}

/// `mstatus.MIE` bit.
const MSTATUS_MIE: u32 = 1 << 3;
/// `mstatus.MPIE` bit.
const MSTATUS_MPIE: u32 = 1 << 7;
/// `mip`/`mie` machine timer interrupt bit.
const MIX_MTIP: u32 = 1 << 7;
/// `mip`/`mie` machine external interrupt bit.
const MIX_MEIP: u32 = 1 << 11;

/// `misa`: RV32 (MXL=1) with I, M, A, C.
const MISA_VALUE: u32 = (1 << 30) | (1 << 8) | (1 << 12) | 1 | (1 << 2);

/// Number of wired `mhpmcounter` event counters (3 through 14).
pub const HPM_COUNTERS: usize = 12;

/// Event sources for the wired performance counters.
///
/// The discriminant is the counter offset: event `n` increments
/// `mhpmcounter(3 + n)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum CounterEvent {
    /// Instruction retired whose fetch address was in flash.
    RetiredFromFlash = 0,
    /// Instruction retired whose fetch address was in RAM.
    RetiredFromRam = 1,
    /// Fetch satisfied by the instruction/decode cache.
    CacheHit = 2,
    /// Load completed against flash.
    LoadFlash = 3,
    /// Load completed against RAM.
    LoadRam = 4,
    /// Store completed against RAM.
    StoreRam = 5,
    /// Load completed against the I/O block.
    LoadIo = 6,
    /// Store completed against the I/O block.
    StoreIo = 7,
    /// CSR read transaction completed.
    CsrRead = 8,
    /// CSR write transaction completed.
    CsrWrite = 9,
    /// Timer interrupt taken.
    TimerIrq = 10,
    /// External interrupt taken.
    ExternalIrq = 11,
}

/// The machine-mode CSR bank.
#[derive(Debug)]
pub struct CsrFile {
    mstatus: u32,
    mie: u32,
    mip: u32,
    mtvec: u32,
    mscratch: u32,
    mepc: u32,
    mcause: u32,
    mtval: u32,
    mcycle: u64,
    minstret: u64,
    hpm: [u64; HPM_COUNTERS],
    latency: u32,
}

impl CsrFile {
    /// Creates the bank in its reset state (`mtvec` holds the unset
    /// sentinel, everything else zero).
    pub fn new(latency: u32) -> Self {
        Self {
            mstatus: 0,
            mie: 0,
            mip: 0,
            mtvec: TRAP_VECTOR_UNSET,
            mscratch: 0,
            mepc: 0,
            mcause: 0,
            mtval: 0,
            mcycle: 0,
            minstret: 0,
            hpm: [0; HPM_COUNTERS],
            latency,
        }
    }

    /// Mirrors the interrupt line levels into `mip`.
    pub fn set_irq_lines(&mut self, timer: bool, external: bool) {
        self.mip = (self.mip & !(MIX_MTIP | MIX_MEIP))
            | if timer { MIX_MTIP } else { 0 }
            | if external { MIX_MEIP } else { 0 };
    }

    /// Whether a pending timer interrupt may be taken.
    pub fn timer_irq_enabled(&self) -> bool {
        self.mstatus & MSTATUS_MIE != 0 && self.mie & MIX_MTIP != 0
    }

    /// Whether a pending external interrupt may be taken.
    pub fn external_irq_enabled(&self) -> bool {
        self.mstatus & MSTATUS_MIE != 0 && self.mie & MIX_MEIP != 0
    }

    /// MIE/MPIE shuffle on trap entry: save MIE into MPIE, clear MIE.
    pub fn trap_enter(&mut self) {
        let mie = self.mstatus & MSTATUS_MIE != 0;
        self.mstatus &= !(MSTATUS_MIE | MSTATUS_MPIE);
        if mie {
            self.mstatus |= MSTATUS_MPIE;
        }
    }

    /// `mret`: restore MIE from MPIE, set MPIE, return the resume PC.
    pub fn trap_return(&mut self) -> u32 {
        let mpie = self.mstatus & MSTATUS_MPIE != 0;
        self.mstatus |= MSTATUS_MPIE;
        self.mstatus &= !MSTATUS_MIE;
        if mpie {
            self.mstatus |= MSTATUS_MIE;
        }
        self.mepc
    }

    /// Increments `mcycle`; called once per simulator tick.
    pub fn cycle_tick(&mut self) {
        self.mcycle = self.mcycle.wrapping_add(1);
    }

    /// Increments `minstret`; called once per retired instruction.
    pub fn retire(&mut self) {
        self.minstret = self.minstret.wrapping_add(1);
    }

    /// Increments the wired performance counter for `event`.
    pub fn pulse(&mut self, event: CounterEvent) {
        self.hpm[event as usize] = self.hpm[event as usize].wrapping_add(1);
    }

    /// Raw read without bus timing; trap entry, tests, and trace output.
    pub fn read_raw(&self, num: u32) -> Option<u32> {
        use csr_num::*;
        let v = match num {
            MSTATUS => self.mstatus,
            MISA => MISA_VALUE,
            MIE => self.mie,
            MTVEC => self.mtvec,
            MSCRATCH => self.mscratch,
            MEPC => self.mepc,
            MCAUSE => self.mcause,
            MTVAL => self.mtval,
            MIP => self.mip,
            MCYCLE => self.mcycle as u32,
            MCYCLEH => (self.mcycle >> 32) as u32,
            MINSTRET => self.minstret as u32,
            MINSTRETH => (self.minstret >> 32) as u32,
            MVENDORID | MARCHID | MIMPID | MHARTID => 0,
            n if (MHPMCOUNTER3..MHPMCOUNTER3 + HPM_COUNTERS as u32).contains(&n) => {
                self.hpm[(n - MHPMCOUNTER3) as usize] as u32
            }
            n if (MHPMCOUNTER3H..MHPMCOUNTER3H + HPM_COUNTERS as u32).contains(&n) => {
                (self.hpm[(n - MHPMCOUNTER3H) as usize] >> 32) as u32
            }
            _ => return None,
        };
        Some(v)
    }

    fn write_raw(&mut self, num: u32, data: u32) -> bool {
        use csr_num::*;
        match num {
            MSTATUS => self.mstatus = data & (MSTATUS_MIE | MSTATUS_MPIE),
            MIE => self.mie = data & (MIX_MTIP | MIX_MEIP),
            MTVEC => self.mtvec = data,
            MSCRATCH => self.mscratch = data,
            MEPC => self.mepc = data & !1,
            MCAUSE => self.mcause = data,
            MTVAL => self.mtval = data,
            // Line-driven; writes are accepted and ignored.
            MIP => {}
            MCYCLE => self.mcycle = (self.mcycle & 0xFFFF_FFFF_0000_0000) | u64::from(data),
            MCYCLEH => self.mcycle = (self.mcycle & 0xFFFF_FFFF) | (u64::from(data) << 32),
            MINSTRET => self.minstret = (self.minstret & 0xFFFF_FFFF_0000_0000) | u64::from(data),
            MINSTRETH => self.minstret = (self.minstret & 0xFFFF_FFFF) | (u64::from(data) << 32),
            n if (MHPMCOUNTER3..MHPMCOUNTER3 + HPM_COUNTERS as u32).contains(&n) => {
                let i = (n - MHPMCOUNTER3) as usize;
                self.hpm[i] = (self.hpm[i] & 0xFFFF_FFFF_0000_0000) | u64::from(data);
            }
            n if (MHPMCOUNTER3H..MHPMCOUNTER3H + HPM_COUNTERS as u32).contains(&n) => {
                let i = (n - MHPMCOUNTER3H) as usize;
                self.hpm[i] = (self.hpm[i] & 0xFFFF_FFFF) | (u64::from(data) << 32);
            }
            _ => return false,
        }
        true
    }
}

impl Backend for CsrFile {
    fn name(&self) -> &'static str {
        "csr"
    }

    fn latency(&self) -> u32 {
        self.latency
    }

    fn read(&mut self, local: u32, _select: u8) -> BusReply {
        match self.read_raw(local) {
            Some(v) => BusReply::ok(v),
            None => BusReply::fault(),
        }
    }

    fn write(&mut self, local: u32, _select: u8, data: u32) -> BusReply {
        if self.write_raw(local, data) {
            BusReply::ok(0)
        } else {
            BusReply::fault()
        }
    }
}
