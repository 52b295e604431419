//! Pipeline controller.
//!
//! The pipeline is a ring of slots walked by four cursors, one per stage:
//! 1. **Fetch** fills the slot at the write cursor, from the caches when it
//!    can and from the bus otherwise.
//! 2. **Decode** turns raw encodings into [`crate::isa::DecodedOp`]s, one
//!    tick per instruction, and installs them in the decode cache.
//! 3. **Register read** issues the one-tick register-file read, skipping it
//!    entirely when every source is `x0`.
//! 4. **Execute/commit** is driven by the core from the read cursor and is
//!    not part of this module.
//!
//! A decode-cache hit lets a freshly fetched slot skip ahead: straight to
//! ready when it needs no operands, or straight into the register-file read
//! when it is already the register-read cursor's turn and the port is free.

pub mod cache;
pub mod forward;
pub mod slot;

use tracing::trace;

use crate::common::{AccessKind, BusRequest, Exception, MasterId};
use crate::core::csr::CounterEvent;
use crate::core::regfile::RegFile;
use crate::isa;
use crate::soc::Router;
use crate::stats::SimStats;

pub use cache::{CacheProbe, FetchCache};
pub use forward::ForwardingUnit;
pub use slot::{PipelineSlot, SlotState};

/// The in-order pipeline over the slot ring.
#[derive(Debug)]
pub struct PipelineController {
    slots: Vec<PipelineSlot>,
    write_cur: usize,
    decode_cur: usize,
    regread_cur: usize,
    read_cur: usize,
    cache: FetchCache,
    fetch_pc: u32,
    /// Cleared when a fetch-path exception latches or the ring is flushed
    /// into a trap; no new fetches start until the flush.
    fill_enabled: bool,
    fetch_owner: Option<usize>,
    decode_owner: Option<usize>,
    regread_owner: Option<usize>,
}

impl PipelineController {
    /// Creates an empty pipeline fetching from `start_pc`.
    pub fn new(slots: usize, cache_lines: usize, start_pc: u32) -> Self {
        let slots = slots.max(2);
        Self {
            slots: vec![PipelineSlot::empty(); slots],
            write_cur: 0,
            decode_cur: 0,
            regread_cur: 0,
            read_cur: 0,
            cache: FetchCache::new(cache_lines),
            fetch_pc: start_pc,
            fill_enabled: true,
            fetch_owner: None,
            decode_owner: None,
            regread_owner: None,
        }
    }

    /// Index of the oldest slot (the commit stage's cursor).
    #[inline]
    pub fn oldest_index(&self) -> usize {
        self.read_cur
    }

    /// Borrows a slot.
    #[inline]
    pub fn slot(&self, idx: usize) -> &PipelineSlot {
        &self.slots[idx]
    }

    /// Mutably borrows a slot.
    #[inline]
    pub fn slot_mut(&mut self, idx: usize) -> &mut PipelineSlot {
        &mut self.slots[idx]
    }

    /// All slots, for the forwarding unit.
    #[inline]
    pub fn slots_mut(&mut self) -> &mut [PipelineSlot] {
        &mut self.slots
    }

    /// Recycles the oldest slot after commit and advances the read cursor.
    pub fn commit_recycle(&mut self) {
        let i = self.read_cur;
        self.slots[i].clear();
        self.read_cur = self.next(i);
    }

    /// Discards all in-flight work and restarts fetch at `target`.
    ///
    /// The caches survive a flush; only `fence.i` invalidates them.
    pub fn flush(&mut self, target: u32, regfile: &mut RegFile) {
        trace!(target = format_args!("{target:#010x}"), "pipeline flush");
        for slot in &mut self.slots {
            slot.clear();
        }
        self.write_cur = 0;
        self.decode_cur = 0;
        self.regread_cur = 0;
        self.read_cur = 0;
        self.fetch_pc = target;
        self.fill_enabled = true;
        self.fetch_owner = None;
        self.decode_owner = None;
        self.regread_owner = None;
        regfile.cancel_read();
    }

    /// Invalidates the instruction and decode caches (`fence.i`).
    pub fn invalidate_caches(&mut self) {
        self.cache.invalidate_all();
    }

    /// Register-read stage: delivers the read issued last tick, then issues
    /// for the slot at the register-read cursor.
    pub fn regread_step(&mut self, regfile: &mut RegFile, fwd: &ForwardingUnit) {
        if let Some(i) = self.regread_owner {
            if let Some(p) = regfile.take_read() {
                let slot = &mut self.slots[i];
                slot.rs1_val = fwd.patch(p.rs1, p.rs1_val);
                slot.rs2_val = fwd.patch(p.rs2, p.rs2_val);
                slot.state = SlotState::RegRead;
                self.regread_owner = None;
            }
        }

        self.advance_cursor(CursorKind::RegRead);

        let i = self.regread_cur;
        if self.slots[i].state != SlotState::Decoded {
            return;
        }
        let Some(d) = self.slots[i].decoded else {
            return;
        };
        if !d.needs_operands {
            // All read sources are x0; the operand values are just zero.
            self.slots[i].rs1_val = 0;
            self.slots[i].rs2_val = 0;
            self.slots[i].state = SlotState::RegRead;
        } else if self.regread_owner.is_none() && regfile.port_free() {
            regfile.issue_read(d.rs1, d.rs2);
            self.slots[i].state = SlotState::RegReadPending;
            self.regread_owner = Some(i);
        }
    }

    /// Decode stage: completes the decode started last tick, then starts
    /// decoding the slot at the decode cursor.
    pub fn decode_step(&mut self) {
        if let Some(i) = self.decode_owner.take() {
            if self.slots[i].state == SlotState::DecodePending {
                let decoded = isa::decode(self.slots[i].raw);
                self.slots[i].decoded = Some(decoded);
                self.slots[i].state = SlotState::Decoded;
                self.cache.fill_decoded(self.slots[i].addr, decoded);
            }
        }

        self.advance_cursor(CursorKind::Decode);

        let i = self.decode_cur;
        if self.slots[i].state == SlotState::Fetched && self.decode_owner.is_none() {
            self.slots[i].state = SlotState::DecodePending;
            self.decode_owner = Some(i);
        }
    }

    /// Fetch stage: consumes a fetch acknowledgement, then fills the slot at
    /// the write cursor from the caches or the bus.
    ///
    /// The register file is needed for the decode-cache fast path: a full
    /// hit may issue its register read straight from fetch when it is
    /// already that slot's turn at the read port.
    pub fn fetch_step(&mut self, router: &mut Router, regfile: &mut RegFile, stats: &mut SimStats) {
        if let Some((req, reply)) = router.take_reply(MasterId::Core) {
            self.complete_fetch(&req, reply.data, reply.fault, req.kind);
        }

        if !self.fill_enabled {
            return;
        }
        let i = self.write_cur;
        if self.slots[i].state != SlotState::Empty {
            return;
        }

        let pc = self.fetch_pc;
        if pc & 1 != 0 {
            // Misaligned fetch: latch the exception against this slot and
            // stop filling until the trap flushes the ring.
            self.slots[i].addr = pc;
            self.slots[i].fault = Some(Exception::InstructionAddressMisaligned);
            self.slots[i].state = SlotState::RegRead;
            self.write_cur = self.next(i);
            self.fill_enabled = false;
            return;
        }

        match self.cache.probe(pc) {
            CacheProbe::Full {
                raw,
                compressed,
                decoded,
            } => {
                stats.dcache_hits += 1;
                router.csr.pulse(CounterEvent::CacheHit);
                let slot = &mut self.slots[i];
                slot.addr = pc;
                slot.raw = raw;
                slot.compressed = compressed;
                slot.decoded = Some(decoded);
                if !decoded.needs_operands {
                    slot.rs1_val = 0;
                    slot.rs2_val = 0;
                    slot.state = SlotState::RegRead;
                } else if self.regread_cur == i
                    && self.regread_owner.is_none()
                    && regfile.port_free()
                {
                    regfile.issue_read(decoded.rs1, decoded.rs2);
                    slot.state = SlotState::RegReadPending;
                    self.regread_owner = Some(i);
                } else {
                    slot.state = SlotState::Decoded;
                }
                self.write_cur = self.next(i);
                self.fetch_pc = pc.wrapping_add(if compressed { 2 } else { 4 });
            }
            CacheProbe::Instr { raw, compressed } => {
                stats.icache_hits += 1;
                router.csr.pulse(CounterEvent::CacheHit);
                let slot = &mut self.slots[i];
                slot.addr = pc;
                slot.raw = raw;
                slot.compressed = compressed;
                slot.state = SlotState::Fetched;
                self.write_cur = self.next(i);
                self.fetch_pc = pc.wrapping_add(if compressed { 2 } else { 4 });
            }
            CacheProbe::Miss => {
                if router.master_busy(MasterId::Core) {
                    return;
                }
                stats.cache_misses += 1;
                router.submit(
                    MasterId::Core,
                    BusRequest::read(pc, 0b1111, AccessKind::Fetch),
                );
                self.slots[i].addr = pc;
                self.slots[i].state = SlotState::FetchPending;
                self.fetch_owner = Some(i);
            }
        }
    }

    fn complete_fetch(&mut self, req: &BusRequest, data: u32, fault: bool, kind: AccessKind) {
        // Anything that is not the fetch this pipeline is waiting on is a
        // stale acknowledgement from before a flush; drop it.
        let Some(i) = self.fetch_owner else { return };
        if kind != AccessKind::Fetch
            || self.slots[i].state != SlotState::FetchPending
            || self.slots[i].addr != req.addr
        {
            return;
        }
        self.fetch_owner = None;

        if fault {
            self.slots[i].fault = Some(Exception::InstructionAccessFault);
            self.slots[i].state = SlotState::RegRead;
            self.write_cur = self.next(i);
            self.fill_enabled = false;
            return;
        }

        let compressed = data & 0b11 != 0b11;
        let raw = if compressed {
            // Failed expansions keep the 16-bit encoding, which cannot match
            // any 32-bit opcode and so decodes to Illegal.
            isa::rvc::expand(data as u16).unwrap_or(data & 0xFFFF)
        } else {
            data
        };
        let addr = self.slots[i].addr;
        self.slots[i].raw = raw;
        self.slots[i].compressed = compressed;
        self.slots[i].state = SlotState::Fetched;
        self.cache.fill_raw(addr, raw, compressed);
        self.write_cur = self.next(i);
        self.fetch_pc = addr.wrapping_add(if compressed { 2 } else { 4 });
    }

    fn advance_cursor(&mut self, kind: CursorKind) {
        let threshold = match kind {
            CursorKind::Decode => SlotState::Decoded,
            CursorKind::RegRead => SlotState::RegRead,
        };
        for _ in 0..self.slots.len() {
            let cur = match kind {
                CursorKind::Decode => self.decode_cur,
                CursorKind::RegRead => self.regread_cur,
            };
            if self.slots[cur].state < threshold {
                break;
            }
            let next = self.next(cur);
            match kind {
                CursorKind::Decode => self.decode_cur = next,
                CursorKind::RegRead => self.regread_cur = next,
            }
        }
    }

    #[inline]
    fn next(&self, idx: usize) -> usize {
        (idx + 1) % self.slots.len()
    }
}

#[derive(Clone, Copy)]
enum CursorKind {
    Decode,
    RegRead,
}
