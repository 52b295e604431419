//! Memory-space router.
//!
//! The router arbitrates the two masters over the four backends. Per tick it
//! runs two phases around the core:
//! 1. **Completion (before the core):** in-flight waits count down; at zero
//!    the backend performs the access and the acknowledgement is posted to
//!    the owning master's reply slot.
//! 2. **Dispatch (after the core):** queued transactions move to idle
//!    backends, data master first. A core transaction still dispatches in
//!    the same tick when its backend remains idle.
//!
//! Each master has a one-deep submission queue; submitting again before
//! dispatch overwrites the queued transaction. Illegal targets (unmapped
//! addresses, writes to flash, non-CSR traffic in the CSR window) are
//! acknowledged immediately with the fault flag set.

use tracing::trace;

use crate::common::{AccessKind, BusReply, BusRequest, MasterId};
use crate::config::Config;
use crate::core::csr::{CounterEvent, CsrFile};
use crate::stats::SimStats;

use super::addr::{AddressDecoder, Resource};
use super::devices::{Backend, Flash, IoBlock, Ram};

/// Interrupt line levels sampled once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IrqLines {
    /// Machine timer line (`mtime >= mtimecmp`).
    pub timer: bool,
    /// External line (UART receive data available).
    pub external: bool,
}

#[derive(Debug)]
struct InFlight {
    master: MasterId,
    req: BusRequest,
    resource: Resource,
    local: u32,
    remaining: u32,
}

/// The memory-space router and the backends it owns.
#[derive(Debug)]
pub struct Router {
    decoder: AddressDecoder,
    /// Program flash.
    pub flash: Flash,
    /// Main RAM.
    pub ram: Ram,
    /// UART + timer block.
    pub io: IoBlock,
    /// CSR bank, reachable only through the CSR window.
    pub csr: CsrFile,
    busy: [Option<InFlight>; 4],
    queued: [Option<BusRequest>; 2],
    replies: [Option<(BusRequest, BusReply)>; 2],
}

impl Router {
    /// Builds the router and its backends from `config`.
    pub fn new(config: &Config) -> Self {
        let t = &config.timing;
        Self {
            decoder: AddressDecoder::new(config.memory.ram_size),
            flash: Flash::new(config.memory.flash_size, t.flash_latency),
            ram: Ram::new(config.memory.ram_size, t.ram_latency),
            io: IoBlock::new(t.timer_divider, t.io_latency),
            csr: CsrFile::new(t.csr_latency),
            busy: [None, None, None, None],
            queued: [None, None],
            replies: [None, None],
        }
    }

    /// Queues a transaction for `master`, overwriting anything still queued.
    pub fn submit(&mut self, master: MasterId, req: BusRequest) {
        trace!(master = ?master, %req, "router submit");
        self.queued[master.index()] = Some(req);
    }

    /// Whether `master` has a transaction queued or in flight.
    ///
    /// A posted but unconsumed reply does not count as busy.
    pub fn master_busy(&self, master: MasterId) -> bool {
        self.queued[master.index()].is_some()
            || self
                .busy
                .iter()
                .flatten()
                .any(|f| f.master == master)
    }

    /// Takes the pending acknowledgement for `master`, if any.
    pub fn take_reply(&mut self, master: MasterId) -> Option<(BusRequest, BusReply)> {
        self.replies[master.index()].take()
    }

    /// Completion phase: counts down in-flight waits and performs accesses
    /// whose wait has elapsed.
    pub fn complete_phase(&mut self, stats: &mut SimStats) {
        for slot in 0..self.busy.len() {
            let done = match &mut self.busy[slot] {
                Some(f) => {
                    f.remaining -= 1;
                    f.remaining == 0
                }
                None => false,
            };
            if !done {
                continue;
            }
            let Some(f) = self.busy[slot].take() else {
                continue;
            };
            let reply = if f.req.write {
                self.backend_mut(f.resource)
                    .write(f.local, f.req.select, f.req.data)
            } else {
                self.backend_mut(f.resource).read(f.local, f.req.select)
            };
            if !reply.fault {
                self.count_access(f.resource, &f.req);
            } else {
                stats.faulted_acks += 1;
            }
            trace!(master = ?f.master, req = %f.req, fault = reply.fault, "router complete");
            self.replies[f.master.index()] = Some((f.req, reply));
        }
    }

    /// Dispatch phase: moves queued transactions to idle backends, data
    /// master first. Illegal targets are fault-acknowledged here without
    /// touching a backend.
    pub fn dispatch_phase(&mut self, stats: &mut SimStats) {
        for master in [MasterId::Data, MasterId::Core] {
            let idx = master.index();
            let Some(req) = self.queued[idx] else {
                continue;
            };
            let target = self.decoder.decode(req.addr).filter(|(resource, _)| {
                Self::legal(*resource, req.kind, req.write)
            });
            let Some((resource, local)) = target else {
                self.queued[idx] = None;
                self.replies[idx] = Some((req, BusReply::fault()));
                stats.faulted_acks += 1;
                trace!(master = ?master, %req, "router reject");
                continue;
            };
            if self.busy[resource.index()].is_some() {
                continue;
            }
            self.queued[idx] = None;
            let latency = self.backend_mut(resource).latency().max(1);
            self.busy[resource.index()] = Some(InFlight {
                master,
                req,
                resource,
                local,
                remaining: latency,
            });
            match master {
                MasterId::Core => stats.core_dispatches += 1,
                MasterId::Data => stats.data_dispatches += 1,
            }
            trace!(master = ?master, %req, backend = resource.index(), "router dispatch");
        }
    }

    /// Interrupt line levels for this tick.
    pub fn irq_lines(&self) -> IrqLines {
        IrqLines {
            timer: self.io.timer.irq_line(),
            external: self.io.uart.irq_line(),
        }
    }

    /// Advances the devices behind the I/O block one tick.
    pub fn tick_devices(&mut self) {
        self.io.tick();
    }

    /// Loads raw bytes at a global address; loader and test access only.
    ///
    /// Returns false when the address is not backed by flash or RAM or the
    /// data does not fit.
    pub fn load_bytes(&mut self, addr: u32, data: &[u8]) -> bool {
        match self.decoder.decode(addr) {
            Some((Resource::Flash, local)) => self.flash.program(local, data),
            Some((Resource::Ram, local)) => self.ram.load(local, data),
            _ => false,
        }
    }

    /// Reads a RAM or flash word without bus timing; test access.
    pub fn peek_word(&mut self, addr: u32) -> Option<u32> {
        match self.decoder.decode(addr)? {
            (Resource::Ram, local) => self.ram.peek_word(local),
            (Resource::Flash, local) => {
                let reply = self.flash.read(local, 0b1111);
                (!reply.fault).then_some(reply.data)
            }
            _ => None,
        }
    }

    /// Classifies a global address; used for the retired-from counters.
    pub fn classify(&self, addr: u32) -> Option<Resource> {
        self.decoder.decode(addr).map(|(r, _)| r)
    }

    fn legal(resource: Resource, kind: AccessKind, write: bool) -> bool {
        let csr_kind = matches!(kind, AccessKind::CsrRead | AccessKind::CsrWrite);
        match resource {
            Resource::Csr => csr_kind,
            Resource::Flash => !csr_kind && !write,
            Resource::Ram | Resource::Io => !csr_kind,
        }
    }

    fn backend_mut(&mut self, resource: Resource) -> &mut dyn Backend {
        match resource {
            Resource::Flash => &mut self.flash,
            Resource::Ram => &mut self.ram,
            Resource::Io => &mut self.io,
            Resource::Csr => &mut self.csr,
        }
    }

    fn count_access(&mut self, resource: Resource, req: &BusRequest) {
        let event = match (resource, req.kind) {
            (Resource::Flash, AccessKind::Load) => Some(CounterEvent::LoadFlash),
            (Resource::Ram, AccessKind::Load) => Some(CounterEvent::LoadRam),
            (Resource::Ram, AccessKind::Store) => Some(CounterEvent::StoreRam),
            (Resource::Io, AccessKind::Load) => Some(CounterEvent::LoadIo),
            (Resource::Io, AccessKind::Store) => Some(CounterEvent::StoreIo),
            (Resource::Csr, AccessKind::CsrRead) => Some(CounterEvent::CsrRead),
            (Resource::Csr, AccessKind::CsrWrite) => Some(CounterEvent::CsrWrite),
            _ => None,
        };
        if let Some(event) = event {
            self.csr.pulse(event);
        }
    }
}
