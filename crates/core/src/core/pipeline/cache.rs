//! Paired instruction and decode caches.
//!
//! Direct-mapped, indexed by halfword address because compressed encodings
//! are 2-byte aligned. Each line carries the raw encoding and, once the
//! instruction has been through decode, the decoded fields. Refilling a line
//! with a new raw encoding invalidates its decoded half, so the decode cache
//! can never disagree with the instruction cache.

use crate::isa::DecodedOp;

#[derive(Debug, Clone, Copy)]
struct Line {
    valid: bool,
    tag: u32,
    raw: u32,
    compressed: bool,
    decoded: Option<DecodedOp>,
}

impl Line {
    fn invalid() -> Self {
        Self {
            valid: false,
            tag: 0,
            raw: 0,
            compressed: false,
            decoded: None,
        }
    }
}

/// Outcome of a cache probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheProbe {
    /// Nothing cached for this address.
    Miss,
    /// The raw encoding is cached; decode still has to run.
    Instr {
        /// Cached raw encoding.
        raw: u32,
        /// Compressed flag as captured at fill time.
        compressed: bool,
    },
    /// Both the raw encoding and its decode are cached.
    Full {
        /// Cached raw encoding.
        raw: u32,
        /// Compressed flag as captured at fill time.
        compressed: bool,
        /// Cached decoded fields.
        decoded: DecodedOp,
    },
}

/// The paired fetch caches.
#[derive(Debug)]
pub struct FetchCache {
    lines: Vec<Line>,
    mask: u32,
}

impl FetchCache {
    /// Creates an invalid cache with `lines` entries (power of two).
    pub fn new(lines: usize) -> Self {
        let lines = lines.next_power_of_two().max(2);
        Self {
            lines: vec![Line::invalid(); lines],
            mask: (lines - 1) as u32,
        }
    }

    #[inline]
    fn index(&self, addr: u32) -> (usize, u32) {
        let half = addr >> 1;
        ((half & self.mask) as usize, half >> self.mask.count_ones())
    }

    /// Looks up `addr` in both caches.
    pub fn probe(&self, addr: u32) -> CacheProbe {
        let (idx, tag) = self.index(addr);
        let line = &self.lines[idx];
        if !line.valid || line.tag != tag {
            return CacheProbe::Miss;
        }
        match line.decoded {
            Some(decoded) => CacheProbe::Full {
                raw: line.raw,
                compressed: line.compressed,
                decoded,
            },
            None => CacheProbe::Instr {
                raw: line.raw,
                compressed: line.compressed,
            },
        }
    }

    /// Installs a raw encoding, invalidating the line's decoded half.
    pub fn fill_raw(&mut self, addr: u32, raw: u32, compressed: bool) {
        let (idx, tag) = self.index(addr);
        self.lines[idx] = Line {
            valid: true,
            tag,
            raw,
            compressed,
            decoded: None,
        };
    }

    /// Installs decoded fields next to an already-cached raw encoding.
    ///
    /// A no-op when the line has since been refilled for another address.
    pub fn fill_decoded(&mut self, addr: u32, decoded: DecodedOp) {
        let (idx, tag) = self.index(addr);
        let line = &mut self.lines[idx];
        if line.valid && line.tag == tag {
            line.decoded = Some(decoded);
        }
    }

    /// Invalidates everything; `fence.i`.
    pub fn invalidate_all(&mut self) {
        for line in &mut self.lines {
            *line = Line::invalid();
        }
    }
}
