//! Simulation statistics collection and reporting.
//!
//! This module tracks performance metrics for the simulator. It provides:
//! 1. **Cycle and IPC:** Total ticks, retired instructions, derived CPI.
//! 2. **Fetch path:** Instruction/decode cache hits and misses.
//! 3. **Control flow:** Flushes, traps, and interrupts taken.
//! 4. **Bus traffic:** Dispatches and faulted acknowledgements per master.

use std::time::Instant;

/// Simulation statistics structure tracking all performance metrics.
#[derive(Clone, Debug)]
pub struct SimStats {
    start_time: Instant,
    /// Total simulator ticks elapsed.
    pub cycles: u64,
    /// Number of instructions committed (retired).
    pub instructions_retired: u64,

    /// Fetches satisfied by the instruction cache alone.
    pub icache_hits: u64,
    /// Fetches satisfied by the instruction and decode caches together.
    pub dcache_hits: u64,
    /// Fetches that went to the bus.
    pub cache_misses: u64,

    /// Pipeline flushes (taken branches, jumps, `mret`, `fence.i`, traps).
    pub flushes: u64,
    /// Traps taken (exceptions and interrupts).
    pub traps_taken: u64,
    /// Timer interrupts taken.
    pub timer_interrupts: u64,
    /// External interrupts taken.
    pub external_interrupts: u64,

    /// Transactions dispatched for the core master.
    pub core_dispatches: u64,
    /// Transactions dispatched for the data master.
    pub data_dispatches: u64,
    /// Acknowledgements delivered with the fault flag set.
    pub faulted_acks: u64,
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            instructions_retired: 0,
            icache_hits: 0,
            dcache_hits: 0,
            cache_misses: 0,
            flushes: 0,
            traps_taken: 0,
            timer_interrupts: 0,
            external_interrupts: 0,
            core_dispatches: 0,
            data_dispatches: 0,
            faulted_acks: 0,
        }
    }
}

impl SimStats {
    /// Prints all statistics sections to stdout.
    pub fn print(&self) {
        let seconds = self.start_time.elapsed().as_secs_f64();
        let cyc = if self.cycles == 0 { 1 } else { self.cycles };
        let instr = if self.instructions_retired == 0 {
            1
        } else {
            self.instructions_retired
        };
        let ipc = self.instructions_retired as f64 / cyc as f64;
        let cpi = cyc as f64 / instr as f64;
        let khz = (self.cycles as f64 / seconds) / 1000.0;

        println!("\n==========================================================");
        println!("RV32 SYSTEM SIMULATION STATISTICS");
        println!("==========================================================");
        println!("host_seconds             {seconds:.4} s");
        println!("sim_ticks                {}", self.cycles);
        println!("sim_freq                 {khz:.2} kHz");
        println!("sim_insts                {}", self.instructions_retired);
        println!("sim_ipc                  {ipc:.4}");
        println!("sim_cpi                  {cpi:.4}");
        println!("----------------------------------------------------------");
        println!("FETCH PATH");
        let lookups = self.icache_hits + self.dcache_hits + self.cache_misses;
        let rate = if lookups > 0 {
            100.0 * (self.icache_hits + self.dcache_hits) as f64 / lookups as f64
        } else {
            0.0
        };
        println!("  cache.lookups          {lookups}");
        println!("  cache.instr_hits       {}", self.icache_hits);
        println!("  cache.decode_hits      {}", self.dcache_hits);
        println!("  cache.misses           {}", self.cache_misses);
        println!("  cache.hit_rate         {rate:.2}%");
        println!("----------------------------------------------------------");
        println!("CONTROL FLOW");
        println!("  flushes                {}", self.flushes);
        println!("  traps                  {}", self.traps_taken);
        println!("  irq.timer              {}", self.timer_interrupts);
        println!("  irq.external           {}", self.external_interrupts);
        println!("----------------------------------------------------------");
        println!("BUS TRAFFIC");
        println!("  dispatch.core          {}", self.core_dispatches);
        println!("  dispatch.data          {}", self.data_dispatches);
        println!("  acks.faulted           {}", self.faulted_acks);
        println!("==========================================================");
    }
}
