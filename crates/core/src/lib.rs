//! Cycle-level RV32 microcontroller simulator library.
//!
//! This crate models a small in-order RV32IMAC core and its memory-space
//! router at tick granularity. It provides:
//! 1. **Core:** Four-stage pipeline over a slot ring, execution unit, register
//!    file, CSR bank, and the trap entry state machine.
//! 2. **SoC:** The memory-space router arbitrating two masters over four
//!    backends (flash, RAM, I/O block, CSR bank).
//! 3. **ISA:** RV32I/M/A/Zicsr/Zifencei decoding plus the RVC expander.
//! 4. **Simulation:** Tick orchestration, binary/ELF loader, configuration,
//!    and statistics collection.

/// Common types (bus transactions, trap taxonomy, host-side errors).
pub mod common;
/// Simulator configuration (defaults and hierarchical config structures).
pub mod config;
/// CPU core (pipeline, execution, register file, CSR bank, trap entry).
pub mod core;
/// Instruction set (decode tables, RVC expansion).
pub mod isa;
/// Simulator shell (tick loop, loader).
pub mod sim;
/// System-on-chip (address decode, router, backends).
pub mod soc;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Core state machine; owns the pipeline and architectural registers.
pub use crate::core::Core;
/// Top-level simulator; construct with `Simulator::new` and drive with `tick`.
pub use crate::sim::Simulator;
/// Memory-space router; owns the four backends and the per-master queues.
pub use crate::soc::Router;
