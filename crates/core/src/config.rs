//! Configuration system for the simulator.
//!
//! This module defines the configuration structures used to parameterize a
//! simulation. It provides:
//! 1. **Defaults:** Baseline hardware constants (memory sizes, latencies,
//!    pipeline geometry, timer divider).
//! 2. **Structures:** Hierarchical config for general, pipeline, memory, and
//!    timing sections.
//!
//! Configuration is supplied as JSON via the CLI `--config` flag, or use
//! `Config::default()`.

use serde::Deserialize;

use crate::common::SimError;

/// Default configuration constants for the simulator.
///
/// These values define the baseline hardware configuration when not
/// explicitly overridden in a JSON configuration file.
pub mod defaults {
    /// Reset program counter (start of the flash window).
    pub const START_PC: u32 = 0x0060_0000;

    /// Flash image capacity in bytes (the full 10 MiB window).
    pub const FLASH_SIZE: usize = 0x00A0_0000;

    /// Main RAM size in bytes (16 MiB).
    pub const RAM_SIZE: usize = 16 * 1024 * 1024;

    /// Number of slots in the pipeline ring.
    pub const PIPELINE_SLOTS: usize = 4;

    /// Lines in the instruction/decode cache pair (power of two).
    pub const CACHE_LINES: usize = 64;

    /// Flash read latency in ticks.
    pub const FLASH_LATENCY: u32 = 1;

    /// RAM access latency in ticks.
    pub const RAM_LATENCY: u32 = 1;

    /// I/O block access latency in ticks.
    pub const IO_LATENCY: u32 = 1;

    /// CSR backend access latency in ticks.
    pub const CSR_LATENCY: u32 = 1;

    /// Multiplier busy time in ticks.
    pub const MUL_LATENCY: u32 = 4;

    /// Divider busy time in ticks.
    pub const DIV_LATENCY: u32 = 16;

    /// Timer divider (`mtime` increments every N ticks).
    pub const TIMER_DIVIDER: u32 = 10;
}

/// General simulation options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Program counter at reset. Flat binaries are loaded here.
    pub start_pc: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            start_pc: defaults::START_PC,
        }
    }
}

/// Pipeline geometry.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Slots in the pipeline ring buffer.
    pub slots: usize,
    /// Lines in the instruction/decode cache pair. Must be a power of two.
    pub cache_lines: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            slots: defaults::PIPELINE_SLOTS,
            cache_lines: defaults::CACHE_LINES,
        }
    }
}

/// Backing store sizes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Flash image capacity in bytes (capped at the window size).
    pub flash_size: usize,
    /// RAM size in bytes.
    pub ram_size: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            flash_size: defaults::FLASH_SIZE,
            ram_size: defaults::RAM_SIZE,
        }
    }
}

/// Access latencies and functional-unit busy times, all in ticks.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Flash read latency.
    pub flash_latency: u32,
    /// RAM access latency.
    pub ram_latency: u32,
    /// I/O block access latency.
    pub io_latency: u32,
    /// CSR backend access latency.
    pub csr_latency: u32,
    /// Multiplier busy time.
    pub mul_latency: u32,
    /// Divider busy time.
    pub div_latency: u32,
    /// `mtime` increments once every this many ticks.
    pub timer_divider: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            flash_latency: defaults::FLASH_LATENCY,
            ram_latency: defaults::RAM_LATENCY,
            io_latency: defaults::IO_LATENCY,
            csr_latency: defaults::CSR_LATENCY,
            mul_latency: defaults::MUL_LATENCY,
            div_latency: defaults::DIV_LATENCY,
            timer_divider: defaults::TIMER_DIVIDER,
        }
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General simulation options.
    pub general: GeneralConfig,
    /// Pipeline geometry.
    pub pipeline: PipelineConfig,
    /// Backing store sizes.
    pub memory: MemoryConfig,
    /// Latencies and busy times.
    pub timing: TimingConfig,
}

impl Config {
    /// Deserializes a configuration from a JSON string.
    ///
    /// Missing sections and fields fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] when the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }
}
