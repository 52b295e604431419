//! Common types shared across the core and the SoC.
//!
//! This module groups the vocabulary types of the simulator. It provides:
//! 1. **Bus:** Master identifiers, transaction descriptors, and reply shapes.
//! 2. **Traps:** Synchronous exception taxonomy and trap cause encoding.
//! 3. **Errors:** Host-side error types for the loader and configuration.

pub mod bus;
pub mod error;
pub mod trap;

pub use bus::{AccessKind, BusReply, BusRequest, MasterId};
pub use error::SimError;
pub use trap::{Exception, TrapCause};
