//! System-on-chip: address map, backends, and the memory-space router.

pub mod addr;
pub mod devices;
pub mod router;

pub use addr::{AddressDecoder, Resource};
pub use router::{IrqLines, Router};
