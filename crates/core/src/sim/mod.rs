//! Simulator shell: tick loop and image loading.

pub mod loader;
pub mod simulator;

pub use simulator::{RunExit, Simulator};
