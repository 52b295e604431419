//! # Unit Components
//!
//! Central hub for the unit tests, organized to mirror the library's module
//! tree: ISA decoding, SoC routing and devices, the core's pipeline and
//! execution machinery, and the simulation shell.




/// Simulation shell: loader and whole-program runs.
pub mod sim;
