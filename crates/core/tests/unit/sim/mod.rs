//! Unit tests for the simulation shell.

pub mod programs;
