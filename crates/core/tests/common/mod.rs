//! Shared infrastructure for the simulator tests.


pub use harness::TestContext;
