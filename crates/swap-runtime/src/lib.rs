//! # Swap Runtime
//!
//! Wiring for the `swap-demo` binary: environment configuration and the
//! scenario harness that drives a [`swap_protocol::LedgerCoordinator`] over
//! two in-memory ledgers.
//!
//! The harness is also used by the cross-crate test suite, so a demo run and
//! a test run exercise the same setup.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod scenario;

pub use config::{ConfigError, RuntimeConfig};
pub use scenario::{DemoCoordinator, DemoHarness, SwapReport, DEMO_AMOUNT, DEMO_FEE};
