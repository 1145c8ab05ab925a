//! # Integration Tests
//!
//! Cross-ledger behavior exercised through the [`swap_protocol::SwapProtocolApi`]
//! of a coordinator wired to two in-memory ledgers.

#[cfg(test)]
mod fixtures;

pub mod partial_failure;
pub mod properties;
