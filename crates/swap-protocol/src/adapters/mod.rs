//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements the outbound port traits in memory.

mod in_memory_ledger;
mod token_registry;

pub use in_memory_ledger::{InMemoryLedger, PoolBalance};
pub use token_registry::StaticTokenRegistry;
