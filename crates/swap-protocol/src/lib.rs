//! # Swap Protocol
//!
//! Hash-locked atomic swaps between two independent ledgers.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Protocol
//!
//! ```text
//! source ledger                          destination ledger
//! ─────────────                          ──────────────────
//! postSwap   escrow amount     ──┐
//!                                └──→    lock      reserve amount - fee
//!                                ┌──     release   pay recipient, reveal secret
//! executeSwap pay counterparty ←─┘
//! ```
//!
//! Either side can be swept back to its owner once its expiry passes. The
//! destination lock expires `release_margin_secs` before the source escrow,
//! so a secret revealed on the destination ledger can always be used on the
//! source ledger in time.
//!
//! ## Security Properties
//!
//! | Defense | Description |
//! |---------|-------------|
//! | Signed requests | Initiator signature over intent, expiry and hash-lock |
//! | Network-tagged digests | A testnet signature never verifies on mainnet |
//! | SHA-256 hash-lock | One hash function on both ledgers |
//! | Timelock ordering | Destination lock expires before the source escrow |
//! | Atomic transitions | A rejected call mutates nothing |
//!
//! ## Module Structure
//!
//! ```text
//! swap-protocol/
//! ├── domain/          # Intent, records, status, errors, invariants
//! ├── algorithms/      # Authorization digests, transition guards
//! ├── ports/           # SwapProtocolApi, LedgerClient, TokenRegistry
//! ├── adapters/        # InMemoryLedger, StaticTokenRegistry
//! └── service.rs       # LedgerCoordinator
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{InMemoryLedger, PoolBalance, StaticTokenRegistry};
pub use algorithms::{
    check_signature, release_digest, request_digest, sign_for_release, sign_for_request,
    Authorization,
};
pub use domain::{
    short_hex, Address, CrossChainStatus, Hash, LedgerEvent, LedgerEventKind, LedgerRole,
    NetworkTag, ProtocolConfig, Salt, Secret, SecureSecret, SwapError, SwapId, SwapIntent,
    SwapIntentBuilder, SwapProgress, SwapRecord, SwapRelease, SwapRequest, SwapStatus, TokenIndex,
};
pub use ports::{
    LedgerCall, LedgerClient, SwapProtocolApi, SweepOutcome, TokenInfo, TokenRegistry, TxHandle,
    TxReceipt, TxStatus,
};
pub use service::{CoordinatorConfig, LedgerCoordinator};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
