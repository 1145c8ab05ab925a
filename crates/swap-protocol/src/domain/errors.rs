//! # Domain Errors
//!
//! Rejections of a proposed transition. A rejected call never mutates the
//! swap record it targeted.

use super::value_objects::{LedgerRole, SwapStatus, TokenIndex};
use swap_crypto::CryptoError;
use thiserror::Error;

/// Hash type (32-byte).
pub type Hash = [u8; 32];

/// Address type (20-byte).
pub type Address = [u8; 20];

/// Secret type (32-byte hash-lock preimage).
pub type Secret = [u8; 32];

/// Swap identifier: Keccak-256 of the canonical intent encoding.
pub type SwapId = [u8; 32];

/// Swap protocol error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwapError {
    /// Signature missing, malformed, for another network, or by the wrong signer.
    #[error("Invalid signature")]
    InvalidSignature,

    /// A record for this swap id already exists on the ledger.
    #[error("Duplicate swap id: {}", hex::encode(.0))]
    DuplicateSwapId(SwapId),

    /// The swap's expiry has passed; only the expiry sweep remains.
    #[error("Swap expired: expiry={expiry}, now={now}")]
    Expired {
        /// Swap expiry (unix seconds)
        expiry: u64,
        /// Ledger time of the attempt
        now: u64,
    },

    /// Secret does not hash to the recorded hash-lock.
    #[error("Secret does not match hash-lock")]
    HashMismatch,

    /// Pool operator cannot cover `amount - fee`.
    #[error("Insufficient liquidity: available={available}, required={required}")]
    InsufficientLiquidity {
        /// Available pool balance
        available: u64,
        /// Amount the transition needs
        required: u64,
    },

    /// Swap is not in the state the transition requires.
    #[error("Swap is {status:?}, transition requires {required:?}")]
    AlreadyTerminal {
        /// Current status
        status: SwapStatus,
        /// Status the transition starts from
        required: SwapStatus,
    },

    /// No record for this swap id on the ledger.
    #[error("Swap not found: {}", hex::encode(.0))]
    SwapNotFound(SwapId),

    /// The source escrow is not visible yet; the destination may lag behind it.
    #[error("Swap {} not yet observed on the source ledger", hex::encode(.0))]
    SourceNotObserved(SwapId),

    /// Expiry leaves less than the minimum window.
    #[error("Expiry too soon: expiry={expiry}, earliest allowed={earliest}")]
    ExpiryTooSoon {
        /// Requested expiry
        expiry: u64,
        /// Earliest acceptable expiry
        earliest: u64,
    },

    /// Sweep attempted before expiry.
    #[error("Swap not expired: expiry={expiry}, now={now}")]
    NotExpired {
        /// Swap expiry
        expiry: u64,
        /// Ledger time of the attempt
        now: u64,
    },

    /// Initiator wallet cannot cover the escrow.
    #[error("Insufficient balance: available={available}, required={required}")]
    InsufficientBalance {
        /// Wallet balance
        available: u64,
        /// Escrow amount
        required: u64,
    },

    /// Intent fields violate the data model.
    #[error("Invalid intent: {0}")]
    InvalidIntent(String),

    /// Token index not supported by the ledger.
    #[error("Unknown token: {0}")]
    UnknownToken(TokenIndex),

    /// Entry point does not exist on this ledger.
    #[error("Wrong ledger: operation belongs on {expected:?}, submitted to {actual:?}")]
    WrongLedger {
        /// Ledger that hosts the operation
        expected: LedgerRole,
        /// Ledger it was submitted to
        actual: LedgerRole,
    },

    /// The local signer could not produce a signature.
    #[error("Signing failed: {0}")]
    Signing(#[from] CryptoError),

    /// Transaction dropped before confirmation; safe to resubmit.
    #[error("Transaction dropped: {0}")]
    Dropped(String),

    /// Transport or client failure.
    #[error("Ledger error: {0}")]
    Ledger(String),
}

impl SwapError {
    /// Whether a relayer may retry the same call later.
    ///
    /// Liquidity can be topped up, expiry arrives, a posted escrow becomes
    /// visible and dropped transactions can be resubmitted. Everything else
    /// fails identically on every retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InsufficientLiquidity { .. }
                | Self::NotExpired { .. }
                | Self::SourceNotObserved(_)
                | Self::Dropped(_)
                | Self::Ledger(_)
        )
    }
}
