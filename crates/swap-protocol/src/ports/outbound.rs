//! # Outbound Ports
//!
//! Traits for external dependencies: the two ledgers and the token registry.

use crate::domain::{
    Address, Hash, LedgerEvent, LedgerRole, Secret, SwapError, SwapId, SwapRecord, SwapRelease,
    SwapRequest, TokenIndex,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A named ledger entry point with typed arguments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerCall {
    /// Escrow `amount` from the initiator, bound to `counterparty`.
    PostSwap {
        /// Signed request.
        request: SwapRequest,
        /// Liquidity provider paid on execute.
        counterparty: Address,
    },
    /// Reserve `amount - fee` from the counterparty pool.
    Lock {
        /// Signed request.
        request: SwapRequest,
        /// Pool operator providing the liquidity.
        counterparty: Address,
    },
    /// Pay reserved funds to the recipient, revealing the secret.
    Release {
        /// Signed release.
        release: SwapRelease,
        /// Hash-lock preimage.
        secret: Secret,
    },
    /// Pay the source escrow to the counterparty.
    ExecuteSwap {
        /// Swap to execute.
        swap_id: SwapId,
        /// Hash-lock preimage.
        secret: Secret,
    },
    /// Return escrowed or reserved funds after expiry.
    SweepExpired {
        /// Swap to sweep.
        swap_id: SwapId,
    },
    /// Add pool liquidity.
    Deposit {
        /// Pool owner.
        provider: Address,
        /// Pool token.
        token: TokenIndex,
        /// Amount added.
        amount: u64,
    },
    /// Remove unreserved pool liquidity.
    Withdraw {
        /// Pool owner.
        provider: Address,
        /// Pool token.
        token: TokenIndex,
        /// Amount removed.
        amount: u64,
    },
}

impl LedgerCall {
    /// Entry point name as exposed by the ledger.
    pub fn entry_point(&self) -> &'static str {
        match self {
            Self::PostSwap { .. } => "postSwap",
            Self::Lock { .. } => "lock",
            Self::Release { .. } => "release",
            Self::ExecuteSwap { .. } => "executeSwap",
            Self::SweepExpired { .. } => "sweepExpired",
            Self::Deposit { .. } => "deposit",
            Self::Withdraw { .. } => "withdraw",
        }
    }

    /// Ledger side that hosts this entry point, `None` if both do.
    pub fn host(&self) -> Option<LedgerRole> {
        match self {
            Self::PostSwap { .. } | Self::ExecuteSwap { .. } => Some(LedgerRole::Source),
            Self::Lock { .. } | Self::Release { .. } => Some(LedgerRole::Destination),
            Self::SweepExpired { .. } | Self::Deposit { .. } | Self::Withdraw { .. } => None,
        }
    }

    /// Swap the call targets, if any.
    pub fn swap_id(&self) -> Option<SwapId> {
        match self {
            Self::PostSwap { request, .. } | Self::Lock { request, .. } => Some(request.swap_id()),
            Self::Release { release, .. } => Some(release.swap_id),
            Self::ExecuteSwap { swap_id, .. } | Self::SweepExpired { swap_id } => Some(*swap_id),
            Self::Deposit { .. } | Self::Withdraw { .. } => None,
        }
    }
}

/// Handle to a submitted transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxHandle {
    /// Transaction hash.
    pub tx_hash: Hash,
    /// Entry point submitted.
    pub entry_point: String,
    /// Ledger time of submission.
    pub submitted_at: u64,
}

/// Final outcome of a transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxStatus {
    /// Included and applied.
    Confirmed,
    /// Included and rejected; no state changed.
    Reverted(SwapError),
    /// Never included; safe to resubmit.
    Dropped,
}

/// Receipt returned once a transaction is final.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxReceipt {
    /// Transaction hash.
    pub tx_hash: Hash,
    /// Outcome.
    pub status: TxStatus,
    /// Events emitted (empty unless confirmed).
    pub events: Vec<LedgerEvent>,
}

impl TxReceipt {
    /// Whether the transaction was applied.
    pub fn is_confirmed(&self) -> bool {
        self.status == TxStatus::Confirmed
    }

    /// Convert a non-confirmed outcome into its error.
    pub fn into_result(self) -> Result<Self, SwapError> {
        match &self.status {
            TxStatus::Confirmed => Ok(self),
            TxStatus::Reverted(err) => Err(err.clone()),
            TxStatus::Dropped => Err(SwapError::Dropped(hex::encode(self.tx_hash))),
        }
    }
}

/// Ledger client - outbound port. One instance per ledger.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Side of the swap this ledger hosts.
    fn role(&self) -> LedgerRole;

    /// Submit a call. Returns as soon as the ledger accepted the transaction.
    async fn submit(&self, call: LedgerCall) -> Result<TxHandle, SwapError>;

    /// Block until the transaction is final.
    async fn wait_for_confirmation(&self, handle: &TxHandle) -> Result<TxReceipt, SwapError>;

    /// Ledger-resident record for `swap_id`.
    async fn get_swap(&self, swap_id: &SwapId) -> Result<Option<SwapRecord>, SwapError>;

    /// Events with `seq >= cursor`, in log order.
    async fn events_since(&self, cursor: u64) -> Result<Vec<LedgerEvent>, SwapError>;

    /// Current ledger time (unix seconds).
    async fn now(&self) -> Result<u64, SwapError>;

    /// Unreserved pool balance of `provider` in `token`.
    async fn available_liquidity(
        &self,
        provider: &Address,
        token: TokenIndex,
    ) -> Result<u64, SwapError>;
}

/// Registry entry for a supported token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Ticker symbol.
    pub symbol: String,
    /// On-ledger index.
    pub index: TokenIndex,
    /// Decimal places of the smallest unit.
    pub decimals: u8,
}

/// Token registry - outbound port. Pure lookup.
pub trait TokenRegistry: Send + Sync {
    /// Look up a token by symbol.
    fn resolve(&self, symbol: &str) -> Option<TokenInfo>;

    /// Look up a token by index.
    fn by_index(&self, index: TokenIndex) -> Option<TokenInfo>;

    /// All supported tokens.
    fn supported_tokens(&self) -> Vec<TokenInfo>;
}
