//! # Inbound Ports
//!
//! API trait defining what the swap coordinator can do.

use super::outbound::TxReceipt;
use crate::domain::{
    Address, CrossChainStatus, LedgerRole, Secret, SwapError, SwapId, SwapRelease, SwapRequest,
};
use async_trait::async_trait;

/// Result of an expiry sweep.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SweepOutcome {
    /// Our sweep confirmed.
    Swept(TxReceipt),
    /// Someone else's sweep got there first.
    AlreadySwept,
}

/// Swap protocol API - inbound port.
///
/// Every call returns only after the ledger transaction is final.
#[async_trait]
pub trait SwapProtocolApi: Send + Sync {
    /// `postSwap` on the source ledger, binding `counterparty` as the payee
    /// of `executeSwap`.
    async fn post_swap(
        &self,
        request: SwapRequest,
        counterparty: Address,
    ) -> Result<TxReceipt, SwapError>;

    /// `lock` on the destination ledger, reserving from `counterparty`'s pool.
    async fn lock(&self, request: SwapRequest, counterparty: Address)
        -> Result<TxReceipt, SwapError>;

    /// `release` on the destination ledger.
    async fn release(&self, release: SwapRelease, secret: Secret) -> Result<TxReceipt, SwapError>;

    /// `executeSwap` on the source ledger.
    async fn execute_swap(&self, swap_id: SwapId, secret: Secret) -> Result<TxReceipt, SwapError>;

    /// Wait for `release` on the destination ledger, then execute on the
    /// source ledger with the revealed secret.
    async fn relay_execute(&self, swap_id: SwapId) -> Result<TxReceipt, SwapError>;

    /// Expiry sweep on one ledger, resubmitting dropped transactions.
    async fn sweep_expired(
        &self,
        role: LedgerRole,
        swap_id: SwapId,
    ) -> Result<SweepOutcome, SwapError>;

    /// Status of the swap on both ledgers.
    async fn swap_status(&self, swap_id: SwapId) -> Result<CrossChainStatus, SwapError>;
}
