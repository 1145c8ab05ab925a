//! # Ledger Events
//!
//! Append-only log entries a ledger emits for each confirmed transition.
//! The coordinator reacts to these (notably `Released`, which carries the
//! secret) instead of trusting its own submission order.

use super::errors::{Address, Secret, SwapId};
use super::value_objects::TokenIndex;
use serde::{Deserialize, Serialize};

/// One event in a ledger's log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Position in the ledger's log, starting at 0.
    pub seq: u64,
    /// Ledger time of the confirming transaction.
    pub at: u64,
    /// Payload.
    pub kind: LedgerEventKind,
}

/// Event payloads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEventKind {
    /// Source escrow created.
    Posted {
        /// Swap id.
        swap_id: SwapId,
        /// Request signer.
        initiator: Address,
        /// Amount moved.
        amount: u64,
    },
    /// Destination liquidity reserved.
    Locked {
        /// Swap id.
        swap_id: SwapId,
        /// Liquidity provider.
        counterparty: Address,
        /// Amount moved.
        amount: u64,
    },
    /// Destination funds paid out; secret is public from here on.
    Released {
        /// Swap id.
        swap_id: SwapId,
        /// Destination payee.
        recipient: Address,
        /// Revealed preimage.
        secret: Secret,
    },
    /// Source escrow paid to the counterparty.
    Executed {
        /// Swap id.
        swap_id: SwapId,
        /// Liquidity provider.
        counterparty: Address,
    },
    /// Funds returned after expiry.
    Expired {
        /// Swap id.
        swap_id: SwapId,
        /// Owner the funds returned to.
        refunded_to: Address,
        /// Amount moved.
        amount: u64,
    },
    /// Pool liquidity added.
    Deposited {
        /// Pool owner.
        provider: Address,
        /// Pool token.
        token: TokenIndex,
        /// Amount moved.
        amount: u64,
    },
    /// Pool liquidity removed.
    Withdrawn {
        /// Pool owner.
        provider: Address,
        /// Pool token.
        token: TokenIndex,
        /// Amount moved.
        amount: u64,
    },
}

impl LedgerEventKind {
    /// Swap the event belongs to, if any.
    pub fn swap_id(&self) -> Option<&SwapId> {
        match self {
            Self::Posted { swap_id, .. }
            | Self::Locked { swap_id, .. }
            | Self::Released { swap_id, .. }
            | Self::Executed { swap_id, .. }
            | Self::Expired { swap_id, .. } => Some(swap_id),
            Self::Deposited { .. } | Self::Withdrawn { .. } => None,
        }
    }

    /// Revealed secret for `swap_id`, if this is its release.
    pub fn released_secret(&self, id: &SwapId) -> Option<Secret> {
        match self {
            Self::Released {
                swap_id, secret, ..
            } if swap_id == id => Some(*secret),
            _ => None,
        }
    }
}
