//! # Domain Entities
//!
//! The swap intent, the two signed messages that authorize transitions, and
//! the per-ledger swap record.
//!
//! Source and destination records are independent entities. They share a
//! `swap_id` and a hash-lock and nothing else: there is no object that spans
//! both ledgers.

use super::errors::{Address, Hash, Secret, SwapError, SwapId};
use super::value_objects::{LedgerRole, NetworkTag, Salt, SwapStatus, TokenIndex};
use serde::{Deserialize, Serialize};
use swap_crypto::{keccak256, SchemeSignature};

/// Minimum time between `postSwap` and expiry (1 hour).
pub const DEFAULT_MIN_POST_WINDOW_SECS: u64 = 3600;

/// Destination lock expires this long before the request expiry (20 minutes).
pub const DEFAULT_RELEASE_MARGIN_SECS: u64 = 1200;

/// What the initiator wants swapped. Immutable once signed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapIntent {
    /// Amount escrowed on the source ledger, smallest token unit.
    pub amount: u64,
    /// Fee kept by the liquidity provider.
    pub fee: u64,
    /// Source asset.
    pub in_token: TokenIndex,
    /// Destination asset.
    pub out_token: TokenIndex,
    /// Destination-ledger address receiving `amount - fee`.
    pub recipient: Address,
    /// Uniqueness nonce with version/network header.
    pub salt: Salt,
}

impl SwapIntent {
    /// Length of the canonical encoding.
    pub const ENCODED_LEN: usize = 48;

    /// Canonical encoding:
    /// `amount u64 BE | fee u64 BE | in_token | out_token | recipient[20] | salt[10]`.
    pub fn encode(&self) -> [u8; Self::ENCODED_LEN] {
        let mut out = [0u8; Self::ENCODED_LEN];
        out[0..8].copy_from_slice(&self.amount.to_be_bytes());
        out[8..16].copy_from_slice(&self.fee.to_be_bytes());
        out[16] = self.in_token;
        out[17] = self.out_token;
        out[18..38].copy_from_slice(&self.recipient);
        out[38..48].copy_from_slice(self.salt.as_bytes());
        out
    }

    /// Parse a canonical encoding.
    pub fn decode(bytes: &[u8]) -> Result<Self, SwapError> {
        if bytes.len() != Self::ENCODED_LEN {
            return Err(SwapError::InvalidIntent(format!(
                "encoding is {} bytes, expected {}",
                bytes.len(),
                Self::ENCODED_LEN
            )));
        }
        let mut amount = [0u8; 8];
        amount.copy_from_slice(&bytes[0..8]);
        let mut fee = [0u8; 8];
        fee.copy_from_slice(&bytes[8..16]);
        let mut recipient = [0u8; 20];
        recipient.copy_from_slice(&bytes[18..38]);
        let mut salt = [0u8; Salt::LEN];
        salt.copy_from_slice(&bytes[38..48]);

        Ok(Self {
            amount: u64::from_be_bytes(amount),
            fee: u64::from_be_bytes(fee),
            in_token: bytes[16],
            out_token: bytes[17],
            recipient,
            salt: Salt::from_bytes(salt),
        })
    }

    /// Keccak-256 of the canonical encoding.
    pub fn swap_id(&self) -> SwapId {
        keccak256(&self.encode())
    }

    /// Amount the liquidity provider reserves on the destination ledger.
    pub fn locked_amount(&self) -> u64 {
        self.amount.saturating_sub(self.fee)
    }

    /// Check the data-model constraints.
    pub fn validate(&self) -> Result<(), SwapError> {
        if self.amount == 0 {
            return Err(SwapError::InvalidIntent("amount must be positive".into()));
        }
        if self.fee > self.amount {
            return Err(SwapError::InvalidIntent(format!(
                "fee {} exceeds amount {}",
                self.fee, self.amount
            )));
        }
        if !self.salt.is_versioned() {
            return Err(SwapError::InvalidIntent(format!(
                "salt header {:#04x} lacks the version flag",
                self.salt.header()
            )));
        }
        Ok(())
    }
}

/// Builder for [`SwapIntent`].
#[derive(Clone, Debug)]
pub struct SwapIntentBuilder {
    amount: u64,
    fee: u64,
    in_token: TokenIndex,
    out_token: TokenIndex,
    recipient: Address,
    salt: Option<Salt>,
    network: NetworkTag,
}

impl SwapIntentBuilder {
    /// Start with the amount and recipient.
    pub fn new(amount: u64, recipient: Address) -> Self {
        Self {
            amount,
            fee: 0,
            in_token: 0,
            out_token: 0,
            recipient,
            salt: None,
            network: NetworkTag::default(),
        }
    }

    /// Set fee.
    pub fn fee(mut self, fee: u64) -> Self {
        self.fee = fee;
        self
    }

    /// Set source and destination tokens.
    pub fn tokens(mut self, in_token: TokenIndex, out_token: TokenIndex) -> Self {
        self.in_token = in_token;
        self.out_token = out_token;
        self
    }

    /// Use a fixed salt instead of a fresh random one.
    pub fn salt(mut self, salt: Salt) -> Self {
        self.salt = Some(salt);
        self
    }

    /// Network used for the random salt header.
    pub fn network(mut self, network: NetworkTag) -> Self {
        self.network = network;
        self
    }

    /// Build and validate.
    pub fn build(self) -> Result<SwapIntent, SwapError> {
        let intent = SwapIntent {
            amount: self.amount,
            fee: self.fee,
            in_token: self.in_token,
            out_token: self.out_token,
            recipient: self.recipient,
            salt: self.salt.unwrap_or_else(|| Salt::random(self.network)),
        };
        intent.validate()?;
        Ok(intent)
    }
}

/// Initiator-signed authorization to post and lock a swap.
///
/// The signature covers the intent, the expiry and the hash-lock, so a
/// relayer holding the request can submit it but not alter it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequest {
    /// Swap parameters.
    pub intent: SwapIntent,
    /// Source escrow expiry (unix seconds).
    pub expire_ts: u64,
    /// `SHA-256(secret)`.
    pub hash_lock: Hash,
    /// Address the signature must resolve to.
    pub initiator: Address,
    /// Initiator signature.
    pub signature: SchemeSignature,
}

impl SwapRequest {
    /// Swap id of the signed intent.
    pub fn swap_id(&self) -> SwapId {
        self.intent.swap_id()
    }
}

/// Initiator-signed authorization to pay destination funds to `recipient`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRelease {
    /// Swap being released.
    pub swap_id: SwapId,
    /// Destination payee.
    pub recipient: Address,
    /// Address the signature must resolve to.
    pub initiator: Address,
    /// Initiator signature.
    pub signature: SchemeSignature,
}

/// Ledger-resident swap record. One per `swap_id` per ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRecord {
    /// Lookup key.
    pub swap_id: SwapId,
    /// Ledger side holding this record.
    pub role: LedgerRole,
    /// Current status.
    pub status: SwapStatus,
    /// Unix seconds; the record is expired once ledger time reaches it.
    pub expiry: u64,
    /// Escrowed (source) or reserved (destination) amount.
    pub amount: u64,
    /// Token the amount is held in.
    pub token: TokenIndex,
    /// Hash-lock bound at creation.
    pub hash_lock: Hash,
    /// Request signer.
    pub initiator: Address,
    /// Liquidity provider.
    pub counterparty: Address,
    /// Destination payee from the intent.
    pub recipient: Address,
    /// Preimage, set once revealed on this ledger.
    pub secret: Option<Secret>,
    /// Ledger time at creation.
    pub created_at: u64,
    /// Ledger time of the last transition.
    pub updated_at: u64,
}

impl SwapRecord {
    /// Whether ledger time has reached the expiry.
    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.expiry
    }

    /// Apply a status transition valid for this record's ledger.
    pub fn transition_to(&mut self, next: SwapStatus, now: u64) -> Result<(), SwapError> {
        if !self.status.can_transition_to(next, self.role) {
            return Err(SwapError::AlreadyTerminal {
                status: self.status,
                required: required_status(next, self.role),
            });
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }
}

/// Status a transition into `next` must start from on a `role` ledger.
pub fn required_status(next: SwapStatus, role: LedgerRole) -> SwapStatus {
    match (next, role) {
        (SwapStatus::Executed, _) => SwapStatus::Posted,
        (SwapStatus::Released, _) => SwapStatus::Locked,
        (SwapStatus::Expired, LedgerRole::Source) => SwapStatus::Posted,
        (SwapStatus::Expired, LedgerRole::Destination) => SwapStatus::Locked,
        _ => SwapStatus::None,
    }
}

/// Protocol timing and network parameters shared by both ledgers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Network tag mixed into signed digests.
    pub network: NetworkTag,
    /// `postSwap` requires `expire_ts >= now + min_post_window_secs`.
    pub min_post_window_secs: u64,
    /// Destination lock expiry is `expire_ts - release_margin_secs`.
    pub release_margin_secs: u64,
}

impl ProtocolConfig {
    /// Default timings on the given network.
    pub fn for_network(network: NetworkTag) -> Self {
        Self {
            network,
            ..Self::default()
        }
    }

    /// Expiry of the destination lock for a request expiring at `expire_ts`.
    pub fn lock_expiry(&self, expire_ts: u64) -> u64 {
        expire_ts.saturating_sub(self.release_margin_secs)
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            network: NetworkTag::Testnet,
            min_post_window_secs: DEFAULT_MIN_POST_WINDOW_SECS,
            release_margin_secs: DEFAULT_RELEASE_MARGIN_SECS,
        }
    }
}

/// Status of one swap as seen on both ledgers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossChainStatus {
    /// Source ledger status.
    pub source: SwapStatus,
    /// Destination ledger status.
    pub destination: SwapStatus,
}

/// Overall progress derived from the two ledger statuses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapProgress {
    /// Nothing recorded on either ledger.
    NotStarted,
    /// Posted on source, no lock yet.
    AwaitingLock,
    /// Locked on destination, secret not yet revealed.
    AwaitingRelease,
    /// Released on destination, source escrow still claimable.
    AwaitingExecution,
    /// Released and executed.
    Completed,
    /// One side expired, the other still holds funds.
    Refunding,
    /// Every recorded side returned its funds.
    Refunded,
    /// Combination no honest run produces (e.g. lock without post, or a
    /// released destination with an expired source).
    Diverged,
}

impl CrossChainStatus {
    /// Derive overall progress.
    pub fn progress(&self) -> SwapProgress {
        use SwapStatus as S;
        match (self.source, self.destination) {
            (S::None, S::None) => SwapProgress::NotStarted,
            (S::Posted, S::None) => SwapProgress::AwaitingLock,
            (S::Posted, S::Locked) => SwapProgress::AwaitingRelease,
            (S::Posted, S::Released) => SwapProgress::AwaitingExecution,
            (S::Executed, S::Released) => SwapProgress::Completed,
            (S::Posted, S::Expired) | (S::Expired, S::Locked) => SwapProgress::Refunding,
            (S::Expired, S::None) | (S::Expired, S::Expired) => SwapProgress::Refunded,
            _ => SwapProgress::Diverged,
        }
    }

    /// Both recorded sides are terminal.
    pub fn is_settled(&self) -> bool {
        matches!(
            self.progress(),
            SwapProgress::Completed | SwapProgress::Refunded
        )
    }
}
