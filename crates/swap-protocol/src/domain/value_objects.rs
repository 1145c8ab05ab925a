//! # Domain Value Objects
//!
//! Immutable value types for the swap protocol.

use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Token identifier on a ledger (index into its supported-token table).
pub type TokenIndex = u8;

/// Salt header flag: protocol version 1. Required on every intent.
pub const SALT_VERSION_FLAG: u8 = 0x80;

/// Salt header flag: intent targets the testnet deployment.
pub const SALT_TESTNET_FLAG: u8 = 0x40;

/// Network discriminator mixed into every signed digest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkTag {
    /// Test deployment.
    #[default]
    Testnet,
    /// Production deployment.
    Mainnet,
}

impl NetworkTag {
    /// Domain prefix for request digests.
    pub fn request_domain(&self) -> &'static [u8] {
        match self {
            Self::Testnet => b"Sign to request a swap (Testnet)",
            Self::Mainnet => b"Sign to request a swap (Mainnet)",
        }
    }

    /// Domain prefix for release digests.
    pub fn release_domain(&self) -> &'static [u8] {
        match self {
            Self::Testnet => b"Sign to release a swap (Testnet)",
            Self::Mainnet => b"Sign to release a swap (Mainnet)",
        }
    }

    /// Parse from a config string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "testnet" => Some(Self::Testnet),
            "mainnet" => Some(Self::Mainnet),
            _ => None,
        }
    }
}

impl std::fmt::Display for NetworkTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Testnet => f.write_str("testnet"),
            Self::Mainnet => f.write_str("mainnet"),
        }
    }
}

/// Which side of the swap a ledger hosts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerRole {
    /// Initiator's escrow: `postSwap`, `executeSwap`.
    Source,
    /// Pool liquidity: `lock`, `release`.
    Destination,
}

impl std::fmt::Display for LedgerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Destination => f.write_str("destination"),
        }
    }
}

/// First four bytes of an id as hex, for log lines.
pub fn short_hex(bytes: &[u8]) -> String {
    hex::encode(&bytes[..bytes.len().min(4)])
}

/// Swap status on one ledger.
///
/// ```text
/// source:       None ─postSwap─→ Posted ─executeSwap─→ Executed
///                                  └────sweep────→ Expired
/// destination:  None ─lock─→ Locked ─release─→ Released
///                               └───sweep───→ Expired
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapStatus {
    /// No record.
    #[default]
    None,
    /// Source escrow holds `amount`.
    Posted,
    /// Destination pool reserves `amount - fee`.
    Locked,
    /// Destination funds paid to recipient, secret public.
    Released,
    /// Source escrow paid to the counterparty.
    Executed,
    /// Funds returned after expiry.
    Expired,
}

impl SwapStatus {
    /// Check if transition is valid on a ledger of the given role.
    pub fn can_transition_to(&self, next: SwapStatus, role: LedgerRole) -> bool {
        match role {
            LedgerRole::Source => matches!(
                (self, next),
                (Self::None, Self::Posted)
                    | (Self::Posted, Self::Executed)
                    | (Self::Posted, Self::Expired)
            ),
            LedgerRole::Destination => matches!(
                (self, next),
                (Self::None, Self::Locked)
                    | (Self::Locked, Self::Released)
                    | (Self::Locked, Self::Expired)
            ),
        }
    }

    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Released | Self::Executed | Self::Expired)
    }
}

/// 10-byte intent salt. Byte 0 is a flag header, the rest is random.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Salt([u8; 10]);

impl Salt {
    /// Salt length in bytes.
    pub const LEN: usize = 10;

    /// Create from raw bytes.
    pub fn from_bytes(bytes: [u8; 10]) -> Self {
        Self(bytes)
    }

    /// Header-only salt, remaining bytes zero (e.g. `0x80`).
    pub fn from_header(header: u8) -> Self {
        let mut bytes = [0u8; 10];
        bytes[0] = header;
        Self(bytes)
    }

    /// Fresh random salt with the header for `network`.
    pub fn random(network: NetworkTag) -> Self {
        let mut bytes = [0u8; 10];
        rand::thread_rng().fill_bytes(&mut bytes[1..]);
        bytes[0] = Self::header_for(network);
        Self(bytes)
    }

    /// Header byte expected for `network`.
    pub fn header_for(network: NetworkTag) -> u8 {
        match network {
            NetworkTag::Testnet => SALT_VERSION_FLAG | SALT_TESTNET_FLAG,
            NetworkTag::Mainnet => SALT_VERSION_FLAG,
        }
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 10] {
        &self.0
    }

    /// Flag header.
    pub fn header(&self) -> u8 {
        self.0[0]
    }

    /// Version flag set.
    pub fn is_versioned(&self) -> bool {
        self.header() & SALT_VERSION_FLAG != 0
    }

    /// Network the header marks.
    pub fn network(&self) -> NetworkTag {
        if self.header() & SALT_TESTNET_FLAG != 0 {
            NetworkTag::Testnet
        } else {
            NetworkTag::Mainnet
        }
    }
}
