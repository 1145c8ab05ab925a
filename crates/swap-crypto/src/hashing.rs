//! # Hashing
//!
//! Two hash functions with fixed roles:
//!
//! - SHA-256 is the hash-lock function. Every ledger verifies `H(secret)`
//!   with exactly this function, otherwise a swap could never be released.
//! - Keccak-256 derives swap ids and signing digests, matching the digest
//!   format Ethereum-style wallets sign.

use sha2::Sha256;
use sha3::{Digest, Keccak256};

/// 256-bit hash output.
pub type Hash = [u8; 32];

/// SHA-256 of arbitrary data.
pub fn sha256(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash-lock of a 32-byte secret: `SHA-256(secret)`.
pub fn hash_lock(secret: &[u8; 32]) -> Hash {
    sha256(secret)
}

/// Keccak-256 of arbitrary data.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Keccak-256 over the concatenation of several inputs.
pub fn keccak256_many(inputs: &[&[u8]]) -> Hash {
    let mut hasher = Keccak256::new();
    for input in inputs {
        hasher.update(input);
    }
    hasher.finalize().into()
}
