//! # Swap Crypto - Commitment Primitives
//!
//! Hashing and signature primitives that bind a swap to a secret and to an
//! authorizing party.
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | SHA-256, Keccak-256 | Hash-locks, swap ids, signing digests |
//! | `ecdsa` | secp256k1 (recoverable) | Ethereum-style swap authorization |
//! | `signatures` | Ed25519 | Ledger-native account keys |
//! | `signer` | scheme-tagged | Capability interface over both schemes |
//!
//! ## Security Properties
//!
//! - **secp256k1**: RFC 6979 deterministic, low-S normalization (EIP-2),
//!   signer identified by address recovery
//! - **Ed25519**: Deterministic nonces, public key carried with the signature
//! - **SHA-256**: The single hash-lock function on every ledger

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod errors;
pub mod hashing;
mod serde_hex;
pub mod signatures;
pub mod signer;

// Re-exports
pub use ecdsa::{recover_address, Secp256k1KeyPair, Secp256k1RecoverableSignature};
pub use errors::CryptoError;
pub use hashing::{hash_lock, keccak256, keccak256_many, sha256, Hash};
pub use signatures::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use signer::{
    verify_digest, Address, Ed25519Signer, SchemeSignature, Secp256k1Signer, SignatureScheme,
    SwapSigner,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
