//! # Ed25519 Signatures
//!
//! The destination ledger's native account scheme. Keys sign 32-byte swap
//! digests directly. An Ed25519 public key cannot be recovered from a
//! signature, so it is carried alongside it and hashed to an account address.

use crate::hashing::Hash;
use crate::signer::Address;
use crate::CryptoError;
use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use zeroize::Zeroize;

/// Appended to the public key before hashing it into an address.
const ADDRESS_SCHEME_TAG: u8 = 0x00;

/// Ed25519 verifying key (32 bytes, a valid curve point).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ed25519PublicKey(#[serde(with = "crate::serde_hex")] [u8; 32]);

impl Ed25519PublicKey {
    /// Parse a compressed point.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        VerifyingKey::from_bytes(&bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self(bytes))
    }

    /// Compressed point.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check `signature` over `digest`. Small-order keys and `R` points are
    /// rejected.
    pub fn verify_digest(
        &self,
        digest: &Hash,
        signature: &Ed25519Signature,
    ) -> Result<(), CryptoError> {
        let key = VerifyingKey::from_bytes(&self.0).map_err(|_| CryptoError::InvalidPublicKey)?;
        key.verify_strict(digest, &ed25519_dalek::Signature::from_bytes(&signature.0))
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }

    /// Account address: last 20 bytes of `SHA3-256(key | 0x00)`.
    pub fn address(&self) -> Address {
        let digest: Hash = Sha3_256::new()
            .chain_update(self.0)
            .chain_update([ADDRESS_SCHEME_TAG])
            .finalize()
            .into();
        let mut address = [0u8; 20];
        address.copy_from_slice(&digest[12..]);
        address
    }
}

/// Ed25519 signature (64 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ed25519Signature(#[serde(with = "crate::serde_hex")] [u8; 64]);

impl Ed25519Signature {
    /// Wrap raw bytes. Validity is only known at verification.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

/// Ed25519 signing key. The seed is wiped on drop.
pub struct Ed25519KeyPair {
    signing_key: SigningKey,
}

impl Ed25519KeyPair {
    /// Fresh random key.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut rand::thread_rng()),
        }
    }

    /// Key from a 32-byte seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    /// Verifying half.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Deterministic signature over `digest`.
    pub fn sign_digest(&self, digest: &Hash) -> Ed25519Signature {
        Ed25519Signature(self.signing_key.sign(digest).to_bytes())
    }

    /// Seed bytes.
    pub fn to_seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519KeyPair")
            .field("public_key", &hex::encode(self.public_key().as_bytes()))
            .finish_non_exhaustive()
    }
}

impl Drop for Ed25519KeyPair {
    fn drop(&mut self) {
        let mut seed = self.signing_key.to_bytes();
        seed.zeroize();
    }
}
