//! # Signer Capability
//!
//! A swap authorization is a signature over a 32-byte digest. Who produced it
//! is answered by an address, whatever the key scheme:
//!
//! | Scheme | How the signer is identified |
//! |--------|------------------------------|
//! | secp256k1 | address recovered from the signature |
//! | Ed25519 | public key carried with the signature, hashed to an address |
//!
//! A destination ledger that natively speaks only one scheme can still accept
//! authorizations from the other: verification runs off-ledger through
//! [`verify_digest`], and only the resulting authorization is acted upon.

use crate::ecdsa::{recover_address, Secp256k1KeyPair, Secp256k1RecoverableSignature};
use crate::hashing::Hash;
use crate::signatures::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
use crate::CryptoError;
use serde::{Deserialize, Serialize};

/// Account address (20 bytes).
pub type Address = [u8; 20];

/// Supported signature schemes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureScheme {
    /// Recoverable ECDSA over secp256k1.
    Secp256k1,
    /// Ed25519.
    Ed25519,
}

/// A signature tagged with the scheme that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum SchemeSignature {
    /// secp256k1, signer recovered from the signature.
    Secp256k1 {
        /// 65-byte recoverable signature.
        signature: Secp256k1RecoverableSignature,
    },
    /// Ed25519, signer's public key attached.
    Ed25519 {
        /// Signer public key.
        public_key: Ed25519PublicKey,
        /// 64-byte signature.
        signature: Ed25519Signature,
    },
}

impl SchemeSignature {
    /// Scheme of this signature.
    pub fn scheme(&self) -> SignatureScheme {
        match self {
            Self::Secp256k1 { .. } => SignatureScheme::Secp256k1,
            Self::Ed25519 { .. } => SignatureScheme::Ed25519,
        }
    }

    /// Address of the key that produced this signature over `digest`.
    pub fn signer(&self, digest: &Hash) -> Result<Address, CryptoError> {
        match self {
            Self::Secp256k1 { signature } => recover_address(digest, signature),
            Self::Ed25519 {
                public_key,
                signature,
            } => {
                public_key.verify_digest(digest, signature)?;
                Ok(public_key.address())
            }
        }
    }
}

/// Off-ledger verification: did `address` sign `digest`?
///
/// A `false` result is the normal rejection path, not an error.
pub fn verify_digest(digest: &Hash, signature: &SchemeSignature, address: &Address) -> bool {
    matches!(signature.signer(digest), Ok(signer) if signer == *address)
}

/// Capability interface for anything that can authorize a swap.
pub trait SwapSigner: Send + Sync {
    /// Scheme this signer produces.
    fn scheme(&self) -> SignatureScheme;

    /// Address that verification resolves this signer to.
    fn address(&self) -> Address;

    /// Sign a 32-byte digest.
    fn sign_digest(&self, digest: &Hash) -> Result<SchemeSignature, CryptoError>;

    /// Verify a signature against this signer's address.
    fn verify(&self, digest: &Hash, signature: &SchemeSignature) -> bool {
        verify_digest(digest, signature, &self.address())
    }
}

/// Ethereum-style signer backed by a secp256k1 key.
pub struct Secp256k1Signer {
    keypair: Secp256k1KeyPair,
}

impl Secp256k1Signer {
    /// Wrap an existing keypair.
    pub fn new(keypair: Secp256k1KeyPair) -> Self {
        Self { keypair }
    }

    /// Random key, for tests and demos.
    pub fn generate() -> Self {
        Self::new(Secp256k1KeyPair::generate())
    }

    /// From a hex-encoded private key.
    pub fn from_hex(hex_key: &str) -> Result<Self, CryptoError> {
        Ok(Self::new(Secp256k1KeyPair::from_hex(hex_key)?))
    }
}

impl SwapSigner for Secp256k1Signer {
    fn scheme(&self) -> SignatureScheme {
        SignatureScheme::Secp256k1
    }

    fn address(&self) -> Address {
        self.keypair.address()
    }

    fn sign_digest(&self, digest: &Hash) -> Result<SchemeSignature, CryptoError> {
        Ok(SchemeSignature::Secp256k1 {
            signature: self.keypair.sign_digest(digest)?,
        })
    }
}

/// Ledger-native signer backed by an Ed25519 key.
pub struct Ed25519Signer {
    keypair: Ed25519KeyPair,
}

impl Ed25519Signer {
    /// Wrap an existing keypair.
    pub fn new(keypair: Ed25519KeyPair) -> Self {
        Self { keypair }
    }

    /// Random key, for tests and demos.
    pub fn generate() -> Self {
        Self::new(Ed25519KeyPair::generate())
    }

    /// From a 32-byte seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self::new(Ed25519KeyPair::from_seed(seed))
    }
}

impl SwapSigner for Ed25519Signer {
    fn scheme(&self) -> SignatureScheme {
        SignatureScheme::Ed25519
    }

    fn address(&self) -> Address {
        self.keypair.public_key().address()
    }

    fn sign_digest(&self, digest: &Hash) -> Result<SchemeSignature, CryptoError> {
        Ok(SchemeSignature::Ed25519 {
            public_key: self.keypair.public_key(),
            signature: self.keypair.sign_digest(digest),
        })
    }
}
