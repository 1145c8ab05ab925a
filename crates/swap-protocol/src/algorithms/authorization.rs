//! # Request/Release Authorization
//!
//! Canonical digests for the two signed messages and the pure
//! signature pre-check.
//!
//! ```text
//! request = keccak256(request_domain(net) | intent[48] | expire_ts u64 BE | hash_lock[32])
//! release = keccak256(release_domain(net) | swap_id[32] | recipient[20])
//! ```
//!
//! The domain string names the network, so a testnet signature never
//! verifies on mainnet.

use crate::domain::{
    Address, Hash, NetworkTag, SwapError, SwapId, SwapIntent, SwapRelease, SwapRequest,
};
use swap_crypto::{keccak256_many, verify_digest, SchemeSignature, SwapSigner};

/// Digest the initiator signs to request a swap.
pub fn request_digest(
    intent: &SwapIntent,
    expire_ts: u64,
    hash_lock: &Hash,
    network: NetworkTag,
) -> Hash {
    keccak256_many(&[
        network.request_domain(),
        &intent.encode(),
        &expire_ts.to_be_bytes(),
        hash_lock,
    ])
}

/// Digest the initiator signs to release destination funds.
pub fn release_digest(swap_id: &SwapId, recipient: &Address, network: NetworkTag) -> Hash {
    keccak256_many(&[network.release_domain(), swap_id, recipient])
}

/// A message carrying an initiator signature.
pub trait Authorization {
    /// Digest the signature must cover on `network`.
    fn digest(&self, network: NetworkTag) -> Hash;

    /// Address the signature must resolve to.
    fn authorizer(&self) -> &Address;

    /// The signature.
    fn signature(&self) -> &SchemeSignature;
}

impl Authorization for SwapRequest {
    fn digest(&self, network: NetworkTag) -> Hash {
        request_digest(&self.intent, self.expire_ts, &self.hash_lock, network)
    }

    fn authorizer(&self) -> &Address {
        &self.initiator
    }

    fn signature(&self) -> &SchemeSignature {
        &self.signature
    }
}

impl Authorization for SwapRelease {
    fn digest(&self, network: NetworkTag) -> Hash {
        release_digest(&self.swap_id, &self.recipient, network)
    }

    fn authorizer(&self) -> &Address {
        &self.initiator
    }

    fn signature(&self) -> &SchemeSignature {
        &self.signature
    }
}

/// Side-effect-free pre-check of a signed message.
pub fn check_signature<A: Authorization + ?Sized>(signed: &A, network: NetworkTag) -> bool {
    verify_digest(&signed.digest(network), signed.signature(), signed.authorizer())
}

/// Sign a swap request with the initiator's key.
pub fn sign_for_request(
    signer: &dyn SwapSigner,
    intent: SwapIntent,
    expire_ts: u64,
    hash_lock: Hash,
    network: NetworkTag,
) -> Result<SwapRequest, SwapError> {
    intent.validate()?;
    let digest = request_digest(&intent, expire_ts, &hash_lock, network);
    Ok(SwapRequest {
        intent,
        expire_ts,
        hash_lock,
        initiator: signer.address(),
        signature: signer.sign_digest(&digest)?,
    })
}

/// Sign a release of `swap_id` to `recipient` with the initiator's key.
pub fn sign_for_release(
    signer: &dyn SwapSigner,
    swap_id: SwapId,
    recipient: Address,
    network: NetworkTag,
) -> Result<SwapRelease, SwapError> {
    let digest = release_digest(&swap_id, &recipient, network);
    Ok(SwapRelease {
        swap_id,
        recipient,
        initiator: signer.address(),
        signature: signer.sign_digest(&digest)?,
    })
}
