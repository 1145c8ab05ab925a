//! # Domain Invariants
//!
//! Business rules every ledger enforces, independent of who submitted the
//! call or whether it was pre-checked off-ledger.

use super::errors::{Hash, Secret, SwapError};

/// Invariant: the source escrow outlives the destination lock.
///
/// The liquidity provider learns the secret from `release` on the
/// destination ledger and needs at least `min_margin_secs` to execute on the
/// source ledger before the escrow can be swept back.
pub fn invariant_timelock_ordering(
    source_expiry: u64,
    destination_expiry: u64,
    min_margin_secs: u64,
) -> Result<(), SwapError> {
    if source_expiry < destination_expiry.saturating_add(min_margin_secs) {
        return Err(SwapError::InvalidIntent(format!(
            "source expiry {source_expiry} must be at least {min_margin_secs}s after destination expiry {destination_expiry}"
        )));
    }
    Ok(())
}

/// Invariant: `SHA-256(secret) == hash_lock`.
pub fn invariant_secret_matches(secret: &Secret, hash_lock: &Hash) -> bool {
    swap_crypto::hash_lock(secret) == *hash_lock
}

/// Invariant: a new escrow leaves at least the minimum window before expiry.
pub fn invariant_expiry_window(expiry: u64, now: u64, min_window_secs: u64) -> Result<(), SwapError> {
    let earliest = now.saturating_add(min_window_secs);
    if expiry < earliest {
        return Err(SwapError::ExpiryTooSoon { expiry, earliest });
    }
    Ok(())
}

/// Invariant: only the sweep may act once `now >= expiry`.
pub fn invariant_not_expired(expiry: u64, now: u64) -> Result<(), SwapError> {
    if now >= expiry {
        return Err(SwapError::Expired { expiry, now });
    }
    Ok(())
}

/// Invariant: the sweep may act only once `now >= expiry`.
pub fn invariant_expired(expiry: u64, now: u64) -> Result<(), SwapError> {
    if now < expiry {
        return Err(SwapError::NotExpired { expiry, now });
    }
    Ok(())
}

/// Invariant: a reservation or withdrawal never exceeds available liquidity.
pub fn invariant_sufficient_liquidity(available: u64, required: u64) -> Result<(), SwapError> {
    if available < required {
        return Err(SwapError::InsufficientLiquidity {
            available,
            required,
        });
    }
    Ok(())
}
