//! # Transition Guards
//!
//! Pure precondition checks for each ledger operation. A ledger calls the
//! guard, and only on `Ok` applies the effect, so a rejected call leaves
//! every balance and record untouched.
//!
//! | Operation | Ledger | From | To |
//! |-----------|--------|------|----|
//! | `postSwap` | source | None | Posted |
//! | `lock` | destination | None | Locked |
//! | `release` | destination | Locked | Released |
//! | `executeSwap` | source | Posted | Executed |
//! | sweep | either | Posted/Locked | Expired |

use super::authorization::{check_signature, Authorization};
use crate::domain::{
    invariant_expired, invariant_expiry_window, invariant_not_expired, invariant_secret_matches,
    invariant_sufficient_liquidity, required_status, ProtocolConfig, Secret, SwapError, SwapId,
    SwapRecord, SwapRelease, SwapRequest, SwapStatus,
};

fn require_signature<A: Authorization>(signed: &A, config: &ProtocolConfig) -> Result<(), SwapError> {
    if check_signature(signed, config.network) {
        Ok(())
    } else {
        Err(SwapError::InvalidSignature)
    }
}

fn require_unused(existing: Option<&SwapRecord>, swap_id: SwapId) -> Result<(), SwapError> {
    match existing {
        Some(_) => Err(SwapError::DuplicateSwapId(swap_id)),
        None => Ok(()),
    }
}

fn require_status(record: &SwapRecord, status: SwapStatus) -> Result<(), SwapError> {
    if record.status != status {
        return Err(SwapError::AlreadyTerminal {
            status: record.status,
            required: status,
        });
    }
    Ok(())
}

/// Guard for `postSwap` on the source ledger.
pub fn guard_post(
    existing: Option<&SwapRecord>,
    request: &SwapRequest,
    now: u64,
    config: &ProtocolConfig,
) -> Result<(), SwapError> {
    require_signature(request, config)?;
    request.intent.validate()?;
    require_unused(existing, request.swap_id())?;
    invariant_expiry_window(request.expire_ts, now, config.min_post_window_secs)
}

/// Guard for `lock` on the destination ledger. Returns the lock expiry.
pub fn guard_lock(
    existing: Option<&SwapRecord>,
    request: &SwapRequest,
    available: u64,
    now: u64,
    config: &ProtocolConfig,
) -> Result<u64, SwapError> {
    require_signature(request, config)?;
    request.intent.validate()?;
    require_unused(existing, request.swap_id())?;
    let lock_expiry = config.lock_expiry(request.expire_ts);
    invariant_not_expired(lock_expiry, now)?;
    invariant_sufficient_liquidity(available, request.intent.locked_amount())?;
    Ok(lock_expiry)
}

/// Guard for `release` on the destination ledger.
pub fn guard_release(
    record: Option<&SwapRecord>,
    release: &SwapRelease,
    secret: &Secret,
    now: u64,
    config: &ProtocolConfig,
) -> Result<(), SwapError> {
    let record = record.ok_or(SwapError::SwapNotFound(release.swap_id))?;
    require_status(record, SwapStatus::Locked)?;
    if release.initiator != record.initiator {
        return Err(SwapError::InvalidSignature);
    }
    require_signature(release, config)?;
    if release.recipient != record.recipient {
        return Err(SwapError::InvalidIntent(
            "release recipient differs from the signed intent".into(),
        ));
    }
    invariant_not_expired(record.expiry, now)?;
    if !invariant_secret_matches(secret, &record.hash_lock) {
        return Err(SwapError::HashMismatch);
    }
    Ok(())
}

/// Guard for `executeSwap` on the source ledger.
pub fn guard_execute(
    record: Option<&SwapRecord>,
    swap_id: &SwapId,
    secret: &Secret,
    now: u64,
) -> Result<(), SwapError> {
    let record = record.ok_or(SwapError::SwapNotFound(*swap_id))?;
    require_status(record, SwapStatus::Posted)?;
    invariant_not_expired(record.expiry, now)?;
    if !invariant_secret_matches(secret, &record.hash_lock) {
        return Err(SwapError::HashMismatch);
    }
    Ok(())
}

/// Guard for the permissionless expiry sweep on either ledger.
pub fn guard_sweep(record: Option<&SwapRecord>, swap_id: &SwapId, now: u64) -> Result<(), SwapError> {
    let record = record.ok_or(SwapError::SwapNotFound(*swap_id))?;
    require_status(record, required_status(SwapStatus::Expired, record.role))?;
    invariant_expired(record.expiry, now)
}
