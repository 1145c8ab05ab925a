//! # Ledger Coordinator
//!
//! Application service that implements `SwapProtocolApi` over two
//! independent `LedgerClient`s.
//!
//! The coordinator never assumes the ledgers agree with its own view. It
//! pre-checks signatures before paying for a transaction, reads the source
//! record before committing destination liquidity, and learns the secret by
//! watching the destination ledger for `release` rather than from its own
//! submission history.

use crate::algorithms::check_signature;
use crate::domain::{
    invariant_sufficient_liquidity, invariant_timelock_ordering, short_hex, Address,
    CrossChainStatus, LedgerRole, ProtocolConfig, Secret, SwapError, SwapId, SwapRelease,
    SwapRequest, SwapStatus,
};
use crate::ports::inbound::{SwapProtocolApi, SweepOutcome};
use crate::ports::outbound::{LedgerCall, LedgerClient, TxReceipt, TxStatus};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Coordinator tuning.
#[derive(Clone, Debug)]
pub struct CoordinatorConfig {
    /// Delay between polls of the destination ledger while waiting for `release`.
    pub poll_interval_ms: u64,
    /// Submissions of one sweep before giving up on dropped transactions.
    pub max_sweep_attempts: u32,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            max_sweep_attempts: 3,
        }
    }
}

/// Coordinates one source and one destination ledger.
pub struct LedgerCoordinator<S: LedgerClient, D: LedgerClient> {
    source: Arc<S>,
    destination: Arc<D>,
    protocol: ProtocolConfig,
    config: CoordinatorConfig,
}

impl<S: LedgerClient, D: LedgerClient> LedgerCoordinator<S, D> {
    /// Create a coordinator over the two ledgers.
    pub fn new(
        source: Arc<S>,
        destination: Arc<D>,
        protocol: ProtocolConfig,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            source,
            destination,
            protocol,
            config,
        }
    }

    /// Source ledger client.
    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Destination ledger client.
    pub fn destination(&self) -> &Arc<D> {
        &self.destination
    }

    /// Protocol parameters.
    pub fn protocol(&self) -> &ProtocolConfig {
        &self.protocol
    }

    async fn submit_to(&self, role: LedgerRole, call: LedgerCall) -> Result<TxReceipt, SwapError> {
        match role {
            LedgerRole::Source => submit_and_confirm(self.source.as_ref(), call).await,
            LedgerRole::Destination => submit_and_confirm(self.destination.as_ref(), call).await,
        }
    }

    fn precheck<A: crate::algorithms::Authorization>(
        &self,
        signed: &A,
        op: Uuid,
        swap_id: &SwapId,
    ) -> Result<(), SwapError> {
        if !check_signature(signed, self.protocol.network) {
            warn!(
                "[swap] {} signature pre-check failed for {}",
                op,
                short_hex(swap_id)
            );
            return Err(SwapError::InvalidSignature);
        }
        Ok(())
    }

    /// Watch the destination ledger until `swap_id` is released, or until
    /// the source ledger reaches `deadline`.
    pub async fn wait_for_release(&self, swap_id: &SwapId, deadline: u64) -> Result<Secret, SwapError> {
        let mut cursor = 0u64;
        loop {
            for event in self.destination.events_since(cursor).await? {
                cursor = event.seq + 1;
                if let Some(secret) = event.kind.released_secret(swap_id) {
                    return Ok(secret);
                }
            }

            let now = self.source.now().await?;
            if now >= deadline {
                return Err(SwapError::Expired {
                    expiry: deadline,
                    now,
                });
            }
            tokio::time::sleep(Duration::from_millis(self.config.poll_interval_ms)).await;
        }
    }
}

/// Submit a call and block until it is final.
async fn submit_and_confirm<L: LedgerClient + ?Sized>(
    ledger: &L,
    call: LedgerCall,
) -> Result<TxReceipt, SwapError> {
    let handle = ledger.submit(call).await?;
    debug!(
        "[swap] submitted {} to {} (tx {})",
        handle.entry_point,
        ledger.role(),
        short_hex(&handle.tx_hash)
    );
    ledger.wait_for_confirmation(&handle).await
}

#[async_trait]
impl<S: LedgerClient, D: LedgerClient> SwapProtocolApi for LedgerCoordinator<S, D> {
    async fn post_swap(
        &self,
        request: SwapRequest,
        counterparty: Address,
    ) -> Result<TxReceipt, SwapError> {
        let op = Uuid::new_v4();
        let swap_id = request.swap_id();
        self.precheck(&request, op, &swap_id)?;
        request.intent.validate()?;

        let receipt = self
            .submit_to(
                LedgerRole::Source,
                LedgerCall::PostSwap {
                    request,
                    counterparty,
                },
            )
            .await?
            .into_result()?;
        info!("[swap] {} posted {} on source", op, short_hex(&swap_id));
        Ok(receipt)
    }

    async fn lock(
        &self,
        request: SwapRequest,
        counterparty: Address,
    ) -> Result<TxReceipt, SwapError> {
        let op = Uuid::new_v4();
        let swap_id = request.swap_id();
        self.precheck(&request, op, &swap_id)?;
        request.intent.validate()?;

        // Liquidity is only committed against a live escrow with the same hash-lock.
        let posted = self
            .source
            .get_swap(&swap_id)
            .await?
            .ok_or(SwapError::SourceNotObserved(swap_id))?;
        if posted.status != SwapStatus::Posted {
            return Err(SwapError::AlreadyTerminal {
                status: posted.status,
                required: SwapStatus::Posted,
            });
        }
        if posted.hash_lock != request.hash_lock {
            return Err(SwapError::HashMismatch);
        }
        invariant_timelock_ordering(
            posted.expiry,
            self.protocol.lock_expiry(request.expire_ts),
            self.protocol.release_margin_secs,
        )?;

        let available = self
            .destination
            .available_liquidity(&counterparty, request.intent.out_token)
            .await?;
        invariant_sufficient_liquidity(available, request.intent.locked_amount())?;

        let receipt = self
            .submit_to(
                LedgerRole::Destination,
                LedgerCall::Lock {
                    request,
                    counterparty,
                },
            )
            .await?
            .into_result()?;
        info!("[swap] {} locked {} on destination", op, short_hex(&swap_id));
        Ok(receipt)
    }

    async fn release(&self, release: SwapRelease, secret: Secret) -> Result<TxReceipt, SwapError> {
        let op = Uuid::new_v4();
        let swap_id = release.swap_id;
        self.precheck(&release, op, &swap_id)?;

        let receipt = self
            .submit_to(LedgerRole::Destination, LedgerCall::Release { release, secret })
            .await?
            .into_result()?;
        info!("[swap] {} released {} on destination", op, short_hex(&swap_id));
        Ok(receipt)
    }

    async fn execute_swap(&self, swap_id: SwapId, secret: Secret) -> Result<TxReceipt, SwapError> {
        let op = Uuid::new_v4();
        let receipt = self
            .submit_to(LedgerRole::Source, LedgerCall::ExecuteSwap { swap_id, secret })
            .await?
            .into_result()?;
        info!("[swap] {} executed {} on source", op, short_hex(&swap_id));
        Ok(receipt)
    }

    async fn relay_execute(&self, swap_id: SwapId) -> Result<TxReceipt, SwapError> {
        let posted = self
            .source
            .get_swap(&swap_id)
            .await?
            .ok_or(SwapError::SourceNotObserved(swap_id))?;
        if posted.status != SwapStatus::Posted {
            return Err(SwapError::AlreadyTerminal {
                status: posted.status,
                required: SwapStatus::Posted,
            });
        }

        debug!(
            "[swap] waiting for release of {} until {}",
            short_hex(&swap_id),
            posted.expiry
        );
        let secret = self.wait_for_release(&swap_id, posted.expiry).await?;
        self.execute_swap(swap_id, secret).await
    }

    async fn sweep_expired(
        &self,
        role: LedgerRole,
        swap_id: SwapId,
    ) -> Result<SweepOutcome, SwapError> {
        let op = Uuid::new_v4();
        let attempts = self.config.max_sweep_attempts.max(1);

        for attempt in 1..=attempts {
            let receipt = self
                .submit_to(role, LedgerCall::SweepExpired { swap_id })
                .await?;
            match receipt.status {
                TxStatus::Confirmed => {
                    info!(
                        "[swap] {} swept {} on {} (attempt {})",
                        op,
                        short_hex(&swap_id),
                        role,
                        attempt
                    );
                    return Ok(SweepOutcome::Swept(receipt));
                }
                TxStatus::Dropped => {
                    warn!(
                        "[swap] {} sweep of {} on {} dropped, resubmitting ({}/{})",
                        op,
                        short_hex(&swap_id),
                        role,
                        attempt,
                        attempts
                    );
                }
                TxStatus::Reverted(SwapError::AlreadyTerminal {
                    status: SwapStatus::Expired,
                    ..
                }) => {
                    info!(
                        "[swap] {} {} already swept on {}",
                        op,
                        short_hex(&swap_id),
                        role
                    );
                    return Ok(SweepOutcome::AlreadySwept);
                }
                TxStatus::Reverted(err) => return Err(err),
            }
        }

        Err(SwapError::Dropped(format!(
            "sweep of {} on {} dropped {} times",
            short_hex(&swap_id),
            role,
            attempts
        )))
    }

    async fn swap_status(&self, swap_id: SwapId) -> Result<CrossChainStatus, SwapError> {
        let source = self.source.get_swap(&swap_id).await?;
        let destination = self.destination.get_swap(&swap_id).await?;
        Ok(CrossChainStatus {
            source: source.map(|r| r.status).unwrap_or_default(),
            destination: destination.map(|r| r.status).unwrap_or_default(),
        })
    }
}
