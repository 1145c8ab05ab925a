//! # Partial Failures
//!
//! Ledgers are independent: transactions get dropped, events arrive late or
//! not at all, and two relayers can race for the same swap.
//!
//! ## Cases Tested:
//!
//! 1. **Dropped sweep**: resubmitted until confirmed, refunded once
//! 2. **Dropped release**: lock stays intact, a retry succeeds
//! 3. **Out-of-order observation**: relay started before the lock, or after the release
//! 4. **Concurrent relayers**: exactly one `lock` / `postSwap` wins
//! 5. **Unobserved destination**: release confirmed on one ledger while the
//!    relay cannot see it

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use swap_crypto::{Ed25519Signer, Secp256k1Signer, SwapSigner};
    use swap_protocol::{
        Address, InMemoryLedger, LedgerCall, LedgerClient, LedgerCoordinator, LedgerEvent,
        LedgerRole, NetworkTag, ProtocolConfig, Salt, SwapError, SwapId, SwapProgress,
        SwapProtocolApi, SwapRecord, SwapStatus, SweepOutcome, TokenIndex, TxHandle, TxReceipt,
    };
    use tokio::time::timeout;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// Destination ledger whose event feed stays empty until revealed.
    struct LaggingLedger {
        inner: InMemoryLedger,
        visible: AtomicBool,
    }

    impl LaggingLedger {
        fn new(inner: InMemoryLedger) -> Self {
            Self {
                inner,
                visible: AtomicBool::new(false),
            }
        }

        fn reveal(&self) {
            self.visible.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl LedgerClient for LaggingLedger {
        fn role(&self) -> LedgerRole {
            self.inner.role()
        }

        async fn submit(&self, call: LedgerCall) -> Result<TxHandle, SwapError> {
            self.inner.submit(call).await
        }

        async fn wait_for_confirmation(&self, handle: &TxHandle) -> Result<TxReceipt, SwapError> {
            self.inner.wait_for_confirmation(handle).await
        }

        async fn get_swap(&self, swap_id: &SwapId) -> Result<Option<SwapRecord>, SwapError> {
            self.inner.get_swap(swap_id).await
        }

        async fn events_since(&self, cursor: u64) -> Result<Vec<LedgerEvent>, SwapError> {
            if self.visible.load(Ordering::SeqCst) {
                self.inner.events_since(cursor).await
            } else {
                Ok(vec![])
            }
        }

        async fn now(&self) -> Result<u64, SwapError> {
            self.inner.now().await
        }

        async fn available_liquidity(
            &self,
            provider: &Address,
            token: TokenIndex,
        ) -> Result<u64, SwapError> {
            self.inner.available_liquidity(provider, token).await
        }
    }

    struct LaggingFixture {
        coordinator: Arc<LedgerCoordinator<InMemoryLedger, LaggingLedger>>,
        initiator: Secp256k1Signer,
        provider: Address,
        recipient: Address,
    }

    impl LaggingFixture {
        async fn new() -> Self {
            let initiator = Secp256k1Signer::generate();
            let provider = Ed25519Signer::generate().address();
            let (source, destination) =
                funded_ledgers(NetworkTag::Mainnet, initiator.address(), provider).await;
            let coordinator = LedgerCoordinator::new(
                Arc::new(source),
                Arc::new(LaggingLedger::new(destination)),
                ProtocolConfig::for_network(NetworkTag::Mainnet),
                coordinator_config(),
            );
            Self {
                coordinator: Arc::new(coordinator),
                initiator,
                provider,
                recipient: [0x77u8; 20],
            }
        }

        /// Post, lock and release; returns the swap id.
        async fn release_unobserved(&self) -> SwapId {
            let secret = random_secret();
            let intent = swap_protocol::SwapIntent {
                amount: AMOUNT,
                fee: FEE,
                in_token: USDC,
                out_token: USDT,
                recipient: self.recipient,
                salt: Salt::random(NetworkTag::Mainnet),
            };
            let request = swap_protocol::sign_for_request(
                &self.initiator,
                intent,
                self.coordinator.source().time() + EXPIRY_WINDOW,
                swap_crypto::hash_lock(&secret),
                NetworkTag::Mainnet,
            )
            .unwrap();
            let swap_id = request.swap_id();

            self.coordinator
                .post_swap(request.clone(), self.provider)
                .await
                .unwrap();
            self.coordinator
                .lock(request, self.provider)
                .await
                .unwrap();
            let release = swap_protocol::sign_for_release(
                &self.initiator,
                swap_id,
                self.recipient,
                NetworkTag::Mainnet,
            )
            .unwrap();
            self.coordinator.release(release, secret).await.unwrap();
            swap_id
        }
    }

    // =============================================================================
    // DROPPED TRANSACTIONS
    // =============================================================================

    #[tokio::test]
    async fn test_dropped_sweep_is_resubmitted() {
        let f = Fixture::new(NetworkTag::Mainnet).await;
        let request = f.request(Salt::random(NetworkTag::Mainnet), &random_secret());
        let swap_id = request.swap_id();
        f.coordinator.post_swap(request, f.provider()).await.unwrap();

        f.advance(EXPIRY_WINDOW);
        f.source().drop_next_submissions(2);
        let outcome = f
            .coordinator
            .sweep_expired(LedgerRole::Source, swap_id)
            .await
            .unwrap();

        assert!(matches!(outcome, SweepOutcome::Swept(_)));
        assert_eq!(f.initiator_balance(), INITIATOR_FUNDS);
    }

    #[tokio::test]
    async fn test_sweep_gives_up_then_recovers() {
        let f = Fixture::new(NetworkTag::Mainnet).await;
        let request = f.request(Salt::random(NetworkTag::Mainnet), &random_secret());
        let swap_id = request.swap_id();
        f.coordinator.post_swap(request, f.provider()).await.unwrap();

        f.advance(EXPIRY_WINDOW);
        f.source().drop_next_submissions(3);
        let err = f
            .coordinator
            .sweep_expired(LedgerRole::Source, swap_id)
            .await
            .unwrap_err();
        assert!(matches!(err, SwapError::Dropped(_)));
        assert!(err.is_retryable());
        assert_eq!(
            f.coordinator.swap_status(swap_id).await.unwrap().source,
            SwapStatus::Posted
        );
        assert_eq!(f.initiator_balance(), INITIATOR_FUNDS - AMOUNT);

        // A later sweep is still allowed and refunds exactly once.
        f.coordinator
            .sweep_expired(LedgerRole::Source, swap_id)
            .await
            .unwrap();
        assert_eq!(f.initiator_balance(), INITIATOR_FUNDS);
    }

    #[tokio::test]
    async fn test_dropped_release_keeps_lock() {
        let f = Fixture::new(NetworkTag::Mainnet).await;
        let secret = random_secret();
        let request = f.request(Salt::random(NetworkTag::Mainnet), &secret);
        let swap_id = request.swap_id();
        f.coordinator
            .post_swap(request.clone(), f.provider())
            .await
            .unwrap();
        f.coordinator.lock(request, f.provider()).await.unwrap();

        f.destination().drop_next_submissions(1);
        let err = f
            .coordinator
            .release(f.release(swap_id), secret)
            .await
            .unwrap_err();
        assert!(matches!(err, SwapError::Dropped(_)));
        assert_eq!(
            f.coordinator.swap_status(swap_id).await.unwrap().destination,
            SwapStatus::Locked
        );
        assert_eq!(f.recipient_balance(), 0);

        f.coordinator
            .release(f.release(swap_id), secret)
            .await
            .unwrap();
        assert_eq!(f.recipient_balance(), LOCKED);
    }

    // =============================================================================
    // OUT-OF-ORDER OBSERVATION
    // =============================================================================

    #[tokio::test]
    async fn test_relay_started_before_lock() {
        let f = Fixture::new(NetworkTag::Mainnet).await;
        let secret = random_secret();
        let request = f.request(Salt::random(NetworkTag::Mainnet), &secret);
        let swap_id = request.swap_id();
        f.coordinator
            .post_swap(request.clone(), f.provider())
            .await
            .unwrap();

        let relay = {
            let coordinator = Arc::clone(&f.coordinator);
            tokio::spawn(async move { coordinator.relay_execute(swap_id).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        f.coordinator.lock(request, f.provider()).await.unwrap();
        f.coordinator
            .release(f.release(swap_id), secret)
            .await
            .unwrap();

        timeout(Duration::from_secs(5), relay)
            .await
            .expect("relay did not finish")
            .unwrap()
            .unwrap();
        assert_eq!(
            f.coordinator.swap_status(swap_id).await.unwrap().progress(),
            SwapProgress::Completed
        );
    }

    #[tokio::test]
    async fn test_relay_started_after_release() {
        let f = Fixture::new(NetworkTag::Mainnet).await;
        let secret = random_secret();
        let request = f.request(Salt::random(NetworkTag::Mainnet), &secret);
        let swap_id = request.swap_id();
        f.coordinator
            .post_swap(request.clone(), f.provider())
            .await
            .unwrap();
        f.coordinator.lock(request, f.provider()).await.unwrap();
        f.coordinator
            .release(f.release(swap_id), secret)
            .await
            .unwrap();
        assert_eq!(
            f.coordinator.swap_status(swap_id).await.unwrap().progress(),
            SwapProgress::AwaitingExecution
        );

        // The secret is still in the destination event log.
        f.coordinator.relay_execute(swap_id).await.unwrap();
        assert_eq!(
            f.source().pool_balance(&f.provider(), USDC).available,
            AMOUNT
        );
    }

    // =============================================================================
    // CONCURRENT RELAYERS
    // =============================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_lock_reserves_once() {
        let f = Fixture::new(NetworkTag::Mainnet).await;
        let request = f.request(Salt::random(NetworkTag::Mainnet), &random_secret());
        f.coordinator
            .post_swap(request.clone(), f.provider())
            .await
            .unwrap();

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let coordinator = Arc::clone(&f.coordinator);
                let request = request.clone();
                let provider = f.provider();
                tokio::spawn(async move { coordinator.lock(request, provider).await })
            })
            .collect();

        let mut won = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => won += 1,
                Err(err) => assert_eq!(err, SwapError::DuplicateSwapId(request.swap_id())),
            }
        }
        assert_eq!(won, 1);

        let pool = f.destination().pool_balance(&f.provider(), USDT);
        assert_eq!(pool.reserved, LOCKED);
        assert_eq!(pool.available, LIQUIDITY - LOCKED);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_post_escrows_once() {
        let f = Fixture::new(NetworkTag::Mainnet).await;
        let request = f.request(Salt::random(NetworkTag::Mainnet), &random_secret());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let coordinator = Arc::clone(&f.coordinator);
                let request = request.clone();
                let provider = f.provider();
                tokio::spawn(async move { coordinator.post_swap(request, provider).await })
            })
            .collect();

        let mut won = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                won += 1;
            }
        }
        assert_eq!(won, 1);
        assert_eq!(f.initiator_balance(), INITIATOR_FUNDS - AMOUNT);
    }

    // =============================================================================
    // UNOBSERVED DESTINATION
    // =============================================================================

    #[tokio::test]
    async fn test_relay_waits_for_late_destination_events() {
        let f = LaggingFixture::new().await;
        let swap_id = f.release_unobserved().await;

        let relay = {
            let coordinator = Arc::clone(&f.coordinator);
            tokio::spawn(async move { coordinator.relay_execute(swap_id).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Confirmed on the destination, still escrowed on the source.
        let status = f.coordinator.swap_status(swap_id).await.unwrap();
        assert_eq!(status.progress(), SwapProgress::AwaitingExecution);
        assert!(!relay.is_finished());

        f.coordinator.destination().reveal();
        timeout(Duration::from_secs(5), relay)
            .await
            .expect("relay did not finish")
            .unwrap()
            .unwrap();
        assert_eq!(
            f.coordinator.swap_status(swap_id).await.unwrap().progress(),
            SwapProgress::Completed
        );
    }

    #[tokio::test]
    async fn test_relay_gives_up_at_source_expiry() {
        let f = LaggingFixture::new().await;
        let swap_id = f.release_unobserved().await;

        let relay = {
            let coordinator = Arc::clone(&f.coordinator);
            tokio::spawn(async move { coordinator.relay_execute(swap_id).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        f.coordinator.source().advance_time(EXPIRY_WINDOW);

        let result = timeout(Duration::from_secs(5), relay)
            .await
            .expect("relay did not finish")
            .unwrap();
        assert!(matches!(result, Err(SwapError::Expired { .. })));

        // The escrow goes back to the initiator even though the recipient was paid.
        f.coordinator
            .sweep_expired(LedgerRole::Source, swap_id)
            .await
            .unwrap();
        assert_eq!(
            f.coordinator.swap_status(swap_id).await.unwrap().progress(),
            SwapProgress::Diverged
        );
        assert_eq!(
            f.coordinator
                .source()
                .balance_of(&f.initiator.address(), USDC),
            INITIATOR_FUNDS
        );
    }
}
