//! # Safety Properties
//!
//! Each test attacks one invariant through the public API and checks that the
//! rejected call left balances and records untouched.
//!
//! | Property | Rejection |
//! |----------|-----------|
//! | One escrow per intent | `DuplicateSwapId` |
//! | Only the hash-lock preimage releases funds | `HashMismatch` |
//! | Terminal states are final | `AlreadyTerminal` |
//! | Nothing moves after expiry | `Expired` |
//! | Signatures are network-bound | `InvalidSignature` |
//! | Release follows the signed intent | `InvalidSignature` / `InvalidIntent` |

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::*;
    use swap_crypto::{hash_lock, keccak256, Ed25519Signer, Secp256k1Signer, SwapSigner};
    use swap_protocol::{
        sign_for_release, sign_for_request, LedgerCall, NetworkTag, Salt, SwapError,
        SwapIntentBuilder, SwapProtocolApi, SwapStatus, TxStatus,
    };

    async fn posted_and_locked(f: &Fixture) -> (swap_protocol::SwapId, swap_protocol::Secret) {
        let secret = random_secret();
        let request = f.request(Salt::random(f.network), &secret);
        f.coordinator
            .post_swap(request.clone(), f.provider())
            .await
            .unwrap();
        f.coordinator.lock(request.clone(), f.provider()).await.unwrap();
        (request.swap_id(), secret)
    }

    // =============================================================================
    // DUPLICATES
    // =============================================================================

    #[tokio::test]
    async fn test_reused_salt_is_rejected() {
        let f = Fixture::new(NetworkTag::Mainnet).await;
        let secret = random_secret();
        let salt = Salt::from_header(0x80);
        let first = f.request(salt, &secret);
        f.coordinator
            .post_swap(first.clone(), f.provider())
            .await
            .unwrap();

        // Same intent, later expiry and fresh hash-lock: still the same swapId.
        f.advance(60);
        let second = f.request(salt, &random_secret());
        assert_eq!(second.swap_id(), first.swap_id());
        assert_eq!(
            f.coordinator.post_swap(second, f.provider()).await,
            Err(SwapError::DuplicateSwapId(first.swap_id()))
        );
        assert_eq!(f.initiator_balance(), INITIATOR_FUNDS - AMOUNT);
    }

    #[test]
    fn test_swap_id_is_deterministic() {
        let recipient = [0x22u8; 20];
        let build = |salt: Salt| {
            SwapIntentBuilder::new(AMOUNT, recipient)
                .fee(FEE)
                .tokens(USDC, USDT)
                .salt(salt)
                .build()
                .unwrap()
        };

        let a = build(Salt::from_header(0x80));
        let b = build(Salt::from_header(0x80));
        assert_eq!(a.swap_id(), b.swap_id());
        assert_eq!(a.swap_id(), keccak256(&a.encode()));

        let c = build(Salt::random(NetworkTag::Mainnet));
        assert_ne!(a.swap_id(), c.swap_id());
    }

    // =============================================================================
    // HASH-LOCK
    // =============================================================================

    #[tokio::test]
    async fn test_wrong_secret_releases_nothing() {
        let f = Fixture::new(NetworkTag::Mainnet).await;
        let (swap_id, secret) = posted_and_locked(&f).await;
        let mut wrong = secret;
        wrong[0] ^= 0xFF;

        assert_eq!(
            f.coordinator.release(f.release(swap_id), wrong).await,
            Err(SwapError::HashMismatch)
        );
        assert_eq!(
            f.coordinator.execute_swap(swap_id, wrong).await,
            Err(SwapError::HashMismatch)
        );

        let status = f.coordinator.swap_status(swap_id).await.unwrap();
        assert_eq!(status.source, SwapStatus::Posted);
        assert_eq!(status.destination, SwapStatus::Locked);
        assert_eq!(f.recipient_balance(), 0);
    }

    // =============================================================================
    // TERMINAL STATES
    // =============================================================================

    #[tokio::test]
    async fn test_double_release_pays_once() {
        let f = Fixture::new(NetworkTag::Mainnet).await;
        let (swap_id, secret) = posted_and_locked(&f).await;

        f.coordinator
            .release(f.release(swap_id), secret)
            .await
            .unwrap();
        assert_eq!(
            f.coordinator.release(f.release(swap_id), secret).await,
            Err(SwapError::AlreadyTerminal {
                status: SwapStatus::Released,
                required: SwapStatus::Locked,
            })
        );
        assert_eq!(f.recipient_balance(), LOCKED);
    }

    #[tokio::test]
    async fn test_double_execute_pays_once() {
        let f = Fixture::new(NetworkTag::Mainnet).await;
        let (swap_id, secret) = posted_and_locked(&f).await;
        f.coordinator
            .release(f.release(swap_id), secret)
            .await
            .unwrap();

        f.coordinator.execute_swap(swap_id, secret).await.unwrap();
        assert_eq!(
            f.coordinator.execute_swap(swap_id, secret).await,
            Err(SwapError::AlreadyTerminal {
                status: SwapStatus::Executed,
                required: SwapStatus::Posted,
            })
        );
        assert_eq!(f.source().pool_balance(&f.provider(), USDC).available, AMOUNT);
    }

    // =============================================================================
    // EXPIRY
    // =============================================================================

    #[tokio::test]
    async fn test_release_after_lock_expiry_rejected() {
        let f = Fixture::new(NetworkTag::Mainnet).await;
        let (swap_id, secret) = posted_and_locked(&f).await;

        f.advance(EXPIRY_WINDOW - f.coordinator.protocol().release_margin_secs);
        assert!(matches!(
            f.coordinator.release(f.release(swap_id), secret).await,
            Err(SwapError::Expired { .. })
        ));
        assert_eq!(f.recipient_balance(), 0);
    }

    #[tokio::test]
    async fn test_execute_after_source_expiry_rejected() {
        let f = Fixture::new(NetworkTag::Mainnet).await;
        let (swap_id, secret) = posted_and_locked(&f).await;
        f.coordinator
            .release(f.release(swap_id), secret)
            .await
            .unwrap();

        f.advance(EXPIRY_WINDOW);
        assert!(matches!(
            f.coordinator.execute_swap(swap_id, secret).await,
            Err(SwapError::Expired { .. })
        ));
        assert_eq!(f.source().pool_balance(&f.provider(), USDC).available, 0);
    }

    // =============================================================================
    // SIGNATURES
    // =============================================================================

    #[tokio::test]
    async fn test_testnet_signature_rejected_on_mainnet() {
        let f = Fixture::new(NetworkTag::Mainnet).await;
        let secret = random_secret();
        let replayed = sign_for_request(
            &f.initiator,
            f.intent(Salt::random(NetworkTag::Mainnet)),
            f.source().time() + EXPIRY_WINDOW,
            hash_lock(&secret),
            NetworkTag::Testnet,
        )
        .unwrap();

        assert_eq!(
            f.coordinator
                .post_swap(replayed.clone(), f.provider())
                .await,
            Err(SwapError::InvalidSignature)
        );

        // Bypassing the coordinator, the ledger rejects it as well.
        let receipt = confirm(
            f.source(),
            LedgerCall::PostSwap {
                request: replayed,
                counterparty: f.provider(),
            },
        )
        .await;
        assert_eq!(receipt.status, TxStatus::Reverted(SwapError::InvalidSignature));
        assert_eq!(f.initiator_balance(), INITIATOR_FUNDS);
    }

    #[tokio::test]
    async fn test_release_by_stranger_rejected() {
        let f = Fixture::new(NetworkTag::Mainnet).await;
        let (swap_id, secret) = posted_and_locked(&f).await;

        let stranger = Secp256k1Signer::generate();
        let forged = sign_for_release(&stranger, swap_id, stranger.address(), f.network).unwrap();
        assert_eq!(
            f.coordinator.release(forged, secret).await,
            Err(SwapError::InvalidSignature)
        );
        assert_eq!(f.destination().balance_of(&stranger.address(), USDT), 0);
    }

    #[tokio::test]
    async fn test_release_to_other_recipient_rejected() {
        let f = Fixture::new(NetworkTag::Mainnet).await;
        let (swap_id, secret) = posted_and_locked(&f).await;

        let elsewhere = Secp256k1Signer::generate().address();
        let redirected = sign_for_release(&f.initiator, swap_id, elsewhere, f.network).unwrap();
        assert!(matches!(
            f.coordinator.release(redirected, secret).await,
            Err(SwapError::InvalidIntent(_))
        ));
        assert_eq!(f.destination().balance_of(&elsewhere, USDT), 0);
    }

    #[tokio::test]
    async fn test_ed25519_initiator_accepted() {
        let initiator = Ed25519Signer::generate();
        let provider = Ed25519Signer::generate();
        let (source, destination) =
            funded_ledgers(NetworkTag::Testnet, initiator.address(), provider.address()).await;
        let coordinator = swap_protocol::LedgerCoordinator::new(
            std::sync::Arc::new(source),
            std::sync::Arc::new(destination),
            swap_protocol::ProtocolConfig::for_network(NetworkTag::Testnet),
            coordinator_config(),
        );

        let secret = random_secret();
        let intent = SwapIntentBuilder::new(AMOUNT, [0x33u8; 20])
            .fee(FEE)
            .tokens(USDC, USDT)
            .network(NetworkTag::Testnet)
            .build()
            .unwrap();
        let request = sign_for_request(
            &initiator,
            intent,
            coordinator.source().time() + EXPIRY_WINDOW,
            hash_lock(&secret),
            NetworkTag::Testnet,
        )
        .unwrap();
        let swap_id = request.swap_id();

        coordinator
            .post_swap(request.clone(), provider.address())
            .await
            .unwrap();
        coordinator.lock(request, provider.address()).await.unwrap();
        let release =
            sign_for_release(&initiator, swap_id, [0x33u8; 20], NetworkTag::Testnet).unwrap();
        coordinator.release(release, secret).await.unwrap();
        coordinator.execute_swap(swap_id, secret).await.unwrap();

        assert!(coordinator.swap_status(swap_id).await.unwrap().is_settled());
    }

    // =============================================================================
    // LIQUIDITY
    // =============================================================================

    #[tokio::test]
    async fn test_lock_before_post_is_retryable() {
        let f = Fixture::new(NetworkTag::Mainnet).await;
        let request = f.request(Salt::random(NetworkTag::Mainnet), &random_secret());
        let early = f.coordinator.lock(request.clone(), f.provider()).await;
        assert_eq!(early, Err(SwapError::SourceNotObserved(request.swap_id())));
        assert!(early.unwrap_err().is_retryable());
        assert_eq!(
            f.destination().pool_balance(&f.provider(), USDT).available,
            LIQUIDITY
        );

        // Once the escrow lands the same lock goes through.
        f.coordinator
            .post_swap(request.clone(), f.provider())
            .await
            .unwrap();
        f.coordinator
            .lock(request.clone(), f.provider())
            .await
            .unwrap();
        assert_eq!(
            f.destination().pool_balance(&f.provider(), USDT).reserved,
            LOCKED
        );
    }

    #[tokio::test]
    async fn test_withdrawn_liquidity_blocks_lock() {
        let f = Fixture::new(NetworkTag::Mainnet).await;
        confirm(
            f.destination(),
            LedgerCall::Withdraw {
                provider: f.provider(),
                token: USDT,
                amount: LIQUIDITY - 1,
            },
        )
        .await
        .into_result()
        .unwrap();

        let request = f.request(Salt::random(NetworkTag::Mainnet), &random_secret());
        f.coordinator
            .post_swap(request.clone(), f.provider())
            .await
            .unwrap();
        let err = f
            .coordinator
            .lock(request, f.provider())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SwapError::InsufficientLiquidity {
                available: 1,
                required: LOCKED,
            }
        );
        assert!(err.is_retryable());
    }
}
