//! # Demo Scenarios
//!
//! Wires one source and one destination [`InMemoryLedger`] to a
//! [`LedgerCoordinator`] and drives two swaps through it:
//!
//! - **Completed**: post, lock, release, then execute with the secret the
//!   relay observes on the destination ledger.
//! - **Expired**: post without a lock, let the source expiry pass, sweep the
//!   escrow back to the initiator.

use crate::config::RuntimeConfig;
use anyhow::{bail, ensure, Context, Result};
use std::sync::Arc;
use swap_crypto::{Ed25519Signer, Secp256k1Signer, SwapSigner};
use swap_protocol::{
    short_hex, sign_for_release, sign_for_request, Address, InMemoryLedger, LedgerCall,
    LedgerClient, LedgerCoordinator, LedgerRole, NetworkTag, Salt, SecureSecret,
    StaticTokenRegistry, SwapId, SwapIntentBuilder, SwapProgress, SwapProtocolApi, SwapRelease,
    SwapRequest, SweepOutcome, TokenInfo, TokenRegistry, TxReceipt,
};
use tracing::{debug, info};

/// Amount posted by the initiator in each scenario.
pub const DEMO_AMOUNT: u64 = 1_000_000;

/// Fee kept by the liquidity provider.
pub const DEMO_FEE: u64 = 1_000;

/// Coordinator over two in-memory ledgers.
pub type DemoCoordinator = LedgerCoordinator<InMemoryLedger, InMemoryLedger>;

/// Balance changes observed over one scenario.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapReport {
    /// Scenario name.
    pub scenario: &'static str,
    /// Swap identifier.
    pub swap_id: SwapId,
    /// Cross-ledger progress at the end of the run.
    pub progress: SwapProgress,
    /// Initiator wallet on the source ledger.
    pub initiator_source_delta: i128,
    /// Provider pool on the source ledger.
    pub provider_source_delta: i128,
    /// Provider pool (available plus reserved) on the destination ledger.
    pub provider_destination_delta: i128,
    /// Recipient wallet on the destination ledger.
    pub recipient_destination_delta: i128,
}

#[derive(Clone, Copy)]
struct Balances {
    initiator_source: u64,
    provider_source: u64,
    provider_destination: u64,
    recipient_destination: u64,
}

/// Everything needed to run the demo swaps.
pub struct DemoHarness {
    coordinator: Arc<DemoCoordinator>,
    network: NetworkTag,
    initiator: Secp256k1Signer,
    provider: Ed25519Signer,
    recipient: Address,
    in_token: TokenInfo,
    out_token: TokenInfo,
}

impl DemoHarness {
    /// Build both ledgers, fund the initiator and deposit provider liquidity.
    pub async fn setup(config: &RuntimeConfig) -> Result<Self> {
        let protocol = config.protocol();
        let registry = StaticTokenRegistry::default();
        let in_token = registry.resolve("USDC").context("USDC is not supported")?;
        let out_token = registry.resolve("USDT").context("USDT is not supported")?;

        let source = InMemoryLedger::new(LedgerRole::Source, protocol.clone(), &registry);
        let destination = InMemoryLedger::new(LedgerRole::Destination, protocol.clone(), &registry);

        let initiator = match &config.initiator_key {
            Some(key) => Secp256k1Signer::from_hex(key).context("Invalid XS_INITIATOR_KEY")?,
            None => Secp256k1Signer::generate(),
        };
        let provider = match config.lp_seed {
            Some(seed) => Ed25519Signer::from_seed(seed),
            None => Ed25519Signer::generate(),
        };
        let recipient = Secp256k1Signer::generate().address();

        source.credit(initiator.address(), in_token.index, DEMO_AMOUNT * 2);
        destination.credit(provider.address(), out_token.index, config.deposit_amount);

        let coordinator = Arc::new(LedgerCoordinator::new(
            Arc::new(source),
            Arc::new(destination),
            protocol,
            config.coordinator(),
        ));

        let handle = coordinator
            .destination()
            .submit(LedgerCall::Deposit {
                provider: provider.address(),
                token: out_token.index,
                amount: config.deposit_amount,
            })
            .await?;
        coordinator
            .destination()
            .wait_for_confirmation(&handle)
            .await?
            .into_result()
            .context("Liquidity deposit failed")?;

        info!(
            "Demo ready on {}: initiator 0x{} ({:?}), provider 0x{} ({:?}), {} {} deposited",
            config.network,
            hex::encode(initiator.address()),
            initiator.scheme(),
            hex::encode(provider.address()),
            provider.scheme(),
            config.deposit_amount,
            out_token.symbol
        );

        Ok(Self {
            coordinator,
            network: config.network,
            initiator,
            provider,
            recipient,
            in_token,
            out_token,
        })
    }

    /// The coordinator driving both ledgers.
    pub fn coordinator(&self) -> &Arc<DemoCoordinator> {
        &self.coordinator
    }

    /// Initiator address.
    pub fn initiator(&self) -> Address {
        self.initiator.address()
    }

    /// Liquidity provider address.
    pub fn provider(&self) -> Address {
        self.provider.address()
    }

    /// Recipient address on the destination ledger.
    pub fn recipient(&self) -> Address {
        self.recipient
    }

    fn balances(&self) -> Balances {
        let source = self.coordinator.source();
        let destination = self.coordinator.destination();
        let pool = destination.pool_balance(&self.provider(), self.out_token.index);
        Balances {
            initiator_source: source.balance_of(&self.initiator(), self.in_token.index),
            provider_source: source
                .pool_balance(&self.provider(), self.in_token.index)
                .available,
            provider_destination: pool.available + pool.reserved,
            recipient_destination: destination.balance_of(&self.recipient, self.out_token.index),
        }
    }

    async fn report(
        &self,
        scenario: &'static str,
        swap_id: SwapId,
        before: Balances,
    ) -> Result<SwapReport> {
        let after = self.balances();
        let status = self.coordinator.swap_status(swap_id).await?;
        let delta = |a: u64, b: u64| i128::from(a) - i128::from(b);
        Ok(SwapReport {
            scenario,
            swap_id,
            progress: status.progress(),
            initiator_source_delta: delta(after.initiator_source, before.initiator_source),
            provider_source_delta: delta(after.provider_source, before.provider_source),
            provider_destination_delta: delta(
                after.provider_destination,
                before.provider_destination,
            ),
            recipient_destination_delta: delta(
                after.recipient_destination,
                before.recipient_destination,
            ),
        })
    }

    fn request(&self, salt: Salt, secret: &SecureSecret) -> Result<SwapRequest> {
        let intent = SwapIntentBuilder::new(DEMO_AMOUNT, self.recipient)
            .fee(DEMO_FEE)
            .tokens(self.in_token.index, self.out_token.index)
            .salt(salt)
            .build()
            .context("Invalid swap intent")?;
        let expire_ts = self.coordinator.source().time()
            + 2 * self.coordinator.protocol().min_post_window_secs;
        let request = sign_for_request(
            &self.initiator,
            intent,
            expire_ts,
            secret.hash_lock(),
            self.network,
        )
        .context("Failed to sign swap request")?;
        debug!(
            "Signed request {} expiring at {}",
            short_hex(&request.swap_id()),
            expire_ts
        );
        Ok(request)
    }

    /// Post, lock, release and execute one swap.
    pub async fn run_completed_swap(&self) -> Result<SwapReport> {
        let before = self.balances();
        let secret = SecureSecret::generate();
        let request = self.request(Salt::from_header(Salt::header_for(self.network)), &secret)?;
        let swap_id = request.swap_id();
        info!(
            "Scenario completed: swapping {} {} for {} {}",
            DEMO_AMOUNT,
            self.in_token.symbol,
            request.intent.locked_amount(),
            self.out_token.symbol
        );

        self.coordinator
            .post_swap(request.clone(), self.provider())
            .await
            .context("postSwap failed")?;
        self.coordinator
            .lock(request, self.provider())
            .await
            .context("lock failed")?;

        let release = sign_for_release(&self.initiator, swap_id, self.recipient, self.network)
            .context("Failed to sign release")?;
        self.release_and_relay(release, &secret).await?;

        let report = self.report("completed", swap_id, before).await?;
        ensure!(
            report.progress == SwapProgress::Completed,
            "swap {} ended as {:?}",
            short_hex(&swap_id),
            report.progress
        );
        Ok(report)
    }

    /// Release on the destination while a relay task waits to execute on the
    /// source with the revealed secret.
    async fn release_and_relay(
        &self,
        release: SwapRelease,
        secret: &SecureSecret,
    ) -> Result<TxReceipt> {
        let swap_id = release.swap_id;

        // The relay only learns the secret from the destination ledger.
        let relay = {
            let coordinator = Arc::clone(&self.coordinator);
            tokio::spawn(async move { coordinator.relay_execute(swap_id).await })
        };

        if let Err(err) = self.coordinator.release(release, secret.expose()).await {
            // Nothing will be released for the relay to observe.
            relay.abort();
            return Err(err).context("release failed");
        }

        relay
            .await
            .context("Relay task failed")?
            .context("executeSwap failed")
    }

    /// Post one swap, never lock it, and sweep the escrow after expiry.
    pub async fn run_expired_swap(&self) -> Result<SwapReport> {
        let before = self.balances();
        let secret = SecureSecret::generate();
        let request = self.request(Salt::random(self.network), &secret)?;
        let swap_id = request.swap_id();
        info!("Scenario expired: posting without a lock");

        self.coordinator
            .post_swap(request.clone(), self.provider())
            .await
            .context("postSwap failed")?;

        let wait = request
            .expire_ts
            .saturating_sub(self.coordinator.source().time());
        self.coordinator.source().advance_time(wait);
        self.coordinator.destination().advance_time(wait);
        info!("Advanced both ledgers {}s to the source expiry", wait);

        match self
            .coordinator
            .sweep_expired(LedgerRole::Source, swap_id)
            .await
            .context("sweepExpired failed")?
        {
            SweepOutcome::Swept(receipt) => {
                info!("Escrow refunded in tx 0x{}", hex::encode(receipt.tx_hash))
            }
            SweepOutcome::AlreadySwept => info!("Escrow was already refunded"),
        }

        if self.coordinator.lock(request, self.provider()).await.is_ok() {
            bail!("expired swap {} was locked", short_hex(&swap_id));
        }

        let report = self.report("expired", swap_id, before).await?;
        ensure!(
            report.progress == SwapProgress::Refunded,
            "swap {} ended as {:?}",
            short_hex(&swap_id),
            report.progress
        );
        Ok(report)
    }
}
