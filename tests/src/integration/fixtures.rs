//! Shared setup: two funded ledgers, an secp256k1 initiator and an Ed25519
//! liquidity provider.

use std::sync::Arc;
use swap_crypto::{hash_lock, Ed25519Signer, Secp256k1Signer, SwapSigner};
use swap_protocol::{
    sign_for_release, sign_for_request, Address, CoordinatorConfig, InMemoryLedger, LedgerCall,
    LedgerClient, LedgerCoordinator, LedgerRole, NetworkTag, ProtocolConfig, Salt, Secret,
    StaticTokenRegistry, SwapId, SwapIntent, SwapRelease, SwapRequest, TokenIndex, TxReceipt,
};

pub const USDC: TokenIndex = 1;
pub const USDT: TokenIndex = 2;
pub const AMOUNT: u64 = 1_000_000;
pub const FEE: u64 = 1_000;
pub const LOCKED: u64 = AMOUNT - FEE;
pub const INITIATOR_FUNDS: u64 = 4 * AMOUNT;
pub const LIQUIDITY: u64 = 5_000_000;
/// Request expiry, relative to the source clock at signing time.
pub const EXPIRY_WINDOW: u64 = 7_200;

pub type Coordinator = LedgerCoordinator<InMemoryLedger, InMemoryLedger>;

pub fn coordinator_config() -> CoordinatorConfig {
    CoordinatorConfig {
        poll_interval_ms: 5,
        max_sweep_attempts: 3,
    }
}

pub async fn confirm(ledger: &InMemoryLedger, call: LedgerCall) -> TxReceipt {
    let handle = ledger.submit(call).await.unwrap();
    ledger.wait_for_confirmation(&handle).await.unwrap()
}

pub fn random_secret() -> Secret {
    rand::random()
}

/// Source and destination ledgers with the initiator funded and the
/// provider's liquidity deposited.
pub async fn funded_ledgers(
    network: NetworkTag,
    initiator: Address,
    provider: Address,
) -> (InMemoryLedger, InMemoryLedger) {
    let protocol = ProtocolConfig::for_network(network);
    let registry = StaticTokenRegistry::default();
    let source = InMemoryLedger::new(LedgerRole::Source, protocol.clone(), &registry);
    let destination = InMemoryLedger::new(LedgerRole::Destination, protocol, &registry);

    source.credit(initiator, USDC, INITIATOR_FUNDS);
    destination.credit(provider, USDT, LIQUIDITY);
    confirm(
        &destination,
        LedgerCall::Deposit {
            provider,
            token: USDT,
            amount: LIQUIDITY,
        },
    )
    .await
    .into_result()
    .unwrap();

    (source, destination)
}

pub struct Fixture {
    pub network: NetworkTag,
    pub coordinator: Arc<Coordinator>,
    pub initiator: Secp256k1Signer,
    pub provider: Ed25519Signer,
    pub recipient: Address,
}

impl Fixture {
    pub async fn new(network: NetworkTag) -> Self {
        let initiator = Secp256k1Signer::generate();
        let provider = Ed25519Signer::generate();
        let (source, destination) =
            funded_ledgers(network, initiator.address(), provider.address()).await;
        let coordinator = LedgerCoordinator::new(
            Arc::new(source),
            Arc::new(destination),
            ProtocolConfig::for_network(network),
            coordinator_config(),
        );
        Self {
            network,
            coordinator: Arc::new(coordinator),
            initiator,
            provider,
            recipient: Secp256k1Signer::generate().address(),
        }
    }

    pub fn source(&self) -> &InMemoryLedger {
        self.coordinator.source()
    }

    pub fn destination(&self) -> &InMemoryLedger {
        self.coordinator.destination()
    }

    pub fn provider(&self) -> Address {
        self.provider.address()
    }

    pub fn intent(&self, salt: Salt) -> SwapIntent {
        SwapIntent {
            amount: AMOUNT,
            fee: FEE,
            in_token: USDC,
            out_token: USDT,
            recipient: self.recipient,
            salt,
        }
    }

    pub fn request(&self, salt: Salt, secret: &Secret) -> SwapRequest {
        sign_for_request(
            &self.initiator,
            self.intent(salt),
            self.source().time() + EXPIRY_WINDOW,
            hash_lock(secret),
            self.network,
        )
        .unwrap()
    }

    pub fn release(&self, swap_id: SwapId) -> SwapRelease {
        sign_for_release(&self.initiator, swap_id, self.recipient, self.network).unwrap()
    }

    /// Advance both ledger clocks together.
    pub fn advance(&self, secs: u64) {
        self.source().advance_time(secs);
        self.destination().advance_time(secs);
    }

    pub fn initiator_balance(&self) -> u64 {
        self.source().balance_of(&self.initiator.address(), USDC)
    }

    pub fn recipient_balance(&self) -> u64 {
        self.destination().balance_of(&self.recipient, USDT)
    }
}
