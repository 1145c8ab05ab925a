//! In-Memory Ledger Adapter
//!
//! Implements the `LedgerClient` port for one ledger. Each submitted call is
//! guarded and applied under a single write lock, so it either commits all of
//! its balance and record changes or none of them.

use crate::algorithms::{guard_execute, guard_lock, guard_post, guard_release, guard_sweep};
use crate::domain::{
    invariant_sufficient_liquidity, short_hex, Address, Hash, LedgerEvent, LedgerEventKind,
    LedgerRole, ProtocolConfig, Secret, SwapError, SwapId, SwapRecord, SwapRelease, SwapRequest,
    SwapStatus, TokenIndex,
};
use crate::ports::outbound::{LedgerCall, LedgerClient, TokenRegistry, TxHandle, TxReceipt, TxStatus};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use swap_crypto::keccak256_many;
use tracing::{debug, info, warn};

/// Pool balance of one provider in one token.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolBalance {
    /// Free to lock or withdraw.
    pub available: u64,
    /// Held by `Locked` swaps.
    pub reserved: u64,
}

#[derive(Default)]
struct LedgerState {
    records: HashMap<SwapId, SwapRecord>,
    wallets: HashMap<(Address, TokenIndex), u64>,
    pools: HashMap<(Address, TokenIndex), PoolBalance>,
    events: Vec<LedgerEvent>,
    receipts: HashMap<Hash, TxReceipt>,
    nonce: u64,
    drop_next: usize,
}

impl LedgerState {
    fn emit(&mut self, at: u64, kind: LedgerEventKind) -> LedgerEvent {
        let event = LedgerEvent {
            seq: self.events.len() as u64,
            at,
            kind,
        };
        self.events.push(event.clone());
        event
    }

    fn wallet(&self, owner: &Address, token: TokenIndex) -> u64 {
        self.wallets.get(&(*owner, token)).copied().unwrap_or(0)
    }

    fn pool(&self, provider: &Address, token: TokenIndex) -> PoolBalance {
        self.pools.get(&(*provider, token)).copied().unwrap_or_default()
    }
}

/// Balance a sweep returns the escrow to.
enum Refund {
    Wallet(u64),
    Pool(PoolBalance),
}

/// Add `amount` to a balance, reverting the call on overflow.
fn credited(balance: u64, amount: u64) -> Result<u64, SwapError> {
    balance
        .checked_add(amount)
        .ok_or_else(|| SwapError::Ledger("balance overflow".into()))
}

/// In-memory ledger with its own clock.
pub struct InMemoryLedger {
    role: LedgerRole,
    config: ProtocolConfig,
    tokens: HashSet<TokenIndex>,
    state: RwLock<LedgerState>,
    current_time: RwLock<u64>,
}

impl InMemoryLedger {
    /// Create a ledger supporting every token in `registry`.
    pub fn new(role: LedgerRole, config: ProtocolConfig, registry: &dyn TokenRegistry) -> Self {
        Self {
            role,
            config,
            tokens: registry.supported_tokens().iter().map(|t| t.index).collect(),
            state: RwLock::new(LedgerState::default()),
            current_time: RwLock::new(1_700_000_000),
        }
    }

    /// Set current time for testing.
    pub fn set_time(&self, time: u64) {
        *self.current_time.write() = time;
    }

    /// Advance time for testing.
    pub fn advance_time(&self, secs: u64) {
        *self.current_time.write() += secs;
    }

    /// Current ledger time.
    pub fn time(&self) -> u64 {
        *self.current_time.read()
    }

    /// Fund a wallet outside the protocol (test and demo setup).
    pub fn credit(&self, owner: Address, token: TokenIndex, amount: u64) {
        let mut state = self.state.write();
        let balance = state.wallets.entry((owner, token)).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    /// Wallet balance.
    pub fn balance_of(&self, owner: &Address, token: TokenIndex) -> u64 {
        self.state.read().wallet(owner, token)
    }

    /// Pool balance of a provider.
    pub fn pool_balance(&self, provider: &Address, token: TokenIndex) -> PoolBalance {
        self.state.read().pool(provider, token)
    }

    /// The next `n` submissions are dropped without being applied.
    pub fn drop_next_submissions(&self, n: usize) {
        self.state.write().drop_next = n;
    }

    fn require_token(&self, token: TokenIndex) -> Result<(), SwapError> {
        if self.tokens.contains(&token) {
            Ok(())
        } else {
            Err(SwapError::UnknownToken(token))
        }
    }

    fn apply(
        &self,
        state: &mut LedgerState,
        call: LedgerCall,
        now: u64,
    ) -> Result<Vec<LedgerEvent>, SwapError> {
        if let Some(host) = call.host() {
            if host != self.role {
                return Err(SwapError::WrongLedger {
                    expected: host,
                    actual: self.role,
                });
            }
        }

        let event = match call {
            LedgerCall::PostSwap {
                request,
                counterparty,
            } => self.apply_post(state, request, counterparty, now)?,
            LedgerCall::Lock {
                request,
                counterparty,
            } => self.apply_lock(state, request, counterparty, now)?,
            LedgerCall::Release { release, secret } => {
                self.apply_release(state, release, secret, now)?
            }
            LedgerCall::ExecuteSwap { swap_id, secret } => {
                guard_execute(state.records.get(&swap_id), &swap_id, &secret, now)?;
                let (counterparty, token, amount) = state
                    .records
                    .get(&swap_id)
                    .map(|record| (record.counterparty, record.token, record.amount))
                    .ok_or(SwapError::SwapNotFound(swap_id))?;
                let mut pool = state.pool(&counterparty, token);
                pool.available = credited(pool.available, amount)?;

                let record = state
                    .records
                    .get_mut(&swap_id)
                    .ok_or(SwapError::SwapNotFound(swap_id))?;
                record.transition_to(SwapStatus::Executed, now)?;
                record.secret = Some(secret);
                state.pools.insert((counterparty, token), pool);
                state.emit(
                    now,
                    LedgerEventKind::Executed {
                        swap_id,
                        counterparty,
                    },
                )
            }
            LedgerCall::SweepExpired { swap_id } => self.apply_sweep(state, swap_id, now)?,
            LedgerCall::Deposit {
                provider,
                token,
                amount,
            } => {
                self.require_token(token)?;
                let available = state.wallet(&provider, token);
                if available < amount {
                    return Err(SwapError::InsufficientBalance {
                        available,
                        required: amount,
                    });
                }
                let mut pool = state.pool(&provider, token);
                pool.available = credited(pool.available, amount)?;
                state.wallets.insert((provider, token), available - amount);
                state.pools.insert((provider, token), pool);
                state.emit(
                    now,
                    LedgerEventKind::Deposited {
                        provider,
                        token,
                        amount,
                    },
                )
            }
            LedgerCall::Withdraw {
                provider,
                token,
                amount,
            } => {
                self.require_token(token)?;
                let pool = state.pool(&provider, token);
                invariant_sufficient_liquidity(pool.available, amount)?;
                let wallet = credited(state.wallet(&provider, token), amount)?;
                state.pools.insert(
                    (provider, token),
                    PoolBalance {
                        available: pool.available - amount,
                        ..pool
                    },
                );
                state.wallets.insert((provider, token), wallet);
                state.emit(
                    now,
                    LedgerEventKind::Withdrawn {
                        provider,
                        token,
                        amount,
                    },
                )
            }
        };
        Ok(vec![event])
    }

    fn apply_post(
        &self,
        state: &mut LedgerState,
        request: SwapRequest,
        counterparty: Address,
        now: u64,
    ) -> Result<LedgerEvent, SwapError> {
        let swap_id = request.swap_id();
        let intent = request.intent;
        self.require_token(intent.in_token)?;
        guard_post(state.records.get(&swap_id), &request, now, &self.config)?;

        let available = state.wallet(&request.initiator, intent.in_token);
        if available < intent.amount {
            return Err(SwapError::InsufficientBalance {
                available,
                required: intent.amount,
            });
        }

        state
            .wallets
            .insert((request.initiator, intent.in_token), available - intent.amount);
        state.records.insert(
            swap_id,
            SwapRecord {
                swap_id,
                role: self.role,
                status: SwapStatus::Posted,
                expiry: request.expire_ts,
                amount: intent.amount,
                token: intent.in_token,
                hash_lock: request.hash_lock,
                initiator: request.initiator,
                counterparty,
                recipient: intent.recipient,
                secret: None,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(state.emit(
            now,
            LedgerEventKind::Posted {
                swap_id,
                initiator: request.initiator,
                amount: intent.amount,
            },
        ))
    }

    fn apply_lock(
        &self,
        state: &mut LedgerState,
        request: SwapRequest,
        counterparty: Address,
        now: u64,
    ) -> Result<LedgerEvent, SwapError> {
        let swap_id = request.swap_id();
        let intent = request.intent;
        self.require_token(intent.out_token)?;
        let pool = state.pool(&counterparty, intent.out_token);
        let expiry = guard_lock(
            state.records.get(&swap_id),
            &request,
            pool.available,
            now,
            &self.config,
        )?;

        let locked = intent.locked_amount();
        state.pools.insert(
            (counterparty, intent.out_token),
            PoolBalance {
                available: pool.available - locked,
                reserved: pool.reserved + locked,
            },
        );
        state.records.insert(
            swap_id,
            SwapRecord {
                swap_id,
                role: self.role,
                status: SwapStatus::Locked,
                expiry,
                amount: locked,
                token: intent.out_token,
                hash_lock: request.hash_lock,
                initiator: request.initiator,
                counterparty,
                recipient: intent.recipient,
                secret: None,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(state.emit(
            now,
            LedgerEventKind::Locked {
                swap_id,
                counterparty,
                amount: locked,
            },
        ))
    }

    fn apply_release(
        &self,
        state: &mut LedgerState,
        release: SwapRelease,
        secret: Secret,
        now: u64,
    ) -> Result<LedgerEvent, SwapError> {
        let swap_id = release.swap_id;
        guard_release(
            state.records.get(&swap_id),
            &release,
            &secret,
            now,
            &self.config,
        )?;
        let (counterparty, token, amount) = state
            .records
            .get(&swap_id)
            .map(|record| (record.counterparty, record.token, record.amount))
            .ok_or(SwapError::SwapNotFound(swap_id))?;
        let wallet = credited(state.wallet(&release.recipient, token), amount)?;

        let record = state
            .records
            .get_mut(&swap_id)
            .ok_or(SwapError::SwapNotFound(swap_id))?;
        record.transition_to(SwapStatus::Released, now)?;
        record.secret = Some(secret);
        let pool = state.pools.entry((counterparty, token)).or_default();
        pool.reserved = pool.reserved.saturating_sub(amount);
        state.wallets.insert((release.recipient, token), wallet);
        Ok(state.emit(
            now,
            LedgerEventKind::Released {
                swap_id,
                recipient: release.recipient,
                secret,
            },
        ))
    }

    fn apply_sweep(
        &self,
        state: &mut LedgerState,
        swap_id: SwapId,
        now: u64,
    ) -> Result<LedgerEvent, SwapError> {
        guard_sweep(state.records.get(&swap_id), &swap_id, now)?;
        let (initiator, counterparty, token, amount) = state
            .records
            .get(&swap_id)
            .map(|record| {
                (
                    record.initiator,
                    record.counterparty,
                    record.token,
                    record.amount,
                )
            })
            .ok_or(SwapError::SwapNotFound(swap_id))?;

        // Computed before the record moves so an overflow leaves it untouched.
        let (refunded_to, refund) = match self.role {
            LedgerRole::Source => (
                initiator,
                Refund::Wallet(credited(state.wallet(&initiator, token), amount)?),
            ),
            LedgerRole::Destination => {
                let mut pool = state.pool(&counterparty, token);
                pool.reserved = pool.reserved.saturating_sub(amount);
                pool.available = credited(pool.available, amount)?;
                (counterparty, Refund::Pool(pool))
            }
        };

        let record = state
            .records
            .get_mut(&swap_id)
            .ok_or(SwapError::SwapNotFound(swap_id))?;
        record.transition_to(SwapStatus::Expired, now)?;
        match refund {
            Refund::Wallet(balance) => {
                state.wallets.insert((refunded_to, token), balance);
            }
            Refund::Pool(pool) => {
                state.pools.insert((refunded_to, token), pool);
            }
        }
        Ok(state.emit(
            now,
            LedgerEventKind::Expired {
                swap_id,
                refunded_to,
                amount,
            },
        ))
    }
}

#[async_trait]
impl LedgerClient for InMemoryLedger {
    fn role(&self) -> LedgerRole {
        self.role
    }

    async fn submit(&self, call: LedgerCall) -> Result<TxHandle, SwapError> {
        let now = self.time();
        let entry_point = call.entry_point();
        let swap_tag = call.swap_id().map(|id| short_hex(&id)).unwrap_or_default();

        let mut state = self.state.write();
        state.nonce += 1;
        let tx_hash = keccak256_many(&[
            self.role.to_string().as_bytes(),
            entry_point.as_bytes(),
            &state.nonce.to_be_bytes(),
        ]);

        let receipt = if state.drop_next > 0 {
            state.drop_next -= 1;
            warn!(
                "[ledger:{}] {} {} dropped (tx {})",
                self.role,
                entry_point,
                swap_tag,
                short_hex(&tx_hash)
            );
            TxReceipt {
                tx_hash,
                status: TxStatus::Dropped,
                events: vec![],
            }
        } else {
            match self.apply(&mut state, call, now) {
                Ok(events) => {
                    info!(
                        "[ledger:{}] {} {} confirmed (tx {})",
                        self.role,
                        entry_point,
                        swap_tag,
                        short_hex(&tx_hash)
                    );
                    TxReceipt {
                        tx_hash,
                        status: TxStatus::Confirmed,
                        events,
                    }
                }
                Err(err) => {
                    debug!(
                        "[ledger:{}] {} {} reverted: {}",
                        self.role, entry_point, swap_tag, err
                    );
                    TxReceipt {
                        tx_hash,
                        status: TxStatus::Reverted(err),
                        events: vec![],
                    }
                }
            }
        };
        state.receipts.insert(tx_hash, receipt);

        Ok(TxHandle {
            tx_hash,
            entry_point: entry_point.to_string(),
            submitted_at: now,
        })
    }

    async fn wait_for_confirmation(&self, handle: &TxHandle) -> Result<TxReceipt, SwapError> {
        self.state
            .read()
            .receipts
            .get(&handle.tx_hash)
            .cloned()
            .ok_or_else(|| {
                SwapError::Ledger(format!("unknown transaction {}", hex::encode(handle.tx_hash)))
            })
    }

    async fn get_swap(&self, swap_id: &SwapId) -> Result<Option<SwapRecord>, SwapError> {
        Ok(self.state.read().records.get(swap_id).cloned())
    }

    async fn events_since(&self, cursor: u64) -> Result<Vec<LedgerEvent>, SwapError> {
        let state = self.state.read();
        let start = usize::try_from(cursor).unwrap_or(usize::MAX);
        Ok(state.events.iter().skip(start).cloned().collect())
    }

    async fn now(&self) -> Result<u64, SwapError> {
        Ok(self.time())
    }

    async fn available_liquidity(
        &self,
        provider: &Address,
        token: TokenIndex,
    ) -> Result<u64, SwapError> {
        Ok(self.state.read().pool(provider, token).available)
    }
}
