//! # Runtime Configuration
//!
//! Loaded from environment variables on top of defaults. A value that does
//! not parse is reported and the default kept.
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `XS_NETWORK` | `testnet` or `mainnet` | `testnet` |
//! | `XS_LOG_LEVEL` / `RUST_LOG` | tracing filter | `info` |
//! | `XS_POLL_INTERVAL_MS` | release poll interval | `500` |
//! | `XS_INITIATOR_KEY` | hex secp256k1 private key | random |
//! | `XS_LP_KEY` | hex Ed25519 seed | random |
//! | `XS_DEPOSIT_AMOUNT` | pool liquidity per token | `10000000` |

use swap_protocol::{CoordinatorConfig, NetworkTag, ProtocolConfig};
use thiserror::Error;
use tracing::{info, warn};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The liquidity provider would start with an empty pool.
    #[error("XS_DEPOSIT_AMOUNT must be positive")]
    ZeroDeposit,

    /// The coordinator would busy-loop while waiting for a release.
    #[error("XS_POLL_INTERVAL_MS must be positive")]
    ZeroPollInterval,
}

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Network tag for signatures and salts.
    pub network: NetworkTag,
    /// Tracing filter directive.
    pub log_level: String,
    /// Release poll interval.
    pub poll_interval_ms: u64,
    /// Initiator secp256k1 key (hex); generated when absent.
    pub initiator_key: Option<String>,
    /// Liquidity provider Ed25519 seed; generated when absent.
    pub lp_seed: Option<[u8; 32]>,
    /// Liquidity deposited by the provider on each ledger.
    pub deposit_amount: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            network: NetworkTag::Testnet,
            log_level: "info".to_string(),
            poll_interval_ms: 500,
            initiator_key: None,
            lp_seed: None,
            deposit_amount: 10_000_000,
        }
    }
}

impl RuntimeConfig {
    /// Load from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("XS_NETWORK") {
            match NetworkTag::parse(&value) {
                Some(network) => config.network = network,
                None => warn!("XS_NETWORK must be testnet or mainnet, got {:?}", value),
            }
        }

        if let Some(level) = lookup("XS_LOG_LEVEL").or_else(|| lookup("RUST_LOG")) {
            config.log_level = level;
        }

        if let Some(value) = lookup("XS_POLL_INTERVAL_MS") {
            match value.parse() {
                Ok(ms) => config.poll_interval_ms = ms,
                Err(_) => warn!("XS_POLL_INTERVAL_MS is not a number: {:?}", value),
            }
        }

        if let Some(key) = lookup("XS_INITIATOR_KEY") {
            match hex::decode(key.trim_start_matches("0x")) {
                Ok(bytes) if bytes.len() == 32 => {
                    config.initiator_key = Some(key);
                    info!("Loaded initiator key from environment");
                }
                _ => warn!("XS_INITIATOR_KEY must be 32 bytes (64 hex chars)"),
            }
        }

        if let Some(seed) = lookup("XS_LP_KEY") {
            match hex::decode(seed.trim_start_matches("0x")) {
                Ok(bytes) if bytes.len() == 32 => {
                    let mut out = [0u8; 32];
                    out.copy_from_slice(&bytes);
                    config.lp_seed = Some(out);
                    info!("Loaded liquidity provider key from environment");
                }
                _ => warn!("XS_LP_KEY must be 32 bytes (64 hex chars)"),
            }
        }

        if let Some(value) = lookup("XS_DEPOSIT_AMOUNT") {
            match value.parse() {
                Ok(amount) => config.deposit_amount = amount,
                Err(_) => warn!("XS_DEPOSIT_AMOUNT is not a number: {:?}", value),
            }
        }

        config
    }

    /// Reject configurations the demo cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.deposit_amount == 0 {
            return Err(ConfigError::ZeroDeposit);
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(())
    }

    /// Protocol parameters for both ledgers.
    pub fn protocol(&self) -> ProtocolConfig {
        ProtocolConfig::for_network(self.network)
    }

    /// Coordinator tuning.
    pub fn coordinator(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            poll_interval_ms: self.poll_interval_ms,
            ..CoordinatorConfig::default()
        }
    }
}
