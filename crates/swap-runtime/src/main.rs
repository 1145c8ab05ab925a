//! # Swap Demo
//!
//! Runs two cross-ledger swaps against in-memory ledgers:
//!
//! ```text
//! completed:  postSwap → lock → release → executeSwap (relay learns the secret)
//! expired:    postSwap → source expiry → sweepExpired  (lock is refused)
//! ```
//!
//! ## Startup Sequence
//!
//! 1. Install the tracing subscriber (`XS_LOG_LEVEL`, then `RUST_LOG`)
//! 2. Load configuration from the environment
//! 3. Validate configuration
//! 4. Fund both ledgers and deposit pool liquidity
//! 5. Run both scenarios and log their balance changes

use anyhow::{Context, Result};
use swap_protocol::short_hex;
use swap_runtime::{DemoHarness, RuntimeConfig, SwapReport};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn log_report(report: &SwapReport) {
    info!(
        "[{}] swap {} finished as {:?}",
        report.scenario,
        short_hex(&report.swap_id),
        report.progress
    );
    info!(
        "[{}] initiator {:+} on source, provider {:+} on source / {:+} on destination, recipient {:+}",
        report.scenario,
        report.initiator_source_delta,
        report.provider_source_delta,
        report.provider_destination_delta,
        report.recipient_destination_delta
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_env("XS_LOG_LEVEL")
        .or_else(|_| EnvFilter::try_from_default_env())
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Invalid log filter")?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load configuration
    let config = RuntimeConfig::from_env();
    config.validate().context("Invalid configuration")?;
    info!(
        "Starting swap demo v{} on {} (log level {})",
        swap_protocol::VERSION,
        config.network,
        config.log_level
    );

    let harness = DemoHarness::setup(&config)
        .await
        .context("Failed to set up ledgers")?;

    let completed = harness
        .run_completed_swap()
        .await
        .context("Completed-swap scenario failed")?;
    log_report(&completed);

    let expired = harness
        .run_expired_swap()
        .await
        .context("Expired-swap scenario failed")?;
    log_report(&expired);

    info!("Demo finished");
    Ok(())
}
