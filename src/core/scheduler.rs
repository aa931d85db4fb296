//! Polling scheduler driving the fetch-evaluate-store sweeps.

use crate::db::SignalSink;
use crate::metrics::Metrics;
use crate::models::{SignalRecord, Symbol};
use crate::services::fetcher::SnapshotSource;
use crate::services::CredentialPool;
use crate::signals::{evaluate, EvalMode};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{error, info, warn};

/// Default cadences for the two sweep modes.
pub const FAST_SWEEP_PERIOD: Duration = Duration::from_secs(60);
pub const SLOW_SWEEP_PERIOD: Duration = Duration::from_secs(600);

/// Stagger for the slow loop's first pass.
pub const SLOW_SWEEP_STARTUP_DELAY: Duration = Duration::from_secs(30);

/// One polling loop: an evaluation mode, its cadence, and the delay
/// before its first pass.
#[derive(Debug, Clone, Copy)]
pub struct SweepConfig {
    pub mode: EvalMode,
    pub period: Duration,
    pub startup_delay: Duration,
}

impl SweepConfig {
    /// Entry-signal sweep on the fast cadence.
    pub fn fast() -> Self {
        Self {
            mode: EvalMode::BuySell,
            period: FAST_SWEEP_PERIOD,
            startup_delay: Duration::ZERO,
        }
    }

    /// Position-upkeep sweep on the slow cadence, staggered at startup.
    pub fn slow() -> Self {
        Self {
            mode: EvalMode::HoldExit,
            period: SLOW_SWEEP_PERIOD,
            startup_delay: SLOW_SWEEP_STARTUP_DELAY,
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn with_startup_delay(mut self, delay: Duration) -> Self {
        self.startup_delay = delay;
        self
    }
}

/// Everything a sweep needs: the symbol universe, credential rotation,
/// snapshot source, signal sink, and optional metrics.
pub struct SweepContext {
    pub symbols: Vec<Symbol>,
    pub credentials: CredentialPool,
    pub source: Arc<dyn SnapshotSource>,
    pub sink: Arc<dyn SignalSink>,
    pub metrics: Option<Arc<Metrics>>,
}

/// Tally of one sweep pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepSummary {
    pub stored: usize,
    pub skipped: usize,
    pub dropped: usize,
    pub cancelled: bool,
}

/// Runs every configured sweep loop against one shared context.
///
/// Symbols within a sweep run sequentially; the loops themselves run
/// concurrently but share the credential rotation, so requests spread
/// across keys process-wide.
pub struct PollingScheduler {
    ctx: Arc<SweepContext>,
    sweeps: Vec<SweepConfig>,
    shutdown: watch::Sender<bool>,
    handles: RwLock<Vec<JoinHandle<()>>>,
}

impl PollingScheduler {
    pub fn new(ctx: SweepContext, sweeps: Vec<SweepConfig>) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            ctx: Arc::new(ctx),
            sweeps,
            shutdown,
            handles: RwLock::new(Vec::new()),
        }
    }

    /// Spawn one polling loop per configured sweep.
    pub async fn start(&self) {
        let mut handles = self.handles.write().await;
        for config in &self.sweeps {
            let ctx = self.ctx.clone();
            let config = *config;
            let shutdown = self.shutdown.subscribe();
            handles.push(tokio::spawn(run_sweep_loop(ctx, config, shutdown)));
        }
        info!(loops = handles.len(), "PollingScheduler: started");
    }

    /// Signal shutdown and wait for the loops to wind down. Sweeps check
    /// the signal between symbols, so this returns without waiting out a
    /// full pass.
    pub async fn stop(&self) {
        self.shutdown.send(true).ok();
        let mut handles = self.handles.write().await;
        for handle in handles.drain(..) {
            if let Err(e) = handle.await {
                error!(error = %e, "PollingScheduler: sweep loop panicked");
            }
        }
        info!("PollingScheduler: stopped");
    }

    pub async fn is_running(&self) -> bool {
        !self.handles.read().await.is_empty()
    }
}

/// Fixed-delay pacing: the full duration elapses after a sweep finishes,
/// regardless of how long the sweep took. Returns true when shutdown
/// fired (or the channel closed) instead.
async fn idle_or_stop(duration: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = time::sleep(duration) => *shutdown.borrow(),
        changed = shutdown.changed() => changed.is_err() || *shutdown.borrow(),
    }
}

async fn run_sweep_loop(
    ctx: Arc<SweepContext>,
    config: SweepConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(
        mode = %config.mode,
        period_secs = config.period.as_secs(),
        "PollingScheduler: sweep loop starting"
    );

    if !config.startup_delay.is_zero() && idle_or_stop(config.startup_delay, &mut shutdown).await {
        info!(mode = %config.mode, "PollingScheduler: sweep loop stopped during startup delay");
        return;
    }

    loop {
        let started = Instant::now();
        let summary = run_sweep(&ctx, config.mode, &shutdown).await;
        if summary.cancelled {
            break;
        }

        if let Some(ref metrics) = ctx.metrics {
            metrics.sweeps_completed_total.inc();
        }
        info!(
            mode = %config.mode,
            stored = summary.stored,
            skipped = summary.skipped,
            dropped = summary.dropped,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "PollingScheduler: sweep complete"
        );

        if idle_or_stop(config.period, &mut shutdown).await {
            break;
        }
    }

    info!(mode = %config.mode, "PollingScheduler: sweep loop stopped");
}

async fn run_sweep(
    ctx: &SweepContext,
    mode: EvalMode,
    shutdown: &watch::Receiver<bool>,
) -> SweepSummary {
    let mut summary = SweepSummary::default();
    for symbol in &ctx.symbols {
        if *shutdown.borrow() {
            info!(mode = %mode, "PollingScheduler: sweep cancelled mid-pass");
            summary.cancelled = true;
            break;
        }
        if let Some(ref metrics) = ctx.metrics {
            metrics.sweep_symbols_total.inc();
        }
        match process_symbol(ctx, mode, symbol).await {
            SymbolOutcome::Stored => summary.stored += 1,
            SymbolOutcome::Skipped => summary.skipped += 1,
            SymbolOutcome::Dropped => summary.dropped += 1,
        }
    }
    summary
}

enum SymbolOutcome {
    Stored,
    Skipped,
    Dropped,
}

/// One symbol, start to finish: rotate to the next credential, fetch a
/// snapshot, evaluate it, upsert the row. Failures never abort the
/// surrounding sweep.
async fn process_symbol(ctx: &SweepContext, mode: EvalMode, symbol: &Symbol) -> SymbolOutcome {
    let credential = ctx.credentials.next_key();
    let snapshot = match ctx.source.fetch(symbol, credential).await {
        Ok(snapshot) => snapshot,
        Err(reason) => {
            warn!(
                mode = %mode,
                symbol = %symbol,
                reason = %reason,
                "PollingScheduler: symbol skipped for this sweep"
            );
            if let Some(ref metrics) = ctx.metrics {
                metrics.symbols_skipped_total.inc();
            }
            return SymbolOutcome::Skipped;
        }
    };

    let verdict = evaluate(mode, &snapshot);
    info!(
        mode = %mode,
        symbol = %symbol,
        signal = %verdict.kind,
        strength = verdict.strength,
        price = snapshot.price,
        "PollingScheduler: signal evaluated"
    );

    let record = SignalRecord::from_evaluation(&snapshot, verdict);
    match ctx.sink.upsert(&record).await {
        Ok(()) => {
            if let Some(ref metrics) = ctx.metrics {
                metrics.signals_stored_total.inc();
            }
            SymbolOutcome::Stored
        }
        Err(e) => {
            error!(
                mode = %mode,
                symbol = %symbol,
                error = %e,
                "PollingScheduler: dropping signal update after store retries"
            );
            if let Some(ref metrics) = ctx.metrics {
                metrics.store_failures_total.inc();
            }
            SymbolOutcome::Dropped
        }
    }
}
