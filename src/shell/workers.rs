// Scheduled outbox sweeping.
//
// One sweep per interval tick, each bounded by a timeout. A run that overruns
// is dropped, which aborts its in-flight store and bus calls; the entries it
// did not mark stay pending for the next tick.

use crate::modules::products::use_cases::process_outbox::sweeper::OutboxSweeper;
use crate::shared::infrastructure::outbox::OutboxRepository;
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub runs: u64,
    pub failed_runs: u64,
    pub timed_out_runs: u64,
    pub published: u64,
}

pub async fn run_sweeper<TOutbox, TPublisher, TShutdown>(
    sweeper: &OutboxSweeper<TOutbox, TPublisher>,
    settings: SweepSettings,
    shutdown: TShutdown,
) -> SweepStats
where
    TOutbox: OutboxRepository + ?Sized,
    TPublisher: ?Sized + Send + Sync + 'static,
    TShutdown: Future<Output = ()>,
{
    let mut stats = SweepStats::default();
    let mut ticker = tokio::time::interval(settings.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!(runs = stats.runs, "shutdown requested, outbox sweeper stopping");
                break;
            }
            _ = ticker.tick() => {
                stats.runs += 1;
                match tokio::time::timeout(settings.timeout, sweeper.run()).await {
                    Ok(Ok(report)) => {
                        stats.published += report.processed.len() as u64;
                    }
                    Ok(Err(err)) => {
                        stats.failed_runs += 1;
                        tracing::error!(error = %err, "outbox sweep failed");
                    }
                    Err(_) => {
                        stats.timed_out_runs += 1;
                        tracing::warn!(
                            timeout_ms = settings.timeout.as_millis() as u64,
                            "outbox sweep timed out"
                        );
                    }
                }
            }
        }
    }
    stats
}

/// Resolves on Ctrl-C. If the handler cannot be installed the worker runs
/// until killed.
pub async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
