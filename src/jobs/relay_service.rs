use crate::error::CycleError;
use crate::jobs::relay_sentiment::{CycleReport, RelaySession};
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// In-memory counters for the lifetime of the process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayStats {
    pub cycles: u64,
    pub submitted: u64,
    pub skipped: u64,
    pub last_sequence_number: Option<u64>,
}

impl RelayStats {
    fn record_success(&mut self, report: &CycleReport) {
        self.cycles += 1;
        if !report.submitted {
            return;
        }
        if let Some(last) = self.last_sequence_number {
            if report.sequence_number <= last {
                warn!(
                    previous = last,
                    current = report.sequence_number,
                    "⚠️  Nonce did not advance; another sender may be using this key"
                );
            }
        }
        self.submitted += 1;
        self.last_sequence_number = Some(report.sequence_number);
    }

    fn record_skip(&mut self) {
        self.cycles += 1;
        self.skipped += 1;
    }
}

/// Drives relay cycles off a fixed-interval timer. Cycles run inline, so a tick
/// that fires while a cycle is in flight waits for it; cycles never overlap.
pub struct RelayService {
    session: RelaySession,
    max_cycles: Option<u64>,
}

impl RelayService {
    pub fn new(session: RelaySession) -> Self {
        Self {
            session,
            max_cycles: None,
        }
    }

    /// Stop after `cycles` cycles instead of running until shutdown.
    pub fn with_max_cycles(mut self, cycles: u64) -> Self {
        self.max_cycles = Some(cycles);
        self
    }

    /// Runs until `shutdown` is cancelled, `max_cycles` is reached, or a cycle
    /// hits a fatal error. Transient failures forfeit the cycle and wait for the next tick.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<RelayStats, CycleError> {
        let period = self.session.interval();
        info!("⏱️  Relay interval: {:?}", period);

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut stats = RelayStats::default();

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("🛑 Shutdown requested, stopping relay loop");
                    break;
                }
                _ = ticker.tick() => {}
            }

            let outcome = tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    warn!("🛑 Shutdown requested, abandoning in-flight relay cycle");
                    break;
                }
                outcome = self.session.run_cycle() => outcome,
            };

            match outcome {
                Ok(report) => stats.record_success(&report),
                Err(err) if err.is_fatal() => {
                    error!(stage = %err.stage(), "❌ Fatal relay error: {}", err);
                    return Err(err);
                }
                Err(err) => {
                    warn!(stage = %err.stage(), "⚠️  Relay cycle skipped: {}", err);
                    stats.record_skip();
                }
            }

            if self.max_cycles.is_some_and(|max| stats.cycles >= max) {
                break;
            }
        }

        info!(
            cycles = stats.cycles,
            submitted = stats.submitted,
            skipped = stats.skipped,
            "📊 Relay loop finished"
        );
        Ok(stats)
    }
}
