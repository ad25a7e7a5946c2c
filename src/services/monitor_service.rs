use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::api::solana::LogNotification;
use crate::api::ChatTransport;
use crate::models::TransactionRecord;
use crate::services::alert_service;
use crate::services::detection_service::MevScanner;
use crate::utils::seen::RecentSignatures;

/// Default pause between poll cycles
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// What starts each poll cycle
pub enum MonitorTrigger {
    /// Poll continuously, pausing the poll interval between cycles
    Interval,
    /// Wait for a log notification before each cycle; falls back to `Interval` when the stream ends
    Logs(mpsc::Receiver<LogNotification>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Polling,
    Notifying,
}

/// Result of a single poll cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The ledger call failed; nothing was sent
    FetchFailed,
    /// Nothing new and notable
    Quiet,
    /// An alert covering this many transactions was delivered
    Delivered(usize),
    /// An alert covering this many transactions could not be delivered
    DeliveryFailed(usize),
}

enum Wake {
    Event(Option<LogNotification>),
    Shutdown,
}

/// Background poll → classify → notify loop for one address
pub struct MonitorLoop {
    scanner: Arc<MevScanner>,
    transport: Arc<dyn ChatTransport>,
    target: u64,
    interval: Duration,
    seen: RecentSignatures,
    trigger: MonitorTrigger,
    state: MonitorState,
}

impl MonitorLoop {
    /// New loop delivering to `target`, with no duplicate suppression
    pub fn new(
        scanner: Arc<MevScanner>,
        transport: Arc<dyn ChatTransport>,
        target: u64,
        interval: Duration,
    ) -> Self {
        Self {
            scanner,
            transport,
            target,
            interval,
            seen: RecentSignatures::new(0),
            trigger: MonitorTrigger::Interval,
            state: MonitorState::Polling,
        }
    }

    /// Suppress alerts for the last `capacity` delivered signatures (0 disables)
    pub fn with_seen_capacity(mut self, capacity: usize) -> Self {
        self.seen = RecentSignatures::new(capacity);
        self
    }

    pub fn with_trigger(mut self, trigger: MonitorTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Run one cycle. Fetch and delivery failures are logged here and never returned.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        self.state = MonitorState::Polling;

        let seen = &self.seen;
        let fresh = match self
            .scanner
            .scan_excluding(|record| seen.contains(&record.signature))
            .await
        {
            Ok(fresh) => fresh,
            Err(e) => {
                error!("Failed to fetch transactions for {}: {}", self.scanner.address(), e);
                return CycleOutcome::FetchFailed;
            }
        };

        if fresh.is_empty() {
            return CycleOutcome::Quiet;
        }

        self.state = MonitorState::Notifying;
        let outcome = self.deliver(&fresh).await;
        self.state = MonitorState::Polling;
        outcome
    }

    /// Send one message per batch that fits the transport's limit. Records are remembered
    /// as soon as their batch is delivered; the first failure ends the cycle.
    async fn deliver(&mut self, fresh: &[TransactionRecord]) -> CycleOutcome {
        let limit = self.transport.message_limit().unwrap_or(usize::MAX);
        let batches = alert_service::batch_for_limit(fresh, limit);
        let mut delivered = 0;

        for batch in batches {
            let alert = alert_service::format_alert(batch);
            if let Err(e) = self.transport.send_message(self.target, &alert).await {
                warn!(
                    "Failed to deliver MEV alert to {} ({} of {} transaction(s) sent): {}",
                    self.target,
                    delivered,
                    fresh.len(),
                    e
                );
                return CycleOutcome::DeliveryFailed(fresh.len() - delivered);
            }

            for record in batch {
                self.seen.insert(&record.signature);
            }
            delivered += batch.len();
        }

        info!("🚨 Sent MEV alert for {} transaction(s) to {}", delivered, self.target);
        CycleOutcome::Delivered(delivered)
    }

    /// Wait for whatever starts the next cycle. Returns false on shutdown.
    async fn wait_for_trigger(&mut self, shutdown: &mut watch::Receiver<bool>) -> bool {
        let MonitorTrigger::Logs(events) = &mut self.trigger else {
            return true;
        };

        let wake = tokio::select! {
            event = events.recv() => Wake::Event(event),
            _ = shutdown.changed() => Wake::Shutdown,
        };

        match wake {
            Wake::Event(Some(event)) => {
                // One poll covers every queued notification
                let mut skipped = 0;
                while events.try_recv().is_ok() {
                    skipped += 1;
                }
                debug!(
                    "Woken by log notification {:?} ({} more queued)",
                    event.signature, skipped
                );
                true
            }
            Wake::Event(None) => {
                warn!("Log subscription ended, falling back to interval polling");
                self.trigger = MonitorTrigger::Interval;
                true
            }
            Wake::Shutdown => false,
        }
    }

    /// Run until `shutdown` flips to true (or its sender is dropped)
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "👀 Monitoring {} every {}ms (duplicate suppression: {})",
            self.scanner.address(),
            self.interval.as_millis(),
            if self.seen.is_enabled() { "on" } else { "off" }
        );

        loop {
            let stopped = *shutdown.borrow();
            if stopped || !self.wait_for_trigger(&mut shutdown).await {
                break;
            }

            let outcome = self.run_cycle().await;
            debug!("Cycle finished: {:?} ({} signatures remembered)", outcome, self.seen.len());

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.changed() => break,
            }
        }

        info!("Monitor for {} stopped", self.scanner.address());
    }
}
