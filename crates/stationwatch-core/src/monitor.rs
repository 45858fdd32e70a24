// ── Background poll driver ──
//
// Runs a `Poller` on a fixed interval inside one spawned task and
// publishes the outcome of every cycle through a `watch` channel. A
// failed cycle never clears the last good snapshot.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use stationwatch_api::DeviceClient;

use crate::error::{CoreError, CycleError};
use crate::model::DeviceSnapshot;
use crate::poller::Poller;

/// What the monitor knows after its most recent cycle.
#[derive(Debug, Clone, Default)]
pub struct MonitorState {
    /// Last successfully fetched snapshot. `None` until the first
    /// success, or after the router returned an empty listing.
    pub snapshot: Option<Arc<DeviceSnapshot>>,
    /// Message of the most recent failed cycle, cleared on success.
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
    pub last_success_at: Option<DateTime<Utc>>,
    /// Poll cycles attempted so far.
    pub cycles: u64,
}

impl MonitorState {
    /// `true` while the published snapshot is older than the last cycle.
    pub fn is_stale(&self) -> bool {
        self.consecutive_failures > 0
    }

    fn record(&mut self, cycle: u64, result: Result<Option<DeviceSnapshot>, CycleError>) {
        self.cycles = cycle;
        match result {
            Ok(snapshot) => {
                self.snapshot = snapshot.map(Arc::new);
                self.last_error = None;
                self.consecutive_failures = 0;
                self.last_success_at = Some(Utc::now());
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
            }
        }
    }
}

/// Owns a [`Poller`] and drives it on its scan interval.
///
/// Created by [`start()`](Self::start), which logs in and runs the first
/// cycle before spawning anything. Stop with [`shutdown()`](Self::shutdown)
/// so the router session is released.
pub struct Monitor {
    state: watch::Receiver<MonitorState>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl Monitor {
    /// Log in, run the first cycle, then spawn the interval loop.
    ///
    /// A failed login or first cycle is returned as-is and nothing is
    /// spawned; after a failed first cycle the session is logged out.
    pub async fn start<C>(mut poller: Poller<C>) -> Result<Self, CoreError>
    where
        C: DeviceClient + 'static,
    {
        poller.login().await?;

        let first = match poller.poll().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                if let Err(logout_err) = poller.logout().await {
                    warn!(error = %logout_err, "logout after failed first poll also failed");
                }
                return Err(e.into());
            }
        };

        let mut initial = MonitorState::default();
        initial.record(poller.cycle_count(), Ok(first));

        let (tx, rx) = watch::channel(initial);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(poll_task(poller, tx, cancel.clone()));

        info!("monitor started");
        Ok(Self {
            state: rx,
            cancel,
            task,
        })
    }

    /// Copy of the current state.
    pub fn state(&self) -> MonitorState {
        self.state.borrow().clone()
    }

    /// Receiver that is notified after every cycle.
    pub fn subscribe(&self) -> watch::Receiver<MonitorState> {
        self.state.clone()
    }

    /// Stop polling and log out.
    ///
    /// A cycle already in progress is allowed to finish first.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            warn!(error = %e, "poll task ended abnormally");
        }
        info!("monitor stopped");
    }
}

async fn poll_task<C: DeviceClient>(
    mut poller: Poller<C>,
    state: watch::Sender<MonitorState>,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(poller.scan_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let result = poller.poll().await;
                let cycle = poller.cycle_count();
                state.send_modify(|s| s.record(cycle, result));
            }
        }
    }

    if let Err(e) = poller.logout().await {
        warn!(error = %e, "logout on shutdown failed");
    }
    debug!("poll task exited");
}
