// ── Session-managed poller ──
//
// One `poll()` is one cycle:
//
//   START → (every 20th cycle: logout + login) → FETCH
//     ├─ ok ─────────────────────────────────────────────→ SUCCESS
//     ├─ session expired → RE-LOGIN → FETCH ─ ok ────────→ SUCCESS
//     │                        └──── err ─ err ──────────→ FATAL
//     └─ any other error ────────────────────────────────→ FATAL
//
// Both successful paths go through the same normalize-then-filter step.

use std::time::Duration;

use tracing::{debug, error, info, warn};

use stationwatch_api::{DeviceClient, RawDeviceList};

use crate::config::{PollerConfig, SESSION_REFRESH_CYCLES};
use crate::convert::snapshot_from_raw;
use crate::error::{CoreError, CycleError, CycleStage};
use crate::model::{DeviceSnapshot, MacAddress, MacFilter, apply_filter};
use crate::session::Session;

/// Polls one router, keeping its session alive across cycles.
///
/// Does not schedule itself: call [`poll()`](Self::poll) from a timer
/// (see [`Monitor`](crate::Monitor)). `&mut self` keeps cycles strictly
/// sequential.
pub struct Poller<C> {
    session: Session<C>,
    filter: Option<MacFilter>,
    scan_interval: Duration,
    cycle: u64,
}

impl<C: DeviceClient> Poller<C> {
    pub fn new(client: C, config: &PollerConfig) -> Self {
        info!(
            host = %config.host,
            scan_interval_secs = config.scan_interval.as_secs(),
            "initializing poller"
        );

        let filter = config.mac_filter.as_deref().and_then(MacFilter::parse);
        match &filter {
            Some(f) => {
                let macs: Vec<&str> = f.iter().map(MacAddress::as_str).collect();
                info!(count = f.len(), ?macs, "MAC filter enabled");
            }
            None => info!("no MAC filter, all devices will be included"),
        }

        Self {
            session: Session::new(
                client,
                config.username.clone(),
                config.password.clone(),
                config.call_timeout,
            ),
            filter,
            scan_interval: config.scan_interval,
            cycle: 0,
        }
    }

    // ── Session passthrough ──────────────────────────────────────

    /// Log in. Fails if the router rejects the credentials or is
    /// unreachable; the session stays unauthenticated in that case.
    pub async fn login(&mut self) -> Result<(), CoreError> {
        self.session.login().await
    }

    /// Log out. The session is unauthenticated afterwards even if the
    /// router call failed.
    pub async fn logout(&mut self) -> Result<(), CoreError> {
        self.session.logout().await
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    // ── Accessors ────────────────────────────────────────────────

    /// Number of poll attempts so far.
    pub fn cycle_count(&self) -> u64 {
        self.cycle
    }

    pub fn scan_interval(&self) -> Duration {
        self.scan_interval
    }

    // ── Cycle ────────────────────────────────────────────────────

    /// Run one poll cycle.
    ///
    /// `Ok(None)` means the router returned no data; that is reported as
    /// a warning, not a failure.
    pub async fn poll(&mut self) -> Result<Option<DeviceSnapshot>, CycleError> {
        self.cycle += 1;
        let cycle = self.cycle;
        debug!(cycle, "starting device poll");

        if cycle % SESSION_REFRESH_CYCLES == 0 {
            self.refresh_session(cycle).await;
        }

        let raw = match self.session.fetch_devices().await {
            Ok(raw) => raw,
            Err(e) if e.is_session_expired() => {
                warn!(cycle, error = %e, "device fetch failed, attempting re-login");
                self.recover(cycle).await?
            }
            Err(e) => {
                error!(cycle, error = %e, "error fetching devices");
                return Err(CycleError {
                    cycle,
                    stage: CycleStage::Fetch,
                    source: e,
                });
            }
        };

        Ok(self.finish(raw, cycle))
    }

    /// Proactive logout + login. Failures only warn; the fetch that
    /// follows runs with whatever session state results.
    async fn refresh_session(&mut self, cycle: u64) {
        debug!(cycle, "performing periodic session refresh");
        if let Err(e) = self.session.logout().await {
            warn!(cycle, error = %e, "periodic session refresh: logout failed");
        }
        if let Err(e) = self.session.login().await {
            warn!(cycle, error = %e, "periodic session refresh: login failed, continuing");
        }
    }

    /// Single recovery attempt after an expired-session signal.
    async fn recover(&mut self, cycle: u64) -> Result<Option<RawDeviceList>, CycleError> {
        self.session.invalidate();

        if let Err(e) = self.session.login().await {
            error!(cycle, error = %e, "re-login failed");
            return Err(CycleError {
                cycle,
                stage: CycleStage::RecoveryLogin,
                source: e,
            });
        }

        match self.session.fetch_devices().await {
            Ok(raw) => {
                info!(cycle, "re-login successful, device data retrieved");
                Ok(raw)
            }
            Err(e) => {
                error!(cycle, error = %e, "device fetch after re-login failed");
                Err(CycleError {
                    cycle,
                    stage: CycleStage::RecoveryFetch,
                    source: e,
                })
            }
        }
    }

    fn finish(&self, raw: Option<RawDeviceList>, cycle: u64) -> Option<DeviceSnapshot> {
        let Some(raw) = raw else {
            warn!(cycle, "no device data returned from router");
            return None;
        };

        let snapshot = apply_filter(self.filter.as_ref(), snapshot_from_raw(raw, cycle));
        info!(
            cycle,
            lan = snapshot.lan.len(),
            wlan = snapshot.wlan.len(),
            "device update successful"
        );
        Some(snapshot)
    }
}
