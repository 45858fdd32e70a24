//! Session-managed polling of a home router's connected-device listing.
//!
//! This crate owns the session lifecycle and the domain model that sits
//! between `stationwatch-api` and the CLI:
//!
//! - **[`Session`]**: One authenticated session against the router. Every
//!   network call is bounded by the configured call timeout.
//!
//! - **[`Poller`]**: One [`poll()`](Poller::poll) is one cycle: a proactive
//!   logout/login every [`SESSION_REFRESH_CYCLES`] cycles, a single re-login
//!   when the router answers with something that is not device data, then
//!   MAC normalization and filtering into a [`DeviceSnapshot`].
//!
//! - **[`Monitor`]**: Drives a poller on its scan interval in a background
//!   task and publishes [`MonitorState`] through a `watch` channel, keeping
//!   the last good snapshot across failed cycles.
//!
//! - **Domain model** ([`model`]): [`MacAddress`] (canonical lowercase
//!   colon form), [`DeviceRecord`], [`DeviceSnapshot`], and [`MacFilter`].

pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod monitor;
pub mod poller;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{
    DEFAULT_CALL_TIMEOUT, DEFAULT_SCAN_INTERVAL, MAX_SCAN_INTERVAL, MIN_SCAN_INTERVAL, PollerConfig,
    SESSION_REFRESH_CYCLES, TlsVerification,
};
pub use error::{CoreError, CycleError, CycleStage};
pub use monitor::{Monitor, MonitorState};
pub use poller::Poller;
pub use session::Session;

pub use model::{DeviceRecord, DeviceSnapshot, MacAddress, MacFilter, Origin, apply_filter};
