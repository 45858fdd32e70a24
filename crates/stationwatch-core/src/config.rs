// ── Runtime polling configuration ──
//
// These types describe *how* to poll one router. They carry credential
// data and tuning, but never touch disk. The CLI (via stationwatch-config)
// constructs a `PollerConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use stationwatch_api::{Endpoints, TlsMode, TransportConfig};

/// Cycles between proactive logout/login rotations.
pub const SESSION_REFRESH_CYCLES: u64 = 20;

/// Default poll interval.
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(30);

/// Default upper bound on a single router call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Shortest accepted poll interval.
pub const MIN_SCAN_INTERVAL: Duration = Duration::from_secs(10);

/// Longest accepted poll interval.
pub const MAX_SCAN_INTERVAL: Duration = Duration::from_secs(600);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs). Default for home routers.
    #[default]
    DangerAcceptInvalid,
}

/// Configuration for polling a single router.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Router base URL (e.g., `http://192.168.0.1`).
    pub host: Url,
    pub username: String,
    pub password: SecretString,
    /// Time between poll cycles.
    pub scan_interval: Duration,
    /// Comma-separated MACs to keep; `None` or empty keeps everything.
    pub mac_filter: Option<String>,
    /// Upper bound on any single login, logout, or fetch call.
    pub call_timeout: Duration,
    pub tls: TlsVerification,
    /// Request paths for the HTTP client.
    pub endpoints: Endpoints,
}

impl PollerConfig {
    pub fn new(host: Url, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            host,
            username: username.into(),
            password,
            scan_interval: DEFAULT_SCAN_INTERVAL,
            mac_filter: None,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            tls: TlsVerification::default(),
            endpoints: Endpoints::default(),
        }
    }

    /// Transport settings for building an HTTP device client.
    ///
    /// Carries no deadline: `call_timeout` is enforced around each call by
    /// the session.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig::new(match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        })
    }
}
