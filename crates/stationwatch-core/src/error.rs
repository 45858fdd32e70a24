// ── Core error types ──
//
// Domain errors from stationwatch-core. Consumers never see HTTP status
// codes or JSON parse failures directly; `From<stationwatch_api::Error>`
// translates them, preserving the expiry/transport classification.

use std::fmt;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// The router answered with something that is not device data.
    #[error("Session expired or response unparsable: {message}")]
    SessionExpired { message: String },

    // ── Transport ────────────────────────────────────────────────────
    #[error("Cannot connect to router at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Router request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Router error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Polling ──────────────────────────────────────────────────────
    #[error(transparent)]
    Cycle(Box<CycleError>),
}

impl CoreError {
    /// `true` for the structural signal that triggers one re-login.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired { .. })
    }

    /// The innermost error, looking through a failed cycle.
    pub fn root(&self) -> &CoreError {
        match self {
            Self::Cycle(c) => c.source.root(),
            other => other,
        }
    }

    /// `true` for network, timeout, and HTTP-level failures.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::Timeout { .. } | Self::Api { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<stationwatch_api::Error> for CoreError {
    fn from(err: stationwatch_api::Error) -> Self {
        match err {
            stationwatch_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            stationwatch_api::Error::Deserialization { message, body: _ } => {
                CoreError::SessionExpired { message }
            }
            stationwatch_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            stationwatch_api::Error::Http { status, message } => CoreError::Api {
                message: format!("HTTP {status}: {message}"),
                status: Some(status),
            },
            stationwatch_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            stationwatch_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            stationwatch_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
        }
    }
}

// ── Cycle failure ────────────────────────────────────────────────────

/// Where in a poll cycle the fatal error happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStage {
    /// Primary device fetch (non-expiry error, no retry attempted).
    Fetch,
    /// Re-login after an expired-session signal.
    RecoveryLogin,
    /// Device fetch after a successful re-login.
    RecoveryFetch,
}

impl fmt::Display for CycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch => f.write_str("fetch"),
            Self::RecoveryLogin => f.write_str("re-login"),
            Self::RecoveryFetch => f.write_str("fetch after re-login"),
        }
    }
}

/// A poll cycle failed and was not recovered.
///
/// The host should keep its last good snapshot and try again next tick.
#[derive(Debug, Error)]
#[error("poll cycle {cycle} failed during {stage}: {source}")]
pub struct CycleError {
    pub cycle: u64,
    pub stage: CycleStage,
    #[source]
    pub source: CoreError,
}

impl From<CycleError> for CoreError {
    fn from(err: CycleError) -> Self {
        Self::Cycle(Box::new(err))
    }
}

impl CycleError {
    /// `true` if a re-login was attempted before giving up.
    pub fn recovery_attempted(&self) -> bool {
        matches!(self.stage, CycleStage::RecoveryLogin | CycleStage::RecoveryFetch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialization_maps_to_session_expired() {
        let err: CoreError = stationwatch_api::Error::Deserialization {
            message: "expected value".into(),
            body: "<html>".into(),
        }
        .into();
        assert!(err.is_session_expired());
        assert!(!err.is_transport());
    }

    #[test]
    fn http_status_maps_to_api() {
        let err: CoreError = stationwatch_api::Error::Http {
            status: 502,
            message: "bad gateway".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Api { status: Some(502), .. }));
        assert!(err.is_transport());
    }

    #[test]
    fn cycle_error_display_names_stage() {
        let err = CycleError {
            cycle: 4,
            stage: CycleStage::RecoveryFetch,
            source: CoreError::Timeout { timeout_secs: 30 },
        };
        let text = err.to_string();
        assert!(text.contains("cycle 4"));
        assert!(text.contains("fetch after re-login"));
        assert!(err.recovery_attempted());
    }
}
