use thiserror::Error;

/// Top-level error type for the `stationwatch-api` crate.
///
/// Every failure a [`DeviceClient`](crate::DeviceClient) can report.
/// `stationwatch-core` classifies these via [`Error::kind`] and maps them
/// into domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login or logout rejected by the router (wrong credentials,
    /// too many sessions, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status on a data request.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// The response body could not be parsed as device data. Routers
    /// answer with a login page or garbage once the session is gone, so
    /// this doubles as the session-expiry signal.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

/// Coarse classification of an [`Error`], decided at the client boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Credentials rejected.
    Authentication,
    /// Unparsable response -- the session most likely expired.
    Structural,
    /// Network, timeout, TLS, or HTTP-status failure. Re-authenticating
    /// does not help.
    Transport,
}

impl Error {
    /// Classify this error for the poller's recovery policy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::Deserialization { .. } => ErrorKind::Structural,
            Self::Transport(_)
            | Self::Http { .. }
            | Self::InvalidUrl(_)
            | Self::Timeout { .. }
            | Self::Tls(_) => ErrorKind::Transport,
        }
    }

    /// Returns `true` if this error indicates the session has likely
    /// expired and a single re-login might resolve it.
    pub fn is_session_expired(&self) -> bool {
        self.kind() == ErrorKind::Structural
    }

    /// Returns `true` if this is a timeout, at any layer.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Build a [`Deserialization`](Self::Deserialization) error with a
    /// bounded body preview in the message.
    pub(crate) fn unparsable(err: &serde_json::Error, body: &str) -> Self {
        let preview: String = body.chars().take(200).collect();
        Self::Deserialization {
            message: format!("{err} (body preview: {preview:?})"),
            body: body.to_owned(),
        }
    }
}
