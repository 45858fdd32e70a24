//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;
use tracing::debug;

use stationwatch_config::ConfigError;
use stationwatch_core::{CoreError, CycleError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to router at {url}")]
    #[diagnostic(
        code(stationwatch::connection_failed),
        help(
            "Check that the router is reachable and the host URL is right.\n\
             URL: {url}\n\
             Self-signed HTTPS? Try: stationwatch devices --insecure"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Router error: {message}")]
    #[diagnostic(code(stationwatch::router_error))]
    RouterError { message: String },

    #[error("Router did not return a device listing")]
    #[diagnostic(
        code(stationwatch::unexpected_response),
        help(
            "The router answered with something other than device data, even after\n\
             logging in again. Check the profile's devices_path and credentials.\n\
             Detail: {message}"
        )
    )]
    UnexpectedResponse { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(stationwatch::auth_failed),
        help(
            "Verify the router username and password.\n\
             Run: stationwatch config set-password --profile {profile}"
        )
    )]
    AuthFailed { profile: String, message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(stationwatch::no_credentials),
        help(
            "Configure credentials with: stationwatch config init\n\
             Or set the STATIONWATCH_PASSWORD environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(stationwatch::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(stationwatch::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: stationwatch config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(stationwatch::no_config),
        help(
            "Create one with: stationwatch config init\n\
             Expected at: {path}\n\
             Or pass --host, --username and --password directly."
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(stationwatch::config))]
    Config(Box<figment::Error>),

    #[error("Failed to write configuration: {message}")]
    #[diagnostic(code(stationwatch::config_write))]
    ConfigWrite { message: String },

    #[error("System keyring unavailable: {message}")]
    #[diagnostic(
        code(stationwatch::keyring),
        help("Store the password in the profile or STATIONWATCH_PASSWORD instead.")
    )]
    Keyring { message: String },

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(stationwatch::timeout),
        help("Increase timeout with --timeout or check router responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(stationwatch::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(stationwatch::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Name the active profile in a rejected login.
    #[must_use]
    pub fn for_profile(self, name: &str) -> Self {
        match self {
            Self::AuthFailed { message, .. } => Self::AuthFailed {
                profile: name.to_owned(),
                message,
            },
            other => other,
        }
    }

    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            // Profile is filled in by `for_profile` once the caller knows it.
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                profile: String::new(),
                message,
            },

            CoreError::SessionExpired { message } => CliError::UnexpectedResponse { message },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::Api { message, status: _ } => CliError::RouterError { message },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Cycle(cycle) => CliError::from(*cycle),
        }
    }
}

impl From<CycleError> for CliError {
    fn from(err: CycleError) -> Self {
        debug!(cycle = err.cycle, stage = %err.stage, "poll cycle failed");
        CliError::from(err.source)
    }
}

impl From<stationwatch_api::Error> for CliError {
    fn from(err: stationwatch_api::Error) -> Self {
        CliError::from(CoreError::from(err))
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: "(none)".into(),
            },
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Serialization(e) => CliError::ConfigWrite {
                message: e.to_string(),
            },
            ConfigError::Keyring(e) => CliError::Keyring {
                message: e.to_string(),
            },
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use stationwatch_core::CycleStage;

    use super::*;

    #[test]
    fn exit_codes_follow_error_class() {
        let auth: CliError = CoreError::AuthenticationFailed {
            message: "denied".into(),
        }
        .into();
        assert_eq!(auth.exit_code(), exit_code::AUTH);

        let conn: CliError = CoreError::ConnectionFailed {
            url: "http://192.168.0.1".into(),
            reason: "refused".into(),
        }
        .into();
        assert_eq!(conn.exit_code(), exit_code::CONNECTION);

        let timeout: CliError = CoreError::Timeout { timeout_secs: 5 }.into();
        assert_eq!(timeout.exit_code(), exit_code::TIMEOUT);

        let usage: CliError = ConfigError::Validation {
            field: "scan_interval".into(),
            reason: "too small".into(),
        }
        .into();
        assert_eq!(usage.exit_code(), exit_code::USAGE);
    }

    #[test]
    fn cycle_error_maps_through_to_its_source() {
        let err: CliError = CycleError {
            cycle: 3,
            stage: CycleStage::RecoveryLogin,
            source: CoreError::AuthenticationFailed {
                message: "locked out".into(),
            },
        }
        .into();
        assert!(matches!(err, CliError::AuthFailed { .. }));
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn rejected_login_names_the_active_profile() {
        let err = CliError::from(CoreError::AuthenticationFailed {
            message: "bad password".into(),
        })
        .for_profile("cabin");
        match &err {
            CliError::AuthFailed { profile, .. } => assert_eq!(profile, "cabin"),
            other => panic!("expected AuthFailed, got {other:?}"),
        }
        let help = miette::Diagnostic::help(&err).map(|h| h.to_string());
        assert!(help.is_some_and(|h| h.contains("--profile cabin")));
    }

    #[test]
    fn for_profile_leaves_other_errors_alone() {
        let err = CliError::from(CoreError::Timeout { timeout_secs: 5 }).for_profile("cabin");
        assert!(matches!(err, CliError::Timeout { seconds: 5 }));
    }
}
