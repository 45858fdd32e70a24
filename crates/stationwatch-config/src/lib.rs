//! Configuration for the stationwatch CLI.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `stationwatch_core::PollerConfig`. The CLI layers
//! its global flag overrides on top of this.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stationwatch_api::Endpoints;
use stationwatch_core::{
    DEFAULT_CALL_TIMEOUT, DEFAULT_SCAN_INTERVAL, MAX_SCAN_INTERVAL, MIN_SCAN_INTERVAL,
    PollerConfig, TlsVerification,
};

/// Service name under which passwords live in the system keyring.
pub const KEYRING_SERVICE: &str = "stationwatch";

/// Env var consulted for the password when a profile names none.
pub const PASSWORD_ENV: &str = "STATIONWATCH_PASSWORD";

/// Env var consulted for the username when a profile has none.
pub const USERNAME_ENV: &str = "STATIONWATCH_USERNAME";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found in config")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named router profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use when none is given explicitly.
    pub fn default_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }

    /// Look up a profile by name.
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// TLS policy for profiles that do not set their own. Unset accepts
    /// self-signed certificates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Seconds between poll cycles.
    #[serde(default = "default_scan_interval")]
    pub scan_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: None,
            timeout: default_timeout(),
            scan_interval: default_scan_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    DEFAULT_CALL_TIMEOUT.as_secs()
}
fn default_scan_interval() -> u64 {
    DEFAULT_SCAN_INTERVAL.as_secs()
}

/// A named router profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Router base URL (e.g., "http://192.168.0.1").
    pub host: String,

    pub username: Option<String>,

    /// Password (plaintext; prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Override poll interval, seconds.
    pub scan_interval: Option<u64>,

    /// Comma-separated MACs to report; unset reports every device.
    pub mac_filter: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,

    pub login_path: Option<String>,
    pub logout_path: Option<String>,
    pub devices_path: Option<String>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "stationwatch", "stationwatch").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("stationwatch");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
///
/// A missing file is not an error; defaults apply. Env vars use a double
/// underscore for nesting, e.g. `STATIONWATCH_DEFAULTS__SCAN_INTERVAL`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("STATIONWATCH_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password)?;
    Ok(())
}

/// Resolve the username: profile, then `STATIONWATCH_USERNAME`.
pub fn resolve_username(profile: &Profile, profile_name: &str) -> Result<String, ConfigError> {
    profile
        .username
        .clone()
        .or_else(|| std::env::var(USERNAME_ENV).ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })
}

/// Resolve the password from the credential chain (no CLI flag step).
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_password_with(profile, profile_name, |name| std::env::var(name).ok())
}

fn resolve_password_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Some(val) = env(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. Well-known env var
    if let Some(val) = env(PASSWORD_ENV) {
        return Ok(SecretString::from(val));
    }

    // 3. System keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    // 4. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

// ── Validation ──────────────────────────────────────────────────────

/// Check a poll interval against the accepted bounds.
pub fn validate_scan_interval(secs: u64) -> Result<Duration, ConfigError> {
    let interval = Duration::from_secs(secs);
    if interval < MIN_SCAN_INTERVAL || interval > MAX_SCAN_INTERVAL {
        return Err(ConfigError::Validation {
            field: "scan_interval".into(),
            reason: format!(
                "{secs}s is outside {}..={}s",
                MIN_SCAN_INTERVAL.as_secs(),
                MAX_SCAN_INTERVAL.as_secs()
            ),
        });
    }
    Ok(interval)
}

/// Parse a router base URL.
pub fn parse_host(host: &str) -> Result<url::Url, ConfigError> {
    host.parse().map_err(|_| ConfigError::Validation {
        field: "host".into(),
        reason: format!("invalid URL: {host}"),
    })
}

/// Profile settings win; `[defaults] insecure` only applies to profiles
/// that pin neither a CA nor their own `insecure`.
fn tls_for(profile: &Profile, defaults: &Defaults) -> TlsVerification {
    match (&profile.ca_cert, profile.insecure) {
        (_, Some(true)) => TlsVerification::DangerAcceptInvalid,
        (Some(ca_path), _) => TlsVerification::CustomCa(ca_path.clone()),
        (None, Some(false)) => TlsVerification::SystemDefaults,
        (None, None) => match defaults.insecure {
            Some(false) => TlsVerification::SystemDefaults,
            // home routers are typically self-signed
            Some(true) | None => TlsVerification::DangerAcceptInvalid,
        },
    }
}

fn endpoints_for(profile: &Profile) -> Endpoints {
    let mut endpoints = Endpoints::default();
    if let Some(ref p) = profile.login_path {
        endpoints.login.clone_from(p);
    }
    if let Some(ref p) = profile.logout_path {
        endpoints.logout.clone_from(p);
    }
    if let Some(ref p) = profile.devices_path {
        endpoints.devices.clone_from(p);
    }
    endpoints
}

/// Build a `PollerConfig` from a profile, without CLI flag overrides.
pub fn profile_to_poller_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<PollerConfig, ConfigError> {
    let password = resolve_password(profile, profile_name)?;
    build_poller_config(profile, profile_name, defaults, password)
}

/// Build a `PollerConfig` from a profile with an already-resolved password.
pub fn build_poller_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    password: SecretString,
) -> Result<PollerConfig, ConfigError> {
    let host = parse_host(&profile.host)?;
    let username = resolve_username(profile, profile_name)?;

    let mut config = PollerConfig::new(host, username, password);
    config.scan_interval =
        validate_scan_interval(profile.scan_interval.unwrap_or(defaults.scan_interval))?;
    config.mac_filter.clone_from(&profile.mac_filter);
    config.call_timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.tls = tls_for(profile, defaults);
    config.endpoints = endpoints_for(profile);
    Ok(config)
}
