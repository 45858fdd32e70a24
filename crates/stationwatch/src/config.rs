//! CLI configuration: thin wrapper around `stationwatch_config`.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--host, --username, --password, etc.).

use clap::ValueEnum;
use secrecy::SecretString;
use tracing::warn;

use stationwatch_core::PollerConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use stationwatch_config::{
    Config, Defaults, Profile, config_path, load_config, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Per-command overrides layered over the profile.
#[derive(Debug, Default)]
pub struct Overrides<'a> {
    pub mac_filter: Option<&'a str>,
    pub scan_interval: Option<u64>,
}

/// Fill `--output` and `--color` from `[defaults]` when neither a flag nor
/// the environment set them.
pub fn apply_output_defaults(global: &mut GlobalOpts, defaults: &Defaults) {
    if global.output.is_none() {
        global.output = parse_default("output", &defaults.output);
    }
    if global.color.is_none() {
        global.color = parse_default("color", &defaults.color);
    }
}

fn parse_default<T: ValueEnum>(field: &str, raw: &str) -> Option<T> {
    match T::from_str(raw, true) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(field, value = raw, "ignoring invalid config default: {e}");
            None
        }
    }
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.default_profile_name().to_owned())
}

fn available_profiles(config: &Config) -> String {
    let mut names: Vec<_> = config.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}

/// A ready-to-use poller configuration and the profile it came from.
#[derive(Debug)]
pub struct Resolved {
    pub config: PollerConfig,
    pub profile: String,
}

/// Build a `PollerConfig` from the config file, the active profile, and
/// CLI overrides.
///
/// Flags take priority over profile values. Without a matching profile,
/// `--host` alone is enough to run against an unconfigured router.
pub fn resolve_poller_config(
    global: &GlobalOpts,
    overrides: &Overrides<'_>,
) -> Result<Resolved, CliError> {
    let cfg = load_config()?;
    let profile_name = active_profile_name(global, &cfg);

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.host.is_some() => Profile::default(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&cfg),
            });
        }
        None => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    // 1. Connection (flag > env > profile)
    if let Some(ref host) = global.host {
        profile.host.clone_from(host);
    }
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    // 2. Polling
    if let Some(filter) = overrides.mac_filter {
        profile.mac_filter = Some(filter.to_owned());
    }
    if let Some(secs) = overrides.scan_interval {
        profile.scan_interval = Some(secs);
    }

    // 3. Password (flag > credential chain)
    let config = match global.password {
        Some(ref pw) => stationwatch_config::build_poller_config(
            &profile,
            &profile_name,
            &cfg.defaults,
            SecretString::from(pw.clone()),
        )?,
        None => stationwatch_config::profile_to_poller_config(&profile, &profile_name, &cfg.defaults)?,
    };
    Ok(Resolved {
        config,
        profile: profile_name,
    })
}
