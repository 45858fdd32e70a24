//! Command dispatch: bridges CLI args -> poller -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod watch;

use stationwatch_api::HttpDeviceClient;
use stationwatch_core::{Poller, PollerConfig};

use crate::cli::{Command, GlobalOpts};
use crate::config::{self, Overrides};
use crate::error::CliError;

/// Build a poller over the HTTP device client.
fn connect(config: &PollerConfig) -> Result<Poller<HttpDeviceClient>, CliError> {
    let client =
        HttpDeviceClient::new(config.host.clone(), config.endpoints.clone(), &config.transport())?;
    Ok(Poller::new(client, config))
}

/// Dispatch a router-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Devices(args) => {
            let overrides = Overrides {
                mac_filter: args.mac_filter.as_deref(),
                ..Overrides::default()
            };
            let resolved = config::resolve_poller_config(global, &overrides)?;
            let poller = connect(&resolved.config)?;
            devices::handle(poller, &args, global)
                .await
                .map_err(|e| e.for_profile(&resolved.profile))
        }
        Command::Watch(args) => {
            let overrides = Overrides {
                mac_filter: args.mac_filter.as_deref(),
                scan_interval: args.interval,
            };
            let resolved = config::resolve_poller_config(global, &overrides)?;
            let poller = connect(&resolved.config)?;
            watch::handle(poller, global)
                .await
                .map_err(|e| e.for_profile(&resolved.profile))
        }
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
