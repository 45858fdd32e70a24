//! One-shot device listing.

use tabled::Tabled;
use tracing::warn;

use stationwatch_api::DeviceClient;
use stationwatch_core::{DeviceRecord, DeviceSnapshot, Poller};

use crate::cli::{DevicesArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Segment")]
    origin: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "IP")]
    ip: String,
}

impl From<&DeviceRecord> for DeviceRow {
    fn from(d: &DeviceRecord) -> Self {
        Self {
            origin: d.origin.to_string(),
            mac: d.mac.as_ref().map(ToString::to_string).unwrap_or_default(),
            name: d.name.clone().unwrap_or_default(),
            hostname: d.hostname.clone().unwrap_or_default(),
            ip: d.ip.map(|ip| ip.to_string()).unwrap_or_default(),
        }
    }
}

/// Identifier for plain output: the MAC, or the best label without one.
fn plain_id(d: &DeviceRecord) -> String {
    d.mac
        .as_ref()
        .map_or_else(|| d.label().to_owned(), |m| m.as_str().to_owned())
}

/// Flatten a snapshot into the segments the user asked for, LAN first.
fn select(snapshot: DeviceSnapshot, lan_only: bool, wlan_only: bool) -> Vec<DeviceRecord> {
    let DeviceSnapshot { lan, wlan, .. } = snapshot;
    match (lan_only, wlan_only) {
        (true, false) => lan,
        (false, true) => wlan,
        _ => lan.into_iter().chain(wlan).collect(),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

/// Log in, run a single poll cycle, log out, and print the result.
pub async fn handle<C: DeviceClient>(
    mut poller: Poller<C>,
    args: &DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    poller.login().await?;
    let result = poller.poll().await;
    if let Err(e) = poller.logout().await {
        warn!(error = %e, "logout failed");
    }

    let records = match result? {
        Some(snapshot) => select(snapshot, args.lan, args.wlan),
        None => {
            warn!("router returned no device data");
            Vec::new()
        }
    };

    let out = output::render_list(global.output_format(), &records, |d| DeviceRow::from(d), plain_id)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::Map;

    use stationwatch_core::{MacAddress, Origin};

    use super::*;

    fn record(mac: &str, origin: Origin) -> DeviceRecord {
        DeviceRecord {
            mac: Some(MacAddress::new(mac)),
            hostname: None,
            ip: None,
            name: None,
            origin,
            extra: Map::new(),
        }
    }

    fn snapshot() -> DeviceSnapshot {
        DeviceSnapshot {
            lan: vec![record("aa:bb:cc:11:22:33", Origin::Lan)],
            wlan: vec![record("de:ad:be:ef:00:01", Origin::Wlan)],
            cycle: 1,
            captured_at: Utc::now(),
        }
    }

    #[test]
    fn select_segments() {
        assert_eq!(select(snapshot(), false, false).len(), 2);

        let lan = select(snapshot(), true, false);
        assert_eq!(lan.len(), 1);
        assert_eq!(lan[0].origin, Origin::Lan);

        let wlan = select(snapshot(), false, true);
        assert_eq!(wlan.len(), 1);
        assert_eq!(wlan[0].origin, Origin::Wlan);
    }

    #[test]
    fn plain_id_falls_back_to_label() {
        let mut d = record("aa:bb:cc:11:22:33", Origin::Lan);
        assert_eq!(plain_id(&d), "aa:bb:cc:11:22:33");

        d.mac = None;
        d.hostname = Some("printer".into());
        assert_eq!(plain_id(&d), "printer");
    }
}
