// ── API-to-domain conversions ──
//
// Bridges raw `stationwatch_api` listings into canonical model types.
// This is where MAC normalization happens; nothing downstream ever sees
// a raw MAC string.

use std::net::IpAddr;

use chrono::Utc;
use tracing::debug;

use stationwatch_api::{RawDevice, RawDeviceList};

use crate::model::{DeviceRecord, DeviceSnapshot, MacAddress, Origin};

/// Parse an optional string to an `IpAddr`, dropping unparseable values.
fn parse_ip(raw: Option<&str>) -> Option<IpAddr> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(ip) => Some(ip),
        Err(_) => {
            debug!(ip = raw, "ignoring unparseable IP address");
            None
        }
    }
}

/// Treat empty strings the router uses for "unset" as absent.
fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

/// Normalize one raw record.
pub fn device_record(raw: RawDevice, origin: Origin) -> DeviceRecord {
    DeviceRecord {
        mac: non_empty(raw.mac).map(MacAddress::new),
        hostname: non_empty(raw.hostname),
        ip: parse_ip(raw.ip.as_deref()),
        name: non_empty(raw.name),
        origin,
        extra: raw.extra,
    }
}

/// Normalize a full listing into a snapshot stamped with `cycle`.
pub fn snapshot_from_raw(raw: RawDeviceList, cycle: u64) -> DeviceSnapshot {
    DeviceSnapshot {
        lan: raw
            .lan_devices
            .into_iter()
            .map(|d| device_record(d, Origin::Lan))
            .collect(),
        wlan: raw
            .wlan_devices
            .into_iter()
            .map(|d| device_record(d, Origin::Wlan))
            .collect(),
        cycle,
        captured_at: Utc::now(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn lowercases_macs_in_both_lists() {
        let raw = RawDeviceList::new(
            vec![RawDevice::with_mac("AA:BB:CC:11:22:33")],
            vec![RawDevice::with_mac("DE-AD-BE-EF-00-01")],
        );
        let snap = snapshot_from_raw(raw, 7);

        assert_eq!(snap.cycle, 7);
        assert_eq!(snap.lan[0].mac, Some(MacAddress::new("aa:bb:cc:11:22:33")));
        assert_eq!(snap.lan[0].mac.as_ref().unwrap().as_str(), "aa:bb:cc:11:22:33");
        assert_eq!(snap.lan[0].origin, Origin::Lan);
        assert_eq!(snap.wlan[0].mac.as_ref().unwrap().as_str(), "de:ad:be:ef:00:01");
        assert_eq!(snap.wlan[0].origin, Origin::Wlan);
    }

    #[test]
    fn missing_mac_passes_through() {
        let raw = RawDeviceList::new(
            vec![RawDevice {
                hostname: Some("printer".into()),
                ..RawDevice::default()
            }],
            vec![],
        );
        let snap = snapshot_from_raw(raw, 1);
        assert_eq!(snap.lan.len(), 1);
        assert_eq!(snap.lan[0].mac, None);
        assert_eq!(snap.lan[0].hostname.as_deref(), Some("printer"));
    }

    #[test]
    fn same_mac_on_lan_and_wlan_stays_separate() {
        let raw = RawDeviceList::new(
            vec![RawDevice::with_mac("AA:BB:CC:11:22:33")],
            vec![RawDevice::with_mac("aa:bb:cc:11:22:33")],
        );
        let snap = snapshot_from_raw(raw, 1);
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.lan[0].mac, snap.wlan[0].mac);
    }

    #[test]
    fn ip_and_blank_fields() {
        let raw = RawDevice {
            mac: Some("aa:bb:cc:11:22:33".into()),
            hostname: Some(String::new()),
            ip: Some("192.168.0.42".into()),
            name: Some("  ".into()),
            ..RawDevice::default()
        };
        let rec = device_record(raw, Origin::Lan);
        assert_eq!(rec.ip, Some("192.168.0.42".parse().unwrap()));
        assert_eq!(rec.hostname, None);
        assert_eq!(rec.name, None);

        let bogus = RawDevice {
            ip: Some("not-an-ip".into()),
            ..RawDevice::default()
        };
        assert_eq!(device_record(bogus, Origin::Wlan).ip, None);
    }
}
