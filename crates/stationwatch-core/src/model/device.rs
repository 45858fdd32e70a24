// ── Device domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::net::IpAddr;

use super::mac::MacAddress;

/// Which router listing a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Lan,
    Wlan,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lan => f.write_str("lan"),
            Self::Wlan => f.write_str("wlan"),
        }
    }
}

/// One attached device, normalized.
///
/// `mac` is `None` only when the router omitted it; such records never
/// pass an active MAC filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub mac: Option<MacAddress>,
    pub hostname: Option<String>,
    pub ip: Option<IpAddr>,
    pub name: Option<String>,
    pub origin: Origin,
    /// Fields the router reported that have no dedicated slot.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl DeviceRecord {
    /// Best human-facing label: display name, then hostname, then MAC.
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.hostname.as_deref())
            .or_else(|| self.mac.as_ref().map(MacAddress::as_str))
            .unwrap_or("(unknown)")
    }
}

/// The result of one poll cycle.
///
/// Built fresh every cycle and never merged with earlier snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub lan: Vec<DeviceRecord>,
    pub wlan: Vec<DeviceRecord>,
    /// Cycle number that produced this snapshot.
    pub cycle: u64,
    pub captured_at: DateTime<Utc>,
}

impl DeviceSnapshot {
    /// Total number of records across both lists.
    pub fn len(&self) -> usize {
        self.lan.len() + self.wlan.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All records, LAN first, in listing order.
    pub fn iter(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.lan.iter().chain(self.wlan.iter())
    }
}
