// Raw device-list wire types
//
// Shapes exactly as the router reports them. Field names follow the
// router's JSON keys; nothing here is normalized. `stationwatch-core`
// converts these into canonical domain records.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One attached device as listed by the router.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDevice {
    #[serde(rename = "MAC", default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    #[serde(rename = "HostName", default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(rename = "IP", default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Everything else the router sent for this device.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawDevice {
    /// A record carrying only a MAC (handy for tests and fixtures).
    pub fn with_mac(mac: impl Into<String>) -> Self {
        Self {
            mac: Some(mac.into()),
            ..Self::default()
        }
    }
}

/// The router's device listing: wired and wireless clients.
///
/// Missing or `null` lists deserialize as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDeviceList {
    #[serde(rename = "lanDevices", default, deserialize_with = "nullable_vec")]
    pub lan_devices: Vec<RawDevice>,
    #[serde(rename = "wlanDevices", default, deserialize_with = "nullable_vec")]
    pub wlan_devices: Vec<RawDevice>,
}

impl RawDeviceList {
    pub fn new(lan_devices: Vec<RawDevice>, wlan_devices: Vec<RawDevice>) -> Self {
        Self {
            lan_devices,
            wlan_devices,
        }
    }

    /// Total number of records across both lists.
    pub fn len(&self) -> usize {
        self.lan_devices.len() + self.wlan_devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
