// ── MAC allow-list ──

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use super::device::{DeviceRecord, DeviceSnapshot};
use super::mac::MacAddress;

/// A set of normalized MACs to keep. Everything else is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MacFilter {
    macs: BTreeSet<MacAddress>,
}

impl MacFilter {
    /// Build a filter from a comma-separated list.
    ///
    /// Tokens are trimmed and normalized; empty or malformed tokens are
    /// dropped. Returns `None` when nothing usable remains, which means
    /// "no filtering".
    pub fn parse(list: &str) -> Option<Self> {
        let macs: BTreeSet<MacAddress> = list.split(',').filter_map(MacAddress::parse).collect();
        if macs.is_empty() {
            None
        } else {
            Some(Self { macs })
        }
    }

    pub fn len(&self) -> usize {
        self.macs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macs.is_empty()
    }

    pub fn contains(&self, mac: &MacAddress) -> bool {
        self.macs.contains(mac)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MacAddress> {
        self.macs.iter()
    }

    /// `true` if the record's MAC is in the set. Records without a MAC
    /// never match.
    pub fn matches(&self, record: &DeviceRecord) -> bool {
        record.mac.as_ref().is_some_and(|m| self.contains(m))
    }

    /// Reduce both lists of a snapshot to matching records.
    pub fn apply(&self, mut snapshot: DeviceSnapshot) -> DeviceSnapshot {
        let (lan_before, wlan_before) = (snapshot.lan.len(), snapshot.wlan.len());
        snapshot.lan.retain(|d| self.matches(d));
        snapshot.wlan.retain(|d| self.matches(d));
        debug!(
            "MAC filtering applied: LAN {}->{}, WLAN {}->{}",
            lan_before,
            snapshot.lan.len(),
            wlan_before,
            snapshot.wlan.len()
        );
        snapshot
    }
}

/// Apply an optional filter; `None` passes the snapshot through unchanged.
pub fn apply_filter(filter: Option<&MacFilter>, snapshot: DeviceSnapshot) -> DeviceSnapshot {
    match filter {
        Some(f) => f.apply(snapshot),
        None => snapshot,
    }
}
