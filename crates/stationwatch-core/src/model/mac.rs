// ── MAC address identity ──
//
// Every device record is keyed by its MAC. Routers report them in mixed
// case and with assorted separators; `MacAddress` is the one canonical
// form used for comparison, filtering, and display.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// MAC address, normalized to lowercase colon-separated format (aa:bb:cc:dd:ee:ff).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MacAddress(String);

impl MacAddress {
    /// Create a normalized MAC address from any common format.
    ///
    /// Accepts colon-separated, dash-separated, or bare 12-digit hex.
    /// Never fails: input that is not a MAC is kept lowercased so it can
    /// still be displayed, and [`is_well_formed`](Self::is_well_formed)
    /// reports `false` for it.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let lowered = raw.as_ref().trim().to_lowercase().replace('-', ":");
        if lowered.len() == 12 && lowered.chars().all(|c| c.is_ascii_hexdigit()) {
            let pairs: Vec<&str> = (0..6).filter_map(|i| lowered.get(i * 2..i * 2 + 2)).collect();
            return Self(pairs.join(":"));
        }
        Self(lowered)
    }

    /// Parse a MAC, returning `None` unless it normalizes to six hex octets.
    pub fn parse(raw: impl AsRef<str>) -> Option<Self> {
        let mac = Self::new(raw);
        mac.is_well_formed().then_some(mac)
    }

    /// `true` if this is exactly six colon-separated two-digit hex octets.
    pub fn is_well_formed(&self) -> bool {
        let octets: Vec<&str> = self.0.split(':').collect();
        octets.len() == 6
            && octets
                .iter()
                .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MacAddress {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl AsRef<str> for MacAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn mac_address_normalizes_dashes() {
        let mac = MacAddress::new("AA-BB-CC-DD-EE-FF");
        assert_eq!(mac.as_str(), "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn mac_address_normalizes_case() {
        let mac = MacAddress::new("AA:BB:CC:DD:EE:FF");
        assert_eq!(mac.as_str(), "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn mac_address_inserts_colons_into_bare_hex() {
        let mac = MacAddress::new("AABBCC112233");
        assert_eq!(mac.as_str(), "aa:bb:cc:11:22:33");
    }

    #[test]
    fn mac_address_from_str() {
        let mac: MacAddress = "AA-BB-CC-DD-EE-FF".parse().unwrap();
        assert_eq!(mac.to_string(), "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in ["AA:BB:CC:11:22:33", "aa-bb-cc-11-22-33", "aabbcc112233", "not a mac"] {
            let once = MacAddress::new(raw);
            let twice = MacAddress::new(once.as_str());
            assert_eq!(once, twice, "normalizing {raw:?} twice changed it");
        }
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(MacAddress::parse("").is_none());
        assert!(MacAddress::parse("zz:bb:cc:dd:ee:ff").is_none());
        assert!(MacAddress::parse("aa:bb:cc:dd:ee").is_none());
        assert!(MacAddress::parse("aaa:bb:cc:dd:ee:ff").is_none());
        assert!(MacAddress::parse(" aa:bb:cc:dd:ee:ff ").is_some());
    }

    #[test]
    fn malformed_input_is_kept_lowercased() {
        let mac = MacAddress::new("Unknown");
        assert_eq!(mac.as_str(), "unknown");
        assert!(!mac.is_well_formed());
    }
}
