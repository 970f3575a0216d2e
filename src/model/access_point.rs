use crate::error::WifiLocError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 48-bit access-point hardware address (BSSID)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    pub fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    /// Normalize a textual MAC to the store key format (`AA:BB:CC:DD:EE:FF`)
    pub fn normalize(mac: &str) -> String {
        mac.trim().to_ascii_uppercase()
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}", a, b, c, d, e, g)
    }
}

impl FromStr for MacAddress {
    type Err = WifiLocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parts: Vec<&str> = trimmed.split(|c: char| c == ':' || c == '-').collect();
        if parts.len() != 6 {
            return Err(WifiLocError::InvalidMac(format!(
                "expected 6 octets, got {} in '{}'",
                parts.len(),
                trimmed
            )));
        }

        let mut bytes = [0u8; 6];
        for (slot, part) in bytes.iter_mut().zip(parts) {
            if part.len() != 2 || !part.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(WifiLocError::InvalidMac(format!(
                    "octet '{}' must be two hex digits",
                    part
                )));
            }
            *slot = u8::from_str_radix(part, 16).map_err(|_| {
                WifiLocError::InvalidMac(format!("octet '{}' is not hexadecimal", part))
            })?;
        }

        Ok(Self(bytes))
    }
}

impl TryFrom<String> for MacAddress {
    type Error = WifiLocError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.to_string()
    }
}

/// RSSI in dBm, signed 8-bit as carried on the wire
pub type Rssi = i8;

/// One scanned access point as reported by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub mac: MacAddress,
    pub rssi: Rssi,
}

/// Known location of an access point in the reference store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessPointRecord {
    pub lat: f64,
    pub lon: f64,
    pub label: String,
}

/// An observation whose MAC was found in the reference store
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAccessPoint {
    pub mac: MacAddress,
    pub rssi: Rssi,
    pub lat: f64,
    pub lon: f64,
    pub label: String,
}

impl ResolvedAccessPoint {
    pub fn new(observation: Observation, record: AccessPointRecord) -> Self {
        Self {
            mac: observation.mac,
            rssi: observation.rssi,
            lat: record.lat,
            lon: record.lon,
            label: record.label,
        }
    }
}
