use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Wall-clock format attached to each history entry
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Geographic point in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Computed device position as stored in the trip history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionEstimate {
    pub lat: f64,
    pub lon: f64,
    pub time: String,
}

impl PositionEstimate {
    /// Stamp coordinates with the given local time
    pub fn at(coords: Coordinates, when: DateTime<Local>) -> Self {
        Self {
            lat: coords.lat,
            lon: coords.lon,
            time: when.format(TIME_FORMAT).to_string(),
        }
    }

    /// Stamp coordinates with the current local time
    pub fn now(coords: Coordinates) -> Self {
        Self::at(coords, Local::now())
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.lat,
            lon: self.lon,
        }
    }
}
