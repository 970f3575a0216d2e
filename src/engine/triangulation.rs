//! Signal-weighted centroid position estimation.
//!
//! Each resolved access point pulls the estimate toward its own location with
//! a weight of `10^((rssi + 100) / 20)`. Every 40 dB of extra signal is
//! worth 100x: -50 dBm outweighs -90 dBm by exactly 100:1.

use crate::model::access_point::{ResolvedAccessPoint, Rssi};
use crate::model::position::Coordinates;
use tracing::debug;

/// RSSI offset applied before the exponential mapping
pub const RSSI_OFFSET_DBM: f64 = 100.0;

/// dB per decade of weight
pub const DB_PER_DECADE: f64 = 20.0;

/// Weight of a single observation
pub fn signal_weight(rssi: Rssi) -> f64 {
    10f64.powf((f64::from(rssi) + RSSI_OFFSET_DBM) / DB_PER_DECADE)
}

/// Weighted centroid of the resolved access points.
///
/// Returns `None` for an empty input or if the weights do not sum to a
/// positive finite value.
pub fn estimate(points: &[ResolvedAccessPoint]) -> Option<Coordinates> {
    if points.is_empty() {
        return None;
    }

    let mut lat_sum = 0.0;
    let mut lon_sum = 0.0;
    let mut total_weight = 0.0;

    for point in points {
        let weight = signal_weight(point.rssi);

        lat_sum += point.lat * weight;
        lon_sum += point.lon * weight;
        total_weight += weight;

        debug!(
            label = point.label.as_str(),
            mac = %point.mac,
            rssi = point.rssi,
            weight = weight,
            "Access point weight"
        );
    }

    if total_weight > 0.0 && total_weight.is_finite() {
        Some(Coordinates {
            lat: lat_sum / total_weight,
            lon: lon_sum / total_weight,
        })
    } else {
        None
    }
}
