//! WiFi scan frame decoding.
//!
//! The device packs each scanned access point as a fixed 7-byte record:
//!
//! ```text
//! [MAC0][MAC1][MAC2][MAC3][MAC4][MAC5][RSSI]
//! ```
//!
//! The RSSI byte is a two's-complement signed value. A trailing partial
//! record is dropped silently.

use crate::model::access_point::{MacAddress, Observation, Rssi};

/// Bytes per access-point record
pub const RECORD_LEN: usize = 7;

const MAC_LEN: usize = 6;

/// Reinterpret a raw RSSI byte as a signed dBm value
pub fn decode_rssi(byte: u8) -> Rssi {
    byte as i8
}

/// Iterator over the observations packed in a raw frame
pub struct FrameDecoder<'a> {
    records: std::slice::ChunksExact<'a, u8>,
}

impl<'a> FrameDecoder<'a> {
    pub fn new(raw: &'a [u8]) -> Self {
        Self {
            records: raw.chunks_exact(RECORD_LEN),
        }
    }

    /// Bytes at the end of the frame that do not form a full record
    pub fn trailing(&self) -> &'a [u8] {
        self.records.remainder()
    }
}

impl Iterator for FrameDecoder<'_> {
    type Item = Observation;

    fn next(&mut self) -> Option<Observation> {
        let record = self.records.next()?;
        let mut mac = [0u8; MAC_LEN];
        mac.copy_from_slice(&record[..MAC_LEN]);

        Some(Observation {
            mac: MacAddress::new(mac),
            rssi: decode_rssi(record[MAC_LEN]),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}

impl ExactSizeIterator for FrameDecoder<'_> {}

/// Decode a raw frame into its observations, in frame order
pub fn decode(raw: &[u8]) -> Vec<Observation> {
    let decoder = FrameDecoder::new(raw);
    if !decoder.trailing().is_empty() {
        tracing::debug!(
            frame_len = raw.len(),
            dropped = decoder.trailing().len(),
            "Discarding trailing partial record"
        );
    }
    decoder.collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decode_single_record() {
        let raw = [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF, 0xCE];
        let observations = decode(&raw);

        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].mac.to_string(), "AA:BB:CC:DD:EE:FF");
        assert_eq!(observations[0].rssi, -50);
    }

    #[test]
    fn test_decode_preserves_order() {
        let raw = [
            0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0xB0, // -80
            0x10, 0x20, 0x30, 0x40, 0x50, 0x60, 0x3C, // 60
        ];
        let observations = decode(&raw);

        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].mac.to_string(), "01:02:03:04:05:06");
        assert_eq!(observations[0].rssi, -80);
        assert_eq!(observations[1].mac.to_string(), "10:20:30:40:50:60");
        assert_eq!(observations[1].rssi, 60);
    }

    #[test]
    fn test_empty_frame() {
        assert!(decode(&[]).is_empty());
    }

    #[test]
    fn test_trailing_partial_record_dropped() {
        let raw = [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF, 0xCE, 0x01, 0x02, 0x03];
        let decoder = FrameDecoder::new(&raw);
        assert_eq!(decoder.trailing(), &[0x01, 0x02, 0x03]);
        assert_eq!(decoder.len(), 1);

        // A frame shorter than one record yields nothing
        assert!(decode(&raw[..6]).is_empty());
    }

    #[test]
    fn test_rssi_examples() {
        assert_eq!(decode_rssi(200), -56);
        assert_eq!(decode_rssi(60), 60);
        assert_eq!(decode_rssi(128), -128);
        assert_eq!(decode_rssi(127), 127);
        assert_eq!(decode_rssi(255), -1);
        assert_eq!(decode_rssi(0), 0);
    }

    #[test]
    fn test_rssi_is_bijective() {
        let mut seen = std::collections::HashSet::new();
        for byte in 0..=255u8 {
            let expected = if byte >= 128 { byte as i16 - 256 } else { byte as i16 };
            let rssi = decode_rssi(byte);
            assert_eq!(rssi as i16, expected);
            assert!(seen.insert(rssi));
        }
        assert_eq!(seen.len(), 256);
    }

    proptest! {
        #[test]
        fn prop_record_count(raw in proptest::collection::vec(any::<u8>(), 0..200)) {
            let observations = decode(&raw);
            prop_assert_eq!(observations.len(), raw.len() / RECORD_LEN);
        }

        #[test]
        fn prop_records_match_input(raw in proptest::collection::vec(any::<u8>(), 0..100)) {
            for (i, obs) in FrameDecoder::new(&raw).enumerate() {
                let record = &raw[i * RECORD_LEN..(i + 1) * RECORD_LEN];
                prop_assert_eq!(&obs.mac.as_bytes()[..], &record[..6]);
                prop_assert_eq!(obs.rssi, record[6] as i8);
            }
        }
    }
}
