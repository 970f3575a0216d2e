use crate::engine::triangulation;
use crate::error::Result;
use crate::ingest::frame;
use crate::ingest::ttn::{decode_frm_payload, TtnUplink};
use crate::model::access_point::ResolvedAccessPoint;
use crate::model::position::PositionEstimate;
use crate::resolver::CoordinateResolver;
use crate::storage::HistoryLog;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of processing one uplink
#[derive(Debug, Clone, PartialEq)]
pub enum UplinkOutcome {
    /// The message carried no `frm_payload`
    Ignored,
    /// No scanned access point is in the reference store
    NoMatch,
    /// A position was computed and appended to the history
    Located(PositionEstimate),
}

/// Decode -> resolve -> triangulate -> record, for a single uplink
#[derive(Clone)]
pub struct LocationPipeline {
    resolver: Arc<dyn CoordinateResolver>,
    history: Arc<HistoryLog>,
}

impl LocationPipeline {
    pub fn new(resolver: Arc<dyn CoordinateResolver>, history: Arc<HistoryLog>) -> Self {
        Self { resolver, history }
    }

    pub fn history(&self) -> &Arc<HistoryLog> {
        &self.history
    }

    /// Process a raw TTN webhook body.
    ///
    /// Nothing is appended to the history unless the whole pipeline succeeds.
    pub fn process_uplink(&self, body: &[u8]) -> Result<UplinkOutcome> {
        let uplink = TtnUplink::parse(body)?;

        let Some(encoded) = uplink.frm_payload()? else {
            debug!(device = ?uplink.device_id(), "Uplink without frm_payload ignored");
            return Ok(UplinkOutcome::Ignored);
        };

        let raw = decode_frm_payload(encoded)?;
        debug!(
            device = ?uplink.device_id(),
            f_cnt = ?uplink.f_cnt(),
            frame_len = raw.len(),
            "Decoded uplink payload"
        );

        Ok(self.locate(&raw))
    }

    /// Run an already-decoded scan frame through resolution and triangulation
    pub fn locate(&self, raw: &[u8]) -> UplinkOutcome {
        let resolved = self.resolve_frame(raw);

        if resolved.is_empty() {
            info!("No known access point in this uplink");
            return UplinkOutcome::NoMatch;
        }

        let Some(coords) = triangulation::estimate(&resolved) else {
            warn!(
                access_points = resolved.len(),
                "Triangulation produced no estimate"
            );
            return UplinkOutcome::NoMatch;
        };

        let estimate = PositionEstimate::now(coords);
        self.history.append(estimate.clone());

        info!(
            lat = estimate.lat,
            lon = estimate.lon,
            access_points = resolved.len(),
            "New position computed"
        );

        UplinkOutcome::Located(estimate)
    }

    /// Decode a frame and keep the observations the resolver knows, in frame order
    pub fn resolve_frame(&self, raw: &[u8]) -> Vec<ResolvedAccessPoint> {
        frame::decode(raw)
            .into_iter()
            .filter_map(|obs| {
                let record = self.resolver.resolve(&obs.mac.to_string())?;
                Some(ResolvedAccessPoint::new(obs, record))
            })
            .collect()
    }
}
