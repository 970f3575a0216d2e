use crate::engine::pipeline::{LocationPipeline, UplinkOutcome};
use crate::error::WifiLocError;
use crate::ingest::ttn::MAX_WEBHOOK_BODY_SIZE;
use crate::model::position::PositionEstimate;
use crate::storage::HistoryLog;
use axum::{body::Body, extract::State, http::Request, response::Json};
use hyper::body::HttpBody;
use serde::Serialize;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: LocationPipeline,
    pub history: Arc<HistoryLog>,
}

impl AppState {
    pub fn new(pipeline: LocationPipeline) -> Self {
        let history = pipeline.history().clone();
        Self { pipeline, history }
    }
}

/// Webhook reply; the outcome is carried in `status`, never in the HTTP code
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WebhookResponse {
    Ignored { reason: String },
    Success { lat: f64, lon: f64 },
    NoMatch,
    Error,
}

impl From<UplinkOutcome> for WebhookResponse {
    fn from(outcome: UplinkOutcome) -> Self {
        match outcome {
            UplinkOutcome::Ignored => WebhookResponse::Ignored {
                reason: "No payload".to_string(),
            },
            UplinkOutcome::NoMatch => WebhookResponse::NoMatch,
            UplinkOutcome::Located(estimate) => WebhookResponse::Success {
                lat: estimate.lat,
                lon: estimate.lon,
            },
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// History reset response
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub status: String,
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Buffer a request body, giving up as soon as it grows past `max` bytes
async fn read_body_limited(mut body: Body, max: usize) -> Result<Vec<u8>, WifiLocError> {
    let mut buf = Vec::new();
    while let Some(chunk) = body.data().await {
        let chunk = chunk
            .map_err(|e| WifiLocError::InvalidPayload(format!("failed to read body: {}", e)))?;
        let size = buf.len() + chunk.len();
        if size > max {
            return Err(WifiLocError::PayloadTooLarge { size, max });
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

/// Receive a TTN uplink webhook and, if possible, record a new position.
///
/// The body is read here rather than through a `Bytes` extractor so that an
/// oversized or broken body is answered with `{"status":"error"}` like any
/// other failure. The pipeline runs on the blocking pool since reference
/// lookups hit SQLite. Any failure, including a panic in the pipeline, is
/// logged here and reported to the sender only as `{"status":"error"}`.
pub async fn receive_uplink(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Json<WebhookResponse> {
    let payload = match read_body_limited(request.into_body(), MAX_WEBHOOK_BODY_SIZE).await {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected uplink body");
            return Json(WebhookResponse::Error);
        }
    };
    tracing::debug!(payload_size = payload.len(), "Received uplink webhook");

    let pipeline = state.pipeline.clone();
    let result = tokio::task::spawn_blocking(move || pipeline.process_uplink(&payload)).await;

    let response = match result {
        Ok(Ok(outcome)) => WebhookResponse::from(outcome),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Failed to process uplink");
            WebhookResponse::Error
        }
        Err(e) => {
            tracing::error!(error = %e, panicked = e.is_panic(), "Uplink processing task failed");
            WebhookResponse::Error
        }
    };

    Json(response)
}

/// Full trip history in arrival order
pub async fn get_history(State(state): State<AppState>) -> Json<Vec<PositionEstimate>> {
    Json(state.history.read_all())
}

/// Drop the whole trip history
pub async fn reset_history(State(state): State<AppState>) -> Json<ResetResponse> {
    let dropped = state.history.clear();
    tracing::info!(dropped = dropped, "History cleared");

    Json(ResetResponse {
        status: "cleared".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::access_point::AccessPointRecord;
    use crate::resolver::MemoryResolver;

    fn create_test_state() -> AppState {
        let resolver = MemoryResolver::new();
        resolver.insert(
            "AA:BB:CC:DD:EE:FF",
            AccessPointRecord {
                lat: 48.85,
                lon: 2.35,
                label: "TestAP".to_string(),
            },
        );
        let pipeline = LocationPipeline::new(Arc::new(resolver), Arc::new(HistoryLog::new()));
        AppState::new(pipeline)
    }

    fn raw(body: impl Into<Body>) -> Request<Body> {
        Request::post("/webhook").body(body.into()).unwrap()
    }

    fn uplink(frm_payload: &str) -> Request<Body> {
        raw(serde_json::json!({ "uplink_message": { "frm_payload": frm_payload } }).to_string())
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = health_check().await;
        assert_eq!(response.0.status, "ok");
    }

    #[test]
    fn test_response_shapes() {
        let cases = [
            (
                WebhookResponse::from(UplinkOutcome::Ignored),
                serde_json::json!({"status": "ignored", "reason": "No payload"}),
            ),
            (
                WebhookResponse::Success { lat: 48.85, lon: 2.35 },
                serde_json::json!({"status": "success", "lat": 48.85, "lon": 2.35}),
            ),
            (WebhookResponse::NoMatch, serde_json::json!({"status": "no_match"})),
            (WebhookResponse::Error, serde_json::json!({"status": "error"})),
        ];

        for (response, expected) in cases {
            assert_eq!(serde_json::to_value(&response).unwrap(), expected);
        }
    }

    #[tokio::test]
    async fn test_receive_uplink_success() {
        let state = create_test_state();

        let response = receive_uplink(State(state.clone()), uplink("qrvM3e7/zg==")).await;
        match response.0 {
            WebhookResponse::Success { lat, lon } => {
                assert!((lat - 48.85).abs() < 1e-9);
                assert!((lon - 2.35).abs() < 1e-9);
            }
            other => panic!("Expected success, got {:?}", other),
        }

        let history = get_history(State(state)).await;
        assert_eq!(history.0.len(), 1);
        assert!((history.0[0].lat - 48.85).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_receive_uplink_ignored() {
        let state = create_test_state();

        let body = raw(r#"{"end_device_ids": {"device_id": "x"}}"#);
        let response = receive_uplink(State(state.clone()), body).await;
        assert_eq!(
            response.0,
            WebhookResponse::Ignored {
                reason: "No payload".to_string()
            }
        );
        assert!(state.history.is_empty());
    }

    #[tokio::test]
    async fn test_receive_uplink_errors() {
        let state = create_test_state();

        let response = receive_uplink(State(state.clone()), uplink("@@not base64@@")).await;
        assert_eq!(response.0, WebhookResponse::Error);

        let response = receive_uplink(State(state.clone()), raw("{oops")).await;
        assert_eq!(response.0, WebhookResponse::Error);

        let response = receive_uplink(
            State(state.clone()),
            raw(r#"{"uplink_message": {"frm_payload": null}}"#),
        )
        .await;
        assert_eq!(response.0, WebhookResponse::Error);

        assert!(state.history.is_empty());
    }

    #[tokio::test]
    async fn test_receive_uplink_oversized_body() {
        let state = create_test_state();

        let body = vec![b' '; 3 * 1024 * 1024];
        let response = receive_uplink(State(state.clone()), raw(body)).await;
        assert_eq!(response.0, WebhookResponse::Error);
        assert!(state.history.is_empty());
    }

    #[tokio::test]
    async fn test_read_body_limited() {
        let body = read_body_limited(Body::from("0123456789"), 10).await.unwrap();
        assert_eq!(body, b"0123456789");

        assert!(matches!(
            read_body_limited(Body::from("0123456789A"), 10).await,
            Err(WifiLocError::PayloadTooLarge { size: 11, max: 10 })
        ));
    }

    #[tokio::test]
    async fn test_reset_history() {
        let state = create_test_state();
        for _ in 0..2 {
            let response = receive_uplink(State(state.clone()), uplink("qrvM3e7/zg==")).await;
            assert!(matches!(response.0, WebhookResponse::Success { .. }));
        }
        assert_eq!(state.history.len(), 2);

        let response = reset_history(State(state.clone())).await;
        assert_eq!(response.0.status, "cleared");
        assert!(get_history(State(state)).await.0.is_empty());
    }
}
