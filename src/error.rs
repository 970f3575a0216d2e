use thiserror::Error;

#[derive(Error, Debug)]
pub enum WifiLocError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Reference store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Reference store error: {0}")]
    StoreError(#[from] rusqlite::Error),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Payload too large: {size} bytes (max: {max})")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Invalid MAC address: {0}")]
    InvalidMac(String),

    #[error("Background task failed: {0}")]
    TaskError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<base64::DecodeError> for WifiLocError {
    fn from(err: base64::DecodeError) -> Self {
        WifiLocError::InvalidPayload(format!("frm_payload is not valid Base64: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, WifiLocError>;
