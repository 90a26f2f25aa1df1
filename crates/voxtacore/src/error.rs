use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtensionError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures talking to the thumbnail backend or loading the image it points at
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Image load failed: {0}")]
    Image(String),
}
