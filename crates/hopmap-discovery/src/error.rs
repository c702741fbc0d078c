use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid discovery base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
