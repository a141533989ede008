use crate::config::Endpoint;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0} webhook is not configured")]
    NotConfigured(Endpoint),

    #[error("Invalid configuration for {key}: {reason}")]
    InvalidConfig { key: &'static str, reason: String },

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error("{endpoint} webhook error: {status}")]
    Status { endpoint: Endpoint, status: u16 },

    #[error("Request timed out after {} minutes", .0.as_secs() / 60)]
    Timeout(Duration),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("Could not read {name}: {reason}")]
    FileRead { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_reads_like_a_webhook_error() {
        let err = Error::Status {
            endpoint: Endpoint::Text,
            status: 502,
        };
        assert_eq!(err.to_string(), "Text webhook error: 502");
    }

    #[test]
    fn timeout_is_reported_in_minutes() {
        let err = Error::Timeout(Duration::from_millis(480_000));
        assert_eq!(err.to_string(), "Request timed out after 8 minutes");
    }
}
