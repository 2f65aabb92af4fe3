use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewError {
    /// The request never produced an HTTP response (connection refused, CORS, ...).
    #[error("backend unreachable: {0}")]
    Network(String),

    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    #[error("{endpoint} returned malformed JSON: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("grid must be at least 1x1 (got {width}x{height})")]
    InvalidGrid { width: u32, height: u32 },

    /// DOM / canvas / fetch plumbing failed inside the browser.
    #[error("browser: {0}")]
    Browser(String),
}

pub type Result<T> = std::result::Result<T, ViewError>;
