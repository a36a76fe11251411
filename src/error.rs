use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("transport failure during {operation}")]
    Transport {
        operation: &'static str,
        #[source]
        cause: reqwest::Error,
    },
    #[error("{target} not found")]
    NotFound { target: String },
    #[error("failed to parse {what}")]
    Parse {
        what: String,
        #[source]
        cause: serde_json::Error,
    },
    #[error("state file i/o failed for {path}")]
    Io {
        path: String,
        #[source]
        cause: std::io::Error,
    },
    #[error("delivery failed after {attempts} attempts: {last_error}")]
    Delivery { attempts: u32, last_error: String },
}
