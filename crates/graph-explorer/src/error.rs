use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can end a run.
///
/// `Config` is raised before any I/O happens; the rest surface from the
/// fetch or export stages and abort the run with a non-zero exit.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Transport-level failure: connection refused, DNS, timeout.
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response; the message is surfaced verbatim.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// 2xx response whose body did not match the expected shape.
    #[error("malformed API response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
