//! Error type shared by the probe and the command-line report.
//!
//! The report prints every variant the same way, so `Display` for the driver
//! variants is the driver's own message.

/// Everything that can go wrong between loading configuration and printing
/// the server version.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid connection URL: {0}")]
    InvalidUrl(#[source] sqlx::Error),

    #[error("{0}")]
    Connect(#[source] sqlx::Error),

    #[error("{0}")]
    Query(#[source] sqlx::Error),

    #[error("Could not write report: {0}")]
    Output(#[from] std::io::Error),
}

impl ProbeError {
    /// Stable code for the step that failed, used in structured log fields.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::InvalidUrl(_) => "url",
            Self::Connect(_) => "connect",
            Self::Query(_) => "query",
            Self::Output(_) => "output",
        }
    }
}

/// Convenience type alias for Results using ProbeError.
pub type ProbeResult<T> = Result<T, ProbeError>;
