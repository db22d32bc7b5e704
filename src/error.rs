//! Failure modes of the name statistics pipeline

/// Errors that can occur while loading or querying the dataset
///
/// Load-time errors (`Fetch`, `Format`, `Task`) abort the load entirely, no
/// partial table is ever produced. Degenerate query results (unknown name,
/// year without one-hit wonders...) are not errors but normal result values.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network or HTTP failure while downloading the dataset
    #[error("failed to fetch {url}")]
    Fetch {
        url: Box<str>,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The archive or one of its rows does not have the expected layout
    #[error("malformed dataset ({location}): {reason}")]
    Format { location: Box<str>, reason: String },

    /// A query parameter is outside of its contract
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A yearly file parsing task panicked or was cancelled
    #[error("dataset parsing task did not complete")]
    Task(#[from] tokio::task::JoinError),
}
//
impl Error {
    /// Build a `Format` error
    pub(crate) fn format(location: impl Into<Box<str>>, reason: impl ToString) -> Self {
        Self::Format {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a `Fetch` error
    pub(crate) fn fetch(
        url: impl Into<Box<str>>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Fetch {
            url: url.into(),
            source: source.into(),
        }
    }
}

/// Result type of the name statistics pipeline
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn format_error_names_location() {
        let err = Error::format("yob1880.txt", "found record with 2 fields");
        assert_eq!(
            err.to_string(),
            "malformed dataset (yob1880.txt): found record with 2 fields"
        );
    }

    #[test]
    fn fetch_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = Error::fetch("http://localhost/names.zip", io);
        assert!(err.to_string().contains("http://localhost/names.zip"));
        assert!(err.source().is_some_and(|s| s.to_string() == "refused"));
    }
}
