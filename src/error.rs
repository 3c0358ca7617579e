//! Failure outcomes of repository queries

use thiserror::Error;

/// Why a query produced no records
///
/// The display text is always the user-facing message; no variant carries raw
/// error types across the repository boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureReason {
    /// The API key is missing or still the placeholder
    #[error("{0}")]
    Configuration(String),

    /// The API answered but reported errors or returned no data
    #[error("{0}")]
    Api(String),

    /// The request failed on the way to or from the API
    #[error("{0}")]
    Transport(String),

    /// The API answered with a body we could not decode
    #[error("{0}")]
    Parse(String),
}

impl FailureReason {
    /// The human-readable message
    pub fn message(&self) -> &str {
        match self {
            FailureReason::Configuration(m)
            | FailureReason::Api(m)
            | FailureReason::Transport(m)
            | FailureReason::Parse(m) => m,
        }
    }
}

/// Outcome of every repository query
pub type QueryResult<T> = Result<Vec<T>, FailureReason>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_the_message() {
        let reason = FailureReason::Transport("No internet connection.".to_string());
        assert_eq!(reason.to_string(), "No internet connection.");
        assert_eq!(reason.message(), "No internet connection.");
    }
}
