use thiserror::Error;

/// Errors from miqat operations.
///
/// Every external call site maps its failure to exactly one variant. Only
/// [`MiqatError::CalculationFailure`] aborts a resolution cycle; the other
/// kinds are recovered where they occur.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MiqatError {
    /// A time-of-day string was not `HH:MM`.
    #[error("Invalid time format '{input}', expected HH:MM")]
    Format { input: String },

    /// An alternate prayer-time source could not be reached or answered badly.
    #[error("Source {source_name} unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    /// A fetched payload had a missing or malformed field.
    #[error("Failed to parse {context}: {reason}")]
    Parse { context: String, reason: String },

    /// The standard calculation (final fallback and Hijri source) failed.
    #[error("Prayer time calculation failed: {0}")]
    CalculationFailure(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {reason}")]
    Configuration { reason: String },
}

impl MiqatError {
    pub fn format(input: impl Into<String>) -> Self {
        Self::Format { input: input.into() }
    }

    pub fn source_unavailable(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    pub fn parse(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            context: context.into(),
            reason: reason.into(),
        }
    }

    /// Creates a `Configuration` error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::Configuration { reason: reason.into() }
    }
}
