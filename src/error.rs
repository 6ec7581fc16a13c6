use std::time::Duration;
use thiserror::Error;

/// Result alias for `rough`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the clustering pipeline and its collaborators.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid parameter value. Rejected before any computation starts.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },

    /// No pooled processing object became available in time.
    #[error("resource pool exhausted: no object available after {waited:?}")]
    ResourceUnavailable {
        /// How long the caller waited before giving up.
        waited: Duration,
    },

    /// A document produced no usable terms.
    ///
    /// Local to one document: the run excludes it and continues.
    #[error("malformed document {document}: {reason}")]
    MalformedInput {
        /// Caller-supplied document id.
        document: usize,
        /// Why the document was excluded.
        reason: &'static str,
    },

    /// No analyzer is registered (or loadable) for a language code.
    #[error("unsupported language '{0}'")]
    UnsupportedLanguage(String),

    /// A named language resource could not be opened or read.
    #[error("failed to load resource '{name}'")]
    Resource {
        /// Resource name as passed to the loader.
        name: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The caller abandoned the run.
    #[error("clustering run cancelled")]
    Cancelled,

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error is local to a single document (recoverable by exclusion).
    pub fn is_document_local(&self) -> bool {
        matches!(
            self,
            Error::MalformedInput { .. } | Error::UnsupportedLanguage(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_invalid_parameter() {
        let err = Error::InvalidParameter {
            name: "tolerance_threshold",
            message: "must be in (0, 1]",
        };
        let s = err.to_string();
        assert!(s.contains("tolerance_threshold"));
        assert!(s.contains("(0, 1]"));
    }

    #[test]
    fn test_document_local_classification() {
        assert!(Error::MalformedInput {
            document: 3,
            reason: "no terms"
        }
        .is_document_local());
        assert!(!Error::Cancelled.is_document_local());
        assert!(!Error::ResourceUnavailable {
            waited: Duration::from_millis(5)
        }
        .is_document_local());
    }

    #[test]
    fn test_resource_error_has_source() {
        use std::error::Error as _;
        let err = Error::Resource {
            name: "stopwords.en".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.source().is_some());
    }
}
