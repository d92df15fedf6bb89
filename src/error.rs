//! Error types for Tablex

use std::path::PathBuf;

/// Result type alias for Tablex operations
pub type Result<T> = std::result::Result<T, TablexError>;

/// Main error type for Tablex
#[derive(Debug, thiserror::Error)]
pub enum TablexError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// PDF could not be read or decoded
    #[error("PDF read error: {reason}")]
    PdfRead {
        /// Reason for failure
        reason: String,
        /// Source error if available
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Requested page does not exist in the document
    #[error("Page {page} does not exist (document has {page_count} pages)")]
    PageOutOfBounds {
        /// 1-based page number requested
        page: usize,
        /// Number of pages in the document
        page_count: usize,
    },

    /// No detector registered under the given name
    #[error("Unknown detector: {0}")]
    UnknownDetector(String),

    /// Detector failed while processing a document
    #[error("Detector error ({detector}): {message}")]
    Detector {
        /// Name of the detector
        detector: String,
        /// Error message
        message: String,
        /// Source error if available
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid configuration value (fill policy, stitch aggressiveness, page range)
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl TablexError {
    /// Create a PDF read error
    pub fn pdf_read<S: Into<String>>(reason: S) -> Self {
        Self::PdfRead {
            reason: reason.into(),
            source: None,
        }
    }

    /// Create a PDF read error with source
    pub fn pdf_read_with_source<S: Into<String>, E>(reason: S, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::PdfRead {
            reason: reason.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a detector error
    pub fn detector<S1: Into<String>, S2: Into<String>>(detector: S1, message: S2) -> Self {
        Self::Detector {
            detector: detector.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a detector error with source
    pub fn detector_with_source<S1: Into<String>, S2: Into<String>, E>(
        detector: S1,
        message: S2,
        source: E,
    ) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Detector {
            detector: detector.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Check if error is related to configuration
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidOptions(_) | Self::UnknownDetector(_))
    }

    /// Check if error is related to file not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::FileNotFound(_))
    }
}

impl From<lopdf::Error> for TablexError {
    fn from(err: lopdf::Error) -> Self {
        TablexError::pdf_read_with_source("lopdf failure", err)
    }
}
