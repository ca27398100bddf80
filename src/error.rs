//! Error types for form population.
//!
//! Fatal variants abort a populate pass. `AssetPlacement` and
//! `FontRegistration` are normally recovered where they occur (logged and
//! collected into a report) and only surface as values, never as a failed pass.

use std::path::PathBuf;

use crate::writer::image_handler::ImageError;

/// Result type alias for form population operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while populating a form.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A field declared `Required` had no value
    #[error("Required field '{0}' has no value")]
    MissingValue(String),

    /// A field has no widget instance, or its widget is not attached to a page
    #[error("Field '{field}' has no usable widget geometry: {reason}")]
    MissingWidgetGeometry {
        /// Full field name
        field: String,
        /// What was missing
        reason: String,
    },

    /// A deferred asset could not be stamped
    #[error("Failed to place asset {}: {reason}", asset.display())]
    AssetPlacement {
        /// Asset file
        asset: PathBuf,
        /// Reason for the failure
        reason: String,
    },

    /// A font file could not be registered
    #[error("Failed to register font {}: {reason}", path.display())]
    FontRegistration {
        /// Font file
        path: PathBuf,
        /// Reason for the failure
        reason: String,
    },

    /// Font type name not present in the registry
    #[error("Font '{0}' is not registered")]
    UnknownFont(String),

    /// Field policy or manifest could not be interpreted
    #[error("Invalid field policy: {0}")]
    InvalidPolicy(String),

    /// Document lacks the structure needed for the operation
    #[error("Invalid PDF structure: {0}")]
    InvalidPdf(String),

    /// Builder session used out of order
    #[error("Invalid session state: {0}")]
    InvalidState(String),

    /// Image decoding error
    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    /// Error from the PDF object layer
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error in a configuration or manifest file
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for [`Error::MissingWidgetGeometry`].
    pub fn missing_geometry(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MissingWidgetGeometry {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error aborts a populate pass.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::AssetPlacement { .. } | Error::FontRegistration { .. })
    }

    /// Field the error refers to, if any.
    pub fn field_name(&self) -> Option<&str> {
        match self {
            Error::MissingValue(field) => Some(field),
            Error::MissingWidgetGeometry { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_value_error() {
        let err = Error::MissingValue("Applicant.Name".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("Required field"));
        assert!(msg.contains("Applicant.Name"));
        assert_eq!(err.field_name(), Some("Applicant.Name"));
    }

    #[test]
    fn test_missing_geometry_error() {
        let err = Error::missing_geometry("Photo", "widget is not attached to a page");
        let msg = format!("{}", err);
        assert!(msg.contains("Photo"));
        assert!(msg.contains("not attached"));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_recoverable_errors() {
        let asset = Error::AssetPlacement {
            asset: PathBuf::from("model.u3d"),
            reason: "truncated".to_string(),
        };
        let font = Error::FontRegistration {
            path: PathBuf::from("Fonts/broken.ttf"),
            reason: "bad table".to_string(),
        };
        assert!(!asset.is_fatal());
        assert!(!font.is_fatal());
        assert!(format!("{}", asset).contains("model.u3d"));
        assert!(format!("{}", font).contains("broken.ttf"));
        assert_eq!(asset.field_name(), None);
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(format!("{}", err).contains("gone"));
    }
}
