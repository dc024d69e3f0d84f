//! XLSX error types

use thiserror::Error;

/// Result type for XLSX operations
pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Errors that can occur during XLSX reading/writing
#[derive(Debug, Error)]
pub enum XlsxError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// No file at the given path
    #[error("File not found: {0}")]
    NotFound(String),

    /// Invalid file format
    #[error("Invalid XLSX format: {0}")]
    InvalidFormat(String),

    /// Missing required part
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// The package is locked or its relationships cannot be resolved
    #[error("Package temporarily unavailable: {0}")]
    TransientLock(String),

    /// Saving a workbook opened read-only
    #[error("Workbook is read-only: {0}")]
    ReadOnly(String),

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] sheetstyle_core::Error),
}
