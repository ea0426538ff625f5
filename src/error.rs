//! Error types for capture, pagination and export

use thiserror::Error;

/// Result type alias for export operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while capturing, paginating or persisting a document
#[derive(Error, Debug)]
pub enum Error {
    /// The surface could not be read (detached handle, cross-origin denial)
    #[error("Capture failed: {0}")]
    CaptureError(String),

    /// The captured image cannot be laid out onto pages
    #[error("Assembly failed: {0}")]
    AssemblyError(String),

    /// The finished artifact could not be written
    #[error("Persist failed: {0}")]
    PersistError(String),

    /// Another export is still running
    #[error("An export is already in progress")]
    ExportInFlight,

    /// Invalid configuration or registry data
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::AssemblyError(format!("PDF encoding: {}", err))
    }
}
