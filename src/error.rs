/*!
 * Error types for ocopy
 */

use std::fmt;
use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, CopyError>;

#[derive(Debug)]
pub enum CopyError {
    /// Source file or directory not found
    SourceNotFound(PathBuf),

    /// Destination already exists and neither overwrite nor skip-existing applied
    FileExists(PathBuf),

    /// I/O error reading the source or writing/renaming a destination
    Io(io::Error),

    /// Post-copy re-hash of the temp files and the source did not agree
    VerificationMismatch { source: PathBuf },

    /// Writing or reading the directory metadata / MHL manifest failed
    MetadataFailed(String),

    /// Configuration error (bad CLI arguments, empty destination list, etc.)
    Config(String),

    /// Generic error with message
    Other(String),
}

/// One failed file: its source path, the destinations it was headed for, and why it failed.
#[derive(Debug, Clone)]
pub struct ErrorEntry {
    pub source: PathBuf,
    pub destinations: Vec<PathBuf>,
    pub message: String,
}

impl ErrorEntry {
    pub fn new(source: PathBuf, destinations: Vec<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            source,
            destinations,
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source.display(), self.message)
    }
}

impl CopyError {
    /// True if this error kind should never be retried at this layer.
    pub fn is_fatal(&self) -> bool {
        match self {
            CopyError::SourceNotFound(_) => true,
            CopyError::FileExists(_) => true,
            CopyError::Config(_) => true,
            CopyError::VerificationMismatch { .. } => true,
            CopyError::Io(_) => false,
            CopyError::MetadataFailed(_) => false,
            CopyError::Other(_) => false,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            CopyError::SourceNotFound(_) => ErrorCategory::Validation,
            CopyError::FileExists(_) => ErrorCategory::Validation,
            CopyError::Io(_) => ErrorCategory::IoError,
            CopyError::VerificationMismatch { .. } => ErrorCategory::Integrity,
            CopyError::MetadataFailed(_) => ErrorCategory::Metadata,
            CopyError::Config(_) => ErrorCategory::Configuration,
            CopyError::Other(_) => ErrorCategory::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    IoError,
    Integrity,
    Metadata,
    Configuration,
    Unknown,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Validation => write!(f, "validation"),
            ErrorCategory::IoError => write!(f, "io"),
            ErrorCategory::Integrity => write!(f, "integrity"),
            ErrorCategory::Metadata => write!(f, "metadata"),
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::Unknown => write!(f, "unknown"),
        }
    }
}

impl fmt::Display for CopyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopyError::SourceNotFound(path) => write!(f, "source not found: {}", path.display()),
            CopyError::FileExists(path) => write!(f, "destination already exists: {}", path.display()),
            CopyError::Io(err) => write!(f, "I/O error: {}", err),
            CopyError::VerificationMismatch { source } => {
                write!(f, "Verification failed for {}: checksums did not agree", source.display())
            }
            CopyError::MetadataFailed(msg) => write!(f, "metadata operation failed: {}", msg),
            CopyError::Config(msg) => write!(f, "configuration error: {}", msg),
            CopyError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for CopyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CopyError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for CopyError {
    fn from(err: io::Error) -> Self {
        CopyError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_errors() {
        assert!(CopyError::SourceNotFound(PathBuf::from("/tmp")).is_fatal());
        assert!(CopyError::FileExists(PathBuf::from("/tmp")).is_fatal());
        assert!(CopyError::VerificationMismatch { source: PathBuf::from("/tmp/a.mov") }.is_fatal());
    }

    #[test]
    fn non_fatal_errors() {
        assert!(!CopyError::Io(io::Error::new(io::ErrorKind::Other, "test")).is_fatal());
        assert!(!CopyError::Other("test".to_string()).is_fatal());
    }

    #[test]
    fn verification_mismatch_display_mentions_source() {
        let err = CopyError::VerificationMismatch { source: PathBuf::from("/src/A001.mov") };
        assert!(err.to_string().contains("/src/A001.mov"));
        assert!(err.to_string().starts_with("Verification failed"));
    }

    #[test]
    fn error_categories() {
        assert_eq!(CopyError::SourceNotFound(PathBuf::from("/tmp")).category(), ErrorCategory::Validation);
        assert_eq!(CopyError::Io(io::Error::new(io::ErrorKind::Other, "x")).category(), ErrorCategory::IoError);
        assert_eq!(
            CopyError::VerificationMismatch { source: PathBuf::from("/tmp") }.category(),
            ErrorCategory::Integrity
        );
    }
}
