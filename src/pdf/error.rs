//! Error types for PDF rendering and analysis operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for PDF operations.
pub type PdfResult<T> = Result<T, PdfError>;

/// Errors that can occur while rendering or analysing a PDF.
#[derive(Debug, Error)]
pub enum PdfError {
    /// The PDF file does not exist.
    #[error("PDF file not found: {path}")]
    NotFound {
        /// Path as given by the caller.
        path: PathBuf,
    },

    /// A parameter is missing or has an invalid value.
    #[error("Invalid parameter '{name}': {message}")]
    Validation {
        /// Parameter name.
        name: String,
        /// Description of what's wrong.
        message: String,
    },

    /// The page range is inverted.
    #[error("Invalid page range: left page {left} is after right page {right}")]
    InvalidRange {
        /// First page of the range.
        left: u32,
        /// Last page of the range.
        right: u32,
    },

    /// A page number lies outside the document.
    #[error("Page {page} is out of bounds (document has {page_count} pages)")]
    PageOutOfBounds {
        /// Offending page number (1-based).
        page: u32,
        /// Number of pages in the document.
        page_count: u32,
    },

    /// Fewer than two pages were rasterised for a spread.
    #[error("Could not extract both pages {left} and {right}: only {rendered} page(s) rendered")]
    InsufficientPages {
        /// First page of the range.
        left: u32,
        /// Last page of the range.
        right: u32,
        /// Number of pages that were rasterised.
        rendered: usize,
    },

    /// Opaque failure from the PDF library.
    #[error("PDF library error: {message}")]
    Library {
        /// Message reported by the library.
        message: String,
    },

    /// Image encoding failed.
    #[error("Image encoding failed")]
    Image {
        /// Underlying image error.
        #[source]
        source: image::ImageError,
    },

    /// Failed to write an output file.
    #[error("Failed to write file: {path}")]
    FileWrite {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl PdfError {
    /// Creates a validation error.
    pub fn validation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a library error.
    pub fn library(message: impl Into<String>) -> Self {
        Self::Library {
            message: message.into(),
        }
    }

    /// Creates a file write error.
    pub fn file_write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Returns a message including the source chain, suitable for tool results.
    #[must_use]
    pub fn report(&self) -> String {
        use std::error::Error as _;

        let mut message = self.to_string();
        let mut source = self.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}

impl From<image::ImageError> for PdfError {
    fn from(source: image::ImageError) -> Self {
        Self::Image { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_display() {
        let err = PdfError::PageOutOfBounds {
            page: 9,
            page_count: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("Page 9"));
        assert!(msg.contains("4 pages"));
    }

    #[test]
    fn report_includes_source() {
        let err = PdfError::file_write(
            "/tmp/out.png",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.report();
        assert!(msg.contains("/tmp/out.png"));
        assert!(msg.ends_with("denied"));
    }
}
