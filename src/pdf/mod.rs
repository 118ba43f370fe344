//! PDF access for spread rendering and contrast analysis.
//!
//! Rasterisation and text extraction are delegated to an external PDF library
//! behind the [`PdfBackend`] and [`PdfDocument`] traits. The production
//! implementation is [`PdfiumBackend`]; tests supply in-memory fakes.
//!
//! All page numbers crossing these traits are 1-based. All geometry is in
//! document points (1/72 inch) with the origin at the top-left of the page.

pub mod color;
pub mod error;
pub mod pdfium;

pub use color::{ColorInfo, DeclaredColor, Rgb};
pub use error::{PdfError, PdfResult};
pub use pdfium::PdfiumBackend;

use std::path::{Path, PathBuf};

use image::RgbImage;
use serde::Serialize;

/// Points per inch in PDF user space.
pub const POINTS_PER_INCH: f32 = 72.0;

/// An axis-aligned rectangle, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    /// Left edge.
    pub x0: f32,
    /// Top edge.
    pub y0: f32,
    /// Right edge.
    pub x1: f32,
    /// Bottom edge.
    pub y1: f32,
}

impl Rect {
    /// Creates a rectangle from its edges.
    #[must_use]
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Width of the rectangle.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the rectangle.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Grows the rectangle by `margin` on every side.
    #[must_use]
    pub fn expand(&self, margin: f32) -> Self {
        Self::new(
            self.x0 - margin,
            self.y0 - margin,
            self.x1 + margin,
            self.y1 + margin,
        )
    }
}

/// A run of text with uniform styling, as reported by the PDF library.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    /// Text content (untrimmed).
    pub text: String,
    /// Bounding box in document points.
    pub bbox: Rect,
    /// Fill colour declared for the text.
    pub color: DeclaredColor,
}

/// An opened PDF document.
pub trait PdfDocument {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Rasterises a page at `scale` pixels per point.
    ///
    /// # Errors
    ///
    /// Returns an error if the page does not exist or rendering fails.
    fn render_page(&self, page: u32, scale: f32) -> PdfResult<RgbImage>;

    /// Returns the text spans of a page in document order.
    ///
    /// # Errors
    ///
    /// Returns an error if the page does not exist or extraction fails.
    fn text_spans(&self, page: u32) -> PdfResult<Vec<TextSpan>>;
}

/// A PDF library capable of opening documents.
pub trait PdfBackend {
    /// Opens the PDF at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded as a PDF.
    fn open<'a>(&'a self, path: &Path) -> PdfResult<Box<dyn PdfDocument + 'a>>;
}

/// Expands a leading `~` and checks that the PDF exists.
///
/// # Errors
///
/// Returns [`PdfError::NotFound`] if nothing exists at the expanded path.
pub fn locate_pdf(pdf_path: &str) -> PdfResult<PathBuf> {
    let path = expand_home(pdf_path);
    if !path.exists() {
        return Err(PdfError::NotFound {
            path: PathBuf::from(pdf_path),
        });
    }
    Ok(path)
}

/// Expands a leading `~` to the user's home directory.
#[must_use]
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Checks an inclusive page range against a document's page count.
///
/// # Errors
///
/// Returns [`PdfError::InvalidRange`] if `left > right`, or
/// [`PdfError::PageOutOfBounds`] if either end lies outside the document.
pub fn check_page_range(left: u32, right: u32, page_count: u32) -> PdfResult<()> {
    if left > right {
        return Err(PdfError::InvalidRange { left, right });
    }
    if left < 1 {
        return Err(PdfError::PageOutOfBounds {
            page: left,
            page_count,
        });
    }
    if right > page_count {
        return Err(PdfError::PageOutOfBounds {
            page: right,
            page_count,
        });
    }
    Ok(())
}

/// Converts a rasterisation density into a points-to-pixels scale.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn dpi_to_scale(dpi: u32) -> f32 {
    dpi as f32 / POINTS_PER_INCH
}
