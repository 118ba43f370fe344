//! Double-page spread rendering.
//!
//! Two rasterised pages are pasted side by side onto a black canvas, with a
//! border of `border_width` pixels around the outside and between the pages:
//!
//! ```text
//! +-----------------------+
//! | +--------+ +--------+ |
//! | |  left  | | right  | |
//! | +--------+ +--------+ |
//! +-----------------------+
//! ```
//!
//! Border widths are capped at [`MAX_BORDER_WIDTH`] so the canvas size stays
//! bounded.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{imageops, ImageFormat, RgbImage};
use tracing::{debug, info, instrument};

use crate::pdf::{
    check_page_range, dpi_to_scale, expand_home, locate_pdf, PdfBackend, PdfError, PdfResult,
};

/// Default border width in pixels.
pub const DEFAULT_BORDER_WIDTH: u32 = 2;

/// Default rendering quality (1-100).
pub const DEFAULT_QUALITY: u32 = 50;

/// Widest accepted border, in pixels.
pub const MAX_BORDER_WIDTH: u32 = 1000;

/// Rasterisation density at quality 100.
pub const MAX_DPI: u32 = 200;

/// Lowest density used for spreads.
pub const MIN_SPREAD_DPI: u32 = 50;

const BORDER_COLOR: image::Rgb<u8> = image::Rgb([0, 0, 0]);

/// Maps `quality` (1-100) linearly onto `0..=MAX_DPI`, floored at `min_dpi`.
#[must_use]
pub const fn quality_to_dpi(quality: u32, min_dpi: u32) -> u32 {
    let dpi = MAX_DPI * quality / 100;
    if dpi < min_dpi {
        min_dpi
    } else {
        dpi
    }
}

/// Checks that `quality` lies in `1..=100`.
///
/// # Errors
///
/// Returns a validation error otherwise.
pub fn validate_quality(quality: u32) -> PdfResult<()> {
    if (1..=100).contains(&quality) {
        Ok(())
    } else {
        Err(PdfError::validation(
            "quality",
            format!("must be between 1 and 100, got {quality}"),
        ))
    }
}

/// Parameters for rendering a spread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadRequest {
    /// Path to the PDF, `~` allowed.
    pub pdf_path: String,
    /// Left page (1-based).
    pub left_page: u32,
    /// Right page (1-based, not before `left_page`).
    pub right_page: u32,
    /// Border width in pixels.
    pub border_width: u32,
    /// Rendering quality (1-100).
    pub quality: u32,
}

impl SpreadRequest {
    /// Creates a request with default border width and quality.
    #[must_use]
    pub fn new(pdf_path: impl Into<String>, left_page: u32, right_page: u32) -> Self {
        Self {
            pdf_path: pdf_path.into(),
            left_page,
            right_page,
            border_width: DEFAULT_BORDER_WIDTH,
            quality: DEFAULT_QUALITY,
        }
    }

    /// Validates the request parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if a page is below 1, the range is inverted, the
    /// border is wider than [`MAX_BORDER_WIDTH`] or the quality is out of
    /// range.
    pub fn validate(&self) -> PdfResult<()> {
        if self.pdf_path.is_empty() {
            return Err(PdfError::validation("pdf_path", "must not be empty"));
        }
        if self.left_page < 1 {
            return Err(PdfError::validation("left_page", "must be at least 1"));
        }
        if self.right_page < self.left_page {
            return Err(PdfError::InvalidRange {
                left: self.left_page,
                right: self.right_page,
            });
        }
        if self.border_width > MAX_BORDER_WIDTH {
            return Err(PdfError::validation(
                "border_width",
                format!(
                    "must be at most {MAX_BORDER_WIDTH}, got {}",
                    self.border_width
                ),
            ));
        }
        validate_quality(self.quality)
    }

    /// Rasterisation density for this request.
    #[must_use]
    pub const fn dpi(&self) -> u32 {
        quality_to_dpi(self.quality, MIN_SPREAD_DPI)
    }
}

/// Pastes two pages side by side on a black, bordered canvas.
#[must_use]
pub fn compose(left: &RgbImage, right: &RgbImage, border_width: u32) -> RgbImage {
    let (left_width, left_height) = left.dimensions();
    let (right_width, right_height) = right.dimensions();

    let canvas_width = left_width + border_width + right_width + 2 * border_width;
    let canvas_height = left_height.max(right_height) + 2 * border_width;

    let mut canvas = RgbImage::from_pixel(canvas_width, canvas_height, BORDER_COLOR);
    let border = i64::from(border_width);
    imageops::replace(&mut canvas, left, border, border);
    imageops::replace(
        &mut canvas,
        right,
        border + i64::from(left_width) + border,
        border,
    );
    canvas
}

/// Encodes an image as PNG.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn encode_png(image: &RgbImage) -> PdfResult<Vec<u8>> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Renders the spread described by `request` to PNG bytes.
///
/// The first two pages of the range are composed; a range that yields fewer
/// than two pages fails with [`PdfError::InsufficientPages`].
///
/// # Errors
///
/// Returns an error for invalid parameters, a missing file, pages outside the
/// document, or a failure inside the PDF library.
#[instrument(skip(backend), fields(pdf = %request.pdf_path))]
pub fn render_spread(backend: &dyn PdfBackend, request: &SpreadRequest) -> PdfResult<Vec<u8>> {
    request.validate()?;
    let path = locate_pdf(&request.pdf_path)?;
    let document = backend.open(&path)?;
    check_page_range(request.left_page, request.right_page, document.page_count())?;

    let dpi = request.dpi();
    let scale = dpi_to_scale(dpi);
    let last = request.right_page.min(request.left_page + 1);
    let pages = (request.left_page..=last)
        .map(|page| document.render_page(page, scale))
        .collect::<PdfResult<Vec<_>>>()?;

    let [left, right] = pages.as_slice() else {
        return Err(PdfError::InsufficientPages {
            left: request.left_page,
            right: request.right_page,
            rendered: pages.len(),
        });
    };

    debug!(
        dpi,
        left = ?left.dimensions(),
        right = ?right.dimensions(),
        "Pages rasterised"
    );
    let canvas = compose(left, right, request.border_width);
    let png = encode_png(&canvas)?;
    info!(
        width = canvas.width(),
        height = canvas.height(),
        bytes = png.len(),
        "Spread rendered"
    );
    Ok(png)
}

/// Renders a spread and writes it to `output_path`, creating parent
/// directories as needed.
///
/// Returns the expanded output path and the number of bytes written.
///
/// # Errors
///
/// Returns any [`render_spread`] error, or an error if the file cannot be
/// written.
pub fn save_spread(
    backend: &dyn PdfBackend,
    request: &SpreadRequest,
    output_path: &str,
) -> PdfResult<(PathBuf, usize)> {
    if output_path.is_empty() {
        return Err(PdfError::validation("output_path", "must not be empty"));
    }
    let png = render_spread(backend, request)?;
    let path = expand_home(output_path);
    write_file(&path, &png)?;
    info!(path = %path.display(), "Spread saved");
    Ok((path, png.len()))
}

fn write_file(path: &Path, bytes: &[u8]) -> PdfResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PdfError::file_write(parent, e))?;
    }
    std::fs::write(path, bytes).map_err(|e| PdfError::file_write(path, e))
}
