//! Text contrast analysis.
//!
//! For every text span on a page, the background behind the span is sampled
//! from a rasterised copy of the page and compared against the span's
//! declared colour using the WCAG contrast ratio.
//!
//! # Region extraction
//!
//! 1. The span's box is padded by 15% of its height, clamped to 1.5..=6.0 pt.
//! 2. The padded box is scaled to pixels and clamped to the page image.
//!    Boxes narrower or shorter than two pixels are skipped.
//! 3. The dominant colour of the crop is taken as the background.

pub mod dominant;
pub mod report;
pub mod wcag;

pub use report::{build_report, PageIssues, WcagReport};
pub use wcag::{contrast_ratio, WcagCompliance};

use std::fmt::Write as _;

use image::{imageops, RgbImage};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::pdf::{
    check_page_range, dpi_to_scale, locate_pdf, ColorInfo, PdfBackend, PdfDocument, PdfError,
    PdfResult, Rect,
};
use crate::spread::{quality_to_dpi, validate_quality};

/// Lowest density used for contrast analysis.
pub const MIN_ANALYSIS_DPI: u32 = 72;

const PADDING_RATIO: f32 = 0.15;
const MIN_PADDING: f32 = 1.5;
const MAX_PADDING: f32 = 6.0;
const MIN_REGION_PIXELS: u32 = 2;

/// Number of regions listed per page in the text summary.
pub const SUMMARY_REGIONS_PER_PAGE: usize = 5;

/// A region in pixel space, half-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PixelRect {
    /// Left column.
    pub x0: u32,
    /// Top row.
    pub y0: u32,
    /// One past the right column.
    pub x1: u32,
    /// One past the bottom row.
    pub y1: u32,
}

impl PixelRect {
    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.y1 - self.y0
    }
}

/// One text span with its measured contrast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRegion {
    /// 1-based position on the page, in document text order.
    pub index: usize,
    /// Trimmed span text.
    pub text: String,
    /// Span box in document points.
    pub bbox: Rect,
    /// Padded, clamped sampling box in pixels.
    pub pixel_bbox: PixelRect,
    /// Declared text colour.
    pub text_color: ColorInfo,
    /// Dominant colour of the sampling box.
    pub background_color: ColorInfo,
    /// WCAG contrast ratio between text and background.
    pub contrast_ratio: f64,
    /// Threshold results.
    pub wcag: WcagCompliance,
}

impl TextRegion {
    /// True if the region fails at least one threshold.
    #[must_use]
    pub const fn is_non_compliant(&self) -> bool {
        !self.wcag.is_fully_compliant()
    }
}

/// Analysis of a single page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageAnalysis {
    /// Page number (1-based).
    pub page: u32,
    /// Rendered width in pixels.
    pub width: u32,
    /// Rendered height in pixels.
    pub height: u32,
    /// Rendering density.
    pub dpi: u32,
    /// Regions in document order.
    pub regions: Vec<TextRegion>,
}

/// Padding added around a span of the given height, in points.
#[must_use]
pub fn padding_for(span_height: f32) -> f32 {
    (span_height * PADDING_RATIO).clamp(MIN_PADDING, MAX_PADDING)
}

/// Maps a box in points to a clamped pixel box.
///
/// Returns `None` if the clamped box is smaller than two pixels either way.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn to_pixel_rect(rect: &Rect, scale: f32, width: u32, height: u32) -> Option<PixelRect> {
    let clamp = |value: f32, limit: u32| -> u32 {
        if value <= 0.0 {
            0
        } else {
            (value as u32).min(limit)
        }
    };

    let pixels = PixelRect {
        x0: clamp((rect.x0 * scale).floor(), width),
        y0: clamp((rect.y0 * scale).floor(), height),
        x1: clamp((rect.x1 * scale).ceil(), width),
        y1: clamp((rect.y1 * scale).ceil(), height),
    };

    if pixels.x1 < pixels.x0 + MIN_REGION_PIXELS || pixels.y1 < pixels.y0 + MIN_REGION_PIXELS {
        return None;
    }
    Some(pixels)
}

/// Analyses every page in `left_page..=right_page`.
///
/// # Errors
///
/// Returns an error for an invalid quality, an inverted range, a missing file,
/// pages outside the document, or a failure inside the PDF library.
#[instrument(skip(backend))]
pub fn analyze(
    backend: &dyn PdfBackend,
    pdf_path: &str,
    left_page: u32,
    right_page: u32,
    quality: u32,
) -> PdfResult<Vec<PageAnalysis>> {
    validate_quality(quality)?;
    if left_page > right_page {
        return Err(PdfError::InvalidRange {
            left: left_page,
            right: right_page,
        });
    }

    let path = locate_pdf(pdf_path)?;
    let document = backend.open(&path)?;
    check_page_range(left_page, right_page, document.page_count())?;

    let dpi = quality_to_dpi(quality, MIN_ANALYSIS_DPI);
    (left_page..=right_page)
        .map(|page| analyze_page(document.as_ref(), page, dpi))
        .collect()
}

/// Analyses one page of an open document at `dpi`.
///
/// # Errors
///
/// Returns an error if rendering or text extraction fails.
pub fn analyze_page(document: &dyn PdfDocument, page: u32, dpi: u32) -> PdfResult<PageAnalysis> {
    let scale = dpi_to_scale(dpi);
    let image = document.render_page(page, scale)?;
    let spans = document.text_spans(page)?;
    let (width, height) = image.dimensions();

    let mut regions = Vec::new();
    for span in spans {
        let text = span.text.trim();
        if text.is_empty() {
            continue;
        }

        let padded = span.bbox.expand(padding_for(span.bbox.height()));
        let Some(pixel_bbox) = to_pixel_rect(&padded, scale, width, height) else {
            debug!(page, text, "Skipping region too small after clamping");
            continue;
        };

        let text_color = match span.color.resolve() {
            Ok(color) => color,
            Err(e) => {
                warn!(page, text, error = %e, "Skipping region with undecodable colour");
                continue;
            }
        };

        let Some(background) = sample_background(&image, pixel_bbox) else {
            continue;
        };
        let ratio = contrast_ratio(text_color, background);

        regions.push(TextRegion {
            index: regions.len() + 1,
            text: text.to_string(),
            bbox: span.bbox,
            pixel_bbox,
            text_color: text_color.into(),
            background_color: background.into(),
            contrast_ratio: ratio,
            wcag: WcagCompliance::classify(ratio),
        });
    }

    debug!(page, dpi, regions = regions.len(), "Page analysed");
    Ok(PageAnalysis {
        page,
        width,
        height,
        dpi,
        regions,
    })
}

fn sample_background(image: &RgbImage, rect: PixelRect) -> Option<crate::pdf::Rgb> {
    let crop = imageops::crop_imm(image, rect.x0, rect.y0, rect.width(), rect.height());
    dominant::dominant_color(&crop.to_image())
}

/// Formats a human-readable summary listing the first few regions per page.
#[must_use]
pub fn summarize(analyses: &[PageAnalysis]) -> String {
    let total: usize = analyses.iter().map(|a| a.regions.len()).sum();
    let failing: usize = analyses
        .iter()
        .flat_map(|a| &a.regions)
        .filter(|r| r.is_non_compliant())
        .count();

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Contrast analysis: {} page(s), {total} text region(s), {failing} not fully WCAG compliant",
        analyses.len()
    );

    for analysis in analyses {
        let _ = writeln!(
            out,
            "\nPage {} ({}x{} px @ {} DPI): {} region(s)",
            analysis.page,
            analysis.width,
            analysis.height,
            analysis.dpi,
            analysis.regions.len()
        );
        for region in analysis.regions.iter().take(SUMMARY_REGIONS_PER_PAGE) {
            let _ = writeln!(
                out,
                "  #{} \"{}\" {} on {} ratio {:.2}:1 [AA {} | AA-large {} | AAA {} | AAA-large {}]",
                region.index,
                region.text,
                region.text_color.hex,
                region.background_color.hex,
                region.contrast_ratio,
                pass_fail(region.wcag.aa_normal),
                pass_fail(region.wcag.aa_large),
                pass_fail(region.wcag.aaa_normal),
                pass_fail(region.wcag.aaa_large),
            );
        }
        let hidden = analysis
            .regions
            .len()
            .saturating_sub(SUMMARY_REGIONS_PER_PAGE);
        if hidden > 0 {
            let _ = writeln!(out, "  ... and {hidden} more region(s)");
        }
    }
    out
}

const fn pass_fail(passed: bool) -> &'static str {
    if passed {
        "pass"
    } else {
        "FAIL"
    }
}
