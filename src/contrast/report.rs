//! Document-wide WCAG report.
//!
//! The document is walked in page pairs from the start page, and each pair is
//! analysed independently. A pair that fails to analyse is recorded in
//! `pages_skipped` and the walk continues.

use serde::Serialize;
use tracing::{info, instrument, warn};

use super::{analyze, TextRegion};
use crate::pdf::{locate_pdf, PdfBackend, PdfError, PdfResult};
use crate::spread::validate_quality;

/// Non-compliant regions on one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageIssues {
    /// Page number (1-based).
    pub page: u32,
    /// Number of non-compliant regions.
    pub regions_count: usize,
    /// The non-compliant regions.
    pub regions: Vec<TextRegion>,
}

/// WCAG compliance report for a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WcagReport {
    /// Path as given by the caller.
    pub pdf_path: String,
    /// Pages in the document.
    pub total_pages: u32,
    /// First page of the walk.
    pub start_page: u32,
    /// Pages analysed successfully.
    pub pages_analyzed: u32,
    /// Sum of `regions_count` over `pages_with_issues`.
    pub non_compliant_regions_count: usize,
    /// Pages with at least one non-compliant region, ascending.
    pub pages_with_issues: Vec<PageIssues>,
    /// Pages whose pair failed to analyse, ascending.
    pub pages_skipped: Vec<u32>,
    /// RFC 3339 generation time (UTC).
    pub generated_at: String,
}

/// Splits `start..=total` into consecutive pairs; the last may be a single page.
#[must_use]
pub fn page_pairs(start: u32, total: u32) -> Vec<(u32, u32)> {
    if start == 0 || start > total {
        return Vec::new();
    }
    (start..=total)
        .step_by(2)
        .map(|left| (left, left.saturating_add(1).min(total)))
        .collect()
}

/// Builds a report of every non-compliant region from `start_page` onwards.
///
/// # Errors
///
/// Returns an error for an invalid quality or start page, a missing file, or
/// a document that cannot be opened. Failures analysing individual page pairs
/// are not errors.
#[instrument(skip(backend))]
pub fn build_report(
    backend: &dyn PdfBackend,
    pdf_path: &str,
    start_page: u32,
    quality: u32,
) -> PdfResult<WcagReport> {
    validate_quality(quality)?;
    if start_page < 1 {
        return Err(PdfError::validation("start_page", "must be at least 1"));
    }

    let path = locate_pdf(pdf_path)?;
    let total_pages = backend.open(&path)?.page_count();
    if start_page > total_pages {
        return Err(PdfError::PageOutOfBounds {
            page: start_page,
            page_count: total_pages,
        });
    }

    let mut pages_analyzed = 0;
    let mut pages_with_issues = Vec::new();
    let mut pages_skipped = Vec::new();

    for (left, right) in page_pairs(start_page, total_pages) {
        let analyses = match analyze(backend, pdf_path, left, right, quality) {
            Ok(analyses) => analyses,
            Err(e) => {
                warn!(left, right, error = %e.report(), "Skipping page pair");
                pages_skipped.extend(left..=right);
                continue;
            }
        };

        for analysis in analyses {
            pages_analyzed += 1;
            let regions: Vec<TextRegion> = analysis
                .regions
                .into_iter()
                .filter(TextRegion::is_non_compliant)
                .collect();
            if !regions.is_empty() {
                pages_with_issues.push(PageIssues {
                    page: analysis.page,
                    regions_count: regions.len(),
                    regions,
                });
            }
        }
    }

    pages_with_issues.sort_by_key(|issues| issues.page);
    pages_skipped.sort_unstable();
    let non_compliant_regions_count = pages_with_issues.iter().map(|p| p.regions_count).sum();

    info!(
        pages_analyzed,
        non_compliant_regions_count,
        skipped = pages_skipped.len(),
        "WCAG report built"
    );

    Ok(WcagReport {
        pdf_path: pdf_path.to_string(),
        total_pages,
        start_page,
        pages_analyzed,
        non_compliant_regions_count,
        pages_with_issues,
        pages_skipped,
        generated_at: chrono::Utc::now().to_rfc3339(),
    })
}
