//! In-memory PDF backend shared by the integration tests.
//!
//! Pages are flat colour fields with optional filled panels. Text spans are
//! reported by `text_spans` but not painted, so the dominant colour behind a
//! span is always the panel (or page background) it sits on.

#![allow(dead_code)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use image::RgbImage;
use pdf_spread_mcp::pdf::{
    DeclaredColor, PdfBackend, PdfDocument, PdfError, PdfResult, Rect, TextSpan,
};
use tempfile::TempDir;

#[derive(Debug, Clone)]
pub struct FakePage {
    pub width_pt: f32,
    pub height_pt: f32,
    pub background: [u8; 3],
    pub panels: Vec<(Rect, [u8; 3])>,
    pub spans: Vec<TextSpan>,
}

impl FakePage {
    pub fn blank(width_pt: f32, height_pt: f32) -> Self {
        Self {
            width_pt,
            height_pt,
            background: [255, 255, 255],
            panels: Vec::new(),
            spans: Vec::new(),
        }
    }

    pub fn with_panel(mut self, rect: Rect, color: [u8; 3]) -> Self {
        self.panels.push((rect, color));
        self
    }

    pub fn with_span(mut self, text: &str, bbox: Rect, color: DeclaredColor) -> Self {
        self.spans.push(TextSpan {
            text: text.to_string(),
            bbox,
            color,
        });
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeDocument {
    pub pages: Vec<FakePage>,
    pub failing_pages: HashSet<u32>,
}

impl FakeDocument {
    fn page(&self, page: u32) -> PdfResult<&FakePage> {
        let page_count = self.page_count();
        if self.failing_pages.contains(&page) {
            return Err(PdfError::library(format!("cannot decode page {page}")));
        }
        page.checked_sub(1)
            .and_then(|index| self.pages.get(index as usize))
            .ok_or(PdfError::PageOutOfBounds { page, page_count })
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_pixels(value: f32, scale: f32) -> u32 {
    (value * scale).round().max(0.0) as u32
}

impl PdfDocument for FakeDocument {
    fn page_count(&self) -> u32 {
        u32::try_from(self.pages.len()).unwrap()
    }

    fn render_page(&self, page: u32, scale: f32) -> PdfResult<RgbImage> {
        let fake = self.page(page)?;
        let width = to_pixels(fake.width_pt, scale);
        let height = to_pixels(fake.height_pt, scale);
        let mut image = RgbImage::from_pixel(width, height, image::Rgb(fake.background));

        for (rect, color) in &fake.panels {
            let x0 = to_pixels(rect.x0, scale).min(width);
            let y0 = to_pixels(rect.y0, scale).min(height);
            let x1 = to_pixels(rect.x1, scale).min(width);
            let y1 = to_pixels(rect.y1, scale).min(height);
            for y in y0..y1 {
                for x in x0..x1 {
                    image.put_pixel(x, y, image::Rgb(*color));
                }
            }
        }
        Ok(image)
    }

    fn text_spans(&self, page: u32) -> PdfResult<Vec<TextSpan>> {
        Ok(self.page(page)?.spans.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    pub document: FakeDocument,
}

impl FakeBackend {
    pub fn new(pages: Vec<FakePage>) -> Self {
        Self {
            document: FakeDocument {
                pages,
                failing_pages: HashSet::new(),
            },
        }
    }

    pub fn failing_on(mut self, page: u32) -> Self {
        self.document.failing_pages.insert(page);
        self
    }
}

impl PdfBackend for FakeBackend {
    fn open<'a>(&'a self, _path: &Path) -> PdfResult<Box<dyn PdfDocument + 'a>> {
        Ok(Box::new(self.document.clone()))
    }
}

/// A placeholder file standing in for a PDF on disk.
pub struct PdfFixture {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl PdfFixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("document.pdf");
        std::fs::write(&path, b"%PDF-1.7\n").expect("Failed to write fixture");
        Self { dir, path }
    }

    pub fn path_str(&self) -> &str {
        self.path.to_str().expect("Temp path is not UTF-8")
    }
}
