//! PDFium-backed implementation of [`PdfBackend`].
//!
//! PDFium is loaded dynamically, once per process. Text spans are the page's
//! text objects in content-stream order; PDFium reports bounds with a
//! bottom-left origin, which are flipped to the top-left convention used by
//! the rest of the crate.

use std::path::Path;

use image::RgbImage;
use pdfium_render::prelude::{
    PdfPage, PdfPageObjectCommon, PdfPageObjectsCommon, PdfRenderConfig, Pdfium, PdfiumError,
};
use tracing::debug;

use super::{DeclaredColor, PdfBackend, PdfDocument, PdfError, PdfResult, Rect, TextSpan};

/// A bound PDFium library.
pub struct PdfiumBackend {
    pdfium: Pdfium,
}

impl PdfiumBackend {
    /// Binds to PDFium.
    ///
    /// With `library_dir`, the platform library name is looked up in that
    /// directory; otherwise the system library search path is used.
    ///
    /// # Errors
    ///
    /// Returns an error if the shared library cannot be loaded.
    pub fn bind(library_dir: Option<&Path>) -> PdfResult<Self> {
        let bindings = match library_dir {
            Some(dir) => {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
            }
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(library_error)?;

        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }
}

impl PdfBackend for PdfiumBackend {
    fn open<'a>(&'a self, path: &Path) -> PdfResult<Box<dyn PdfDocument + 'a>> {
        let document = self
            .pdfium
            .load_pdf_from_file(path, None)
            .map_err(library_error)?;
        debug!(path = %path.display(), pages = document.pages().len(), "Opened PDF");
        Ok(Box::new(PdfiumDocument { document }))
    }
}

struct PdfiumDocument<'a> {
    document: pdfium_render::prelude::PdfDocument<'a>,
}

impl PdfiumDocument<'_> {
    fn page(&self, page: u32) -> PdfResult<PdfPage<'_>> {
        let page_count = self.page_count();
        let out_of_bounds = || PdfError::PageOutOfBounds { page, page_count };
        if page < 1 || page > page_count {
            return Err(out_of_bounds());
        }
        let index = u16::try_from(page - 1).map_err(|_| out_of_bounds())?;
        self.document.pages().get(index).map_err(library_error)
    }
}

impl PdfDocument for PdfiumDocument<'_> {
    fn page_count(&self) -> u32 {
        u32::from(self.document.pages().len())
    }

    fn render_page(&self, page: u32, scale: f32) -> PdfResult<RgbImage> {
        let pdf_page = self.page(page)?;
        let config = PdfRenderConfig::new().scale_page_by_factor(scale);
        let bitmap = pdf_page
            .render_with_config(&config)
            .map_err(library_error)?;
        Ok(bitmap.as_image().into_rgb8())
    }

    fn text_spans(&self, page: u32) -> PdfResult<Vec<TextSpan>> {
        let pdf_page = self.page(page)?;
        let page_height = pdf_page.height().value;

        let mut spans = Vec::new();
        for object in pdf_page.objects().iter() {
            let Some(text_object) = object.as_text_object() else {
                continue;
            };
            let bounds = object.bounds().map_err(library_error)?;
            let fill = object.fill_color().map_err(library_error)?;
            spans.push(TextSpan {
                text: text_object.text(),
                bbox: Rect::new(
                    bounds.left().value,
                    page_height - bounds.top().value,
                    bounds.right().value,
                    page_height - bounds.bottom().value,
                ),
                color: DeclaredColor::Bytes([fill.red(), fill.green(), fill.blue()]),
            });
        }
        Ok(spans)
    }
}

fn library_error(err: PdfiumError) -> PdfError {
    PdfError::library(format!("{err:?}"))
}
