//! PDF page rasterization via PDFium.

use image::RgbImage;
use pdfium_render::prelude::*;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Failed to initialize PDFium: {0}")]
    Init(String),

    #[error("Failed to load PDF: {0}")]
    Load(String),

    #[error("Failed to render page {page}: {message}")]
    Render { page: usize, message: String },

    #[error("PDF has no pages")]
    Empty,
}

/// Rasterization settings for PDF pages.
#[derive(Debug, Clone)]
pub struct RasterSettings {
    /// Zoom factor applied to the page's point size (2.0 ~ 144 DPI).
    pub scale: f32,
    /// Upper bound on either rendered dimension.
    pub max_dimension: u32,
}

impl Default for RasterSettings {
    fn default() -> Self {
        RasterSettings {
            scale: 2.0,
            max_dimension: 4000,
        }
    }
}

/// Renders PDF pages to RGB images for OCR and annotation.
pub struct PdfRasterizer {
    pdfium: Pdfium,
    settings: RasterSettings,
}

impl PdfRasterizer {
    pub fn new(settings: RasterSettings) -> Result<Self, PdfError> {
        let bindings = Pdfium::bind_to_system_library()
            .or_else(|_| {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            })
            .or_else(|_| {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                    "/usr/local/lib",
                ))
            })
            .map_err(|e| PdfError::Init(e.to_string()))?;

        Ok(PdfRasterizer {
            pdfium: Pdfium::new(bindings),
            settings,
        })
    }

    /// Render every page of the PDF at `path`, in page order.
    pub fn render_file(&self, path: &Path) -> Result<Vec<RgbImage>, PdfError> {
        let document = self
            .pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| PdfError::Load(e.to_string()))?;

        let page_count = document.pages().len() as usize;
        if page_count == 0 {
            return Err(PdfError::Empty);
        }

        let mut images = Vec::with_capacity(page_count);
        for (index, page) in document.pages().iter().enumerate() {
            images.push(self.render_page(&page, index)?);
        }
        Ok(images)
    }

    fn render_page(&self, page: &PdfPage, index: usize) -> Result<RgbImage, PdfError> {
        let mut width_px = (page.width().value * self.settings.scale) as u32;
        let mut height_px = (page.height().value * self.settings.scale) as u32;

        // Cap the larger dimension, preserving aspect ratio.
        let max = self.settings.max_dimension;
        if width_px > max || height_px > max {
            let ratio = max as f32 / width_px.max(height_px) as f32;
            width_px = (width_px as f32 * ratio) as u32;
            height_px = (height_px as f32 * ratio) as u32;
        }

        let config = PdfRenderConfig::new()
            .set_target_width(width_px as i32)
            .set_target_height(height_px as i32);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| PdfError::Render {
                page: index + 1,
                message: e.to_string(),
            })?;

        Ok(bitmap.as_image().to_rgb8())
    }
}

/// Whether a file path has a PDF extension.
pub fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_ascii_lowercase() == "pdf")
        .unwrap_or(false)
}
