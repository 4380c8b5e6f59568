pub mod locator;
pub mod pdf;

pub use locator::{TesseractDetector, TextDetection, TextDetector, TextLocations};
pub use pdf::{is_pdf_path, PdfRasterizer, RasterSettings};
