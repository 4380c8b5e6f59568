use std::path::PathBuf;
use thiserror::Error;

use crate::processing::pdf::PdfError;

/// Errors surfaced while localizing and annotating a document.
///
/// Matching ambiguity is never an error: a field that cannot be located with
/// enough confidence is simply absent from the output. Only structural
/// failures (unreadable files, broken records, engine faults) reach callers.
#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error("Could not read image at {path:?}: {source}")]
    ImageRead {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Image encoding error: {0}")]
    ImageEncode(#[from] image::ImageError),

    #[error("Text detection error: {0}")]
    Ocr(String),

    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    #[error("Invalid extraction record: {0}")]
    Record(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
