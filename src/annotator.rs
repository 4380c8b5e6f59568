//! Document-level orchestration: page loading, field localization and
//! annotated image output.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use ab_glyph::FontVec;
use image::RgbImage;
use log::{info, warn};

use crate::matching::{flatten_record, FieldMatcher};
use crate::models::record::page_key;
use crate::models::{NormalizedBox, ResumeData, ResumeDocument};
use crate::processing::locator::{TesseractDetector, TextDetector, TextLocations};
use crate::processing::pdf::{is_pdf_path, PdfRasterizer, RasterSettings};
use crate::render::{annotate_image, load_font, RenderSettings};
use crate::utils::AnnotateError;
use crate::validation::sanitize_document;

/// Which of the two annotation paths produced the outputs.
///
/// A pages-wrapped record over a PDF is annotated page by page; anything
/// else, and any per-page failure, goes through whole-document annotation.
/// The fallback reason is recorded so callers can observe the degraded mode.
#[derive(Debug)]
pub enum AnnotationOutcome {
    PerPage {
        outputs: Vec<PathBuf>,
    },
    Whole {
        outputs: Vec<PathBuf>,
        fallback: Option<String>,
    },
}

impl AnnotationOutcome {
    pub fn outputs(&self) -> &[PathBuf] {
        match self {
            AnnotationOutcome::PerPage { outputs } => outputs,
            AnnotationOutcome::Whole { outputs, .. } => outputs,
        }
    }

    /// True when the per-page path failed and whole-document annotation ran
    /// in its place.
    pub fn is_fallback(&self) -> bool {
        matches!(
            self,
            AnnotationOutcome::Whole {
                fallback: Some(_),
                ..
            }
        )
    }
}

/// Localization result for one page.
#[derive(Debug)]
pub struct PageCoordinates {
    /// 0-based page index.
    pub page: usize,
    pub coordinates: HashMap<String, NormalizedBox>,
    /// Pixel dimensions the page was processed at.
    pub dimensions: (u32, u32),
}

/// Localizes extracted resume fields on a document's pages and renders
/// annotated images.
///
/// All state is per-document; detections and coordinate maps are rebuilt
/// from scratch for every page.
pub struct ResumeAnnotator {
    detector: Box<dyn TextDetector>,
    render: RenderSettings,
    raster: RasterSettings,
    font: Option<FontVec>,
}

impl ResumeAnnotator {
    pub fn new() -> Self {
        Self::with_detector(Box::new(TesseractDetector::default()))
    }

    pub fn with_detector(detector: Box<dyn TextDetector>) -> Self {
        let font = load_font();
        if font.is_none() {
            warn!("no TrueType font found; annotations will carry boxes without labels");
        }
        ResumeAnnotator {
            detector,
            render: RenderSettings::default(),
            raster: RasterSettings::default(),
            font,
        }
    }

    pub fn with_render_settings(mut self, settings: RenderSettings) -> Self {
        self.render = settings;
        self
    }

    /// Annotate a document, choosing the per-page or whole-document path
    /// based on the record shape and file type.
    pub fn annotate(
        &mut self,
        file_path: &Path,
        document: &ResumeDocument,
        output_dir: &Path,
    ) -> Result<AnnotationOutcome, AnnotateError> {
        match document {
            ResumeDocument::Paged { pages } if is_pdf_path(file_path) => {
                match self.annotate_paged_pdf(file_path, pages, output_dir) {
                    Ok(outputs) => Ok(AnnotationOutcome::PerPage { outputs }),
                    Err(err) => {
                        warn!("per-page annotation failed ({err}); falling back to whole-document annotation");
                        let outputs = self.annotate_document(file_path, document, output_dir)?;
                        Ok(AnnotationOutcome::Whole {
                            outputs,
                            fallback: Some(err.to_string()),
                        })
                    }
                }
            }
            ResumeDocument::Paged { pages } => {
                // An image never has more than one page; page 1 of the
                // record is authoritative for it.
                let record = pages.get(&page_key(1)).cloned().unwrap_or_default();
                let outputs =
                    self.annotate_document(file_path, &ResumeDocument::Single(record), output_dir)?;
                Ok(AnnotationOutcome::Whole {
                    outputs,
                    fallback: None,
                })
            }
            ResumeDocument::Single(_) => {
                let outputs = self.annotate_document(file_path, document, output_dir)?;
                Ok(AnnotationOutcome::Whole {
                    outputs,
                    fallback: None,
                })
            }
        }
    }

    /// Per-page path: rasterize the PDF and annotate each page against its
    /// own record entry. Pages absent from the record are skipped.
    fn annotate_paged_pdf(
        &mut self,
        file_path: &Path,
        pages: &BTreeMap<String, ResumeData>,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, AnnotateError> {
        let rasterizer = PdfRasterizer::new(self.raster.clone())?;
        let images = rasterizer.render_file(file_path)?;
        fs::create_dir_all(output_dir)?;
        let base = file_stem(file_path);

        let mut outputs = Vec::new();
        for (index, image) in images.iter().enumerate() {
            let Some(record) = pages.get(&page_key(index + 1)) else {
                continue;
            };
            let output_path = output_dir.join(format!("{base}_page{}.png", index + 1));
            self.annotate_page(image, record, &output_path)?;
            outputs.push(output_path);
        }
        info!("annotated {} page(s) of {}", outputs.len(), file_path.display());
        Ok(outputs)
    }

    /// Whole-document path: load every page, localize fields and write one
    /// annotated image per page.
    pub fn annotate_document(
        &mut self,
        file_path: &Path,
        document: &ResumeDocument,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, AnnotateError> {
        let images = self.load_pages(file_path)?;
        let pages = self.locate_fields(&images, document)?;
        fs::create_dir_all(output_dir)?;
        let base = file_stem(file_path);

        let mut outputs = Vec::new();
        for page in &pages {
            let annotated = annotate_image(
                &images[page.page],
                &page.coordinates,
                &self.render,
                self.font.as_ref(),
            );
            let file_name = if images.len() > 1 {
                format!("{base}_page{}.png", page.page + 1)
            } else {
                format!("{base}_annotated.png")
            };
            let output_path = output_dir.join(file_name);
            annotated.save(&output_path)?;
            outputs.push(output_path);
        }
        Ok(outputs)
    }

    /// Run localization over every page without rendering anything.
    pub fn locate_fields(
        &mut self,
        images: &[RgbImage],
        document: &ResumeDocument,
    ) -> Result<Vec<PageCoordinates>, AnnotateError> {
        let mut results = Vec::new();
        for (index, image) in images.iter().enumerate() {
            let detections = self.detector.detect(image)?;
            let locations =
                TextLocations::from_detections(&detections, image.width(), image.height());
            let record = document.record_for_page(index, images.len());
            let flat = flatten_record(record);
            let coordinates = FieldMatcher::match_fields(&locations, &flat);
            results.push(PageCoordinates {
                page: index,
                coordinates,
                dimensions: (image.width(), image.height()),
            });
        }
        Ok(results)
    }

    /// Localize and annotate a single page image against one record.
    pub fn annotate_page(
        &mut self,
        image: &RgbImage,
        record: &ResumeData,
        output_path: &Path,
    ) -> Result<(), AnnotateError> {
        let detections = self.detector.detect(image)?;
        let locations = TextLocations::from_detections(&detections, image.width(), image.height());
        let flat = flatten_record(record);
        let coordinates = FieldMatcher::match_fields(&locations, &flat);
        let annotated = annotate_image(image, &coordinates, &self.render, self.font.as_ref());
        annotated.save(output_path)?;
        Ok(())
    }

    fn load_pages(&self, file_path: &Path) -> Result<Vec<RgbImage>, AnnotateError> {
        if is_pdf_path(file_path) {
            let rasterizer = PdfRasterizer::new(self.raster.clone())?;
            Ok(rasterizer.render_file(file_path)?)
        } else {
            let image = image::open(file_path).map_err(|source| AnnotateError::ImageRead {
                path: file_path.to_path_buf(),
                source,
            })?;
            Ok(vec![image.to_rgb8()])
        }
    }
}

impl Default for ResumeAnnotator {
    fn default() -> Self {
        Self::new()
    }
}

/// Annotate a resume file using its persisted extraction record.
///
/// The record is sanitized (invalid contact fields demoted to the sentinel)
/// before matching, so malformed extraction output never gets localized.
pub fn annotate_resume(
    file_path: &Path,
    json_path: &Path,
    output_dir: &Path,
) -> Result<AnnotationOutcome, AnnotateError> {
    let raw = fs::read_to_string(json_path)?;
    let mut document: ResumeDocument = serde_json::from_str(&raw)?;
    sanitize_document(&mut document);
    fs::create_dir_all(output_dir)?;
    ResumeAnnotator::new().annotate(file_path, &document, output_dir)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("document")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PersonalInfo;
    use crate::processing::locator::TextDetection;

    /// Detector returning a canned set of detections, one page after the
    /// next.
    struct FakeDetector {
        pages: Vec<Vec<TextDetection>>,
        calls: usize,
    }

    impl FakeDetector {
        fn new(pages: Vec<Vec<TextDetection>>) -> Self {
            FakeDetector { pages, calls: 0 }
        }
    }

    impl TextDetector for FakeDetector {
        fn detect(&mut self, _image: &RgbImage) -> Result<Vec<TextDetection>, AnnotateError> {
            let detections = self.pages[self.calls % self.pages.len()].clone();
            self.calls += 1;
            Ok(detections)
        }
    }

    fn detection(text: &str, y: f32) -> TextDetection {
        TextDetection {
            quad: [[10.0, y], [210.0, y], [210.0, y + 20.0], [10.0, y + 20.0]],
            text: text.to_string(),
        }
    }

    fn sample_record() -> ResumeData {
        ResumeData {
            personal_info: PersonalInfo {
                name: Some("John Doe".to_string()),
                email: Some("john.doe@example.com".to_string()),
                phone: None,
                location: None,
            },
            ..Default::default()
        }
    }

    fn annotator_with(pages: Vec<Vec<TextDetection>>) -> ResumeAnnotator {
        ResumeAnnotator::with_detector(Box::new(FakeDetector::new(pages)))
    }

    #[test]
    fn test_locate_fields_via_exact_path() {
        let mut annotator = annotator_with(vec![vec![
            detection("John Doe", 40.0),
            detection("john.doe@example.com", 80.0),
        ]]);
        let images = vec![RgbImage::new(400, 300)];
        let document = ResumeDocument::Single(sample_record());

        let pages = annotator.locate_fields(&images, &document).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].dimensions, (400, 300));
        let coordinates = &pages[0].coordinates;
        assert!(coordinates.contains_key("Name"));
        assert!(coordinates.contains_key("Email"));
    }

    #[test]
    fn test_annotate_document_writes_single_image_with_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("resume.png");
        RgbImage::new(400, 300).save(&image_path).unwrap();

        let mut annotator = annotator_with(vec![vec![detection("John Doe", 40.0)]]);
        let outputs = annotator
            .annotate_document(
                &image_path,
                &ResumeDocument::Single(sample_record()),
                dir.path(),
            )
            .unwrap();

        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0], dir.path().join("resume_annotated.png"));
        assert!(outputs[0].exists());
    }

    #[test]
    fn test_annotate_paged_record_over_image_uses_page_one() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("resume.png");
        RgbImage::new(400, 300).save(&image_path).unwrap();

        let mut pages = BTreeMap::new();
        pages.insert(page_key(1), sample_record());
        let document = ResumeDocument::Paged { pages };

        let mut annotator = annotator_with(vec![vec![detection("John Doe", 40.0)]]);
        let outcome = annotator.annotate(&image_path, &document, dir.path()).unwrap();

        assert!(!outcome.is_fallback());
        assert_eq!(outcome.outputs().len(), 1);
        assert!(matches!(outcome, AnnotationOutcome::Whole { fallback: None, .. }));
    }

    #[test]
    fn test_unreadable_image_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.png");
        let mut annotator = annotator_with(vec![vec![]]);
        let result = annotator.annotate_document(
            &missing,
            &ResumeDocument::Single(sample_record()),
            dir.path(),
        );
        assert!(matches!(result, Err(AnnotateError::ImageRead { .. })));
    }

    #[test]
    fn test_multi_page_record_resolution_per_page() {
        // Page 1 carries personal info; page 2 carries a job title. Each
        // page matches only against its own record.
        let mut page2 = ResumeData::default();
        page2.work_experience.push(crate::models::WorkExperienceEntry {
            job_title: Some("Software Engineer".to_string()),
            ..Default::default()
        });
        let mut pages = BTreeMap::new();
        pages.insert(page_key(1), sample_record());
        pages.insert(page_key(2), page2);
        let document = ResumeDocument::Paged { pages };

        let mut annotator = annotator_with(vec![
            vec![detection("John Doe", 40.0)],
            vec![detection("Software Engineer", 60.0)],
        ]);
        let images = vec![RgbImage::new(400, 300), RgbImage::new(380, 500)];
        let pages = annotator.locate_fields(&images, &document).unwrap();

        assert!(pages[0].coordinates.contains_key("Name"));
        assert!(!pages[0].coordinates.contains_key("JobTitle"));
        assert!(pages[1].coordinates.contains_key("JobTitle"));
        assert!(!pages[1].coordinates.contains_key("Name"));
        assert_eq!(pages[1].dimensions, (380, 500));
    }
}
