use std::collections::HashMap;
use std::io::Cursor;

use image::{ImageFormat, RgbImage};
use log::debug;
use tesseract::Tesseract;

use crate::models::NormalizedBox;
use crate::utils::AnnotateError;

/// One OCR-reported text region: a quadrilateral in pixel coordinates and
/// the recognized text. Corner order is `[top-left, top-right, bottom-right,
/// bottom-left]`; the quad may be skewed.
#[derive(Debug, Clone)]
pub struct TextDetection {
    pub quad: [[f32; 2]; 4],
    pub text: String,
}

/// The text-detection capability the locator wraps.
///
/// Detection is the dominant cost of a render pass; implementations are
/// invoked at most once per page and must not be shared across concurrently
/// processed documents.
pub trait TextDetector {
    fn detect(&mut self, image: &RgbImage) -> Result<Vec<TextDetection>, AnnotateError>;
}

/// Case-normalized lookup from detected text to its normalized box.
///
/// Every detected phrase is stored under its full lowercase text, and every
/// whitespace token of the phrase longer than 2 characters is stored under
/// the phrase's box as well, enabling partial-word matches. Duplicate keys
/// are not aggregated; the later detection wins.
#[derive(Debug, Clone, Default)]
pub struct TextLocations {
    map: HashMap<String, NormalizedBox>,
}

impl TextLocations {
    pub fn from_detections(detections: &[TextDetection], width: u32, height: u32) -> Self {
        let mut locations = TextLocations::default();
        for detection in detections {
            let text = detection.text.to_lowercase();
            let bbox = NormalizedBox::from_quad(&detection.quad, width, height);
            locations.insert(&text, bbox);
        }
        debug!("located {} text entries", locations.len());
        locations
    }

    pub fn insert(&mut self, text: &str, bbox: NormalizedBox) {
        self.map.insert(text.to_string(), bbox);
        for word in text.split_whitespace() {
            if word.chars().count() > 2 {
                self.map.insert(word.to_string(), bbox);
            }
        }
    }

    pub fn get(&self, text: &str) -> Option<NormalizedBox> {
        self.map.get(text).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, NormalizedBox)> {
        self.map.iter().map(|(text, bbox)| (text.as_str(), *bbox))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Production text detector backed by the Tesseract engine.
///
/// Pages are handed over as in-memory PNG and read back as word-level TSV,
/// with words regrouped into line-level phrases.
pub struct TesseractDetector {
    language: String,
}

impl TesseractDetector {
    pub fn new(language: &str) -> Self {
        TesseractDetector {
            language: language.to_string(),
        }
    }
}

impl Default for TesseractDetector {
    fn default() -> Self {
        TesseractDetector::new("eng")
    }
}

impl TextDetector for TesseractDetector {
    fn detect(&mut self, image: &RgbImage) -> Result<Vec<TextDetection>, AnnotateError> {
        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(AnnotateError::ImageEncode)?;

        let mut engine = Tesseract::new(None, Some(&self.language))
            .map_err(|e| AnnotateError::Ocr(format!("Tesseract init error: {e}")))?
            .set_image_from_mem(&png)
            .map_err(|e| AnnotateError::Ocr(format!("Tesseract set image error: {e}")))?
            .recognize()
            .map_err(|e| AnnotateError::Ocr(format!("Tesseract error: {e}")))?;

        let tsv = engine
            .get_tsv_text(0)
            .map_err(|e| AnnotateError::Ocr(format!("Tesseract error: {e}")))?;

        Ok(parse_tsv(&tsv))
    }
}

#[derive(Debug)]
struct TsvWord {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
    text: String,
}

/// Parse Tesseract TSV output into line-level detections.
///
/// TSV columns: level, page, block, par, line, word, left, top, width,
/// height, conf, text. Word rows (level 5) belonging to the same
/// (page, block, par, line) tuple are joined into one phrase whose box is
/// the union of the word boxes.
fn parse_tsv(tsv: &str) -> Vec<TextDetection> {
    let mut detections = Vec::new();
    let mut current_key: Option<(u32, u32, u32, u32)> = None;
    let mut current_words: Vec<TsvWord> = Vec::new();

    for row in tsv.lines() {
        let columns: Vec<&str> = row.split('\t').collect();
        if columns.len() < 12 {
            continue;
        }
        let Ok(level) = columns[0].parse::<u32>() else {
            continue; // header row
        };
        if level != 5 {
            continue;
        }
        let text = columns[11].trim();
        let conf = columns[10].parse::<f32>().unwrap_or(-1.0);
        if text.is_empty() || conf < 0.0 {
            continue;
        }
        let (Ok(page), Ok(block), Ok(par), Ok(line)) = (
            columns[1].parse::<u32>(),
            columns[2].parse::<u32>(),
            columns[3].parse::<u32>(),
            columns[4].parse::<u32>(),
        ) else {
            continue;
        };
        let (Ok(left), Ok(top), Ok(width), Ok(height)) = (
            columns[6].parse::<f32>(),
            columns[7].parse::<f32>(),
            columns[8].parse::<f32>(),
            columns[9].parse::<f32>(),
        ) else {
            continue;
        };

        let key = (page, block, par, line);
        if current_key != Some(key) {
            if let Some(detection) = flush_line(&mut current_words) {
                detections.push(detection);
            }
            current_key = Some(key);
        }
        current_words.push(TsvWord {
            left,
            top,
            right: left + width,
            bottom: top + height,
            text: text.to_string(),
        });
    }
    if let Some(detection) = flush_line(&mut current_words) {
        detections.push(detection);
    }
    detections
}

fn flush_line(words: &mut Vec<TsvWord>) -> Option<TextDetection> {
    if words.is_empty() {
        return None;
    }
    let x1 = words.iter().map(|w| w.left).fold(f32::INFINITY, f32::min);
    let y1 = words.iter().map(|w| w.top).fold(f32::INFINITY, f32::min);
    let x2 = words.iter().map(|w| w.right).fold(f32::NEG_INFINITY, f32::max);
    let y2 = words
        .iter()
        .map(|w| w.bottom)
        .fold(f32::NEG_INFINITY, f32::max);
    let text = words
        .iter()
        .map(|w| w.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    words.clear();
    Some(TextDetection {
        quad: [[x1, y1], [x2, y1], [x2, y2], [x1, y2]],
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_quad(x1: f32, y1: f32, x2: f32, y2: f32) -> [[f32; 2]; 4] {
        [[x1, y1], [x2, y1], [x2, y2], [x1, y2]]
    }

    #[test]
    fn test_locations_register_phrase_and_subwords() {
        let detections = vec![TextDetection {
            quad: rect_quad(0.0, 160.0, 180.0, 190.0),
            text: "Software Engineer".to_string(),
        }];
        let locations = TextLocations::from_detections(&detections, 800, 600);

        let phrase = locations.get("software engineer").expect("phrase");
        assert_eq!(locations.get("software"), Some(phrase));
        assert_eq!(locations.get("engineer"), Some(phrase));
        assert_eq!(locations.len(), 3);
    }

    #[test]
    fn test_locations_skip_short_subwords() {
        let detections = vec![TextDetection {
            quad: rect_quad(0.0, 0.0, 100.0, 30.0),
            text: "New York NY".to_string(),
        }];
        let locations = TextLocations::from_detections(&detections, 800, 600);
        assert!(locations.get("new york ny").is_some());
        assert!(locations.get("new").is_some());
        assert!(locations.get("york").is_some());
        // Two-character tokens are not registered individually.
        assert!(locations.get("ny").is_none());
    }

    #[test]
    fn test_locations_last_write_wins() {
        let detections = vec![
            TextDetection {
                quad: rect_quad(0.0, 0.0, 100.0, 30.0),
                text: "Engineer".to_string(),
            },
            TextDetection {
                quad: rect_quad(0.0, 300.0, 100.0, 330.0),
                text: "engineer".to_string(),
            },
        ];
        let locations = TextLocations::from_detections(&detections, 800, 600);
        assert_eq!(locations.len(), 1);
        let bbox = locations.get("engineer").unwrap();
        assert!(bbox.y1 > 0.4, "later detection should overwrite the earlier one");
    }

    #[test]
    fn test_parse_tsv_groups_words_into_lines() {
        let tsv = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext\n\
                   1\t1\t0\t0\t0\t0\t0\t0\t800\t600\t-1\t\n\
                   5\t1\t1\t1\t1\t1\t10\t20\t60\t20\t96.1\tJohn\n\
                   5\t1\t1\t1\t1\t2\t80\t22\t50\t18\t95.0\tDoe\n\
                   5\t1\t1\t1\t2\t1\t10\t60\t200\t20\t92.4\tjohn.doe@example.com\n";
        let detections = parse_tsv(tsv);
        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].text, "John Doe");
        assert_eq!(detections[0].quad[0], [10.0, 20.0]);
        assert_eq!(detections[0].quad[2], [130.0, 40.0]);
        assert_eq!(detections[1].text, "john.doe@example.com");
    }

    #[test]
    fn test_parse_tsv_skips_unrecognized_rows() {
        let tsv = "5\t1\t1\t1\t1\t1\t10\t20\t60\t20\t-1\t \n\
                   5\t1\t1\t1\t1\t2\t80\t22\t50\t18\t90.0\tDoe\n";
        let detections = parse_tsv(tsv);
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].text, "Doe");
    }
}
