//! Drawing of field boxes and labels onto page images.

use std::collections::HashMap;

use ab_glyph::FontVec;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

use crate::matching::FieldKind;
use crate::models::NormalizedBox;

/// Appearance of the drawn annotations.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Rectangle outline thickness in pixels.
    pub box_thickness: i32,
    /// Label text height in pixels.
    pub text_scale: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            box_thickness: 2,
            text_scale: 16.0,
        }
    }
}

/// Display color for a field, by its base kind.
pub fn field_color(kind: Option<FieldKind>) -> Rgb<u8> {
    match kind {
        Some(FieldKind::Name) => Rgb([0, 0, 255]),      // Blue
        Some(FieldKind::Email) => Rgb([255, 165, 0]),   // Orange
        Some(FieldKind::Phone) => Rgb([0, 255, 0]),     // Green
        Some(FieldKind::Location) => Rgb([255, 0, 0]),  // Red
        Some(FieldKind::JobTitle) => Rgb([0, 128, 128]), // Teal
        None => Rgb([75, 0, 130]),                      // Indigo default
    }
}

/// Draw one rectangle and one label per located field onto a copy of the
/// page image. Boxes are denormalized against this image's own dimensions,
/// which may differ from the page they were detected on.
pub fn annotate_image(
    image: &RgbImage,
    coordinates: &HashMap<String, NormalizedBox>,
    settings: &RenderSettings,
    font: Option<&FontVec>,
) -> RgbImage {
    let mut output = image.clone();
    for (field, bbox) in coordinates {
        draw_annotation(&mut output, field, *bbox, settings, font);
    }
    output
}

fn draw_annotation(
    image: &mut RgbImage,
    field: &str,
    bbox: NormalizedBox,
    settings: &RenderSettings,
    font: Option<&FontVec>,
) {
    let (width, height) = (image.width() as i32, image.height() as i32);
    let (x1, y1, x2, y2) = bbox.to_pixels(image.width(), image.height());
    let color = field_color(FieldKind::from_field_name(field));

    let box_width = (x2 - x1).max(1) as u32;
    let box_height = (y2 - y1).max(1) as u32;
    for t in 0..settings.box_thickness {
        let rect = Rect::at(x1 - t, y1 - t).of_size(box_width + 2 * t as u32, box_height + 2 * t as u32);
        if rect_in_bounds(&rect, width, height) {
            draw_hollow_rect_mut(image, rect, color);
        }
    }

    if let Some(font) = font {
        // Keep the label on-canvas: above the box unless the box sits close
        // to the top edge, in which case it moves below.
        let label_y = if y1 > 30 {
            y1 - 10 - settings.text_scale as i32
        } else {
            y2 + 20
        };
        let label_x = x1.max(0);
        let label_y = label_y.clamp(0, (height - 1).max(0));
        draw_text_mut(
            image,
            color,
            label_x,
            label_y,
            settings.text_scale,
            font,
            field,
        );
    }
}

fn rect_in_bounds(rect: &Rect, width: i32, height: i32) -> bool {
    rect.left() >= 0
        && rect.top() >= 0
        && rect.left() + rect.width() as i32 <= width
        && rect.top() + rect.height() as i32 <= height
}

/// Load a TrueType font for label rendering from common system locations.
/// Annotations degrade to unlabeled boxes when none is available.
pub fn load_font() -> Option<FontVec> {
    let font_paths = [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ];

    for path in &font_paths {
        if let Ok(data) = std::fs::read(path) {
            if let Ok(font) = FontVec::try_from_vec(data) {
                return Some(font);
            }
        }
    }
    None
}
