//! Debug rendering of detected elements.

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect as DrawRect;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::screen::screen_model::{Element, ElementKind};
use crate::vision::error::VisionResult;
use crate::vision::preprocess::{ImageSource, encode_png, load_image, save_image};

pub const BUTTON_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const TEXT_FIELD_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const CHECKBOX_COLOR: Rgb<u8> = Rgb([255, 0, 255]);
pub const SEPARATOR_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
pub const UNKNOWN_COLOR: Rgb<u8> = Rgb([150, 150, 150]);

const CENTER_RADIUS: i32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizeOptions {
    #[serde(default = "default_thickness")]
    pub thickness: u32,
    #[serde(default)]
    pub show_centers: bool,
}

impl Default for VisualizeOptions {
    fn default() -> Self {
        Self {
            thickness: default_thickness(),
            show_centers: false,
        }
    }
}

fn default_thickness() -> u32 { 2 }

pub fn kind_color(kind: ElementKind) -> Rgb<u8> {
    match kind {
        ElementKind::Button => BUTTON_COLOR,
        ElementKind::TextField => TEXT_FIELD_COLOR,
        ElementKind::Checkbox => CHECKBOX_COLOR,
        ElementKind::Separator => SEPARATOR_COLOR,
        ElementKind::Unknown | ElementKind::TemplateMatch => UNKNOWN_COLOR,
    }
}

/// Copy of `image` with a box drawn around every element. The outermost
/// outline covers exactly the element's `width` x `height` pixels, so it
/// never spills onto a neighbouring element; thicker outlines grow inward.
pub fn draw_elements(image: &DynamicImage, elements: &[Element], options: &VisualizeOptions) -> RgbImage {
    let mut canvas = image.to_rgb8();

    for el in elements {
        let color = kind_color(el.kind);

        for inset in 0..options.thickness.max(1) {
            let w = el.rect.width.saturating_sub(2 * inset);
            let h = el.rect.height.saturating_sub(2 * inset);
            if w == 0 || h == 0 {
                break;
            }
            let rect = DrawRect::at(el.rect.x + inset as i32, el.rect.y + inset as i32).of_size(w, h);
            draw_hollow_rect_mut(&mut canvas, rect, color);
        }

        if options.show_centers {
            draw_filled_circle_mut(&mut canvas, (el.center.x, el.center.y), CENTER_RADIUS, color);
        }
    }

    canvas
}

/// Render the elements onto the screenshot and return PNG bytes.
pub fn visualize_elements(
    source: ImageSource<'_>,
    elements: &[Element],
    options: &VisualizeOptions,
) -> VisionResult<Vec<u8>> {
    let image = load_image(source)?;
    let drawn = draw_elements(&image, elements, options);
    encode_png(&DynamicImage::ImageRgb8(drawn))
}

pub fn save_element_visualization(
    source: ImageSource<'_>,
    elements: &[Element],
    path: &Path,
    options: &VisualizeOptions,
) -> VisionResult<()> {
    let image = load_image(source)?;
    let drawn = draw_elements(&image, elements, options);
    save_image(&DynamicImage::ImageRgb8(drawn), path)
}
