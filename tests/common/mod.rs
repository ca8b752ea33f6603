#![allow(dead_code)]

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect as DrawRect;

use screen_analysis::screen::screen_model::{Element, ElementKind, Point, Rect, TextBox, TextToken};
use screen_analysis::state::identity::{ElementId, PassId};
use screen_analysis::vision::contours::Candidate;
use screen_analysis::vision::preprocess::encode_png;

pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
pub const INK: Rgb<u8> = Rgb([20, 20, 20]);

/// White screenshot with a dark filled box per rectangle.
pub fn screen_with_boxes(width: u32, height: u32, boxes: &[(i32, i32, u32, u32)]) -> DynamicImage {
    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);
    for &(x, y, w, h) in boxes {
        draw_filled_rect_mut(&mut img, DrawRect::at(x, y).of_size(w, h), INK);
    }
    DynamicImage::ImageRgb8(img)
}

pub fn png_bytes(image: &DynamicImage) -> Vec<u8> {
    encode_png(image).unwrap()
}

/// Grayscale image with a deterministic, non-repeating texture.
pub fn textured(width: u32, height: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        let v = (x.wrapping_mul(73) ^ y.wrapping_mul(151)).wrapping_add(x * y) % 251;
        Luma([v as u8])
    })
}

/// Closed boundary of an axis-aligned rectangle spanning `w`x`h` pixels,
/// one point per boundary pixel.
pub fn rect_contour(x: i32, y: i32, w: u32, h: u32) -> Vec<Point> {
    let (x1, y1) = (x + w as i32 - 1, y + h as i32 - 1);
    let mut pts = Vec::new();
    for px in x..x1 {
        pts.push(Point::new(px, y));
    }
    for py in y..y1 {
        pts.push(Point::new(x1, py));
    }
    for px in (x + 1..=x1).rev() {
        pts.push(Point::new(px, y1));
    }
    for py in (y + 1..=y1).rev() {
        pts.push(Point::new(x, py));
    }
    pts
}

/// Candidate whose bounding rect is exactly `w`x`h` and whose area is the
/// rectangle area, as the boundary examples describe them.
pub fn rect_candidate(w: u32, h: u32) -> Candidate {
    let contour = rect_contour(10, 10, w, h);
    Candidate {
        rect: Rect::new(10, 10, w, h),
        area: (w * h) as f64,
        contour,
    }
}

pub fn id(ordinal: u32) -> ElementId {
    ElementId {
        pass: PassId(0),
        ordinal,
    }
}

pub fn element(ordinal: u32, kind: ElementKind, x: i32, y: i32, w: u32, h: u32) -> Element {
    Element::new(id(ordinal), kind, Rect::new(x, y, w, h), (w * h) as f64)
}

pub fn token(text: &str, confidence: f32, x0: f64, y0: f64, x1: f64, y1: f64) -> TextToken {
    TextToken {
        text: text.to_string(),
        confidence,
        bbox: TextBox { x0, y0, x1, y1 },
    }
}

/// Rect equality within `tol` pixels on every field.
pub fn near(a: &Rect, b: &Rect, tol: i64) -> bool {
    (a.x as i64 - b.x as i64).abs() <= tol
        && (a.y as i64 - b.y as i64).abs() <= tol
        && (a.width as i64 - b.width as i64).abs() <= tol
        && (a.height as i64 - b.height as i64).abs() <= tol
}
