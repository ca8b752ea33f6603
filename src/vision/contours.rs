use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};
use tracing::{debug, warn};

use crate::screen::screen_model::{Point, Rect};
use crate::vision::geometry::{arc_length, polygon_area, simplify_chain};
use crate::vision::options::DetectionOptions;

/// A closed outer boundary that survived area filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub rect: Rect,
    pub area: f64,
    pub contour: Vec<Point>,
}

impl Candidate {
    pub fn from_contour(contour: Vec<Point>) -> Option<Self> {
        let rect = Rect::bounding(&contour)?;
        let area = polygon_area(&contour);
        Some(Self { rect, area, contour })
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.rect.aspect_ratio()
    }

    pub fn perimeter(&self) -> f64 {
        arc_length(&self.contour, true)
    }
}

/// Canny edge map of the intensity image.
pub fn detect_edges(gray: &GrayImage, low: f32, high: f32) -> GrayImage {
    imageproc::edges::canny(gray, low, high)
}

/// Outermost boundaries of the edge map, simplified to run end points.
/// Holes, and anything nested inside a hole, are skipped.
pub fn external_contours(edges: &GrayImage) -> Vec<Vec<Point>> {
    find_contours::<i32>(edges)
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .map(|c| {
            let points: Vec<Point> = c.points.into_iter().map(Point::from).collect();
            simplify_chain(&points)
        })
        .collect()
}

/// Result of one contour extraction: the kept candidates plus the counts
/// needed to report what was dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub candidates: Vec<Candidate>,
    pub traced: usize,
    pub truncated: bool,
}

impl Extraction {
    /// One-line summary for the stage trace.
    pub fn summary(&self, limit: usize) -> String {
        if self.truncated {
            format!("traced {} contours, truncated at {}", self.traced, limit)
        } else {
            format!("traced {} contours", self.traced)
        }
    }
}

/// Edge detection, external contour extraction and area filtering.
///
/// Candidates keep the order the contours were traced in; when more than
/// `max_element_count` pass the area filter only the first ones are kept.
pub fn extract_candidates(gray: &GrayImage, options: &DetectionOptions) -> Vec<Candidate> {
    extract(gray, options).candidates
}

/// [`extract_candidates`], also reporting how many contours were traced and
/// whether the count cap dropped any.
pub fn extract(gray: &GrayImage, options: &DetectionOptions) -> Extraction {
    let edges = detect_edges(gray, options.edge_threshold_low, options.edge_threshold_high);
    let contours = external_contours(&edges);
    let traced = contours.len();

    let mut passing = contours
        .into_iter()
        .filter_map(Candidate::from_contour)
        .filter(|c| c.area >= options.min_element_area)
        .peekable();

    let mut candidates = Vec::new();
    while candidates.len() < options.max_element_count {
        match passing.next() {
            Some(c) => candidates.push(c),
            None => break,
        }
    }

    let truncated = passing.peek().is_some();
    if truncated {
        warn!(
            limit = options.max_element_count,
            "candidate list truncated at max_element_count"
        );
    }

    debug!(traced, kept = candidates.len(), "extracted contour candidates");
    Extraction {
        candidates,
        traced,
        truncated,
    }
}
