use serde::{Deserialize, Serialize};
use std::fmt;

use crate::state::identity::ElementId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<imageproc::point::Point<i32>> for Point {
    fn from(p: imageproc::point::Point<i32>) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// Axis-aligned bounding rectangle in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Smallest rectangle covering every point, counting pixels inclusively
    /// (a single point yields a 1x1 rectangle).
    pub fn bounding(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);

        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        Some(Self {
            x: min_x,
            y: min_y,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        })
    }

    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Width divided by height. Degenerate zero-height rectangles report infinity.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return f64::INFINITY;
        }
        self.width as f64 / self.height as f64
    }

    /// Center rounded half-up, matching how screen coordinates are reported
    /// to automation callers.
    pub fn center(&self) -> Point {
        Point {
            x: self.x + ((self.width + 1) / 2) as i32,
            y: self.y + ((self.height + 1) / 2) as i32,
        }
    }

    /// Inclusive on all four edges.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x as f64 && x <= self.right() as f64 && y >= self.y as f64 && y <= self.bottom() as f64
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Button,
    TextField,
    Checkbox,
    Separator,
    Unknown,
    TemplateMatch,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Button => "button",
            ElementKind::TextField => "text_field",
            ElementKind::Checkbox => "checkbox",
            ElementKind::Separator => "separator",
            ElementKind::Unknown => "unknown",
            ElementKind::TemplateMatch => "template_match",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A UI element detected during one analysis pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
    pub rect: Rect,
    pub area: f64,
    pub aspect_ratio: f64,
    pub center: Point,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<ElementId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementId>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contour: Vec<Point>,
}

impl Element {
    pub fn new(id: ElementId, kind: ElementKind, rect: Rect, area: f64) -> Self {
        Self {
            id,
            kind,
            rect,
            area,
            aspect_ratio: rect.aspect_ratio(),
            center: rect.center(),
            text: None,
            confidence: None,
            parent: None,
            children: Vec::new(),
            contour: Vec::new(),
        }
    }

    pub fn with_contour(mut self, contour: Vec<Point>) -> Self {
        self.contour = contour;
        self
    }
}

/// Bounding box as reported by word-level OCR engines (corner coordinates).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl TextBox {
    pub fn center(&self) -> (f64, f64) {
        (
            self.x0 + (self.x1 - self.x0) / 2.0,
            self.y0 + (self.y1 - self.y0) / 2.0,
        )
    }
}

/// One recognized word handed over by the OCR collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextToken {
    pub text: String,
    /// 0..=100
    pub confidence: f32,
    #[serde(alias = "box")]
    pub bbox: TextBox,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemplateMatch {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// 0..=1
    pub confidence: f32,
}

impl TemplateMatch {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x as i32, self.y as i32, self.width, self.height)
    }

    pub fn center(&self) -> Point {
        self.rect().center()
    }

    /// Promote the match to an element so it can be drawn or merged with
    /// detected elements.
    pub fn to_element(&self, id: ElementId) -> Element {
        let rect = self.rect();
        let mut element = Element::new(id, ElementKind::TemplateMatch, rect, rect.area() as f64);
        element.confidence = Some(self.confidence);
        element
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Members share a row (anchored on center Y).
    Horizontal,
    /// Members share a column (anchored on center X).
    Vertical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentGroup {
    pub axis: Axis,
    pub anchor: i32,
    pub members: Vec<ElementId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignmentGroups {
    pub horizontal: Vec<AlignmentGroup>,
    pub vertical: Vec<AlignmentGroup>,
}
