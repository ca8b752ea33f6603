use thiserror::Error;

use crate::ocr::source::OcrError;
use crate::screen::screen_model::Rect;

#[derive(Debug, Error)]
pub enum VisionError {
    /// The screenshot (or template) could not be read or decoded.
    #[error("Failed to load image from {origin}: {source}")]
    ImageLoad {
        origin: String,
        #[source]
        source: image::ImageError,
    },

    #[error(
        "Template ({tw}x{th}) must not exceed the target image ({iw}x{ih})",
        tw = template.0,
        th = template.1,
        iw = target.0,
        ih = target.1
    )]
    InvalidTemplate {
        template: (u32, u32),
        target: (u32, u32),
    },

    #[error("Region {region:?} lies outside the {width}x{height} image")]
    InvalidRegion { region: Rect, width: u32, height: u32 },

    #[error("Invalid detection options: {0}")]
    InvalidOptions(String),

    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("OCR collaborator failed: {0}")]
    Ocr(#[from] OcrError),

    #[error("Template search was cancelled")]
    Cancelled,

    #[error("Template search timed out after {elapsed_ms} ms")]
    TimedOut { elapsed_ms: u128 },
}

pub type VisionResult<T> = Result<T, VisionError>;
