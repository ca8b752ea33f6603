use image::DynamicImage;
use serde::Deserialize;
use std::io::Cursor;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

use crate::screen::screen_model::{TextBox, TextToken};

// ============================================================================
// OcrSource trait: the text recognition collaborator
// ============================================================================

/// Produces word tokens for a screenshot. Recognition itself happens outside
/// this crate; implementations only fetch or replay its output.
pub trait OcrSource: Send + Sync {
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<TextToken>, OcrError>;
}

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Failed to read OCR tokens from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("OCR request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("OCR service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed OCR payload: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to encode screenshot for OCR: {0}")]
    Encode(#[from] image::ImageError),
}

// ============================================================================
// In-memory tokens
// ============================================================================

/// Tokens recognized ahead of time (or fabricated by tests).
#[derive(Debug, Clone, Default)]
pub struct StaticOcrSource {
    tokens: Vec<TextToken>,
}

impl StaticOcrSource {
    pub fn new(tokens: Vec<TextToken>) -> Self {
        Self { tokens }
    }
}

impl OcrSource for StaticOcrSource {
    fn recognize(&self, _image: &DynamicImage) -> Result<Vec<TextToken>, OcrError> {
        Ok(self.tokens.clone())
    }
}

// ============================================================================
// Token file
// ============================================================================

/// Word-level output saved by an OCR engine: either a bare token array or an
/// object with a `words` array, each word carrying `text`, `confidence` and
/// `bbox {x0, y0, x1, y1}`.
#[derive(Debug, Clone)]
pub struct JsonOcrSource {
    path: PathBuf,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TokenFile {
    Words { words: Vec<TextToken> },
    List(Vec<TextToken>),
}

impl JsonOcrSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

pub fn parse_token_json(content: &str) -> Result<Vec<TextToken>, OcrError> {
    let parsed: TokenFile = serde_json::from_str(content)?;
    Ok(match parsed {
        TokenFile::Words { words } => words,
        TokenFile::List(list) => list,
    })
}

impl OcrSource for JsonOcrSource {
    fn recognize(&self, _image: &DynamicImage) -> Result<Vec<TextToken>, OcrError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| OcrError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        let tokens = parse_token_json(&content)?;
        debug!(path = %self.path.display(), tokens = tokens.len(), "loaded OCR tokens");
        Ok(tokens)
    }
}

// ============================================================================
// HTTP OCR service
// ============================================================================

/// Posts the PNG-encoded screenshot to an OCR endpoint and reads back its
/// detected text regions.
pub struct HttpOcrSource {
    endpoint: String,
    client: reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
struct OcrServiceResponse {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    regions: Vec<OcrServiceRegion>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OcrServiceRegion {
    text: String,
    /// 0..=1
    confidence: f32,
    bounding_box: OcrServiceBox,
}

#[derive(Debug, Deserialize)]
struct OcrServiceBox {
    x_min: f64,
    y_min: f64,
    x_max: f64,
    y_max: f64,
}

fn default_success() -> bool { true }

impl HttpOcrSource {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }
}

/// Convert an OCR service response body into tokens (confidence rescaled to
/// 0..=100).
pub fn parse_service_response(body: &str) -> Result<Vec<TextToken>, OcrError> {
    let response: OcrServiceResponse = serde_json::from_str(body)?;

    if !response.success {
        return Err(OcrError::Status {
            status: 200,
            body: response.error.unwrap_or_else(|| "service reported failure".to_string()),
        });
    }

    Ok(response
        .regions
        .into_iter()
        .map(|r| TextToken {
            text: r.text,
            confidence: (r.confidence * 100.0).clamp(0.0, 100.0),
            bbox: TextBox {
                x0: r.bounding_box.x_min,
                y0: r.bounding_box.y_min,
                x1: r.bounding_box.x_max,
                y1: r.bounding_box.y_max,
            },
        })
        .collect())
}

impl OcrSource for HttpOcrSource {
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<TextToken>, OcrError> {
        let mut png = Cursor::new(Vec::new());
        image.write_to(&mut png, image::ImageFormat::Png)?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "image/png")
            .body(png.into_inner())
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(OcrError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let tokens = parse_service_response(&body)?;
        debug!(endpoint = %self.endpoint, tokens = tokens.len(), "received OCR tokens");
        Ok(tokens)
    }
}
