//! Template search over a screenshot.
//!
//! Scores are zero-mean normalized cross-correlation: 1.0 for an exact
//! (brightness/contrast-shifted) copy, 0.0 where the window is flat.

use image::GrayImage;
use rayon::prelude::*;
use std::time::Instant;
use tracing::debug;

use crate::screen::screen_model::TemplateMatch;
use crate::vision::error::{VisionError, VisionResult};
use crate::vision::options::MatchOptions;

/// Summed-area tables of pixel values and squared pixel values, one row and
/// column larger than the image.
struct WindowSums {
    stride: usize,
    sum: Vec<u64>,
    sum_sq: Vec<u64>,
}

impl WindowSums {
    fn new(image: &GrayImage) -> Self {
        let (w, h) = (image.width() as usize, image.height() as usize);
        let stride = w + 1;
        let mut sum = vec![0u64; stride * (h + 1)];
        let mut sum_sq = vec![0u64; stride * (h + 1)];

        for y in 0..h {
            let mut row = 0u64;
            let mut row_sq = 0u64;
            for x in 0..w {
                let v = image.get_pixel(x as u32, y as u32)[0] as u64;
                row += v;
                row_sq += v * v;
                let idx = (y + 1) * stride + x + 1;
                sum[idx] = sum[idx - stride] + row;
                sum_sq[idx] = sum_sq[idx - stride] + row_sq;
            }
        }

        Self { stride, sum, sum_sq }
    }

    /// (sum, sum of squares) over the `w`x`h` window whose top-left is (x, y).
    fn window(&self, x: usize, y: usize, w: usize, h: usize) -> (f64, f64) {
        let at = |table: &[u64], xx: usize, yy: usize| table[yy * self.stride + xx];
        let rect = |table: &[u64]| {
            (at(table, x + w, y + h) + at(table, x, y)) as f64
                - (at(table, x + w, y) + at(table, x, y + h)) as f64
        };
        (rect(&self.sum), rect(&self.sum_sq))
    }
}

/// Zero-mean template pixels plus their energy.
struct CenteredTemplate {
    width: usize,
    height: usize,
    values: Vec<f64>,
    energy: f64,
}

impl CenteredTemplate {
    fn new(template: &GrayImage) -> Self {
        let values: Vec<f64> = template.pixels().map(|p| p[0] as f64).collect();
        let mean = values.iter().sum::<f64>() / values.len().max(1) as f64;
        let values: Vec<f64> = values.into_iter().map(|v| v - mean).collect();
        let energy = values.iter().map(|v| v * v).sum();

        Self {
            width: template.width() as usize,
            height: template.height() as usize,
            values,
            energy,
        }
    }
}

/// Keep scores strictly above `threshold`, best first, at most `max_results`.
/// Equal scores keep scan order (row-major).
pub fn rank_matches(
    mut candidates: Vec<TemplateMatch>,
    threshold: f32,
    max_results: usize,
) -> Vec<TemplateMatch> {
    candidates.retain(|m| m.confidence > threshold);
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    candidates.truncate(max_results);
    candidates
}

pub fn check_template_fits(image: &GrayImage, template: &GrayImage) -> VisionResult<()> {
    let fits = template.width() > 0
        && template.height() > 0
        && template.width() <= image.width()
        && template.height() <= image.height();

    if fits {
        Ok(())
    } else {
        Err(VisionError::InvalidTemplate {
            template: template.dimensions(),
            target: image.dimensions(),
        })
    }
}

/// Score every placement of `template` inside `image` and return the best
/// ones above the threshold. Overlapping placements around one location are
/// all reported.
///
/// Rows are scored on the rayon pool; the cancel token and the timeout are
/// checked before each row.
pub fn match_template(
    image: &GrayImage,
    template: &GrayImage,
    options: &MatchOptions,
) -> VisionResult<Vec<TemplateMatch>> {
    options.validate()?;
    check_template_fits(image, template)?;

    let started = Instant::now();
    let sums = WindowSums::new(image);
    let tpl = CenteredTemplate::new(template);
    let n = (tpl.width * tpl.height) as f64;

    let cols = image.width() as usize - tpl.width + 1;
    let rows = image.height() as usize - tpl.height + 1;

    let check_budget = || -> VisionResult<()> {
        if let Some(token) = &options.cancel {
            if token.is_cancelled() {
                return Err(VisionError::Cancelled);
            }
        }
        if let Some(limit) = options.timeout {
            let elapsed = started.elapsed();
            if elapsed > limit {
                return Err(VisionError::TimedOut {
                    elapsed_ms: elapsed.as_millis(),
                });
            }
        }
        Ok(())
    };

    let per_row: Vec<Vec<TemplateMatch>> = (0..rows)
        .into_par_iter()
        .map(|y| -> VisionResult<Vec<TemplateMatch>> {
            check_budget()?;

            let mut found = Vec::new();
            for x in 0..cols {
                let score = score_at(image, &sums, &tpl, n, x, y);
                if score > options.threshold {
                    found.push(TemplateMatch {
                        x: x as u32,
                        y: y as u32,
                        width: tpl.width as u32,
                        height: tpl.height as u32,
                        confidence: score,
                    });
                }
            }
            Ok(found)
        })
        .collect::<VisionResult<_>>()?;

    let candidates: Vec<TemplateMatch> = per_row.into_iter().flatten().collect();
    debug!(
        above_threshold = candidates.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "template search finished"
    );

    Ok(rank_matches(candidates, options.threshold, options.max_results))
}

fn score_at(
    image: &GrayImage,
    sums: &WindowSums,
    tpl: &CenteredTemplate,
    n: f64,
    x: usize,
    y: usize,
) -> f32 {
    let (sum, sum_sq) = sums.window(x, y, tpl.width, tpl.height);
    let window_energy = sum_sq - sum * sum / n;
    let denom = (window_energy * tpl.energy).sqrt();
    if !(denom > f64::EPSILON) {
        return 0.0;
    }

    let mut cross = 0.0;
    for ty in 0..tpl.height {
        let row = &tpl.values[ty * tpl.width..(ty + 1) * tpl.width];
        for (tx, t) in row.iter().enumerate() {
            let v = image.get_pixel((x + tx) as u32, (y + ty) as u32)[0] as f64;
            cross += v * t;
        }
    }

    (cross / denom).clamp(-1.0, 1.0) as f32
}
