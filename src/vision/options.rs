//! Detection configuration.
//!
//! Every recognized option is an explicit field with a default, so a YAML
//! file may name any subset of them.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::vision::error::{VisionError, VisionResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionOptions {
    #[serde(default = "default_min_element_area")]
    pub min_element_area: f64,

    #[serde(default = "default_edge_threshold_low")]
    pub edge_threshold_low: f32,

    #[serde(default = "default_edge_threshold_high")]
    pub edge_threshold_high: f32,

    #[serde(default = "default_max_element_count")]
    pub max_element_count: usize,

    #[serde(default = "default_checkbox_max_side")]
    pub checkbox_max_side: u32,

    #[serde(default = "default_alignment_tolerance")]
    pub alignment_tolerance: u32,

    #[serde(default = "default_template_threshold")]
    pub template_threshold: f32,

    #[serde(default = "default_template_max_results")]
    pub template_max_results: usize,

    /// Gaussian kernel size (odd). `None` disables smoothing.
    #[serde(default)]
    pub blur_kernel_size: Option<u32>,

    /// Evaluate the checkbox rule before the small-square button rule.
    #[serde(default)]
    pub checkbox_priority: bool,

    /// Candidate count above which classification runs on the rayon pool.
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            min_element_area: default_min_element_area(),
            edge_threshold_low: default_edge_threshold_low(),
            edge_threshold_high: default_edge_threshold_high(),
            max_element_count: default_max_element_count(),
            checkbox_max_side: default_checkbox_max_side(),
            alignment_tolerance: default_alignment_tolerance(),
            template_threshold: default_template_threshold(),
            template_max_results: default_template_max_results(),
            blur_kernel_size: None,
            checkbox_priority: false,
            parallel_threshold: default_parallel_threshold(),
        }
    }
}

impl DetectionOptions {
    pub fn with_min_element_area(mut self, area: f64) -> Self {
        self.min_element_area = area;
        self
    }

    pub fn with_blur_kernel_size(mut self, size: Option<u32>) -> Self {
        self.blur_kernel_size = size;
        self
    }

    pub fn with_max_element_count(mut self, count: usize) -> Self {
        self.max_element_count = count;
        self
    }

    pub fn with_checkbox_priority(mut self, enabled: bool) -> Self {
        self.checkbox_priority = enabled;
        self
    }

    pub fn validate(&self) -> VisionResult<()> {
        if !(self.min_element_area >= 0.0) {
            return Err(VisionError::InvalidOptions(format!(
                "min_element_area must be non-negative, got {}",
                self.min_element_area
            )));
        }
        if self.edge_threshold_low < 0.0 || self.edge_threshold_low > self.edge_threshold_high {
            return Err(VisionError::InvalidOptions(format!(
                "edge thresholds must satisfy 0 <= low <= high, got low={} high={}",
                self.edge_threshold_low, self.edge_threshold_high
            )));
        }
        if let Some(k) = self.blur_kernel_size {
            if k == 0 || k % 2 == 0 {
                return Err(VisionError::InvalidOptions(format!(
                    "blur_kernel_size must be a positive odd number, got {}",
                    k
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.template_threshold) {
            return Err(VisionError::InvalidOptions(format!(
                "template_threshold must lie in [0, 1], got {}",
                self.template_threshold
            )));
        }
        Ok(())
    }

    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            threshold: self.template_threshold,
            max_results: self.template_max_results,
            timeout: None,
            cancel: None,
        }
    }
}

fn default_min_element_area() -> f64 { 500.0 }
fn default_edge_threshold_low() -> f32 { 50.0 }
fn default_edge_threshold_high() -> f32 { 150.0 }
fn default_max_element_count() -> usize { 1000 }
fn default_checkbox_max_side() -> u32 { 50 }
fn default_alignment_tolerance() -> u32 { 10 }
fn default_template_threshold() -> f32 { 0.8 }
fn default_template_max_results() -> usize { 5 }
fn default_parallel_threshold() -> usize { 64 }

/// Cooperative cancellation flag shared between a caller and a running
/// template search.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone)]
pub struct MatchOptions {
    pub threshold: f32,
    pub max_results: usize,
    pub timeout: Option<Duration>,
    pub cancel: Option<CancelToken>,
}

impl Default for MatchOptions {
    fn default() -> Self {
        DetectionOptions::default().match_options()
    }
}

impl MatchOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Scores are reported in [0, 1], so the threshold must lie there too.
    pub fn validate(&self) -> VisionResult<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(VisionError::InvalidOptions(format!(
                "match threshold must lie in [0, 1], got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}
