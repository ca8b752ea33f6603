use serde::Serialize;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::state::identity::PassId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Preprocess,
    Contours,
    Classify,
    Ocr,
    TextMerge,
    Hierarchy,
    Alignment,
}

/// One line of the per-pass stage trace.
#[derive(Debug, Serialize)]
pub struct StageEvent {
    pub timestamp_ms: u128,
    pub pass_id: u64,
    pub stage: Stage,

    pub items: usize,
    pub duration_ms: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl StageEvent {
    pub fn now(pass: PassId, stage: Stage) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            pass_id: pass.0,
            stage,
            items: 0,
            duration_ms: 0.0,
            detail: None,
        }
    }

    pub fn with_items(mut self, items: usize) -> Self {
        self.items = items;
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = duration.as_secs_f64() * 1000.0;
        self
    }

    pub fn with_detail(mut self, detail: impl ToString) -> Self {
        self.detail = Some(detail.to_string());
        self
    }
}
