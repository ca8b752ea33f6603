use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::vision::options::DetectionOptions;

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "screen-analysis",
    version,
    about = "Detect and classify UI elements in screenshots"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: screen-analysis.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ElementFilter {
    All,
    TextFields,
    Buttons,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect and classify elements (no OCR, no hierarchy)
    Detect {
        /// Screenshot to analyze
        #[arg(long)]
        image: String,

        /// Keep only elements shaped like text fields or buttons
        #[arg(long, value_enum, default_value_t = ElementFilter::All)]
        filter: ElementFilter,

        /// Gaussian blur kernel size (odd)
        #[arg(long)]
        blur: Option<u32>,

        /// Minimum contour area in square pixels
        #[arg(long)]
        min_area: Option<f64>,

        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Full pass: detection, OCR merge, hierarchy and alignment groups
    Analyze {
        #[arg(long)]
        image: String,

        /// JSON file with OCR word tokens
        #[arg(long, conflicts_with = "ocr_endpoint")]
        ocr_tokens: Option<String>,

        /// OCR HTTP endpoint receiving the screenshot as PNG
        #[arg(long)]
        ocr_endpoint: Option<String>,

        /// Append per-stage trace events (JSON lines) to this file
        #[arg(long)]
        trace: Option<String>,

        #[arg(short, long)]
        output: Option<String>,
    },

    /// Find a template image inside a screenshot
    Match {
        #[arg(long)]
        image: String,

        #[arg(long)]
        template: String,

        /// Minimum correlation score (0..1)
        #[arg(long)]
        threshold: Option<f32>,

        #[arg(long)]
        max_results: Option<usize>,

        /// Abort the search after this many milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        #[arg(short, long)]
        output: Option<String>,
    },

    /// Draw detected elements onto the screenshot (PNG)
    Visualize {
        #[arg(long)]
        image: String,

        #[arg(short, long)]
        output: String,

        #[arg(long, default_value_t = 2)]
        thickness: u32,

        #[arg(long)]
        show_centers: bool,
    },

    /// Cut a rectangle out of the screenshot (PNG)
    Crop {
        #[arg(long)]
        image: String,

        #[arg(long)]
        x: i32,

        #[arg(long)]
        y: i32,

        #[arg(long)]
        width: u32,

        #[arg(long)]
        height: u32,

        #[arg(short, long)]
        output: String,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `screen-analysis.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub detection: DetectionOptions,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub trace: TraceConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrConfig {
    pub endpoint: Option<String>,
    pub tokens_file: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraceConfig {
    pub path: Option<String>,
}

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("screen-analysis.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}

// ============================================================================
// Config Builders (merge CLI args with config file)
// ============================================================================

/// Detection options from the config file with CLI overrides applied.
pub fn build_detection_options(
    config: &AppConfig,
    blur: Option<u32>,
    min_area: Option<f64>,
) -> DetectionOptions {
    let mut options = config.detection.clone();
    if blur.is_some() {
        options.blur_kernel_size = blur;
    }
    if let Some(area) = min_area {
        options.min_element_area = area;
    }
    options
}

/// Default `tracing` filter for a `-v` count; `RUST_LOG` takes precedence.
pub fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
