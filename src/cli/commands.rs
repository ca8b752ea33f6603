use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::cli::config::{AppConfig, ElementFilter, build_detection_options};
use crate::ocr::source::{HttpOcrSource, JsonOcrSource, OcrSource};
use crate::screen::screen_model::Rect;
use crate::trace::logger::TraceLogger;
use crate::vision::preprocess::ImageSource;
use crate::vision::visualize::VisualizeOptions;
use crate::{
    analyze_screen, crop_region, detect_buttons, detect_elements, detect_text_fields,
    find_elements_by_template, save_element_visualization,
};

// ============================================================================
// detect subcommand
// ============================================================================

pub fn cmd_detect(
    config: &AppConfig,
    image: &str,
    filter: ElementFilter,
    blur: Option<u32>,
    min_area: Option<f64>,
    output: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = build_detection_options(config, blur, min_area);
    let source = ImageSource::Path(Path::new(image));

    let elements = match filter {
        ElementFilter::All => detect_elements(source, &options)?,
        ElementFilter::TextFields => detect_text_fields(source, &options)?,
        ElementFilter::Buttons => detect_buttons(source, &options)?,
    };

    info!(count = elements.len(), ?filter, "detection finished");
    write_json(&elements, output)
}

// ============================================================================
// analyze subcommand
// ============================================================================

pub fn cmd_analyze(
    config: &AppConfig,
    image: &str,
    ocr_tokens: Option<&str>,
    ocr_endpoint: Option<&str>,
    trace: Option<&str>,
    output: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = build_detection_options(config, None, None);
    let ocr = build_ocr_source(
        ocr_tokens.or(config.ocr.tokens_file.as_deref()),
        ocr_endpoint.or(config.ocr.endpoint.as_deref()),
    );
    let tracer = trace.or(config.trace.path.as_deref()).map(TraceLogger::new);

    let analysis = analyze_screen(
        ImageSource::Path(Path::new(image)),
        ocr.as_deref(),
        &options,
        tracer.as_ref(),
    )?;

    info!(
        elements = analysis.elements.len(),
        tokens = analysis.text_tokens.len(),
        fingerprint = %analysis.fingerprint,
        "analysis finished"
    );
    write_json(&analysis, output)
}

// ============================================================================
// match subcommand
// ============================================================================

pub fn cmd_match(
    config: &AppConfig,
    image: &str,
    template: &str,
    threshold: Option<f32>,
    max_results: Option<usize>,
    timeout_ms: Option<u64>,
    output: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = config.detection.match_options();
    if let Some(t) = threshold {
        options.threshold = t;
    }
    if let Some(n) = max_results {
        options.max_results = n;
    }
    if let Some(ms) = timeout_ms {
        options = options.with_timeout(Duration::from_millis(ms));
    }

    let matches = find_elements_by_template(
        ImageSource::Path(Path::new(image)),
        ImageSource::Path(Path::new(template)),
        &options,
    )?;

    info!(count = matches.len(), "template search finished");
    write_json(&matches, output)
}

// ============================================================================
// visualize subcommand
// ============================================================================

pub fn cmd_visualize(
    config: &AppConfig,
    image: &str,
    output: &str,
    thickness: u32,
    show_centers: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = ImageSource::Path(Path::new(image));
    let elements = detect_elements(source, &config.detection)?;

    let options = VisualizeOptions {
        thickness,
        show_centers,
    };
    save_element_visualization(source, &elements, Path::new(output), &options)?;

    println!("Drew {} elements to {}", elements.len(), output);
    Ok(())
}

// ============================================================================
// crop subcommand
// ============================================================================

pub fn cmd_crop(image: &str, region: Rect, output: &str) -> Result<(), Box<dyn std::error::Error>> {
    let png = crop_region(ImageSource::Path(Path::new(image)), region)?;
    std::fs::write(output, png)?;

    println!("Cropped {}x{} region to {}", region.width, region.height, output);
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Pick the OCR collaborator: a token file wins over an HTTP endpoint.
/// Neither means the pass runs without text.
pub fn build_ocr_source(tokens_file: Option<&str>, endpoint: Option<&str>) -> Option<Box<dyn OcrSource>> {
    match (tokens_file, endpoint) {
        (Some(path), _) => Some(Box::new(JsonOcrSource::new(path))),
        (None, Some(url)) => Some(Box::new(HttpOcrSource::new(url))),
        (None, None) => None,
    }
}

fn write_json<T: Serialize>(value: &T, output: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{}", json),
    }
    Ok(())
}
