use image::{DynamicImage, GrayImage};
use std::time::Instant;
use tracing::{debug, info};

use crate::ocr::source::OcrSource;
use crate::screen::{
    alignment::group_aligned,
    classifier::ElementClassifier,
    hierarchy::build_hierarchy,
    screen_model::{Element, TextToken},
    text_merge::merge_text,
};
use crate::state::identity::{ElementSequence, PassId, image_fingerprint};
use crate::state::state_model::ScreenAnalysis;
use crate::trace::{
    logger::TraceLogger,
    trace::{Stage, StageEvent},
};
use crate::vision::{
    contours::{extract, extract_candidates},
    error::VisionResult,
    options::DetectionOptions,
    preprocess::to_intensity,
};

/// Contours through classification on an already converted intensity image.
pub fn detect_in_gray(
    gray: &GrayImage,
    options: &DetectionOptions,
    sequence: &mut ElementSequence,
) -> Vec<Element> {
    let candidates = extract_candidates(gray, options);
    ElementClassifier::for_options(options).classify_all(&candidates, options, sequence)
}

/// Detection for a decoded screenshot, under a fresh pass.
pub fn detect_in_image(image: &DynamicImage, options: &DetectionOptions) -> VisionResult<Vec<Element>> {
    options.validate()?;
    let gray = to_intensity(image, options.blur_kernel_size);
    let mut sequence = ElementSequence::new(PassId::next());
    Ok(detect_in_gray(&gray, options, &mut sequence))
}

/// Full analysis pass: detection and OCR run side by side, then text merge,
/// hierarchy and alignment run in order on the combined result.
pub fn analyze_image(
    image: &DynamicImage,
    ocr: Option<&dyn OcrSource>,
    options: &DetectionOptions,
    tracer: Option<&TraceLogger>,
) -> VisionResult<ScreenAnalysis> {
    options.validate()?;

    let pass = PassId::next();
    let record_with = |stage: Stage, items: usize, started: Instant, detail: Option<String>| {
        let elapsed = started.elapsed();
        debug!(%pass, ?stage, items, elapsed_ms = elapsed.as_secs_f64() * 1000.0, "stage done");
        if let Some(t) = tracer {
            let mut event = StageEvent::now(pass, stage).with_items(items).with_duration(elapsed);
            if let Some(detail) = detail {
                event = event.with_detail(detail);
            }
            t.log(&event);
        }
    };
    let record = |stage: Stage, items: usize, started: Instant| record_with(stage, items, started, None);

    let (gray, classified, tokens) = std::thread::scope(
        |scope| -> VisionResult<(GrayImage, Vec<Element>, Vec<TextToken>)> {
            let ocr_task = ocr.map(|source| {
                scope.spawn(move || {
                    let started = Instant::now();
                    let result = source.recognize(image);
                    (result, started)
                })
            });

            let started = Instant::now();
            let gray = to_intensity(image, options.blur_kernel_size);
            record(Stage::Preprocess, (gray.width() * gray.height()) as usize, started);

            let started = Instant::now();
            let extraction = extract(&gray, options);
            let summary = extraction.summary(options.max_element_count);
            let candidates = extraction.candidates;
            record_with(Stage::Contours, candidates.len(), started, Some(summary));

            let started = Instant::now();
            let mut sequence = ElementSequence::new(pass);
            let classified = ElementClassifier::for_options(options).classify_all(&candidates, options, &mut sequence);
            record(Stage::Classify, classified.len(), started);

            let tokens = match ocr_task {
                Some(handle) => {
                    let (result, started) = handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
                    let tokens = result?;
                    record(Stage::Ocr, tokens.len(), started);
                    tokens
                }
                None => Vec::new(),
            };

            Ok((gray, classified, tokens))
        },
    )?;

    let started = Instant::now();
    let merged = merge_text(&classified, &tokens);
    record(Stage::TextMerge, tokens.len(), started);

    let started = Instant::now();
    let elements = build_hierarchy(&merged);
    record(Stage::Hierarchy, elements.iter().filter(|el| el.parent.is_some()).count(), started);

    let started = Instant::now();
    let groups = group_aligned(&elements, options.alignment_tolerance);
    record(Stage::Alignment, groups.horizontal.len() + groups.vertical.len(), started);

    info!(
        %pass,
        elements = elements.len(),
        tokens = tokens.len(),
        rows = groups.horizontal.len(),
        columns = groups.vertical.len(),
        "screen analysis complete"
    );

    // Unsmoothed intensity, so the fingerprint does not depend on blur settings.
    let raw = image.to_luma8();
    let fingerprint = image_fingerprint(raw.width(), raw.height(), raw.as_raw());

    Ok(ScreenAnalysis {
        pass_id: pass,
        fingerprint,
        width: gray.width(),
        height: gray.height(),
        elements,
        text_tokens: tokens,
        groups,
    })
}
