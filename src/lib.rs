use crate::{
    ocr::source::OcrSource,
    screen::{
        alignment::group_aligned,
        classifier::{looks_like_button, looks_like_text_field},
        hierarchy::build_hierarchy,
        screen_model::{AlignmentGroups, Element, TemplateMatch},
    },
    state::{
        state_builder::{analyze_image, detect_in_image},
        state_model::ScreenAnalysis,
    },
    trace::logger::TraceLogger,
    vision::{
        error::VisionResult,
        options::{DetectionOptions, MatchOptions},
        preprocess::{ImageSource, load_image},
        template::match_template,
    },
};

pub mod cli;
pub mod ocr;
pub mod screen;
pub mod state;
pub mod trace;
pub mod vision;

pub use crate::vision::preprocess::crop_region;
pub use crate::vision::visualize::{save_element_visualization, visualize_elements};

/// Detect and classify elements in a screenshot. Text merge and hierarchy
/// are not applied; see [`analyze_screen`] for the full pass.
pub fn detect_elements(source: ImageSource<'_>, options: &DetectionOptions) -> VisionResult<Vec<Element>> {
    let image = load_image(source)?;
    detect_in_image(&image, options)
}

/// Detected elements shaped like text inputs (wide, medium-sized).
pub fn detect_text_fields(source: ImageSource<'_>, options: &DetectionOptions) -> VisionResult<Vec<Element>> {
    Ok(detect_elements(source, options)?
        .into_iter()
        .filter(looks_like_text_field)
        .collect())
}

/// Detected elements shaped like buttons (squarish to 5:1, small to medium).
pub fn detect_buttons(source: ImageSource<'_>, options: &DetectionOptions) -> VisionResult<Vec<Element>> {
    Ok(detect_elements(source, options)?
        .into_iter()
        .filter(looks_like_button)
        .collect())
}

/// Locate `template` inside the screenshot, best matches first.
pub fn find_elements_by_template(
    source: ImageSource<'_>,
    template: ImageSource<'_>,
    options: &MatchOptions,
) -> VisionResult<Vec<TemplateMatch>> {
    let image = load_image(source)?.to_luma8();
    let template = load_image(template)?.to_luma8();
    match_template(&image, &template, options)
}

/// Parent/child containment, largest elements first.
pub fn analyze_element_hierarchy(elements: &[Element]) -> Vec<Element> {
    build_hierarchy(elements)
}

pub fn group_aligned_elements(elements: &[Element], tolerance: u32) -> AlignmentGroups {
    group_aligned(elements, tolerance)
}

/// Run every stage over one screenshot: detection, OCR merge, hierarchy and
/// alignment.
pub fn analyze_screen(
    source: ImageSource<'_>,
    ocr: Option<&dyn OcrSource>,
    options: &DetectionOptions,
    tracer: Option<&TraceLogger>,
) -> VisionResult<ScreenAnalysis> {
    let image = load_image(source)?;
    analyze_image(&image, ocr, options, tracer)
}
