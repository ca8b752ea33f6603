use std::collections::HashSet;

use image::DynamicImage;
use screen_analysis::analyze_screen;
use screen_analysis::ocr::source::{OcrError, OcrSource, StaticOcrSource};
use screen_analysis::screen::hierarchy::build_hierarchy;
use screen_analysis::screen::screen_model::{AlignmentGroups, ElementKind, Rect, TextToken};
use screen_analysis::state::identity::{PassId, image_fingerprint};
use screen_analysis::state::state_model::ScreenAnalysis;
use screen_analysis::trace::logger::TraceLogger;
use screen_analysis::vision::error::VisionError;
use screen_analysis::vision::options::DetectionOptions;
use screen_analysis::vision::preprocess::ImageSource;

use crate::common::{element, id, near, png_bytes, screen_with_boxes, token};

mod common;

const EMAIL: (i32, i32, u32, u32) = (40, 40, 200, 40);
const GO: (i32, i32, u32, u32) = (300, 40, 40, 40);
const OK_BOX: (i32, i32, u32, u32) = (40, 140, 60, 40);

fn form_png() -> Vec<u8> {
    png_bytes(&screen_with_boxes(420, 260, &[EMAIL, GO, OK_BOX]))
}

fn form_tokens() -> Vec<TextToken> {
    vec![
        token("Email", 91.0, 60.0, 50.0, 120.0, 70.0),
        token("OK", 96.0, 55.0, 150.0, 85.0, 170.0),
        token("footer", 80.0, 300.0, 230.0, 380.0, 250.0),
    ]
}

struct FailingOcr;

impl OcrSource for FailingOcr {
    fn recognize(&self, _image: &DynamicImage) -> Result<Vec<TextToken>, OcrError> {
        Err(OcrError::Status {
            status: 503,
            body: "engine offline".to_string(),
        })
    }
}

// =========================================================================
// Full pass
// =========================================================================

#[test]
fn ocr_text_is_merged_into_elements() {
    let png = form_png();
    let ocr = StaticOcrSource::new(form_tokens());

    let analysis = analyze_screen(ImageSource::Bytes(&png), Some(&ocr), &DetectionOptions::default(), None).unwrap();

    let email = analysis.find_by_text("email").expect("email text attached");
    assert_eq!(email.kind, ElementKind::TextField);
    assert!(near(&email.rect, &Rect::new(EMAIL.0, EMAIL.1, EMAIL.2, EMAIL.3), 3));

    let ok = analysis.find_by_text("OK").expect("OK text attached");
    assert_eq!(ok.kind, ElementKind::Button, "label promotes the unknown box");
    assert_eq!(ok.confidence, Some(96.0));

    assert!(analysis.find_by_text("footer").is_none(), "token outside every element");
    assert_eq!(analysis.text_tokens.len(), 3, "raw tokens are kept");
}

#[test]
fn analysis_without_ocr_has_no_text() {
    let png = form_png();
    let analysis = analyze_screen(ImageSource::Bytes(&png), None, &DetectionOptions::default(), None).unwrap();

    assert!(analysis.text_tokens.is_empty());
    assert!(analysis.elements.iter().all(|e| e.text.is_none()));
    assert_eq!(analysis.of_kind(ElementKind::TextField).count(), 1);
}

#[test]
fn elements_are_ordered_largest_first() {
    let png = form_png();
    let analysis = analyze_screen(ImageSource::Bytes(&png), None, &DetectionOptions::default(), None).unwrap();

    assert_eq!(analysis.elements.len(), 3);
    assert!(analysis.elements.windows(2).all(|w| w[0].area >= w[1].area));
    assert_eq!(analysis.roots().count(), 3, "side-by-side boxes do not nest");
}

#[test]
fn aligned_row_is_grouped() {
    let png = form_png();
    let analysis = analyze_screen(ImageSource::Bytes(&png), None, &DetectionOptions::default(), None).unwrap();

    let field = analysis.of_kind(ElementKind::TextField).next().unwrap().id;
    let button = analysis.of_kind(ElementKind::Button).next().unwrap().id;

    let row = analysis
        .groups
        .horizontal
        .iter()
        .find(|g| g.members.contains(&field))
        .expect("text field has a row");
    assert_eq!(row.members, vec![field, button], "left to right");

    let placed: usize = analysis.groups.vertical.iter().map(|g| g.members.len()).sum();
    assert_eq!(placed, analysis.elements.len());
}

#[test]
fn ids_are_unique_within_and_across_passes() {
    let png = form_png();
    let options = DetectionOptions::default();

    let a = analyze_screen(ImageSource::Bytes(&png), None, &options, None).unwrap();
    let b = analyze_screen(ImageSource::Bytes(&png), None, &options, None).unwrap();

    let ids_a: HashSet<_> = a.elements.iter().map(|e| e.id).collect();
    let ids_b: HashSet<_> = b.elements.iter().map(|e| e.id).collect();

    assert_eq!(ids_a.len(), a.elements.len());
    assert!(ids_a.is_disjoint(&ids_b));
    assert_ne!(a.pass_id, b.pass_id);
    assert!(a.elements.iter().all(|e| e.id.pass == a.pass_id));
}

#[test]
fn fingerprint_identifies_the_screen() {
    let png = form_png();
    let other = png_bytes(&screen_with_boxes(420, 260, &[EMAIL]));
    let options = DetectionOptions::default();

    let a = analyze_screen(ImageSource::Bytes(&png), None, &options, None).unwrap();
    let b = analyze_screen(ImageSource::Bytes(&png), None, &options, None).unwrap();
    let c = analyze_screen(ImageSource::Bytes(&other), None, &options, None).unwrap();

    assert_eq!(a.fingerprint, b.fingerprint);
    assert_ne!(a.fingerprint, c.fingerprint);
    assert_eq!(a.fingerprint.len(), 40, "hex SHA-1");
    assert_eq!((a.width, a.height), (420, 260));
}

#[test]
fn fingerprint_ignores_blur_setting() {
    let png = form_png();

    let plain = analyze_screen(ImageSource::Bytes(&png), None, &DetectionOptions::default(), None).unwrap();
    let blurred = analyze_screen(
        ImageSource::Bytes(&png),
        None,
        &DetectionOptions::default().with_blur_kernel_size(Some(5)),
        None,
    )
    .unwrap();

    assert_eq!(plain.fingerprint, blurred.fingerprint);
}

#[test]
fn fingerprint_covers_dimensions() {
    let pixels = vec![0u8; 12];
    assert_ne!(image_fingerprint(3, 4, &pixels), image_fingerprint(4, 3, &pixels));
}

#[test]
fn ocr_failure_fails_the_pass() {
    let png = form_png();
    let result = analyze_screen(
        ImageSource::Bytes(&png),
        Some(&FailingOcr),
        &DetectionOptions::default(),
        None,
    );

    assert!(matches!(result, Err(VisionError::Ocr(OcrError::Status { status: 503, .. }))));
}

#[test]
fn analysis_serializes_to_json() {
    let png = form_png();
    let ocr = StaticOcrSource::new(form_tokens());
    let analysis = analyze_screen(ImageSource::Bytes(&png), Some(&ocr), &DetectionOptions::default(), None).unwrap();

    let json = serde_json::to_value(&analysis).unwrap();
    assert_eq!(json["elements"].as_array().unwrap().len(), analysis.elements.len());
    assert!(json["groups"]["horizontal"].is_array());
    assert!(
        json["elements"]
            .as_array()
            .unwrap()
            .iter()
            .any(|e| e["kind"] == "text_field")
    );
}

#[test]
fn children_are_looked_up_through_the_analysis() {
    let elements = build_hierarchy(&[
        element(0, ElementKind::Unknown, 0, 0, 400, 300),
        element(1, ElementKind::TextField, 20, 20, 200, 40),
        element(2, ElementKind::Button, 20, 100, 40, 40),
        element(3, ElementKind::Unknown, 500, 0, 50, 50),
    ]);
    let analysis = ScreenAnalysis {
        pass_id: PassId(0),
        fingerprint: String::new(),
        width: 600,
        height: 300,
        elements,
        text_tokens: Vec::new(),
        groups: AlignmentGroups::default(),
    };

    let children: Vec<_> = analysis.children_of(id(0)).iter().map(|e| e.id).collect();
    assert_eq!(children, vec![id(1), id(2)]);
    assert!(analysis.children_of(id(3)).is_empty(), "leaf");
    assert!(analysis.children_of(id(42)).is_empty(), "unknown id");
    assert_eq!(analysis.roots().count(), 2);
}

// =========================================================================
// Stage trace
// =========================================================================

#[test]
fn trace_records_every_stage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.jsonl");
    let tracer = TraceLogger::new(&path);

    let png = form_png();
    let ocr = StaticOcrSource::new(form_tokens());
    let analysis = analyze_screen(ImageSource::Bytes(&png), Some(&ocr), &DetectionOptions::default(), Some(&tracer)).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let events: Vec<serde_json::Value> = content
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    let stages: HashSet<&str> = events.iter().map(|e| e["stage"].as_str().unwrap()).collect();
    for stage in ["preprocess", "contours", "classify", "ocr", "text_merge", "hierarchy", "alignment"] {
        assert!(stages.contains(stage), "missing stage {}", stage);
    }
    assert_eq!(events.len(), 7);
    assert!(events.iter().all(|e| e["pass_id"] == analysis.pass_id.0));

    let classify = events.iter().find(|e| e["stage"] == "classify").unwrap();
    assert_eq!(classify["items"], analysis.elements.len());
}

#[test]
fn trace_skips_ocr_stage_without_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.jsonl");
    let tracer = TraceLogger::new(&path);

    let png = form_png();
    analyze_screen(ImageSource::Bytes(&png), None, &DetectionOptions::default(), Some(&tracer)).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 6);
    assert!(!content.contains("\"ocr\""));
}

#[test]
fn unwritable_trace_does_not_fail_the_pass() {
    let tracer = TraceLogger::new("/nonexistent/dir/trace.jsonl");
    assert!(!tracer.is_enabled());

    let png = form_png();
    let result = analyze_screen(ImageSource::Bytes(&png), None, &DetectionOptions::default(), Some(&tracer));
    assert!(result.is_ok());
}

#[test]
fn contours_stage_reports_truncation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.jsonl");
    let tracer = TraceLogger::new(&path);

    let png = form_png();
    let options = DetectionOptions::default().with_max_element_count(1);
    let analysis = analyze_screen(ImageSource::Bytes(&png), None, &options, Some(&tracer)).unwrap();
    assert_eq!(analysis.elements.len(), 1);

    let content = std::fs::read_to_string(&path).unwrap();
    let contours: serde_json::Value = content
        .lines()
        .map(|line| serde_json::from_str::<serde_json::Value>(line).unwrap())
        .find(|e| e["stage"] == "contours")
        .unwrap();

    let detail = contours["detail"].as_str().expect("contours detail present");
    assert!(detail.contains("truncated at 1"), "detail was {:?}", detail);
}

#[test]
fn contours_stage_detail_without_truncation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.jsonl");
    let tracer = TraceLogger::new(&path);

    let png = form_png();
    analyze_screen(ImageSource::Bytes(&png), None, &DetectionOptions::default(), Some(&tracer)).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let contours: serde_json::Value = content
        .lines()
        .map(|line| serde_json::from_str::<serde_json::Value>(line).unwrap())
        .find(|e| e["stage"] == "contours")
        .unwrap();

    let detail = contours["detail"].as_str().unwrap();
    assert!(detail.starts_with("traced"));
    assert!(!detail.contains("truncated"));
}
