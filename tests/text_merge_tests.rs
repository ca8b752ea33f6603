use screen_analysis::screen::{
    screen_model::{ElementKind, Rect},
    text_merge::{is_button_label, merge_text},
};
use screen_analysis::state::identity::ElementId;

use crate::common::{element, id, token};

mod common;

// =========================================================================
// Button labels
// =========================================================================

#[test]
fn button_labels_match_case_insensitively() {
    for label in ["Submit", "ok", "CANCEL", "Yes", "no", "save"] {
        assert!(is_button_label(label), "{} should be a button label", label);
    }
    assert!(!is_button_label("Email"));
    assert!(!is_button_label("OK!"), "punctuation breaks the match");
    assert!(!is_button_label(""));
}

#[test]
fn button_label_overrides_geometric_kind() {
    // Unknown element: area 2000, aspect ~1.5.
    let mut el = element(0, ElementKind::Unknown, 100, 100, 55, 36);
    el.area = 2000.0;

    let merged = merge_text(&[el], &[token("OK", 95.0, 110.0, 110.0, 140.0, 125.0)]);

    assert_eq!(merged[0].kind, ElementKind::Button);
    assert_eq!(merged[0].text.as_deref(), Some("OK"));
    assert_eq!(merged[0].confidence, Some(95.0));
    assert_eq!(merged[0].area, 2000.0, "geometry is untouched");
}

#[test]
fn ordinary_text_keeps_kind() {
    let el = element(0, ElementKind::TextField, 0, 0, 300, 40);
    let merged = merge_text(&[el], &[token("Email address", 88.5, 10.0, 10.0, 120.0, 30.0)]);

    assert_eq!(merged[0].kind, ElementKind::TextField);
    assert_eq!(merged[0].text.as_deref(), Some("Email address"));
}

// =========================================================================
// Assignment
// =========================================================================

#[test]
fn token_goes_to_first_containing_element() {
    let outer = element(0, ElementKind::Unknown, 0, 0, 400, 300);
    let inner = element(1, ElementKind::Unknown, 50, 50, 100, 40);

    let merged = merge_text(&[outer, inner], &[token("Name", 90.0, 60.0, 60.0, 100.0, 80.0)]);

    assert_eq!(merged[0].text.as_deref(), Some("Name"), "first in order wins");
    assert_eq!(merged[1].text, None);
}

#[test]
fn element_order_decides_not_size() {
    let inner = element(1, ElementKind::Unknown, 50, 50, 100, 40);
    let outer = element(0, ElementKind::Unknown, 0, 0, 400, 300);

    let merged = merge_text(&[inner, outer], &[token("Name", 90.0, 60.0, 60.0, 100.0, 80.0)]);

    assert_eq!(merged[0].id, id(1));
    assert_eq!(merged[0].text.as_deref(), Some("Name"));
    assert_eq!(merged[1].text, None);
}

#[test]
fn containment_is_inclusive_on_edges() {
    let el = element(0, ElementKind::Unknown, 10, 10, 20, 20);

    // Centers exactly on the left/top edge and on x + width / y + height.
    let on_top_left = token("a", 50.0, 8.0, 8.0, 12.0, 12.0);
    let on_bottom_right = token("b", 50.0, 28.0, 28.0, 32.0, 32.0);
    let outside = token("c", 50.0, 29.0, 29.0, 33.0, 33.0);

    let merged = merge_text(&[el.clone()], &[on_top_left]);
    assert_eq!(merged[0].text.as_deref(), Some("a"));

    let merged = merge_text(&[el.clone()], &[on_bottom_right]);
    assert_eq!(merged[0].text.as_deref(), Some("b"));

    let merged = merge_text(&[el], &[outside]);
    assert_eq!(merged[0].text, None, "center (31, 31) lies outside");
}

#[test]
fn later_token_replaces_earlier_text() {
    let el = element(0, ElementKind::Unknown, 0, 0, 200, 40);
    let tokens = [
        token("First", 70.0, 5.0, 5.0, 50.0, 30.0),
        token("name", 80.0, 60.0, 5.0, 100.0, 30.0),
    ];

    let merged = merge_text(&[el], &tokens);

    assert_eq!(merged[0].text.as_deref(), Some("name"));
    assert_eq!(merged[0].confidence, Some(80.0));
}

#[test]
fn unmatched_tokens_are_dropped() {
    let el = element(0, ElementKind::Button, 0, 0, 40, 40);
    let merged = merge_text(&[el.clone()], &[token("stray", 99.0, 500.0, 500.0, 520.0, 510.0)]);

    assert_eq!(merged, vec![el]);
}

#[test]
fn no_tokens_is_identity() {
    let elements = vec![
        element(0, ElementKind::TextField, 0, 0, 300, 40),
        element(1, ElementKind::Button, 0, 60, 40, 40),
    ];

    assert_eq!(merge_text(&elements, &[]), elements);
}

#[test]
fn merge_preserves_ids_and_rects() {
    let elements = vec![
        element(0, ElementKind::Unknown, 0, 0, 100, 40),
        element(1, ElementKind::Unknown, 200, 0, 100, 40),
    ];
    let tokens = [
        token("Save", 90.0, 210.0, 10.0, 260.0, 30.0),
        token("Title", 90.0, 10.0, 10.0, 60.0, 30.0),
    ];

    let merged = merge_text(&elements, &tokens);

    let ids: Vec<ElementId> = merged.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![id(0), id(1)]);
    assert_eq!(merged[1].rect, Rect::new(200, 0, 100, 40));
    assert_eq!(merged[1].kind, ElementKind::Button);
    assert_eq!(merged[0].kind, ElementKind::Unknown);
}
