use tracing::debug;

use crate::screen::screen_model::{Element, ElementKind, TextToken};

/// Labels that mark the element carrying them as a button, whatever its shape.
pub const BUTTON_LABELS: [&str; 6] = ["SUBMIT", "OK", "CANCEL", "YES", "NO", "SAVE"];

pub fn is_button_label(text: &str) -> bool {
    let upper = text.to_uppercase();
    BUTTON_LABELS.contains(&upper.as_str())
}

/// Attach OCR tokens to the elements that contain them.
///
/// Each token goes to the first element (in the given order) whose rectangle
/// contains the token's center, edges included. A later token landing in the
/// same element replaces the earlier text. Tokens outside every element are
/// dropped.
pub fn merge_text(elements: &[Element], tokens: &[TextToken]) -> Vec<Element> {
    let mut merged = elements.to_vec();
    let mut assigned = 0usize;

    for token in tokens {
        let (cx, cy) = token.bbox.center();

        let Some(target) = merged.iter_mut().find(|el| el.rect.contains_point(cx, cy)) else {
            continue;
        };

        target.text = Some(token.text.clone());
        target.confidence = Some(token.confidence);
        if is_button_label(&token.text) {
            target.kind = ElementKind::Button;
        }
        assigned += 1;
    }

    debug!(tokens = tokens.len(), assigned, "merged OCR tokens");
    merged
}
