use rayon::prelude::*;
use tracing::debug;

use crate::screen::screen_model::{Element, ElementKind};
use crate::state::identity::ElementSequence;
use crate::vision::contours::Candidate;
use crate::vision::geometry::approximate_polygon;
use crate::vision::options::DetectionOptions;

const TEXT_FIELD_MIN_ASPECT: f64 = 4.0;
const SQUARE_MIN_ASPECT: f64 = 0.8;
const SQUARE_MAX_ASPECT: f64 = 1.2;
const BUTTON_MAX_WIDTH: u32 = 100;
const SEPARATOR_MAX_ASPECT: f64 = 0.1;
const SEPARATOR_MIN_ASPECT: f64 = 10.0;
const CHECKBOX_EPSILON_FRACTION: f64 = 0.05;

pub type RulePredicate = fn(&Candidate, &DetectionOptions) -> bool;

/// One step of the classification chain.
#[derive(Clone, Copy)]
pub struct ClassificationRule {
    pub name: &'static str,
    pub kind: ElementKind,
    pub predicate: RulePredicate,
}

impl ClassificationRule {
    pub fn matches(&self, candidate: &Candidate, options: &DetectionOptions) -> bool {
        (self.predicate)(candidate, options)
    }
}

impl std::fmt::Debug for ClassificationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassificationRule")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

pub const TEXT_FIELD_RULE: ClassificationRule = ClassificationRule {
    name: "wide_rectangle",
    kind: ElementKind::TextField,
    predicate: is_text_field,
};

pub const BUTTON_RULE: ClassificationRule = ClassificationRule {
    name: "small_square",
    kind: ElementKind::Button,
    predicate: is_button,
};

pub const CHECKBOX_RULE: ClassificationRule = ClassificationRule {
    name: "four_corner_box",
    kind: ElementKind::Checkbox,
    predicate: is_checkbox,
};

pub const SEPARATOR_RULE: ClassificationRule = ClassificationRule {
    name: "thin_line",
    kind: ElementKind::Separator,
    predicate: is_separator,
};

/// Ordered, first-match-wins rule chain. Shapes no rule accepts are
/// `Unknown`.
///
/// With the standard order the checkbox rule is never reached: every shape
/// it accepts (square, at most `checkbox_max_side` wide) is already taken by
/// the small-square button rule. `DetectionOptions::checkbox_priority` swaps
/// the two rules for callers that want checkboxes reported.
#[derive(Debug, Clone)]
pub struct ElementClassifier {
    rules: Vec<ClassificationRule>,
}

impl ElementClassifier {
    pub fn standard() -> Self {
        Self::with_rules(vec![TEXT_FIELD_RULE, BUTTON_RULE, CHECKBOX_RULE, SEPARATOR_RULE])
    }

    pub fn checkbox_first() -> Self {
        Self::with_rules(vec![TEXT_FIELD_RULE, CHECKBOX_RULE, BUTTON_RULE, SEPARATOR_RULE])
    }

    pub fn for_options(options: &DetectionOptions) -> Self {
        if options.checkbox_priority {
            Self::checkbox_first()
        } else {
            Self::standard()
        }
    }

    pub fn with_rules(rules: Vec<ClassificationRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// The rule that decides `candidate`, if any.
    pub fn deciding_rule(
        &self,
        candidate: &Candidate,
        options: &DetectionOptions,
    ) -> Option<&ClassificationRule> {
        self.rules.iter().find(|r| r.matches(candidate, options))
    }

    pub fn classify(&self, candidate: &Candidate, options: &DetectionOptions) -> ElementKind {
        self.deciding_rule(candidate, options)
            .map(|r| r.kind)
            .unwrap_or(ElementKind::Unknown)
    }

    /// Classify every candidate and give each an id from the pass sequence.
    /// Ids follow candidate order whether or not classification ran in
    /// parallel.
    pub fn classify_all(
        &self,
        candidates: &[Candidate],
        options: &DetectionOptions,
        sequence: &mut ElementSequence,
    ) -> Vec<Element> {
        let kinds: Vec<ElementKind> = if candidates.len() > options.parallel_threshold {
            candidates
                .par_iter()
                .map(|c| self.classify(c, options))
                .collect()
        } else {
            candidates.iter().map(|c| self.classify(c, options)).collect()
        };

        let elements: Vec<Element> = candidates
            .iter()
            .zip(kinds)
            .map(|(c, kind)| {
                Element::new(sequence.next_id(), kind, c.rect, c.area).with_contour(c.contour.clone())
            })
            .collect();

        debug!(count = elements.len(), pass = %sequence.pass(), "classified candidates");
        elements
    }
}

impl Default for ElementClassifier {
    fn default() -> Self {
        Self::standard()
    }
}

fn is_square(candidate: &Candidate) -> bool {
    let aspect = candidate.aspect_ratio();
    (SQUARE_MIN_ASPECT..=SQUARE_MAX_ASPECT).contains(&aspect)
}

pub fn is_text_field(candidate: &Candidate, _options: &DetectionOptions) -> bool {
    candidate.aspect_ratio() > TEXT_FIELD_MIN_ASPECT
}

pub fn is_button(candidate: &Candidate, _options: &DetectionOptions) -> bool {
    is_square(candidate) && candidate.rect.width < BUTTON_MAX_WIDTH
}

pub fn is_checkbox(candidate: &Candidate, options: &DetectionOptions) -> bool {
    if !is_square(candidate) {
        return false;
    }

    let max_side = options.checkbox_max_side;
    if candidate.rect.width > max_side || candidate.rect.height > max_side {
        return false;
    }

    let epsilon = CHECKBOX_EPSILON_FRACTION * candidate.perimeter();
    approximate_polygon(&candidate.contour, epsilon).len() == 4
}

pub fn is_separator(candidate: &Candidate, _options: &DetectionOptions) -> bool {
    let aspect = candidate.aspect_ratio();
    aspect <= SEPARATOR_MAX_ASPECT || aspect >= SEPARATOR_MIN_ASPECT
}

// ============================================================================
// Convenience filters (wider bands than the classification rules)
// ============================================================================

pub fn looks_like_text_field(el: &Element) -> bool {
    let rectangular = el.aspect_ratio > 2.5 && el.aspect_ratio < 15.0;
    let medium = el.area > 5000.0 && el.area < 50000.0;
    rectangular && medium
}

pub fn looks_like_button(el: &Element) -> bool {
    let ratio = el.aspect_ratio >= 0.8 && el.aspect_ratio <= 5.0;
    let size = el.area > 1000.0 && el.area < 20000.0;
    ratio && size
}
