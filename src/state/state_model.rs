use serde::{Deserialize, Serialize};

use crate::screen::screen_model::{AlignmentGroups, Element, ElementKind, TextToken};
use crate::state::identity::{ElementId, PassId};

/// Everything one analysis pass learned about a screenshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenAnalysis {
    pub pass_id: PassId,
    pub fingerprint: String,
    pub width: u32,
    pub height: u32,

    /// Largest first, with text, parent and children filled in.
    pub elements: Vec<Element>,
    pub text_tokens: Vec<TextToken>,
    pub groups: AlignmentGroups,
}

impl ScreenAnalysis {
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|el| el.id == id)
    }

    pub fn roots(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|el| el.parent.is_none())
    }

    pub fn children_of(&self, id: ElementId) -> Vec<&Element> {
        self.element(id)
            .map(|parent| parent.children.iter().filter_map(|c| self.element(*c)).collect())
            .unwrap_or_default()
    }

    pub fn of_kind(&self, kind: ElementKind) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(move |el| el.kind == kind)
    }

    /// First element whose recognized text equals `text`, ignoring case.
    pub fn find_by_text(&self, text: &str) -> Option<&Element> {
        self.elements.iter().find(|el| {
            el.text
                .as_deref()
                .map(|t| t.eq_ignore_ascii_case(text))
                .unwrap_or(false)
        })
    }
}
