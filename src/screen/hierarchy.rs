use std::collections::HashMap;

use crate::screen::screen_model::Element;
use crate::state::identity::ElementId;

/// Derive containment relations.
///
/// Returns the elements sorted by area, largest first (ties keep their input
/// order). Each element's parent is the first larger element whose rectangle
/// fully contains it; since parents always come earlier in that order the
/// result is a forest. Relations present on the input are discarded.
pub fn build_hierarchy(elements: &[Element]) -> Vec<Element> {
    let mut sorted: Vec<Element> = elements
        .iter()
        .cloned()
        .map(|mut el| {
            el.parent = None;
            el.children.clear();
            el
        })
        .collect();
    sorted.sort_by(|a, b| b.area.total_cmp(&a.area));

    for i in 1..sorted.len() {
        let rect = sorted[i].rect;
        let parent_idx = (0..i).find(|&j| sorted[j].rect.contains_rect(&rect));

        if let Some(j) = parent_idx {
            let child_id = sorted[i].id;
            sorted[i].parent = Some(sorted[j].id);
            if !sorted[j].children.contains(&child_id) {
                sorted[j].children.push(child_id);
            }
        }
    }

    sorted
}

/// Elements without a parent.
pub fn roots(elements: &[Element]) -> Vec<&Element> {
    elements.iter().filter(|el| el.parent.is_none()).collect()
}

/// Number of parent hops from `id` up to its root, or `None` when the chain
/// references a missing element or revisits an element.
pub fn depth_of(elements: &[Element], id: ElementId) -> Option<usize> {
    let by_id: HashMap<ElementId, &Element> = elements.iter().map(|el| (el.id, el)).collect();

    let mut current = *by_id.get(&id)?;
    let mut depth = 0;
    while let Some(parent) = current.parent {
        depth += 1;
        if depth > elements.len() {
            return None;
        }
        current = *by_id.get(&parent)?;
    }
    Some(depth)
}
