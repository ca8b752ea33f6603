use crate::screen::screen_model::{AlignmentGroup, AlignmentGroups, Axis, Element};

/// Cluster elements into rows (shared center Y) and columns (shared center X).
///
/// Within each pass an element joins the first group, in creation order,
/// whose anchor lies within `tolerance` of its coordinate; otherwise it opens
/// a new group anchored at its own coordinate. Rows are then ordered left to
/// right and columns top to bottom.
pub fn group_aligned(elements: &[Element], tolerance: u32) -> AlignmentGroups {
    AlignmentGroups {
        horizontal: cluster(elements, tolerance, Axis::Horizontal),
        vertical: cluster(elements, tolerance, Axis::Vertical),
    }
}

fn cluster(elements: &[Element], tolerance: u32, axis: Axis) -> Vec<AlignmentGroup> {
    let (anchor_of, order_of): (fn(&Element) -> i32, fn(&Element) -> i32) = match axis {
        Axis::Horizontal => (center_y, center_x),
        Axis::Vertical => (center_x, center_y),
    };

    let mut groups: Vec<(i32, Vec<&Element>)> = Vec::new();
    for el in elements {
        let coord = anchor_of(el);
        match groups
            .iter_mut()
            .find(|(anchor, _)| (*anchor as i64 - coord as i64).unsigned_abs() <= tolerance as u64)
        {
            Some((_, members)) => members.push(el),
            None => groups.push((coord, vec![el])),
        }
    }

    groups
        .into_iter()
        .map(|(anchor, mut members)| {
            members.sort_by_key(|el| order_of(el));
            AlignmentGroup {
                axis,
                anchor,
                members: members.iter().map(|el| el.id).collect(),
            }
        })
        .collect()
}

fn center_x(el: &Element) -> i32 {
    el.center.x
}

fn center_y(el: &Element) -> i32 {
    el.center.y
}
