//! Polygon measurements on closed contours.

use crate::screen::screen_model::Point;

/// Absolute shoelace area of a closed polygon.
pub fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let mut twice_area = 0i64;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        twice_area += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }

    (twice_area as f64 / 2.0).abs()
}

/// Perimeter of the polygon; `closed` adds the segment back to the start.
pub fn arc_length(points: &[Point], closed: bool) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    let mut length: f64 = points.windows(2).map(|w| distance(w[0], w[1])).sum();
    if closed {
        length += distance(points[points.len() - 1], points[0]);
    }
    length
}

/// Drop points that sit in the middle of a straight horizontal, vertical or
/// diagonal run, keeping only the run end points.
pub fn simplify_chain(points: &[Point]) -> Vec<Point> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let step = |a: Point, b: Point| ((b.x - a.x).signum(), (b.y - a.y).signum());

    points
        .iter()
        .enumerate()
        .filter(|&(i, &p)| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            step(prev, p) != step(p, next)
        })
        .map(|(_, &p)| p)
        .collect()
}

/// Douglas-Peucker approximation of a closed contour.
///
/// The contour is split at the vertex farthest from its first point and each
/// half is simplified independently, so the result never repeats the start
/// vertex at the end.
pub fn approximate_polygon(points: &[Point], epsilon: f64) -> Vec<Point> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let start = points[0];
    let split = (1..n)
        .max_by(|&a, &b| {
            distance(start, points[a])
                .partial_cmp(&distance(start, points[b]))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap_or(n / 2);

    let first_half = &points[..=split];
    let mut second_half: Vec<Point> = points[split..].to_vec();
    second_half.push(start);

    let mut result = douglas_peucker(first_half, epsilon);
    result.pop();
    let mut tail = douglas_peucker(&second_half, epsilon);
    tail.pop();
    result.extend(tail);
    result
}

fn douglas_peucker(points: &[Point], epsilon: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let first = points[0];
    let last = points[points.len() - 1];

    let (index, max_dist) = points[1..points.len() - 1]
        .iter()
        .enumerate()
        .map(|(i, &p)| (i + 1, point_to_segment_distance(p, first, last)))
        .fold((0, 0.0f64), |best, cur| if cur.1 > best.1 { cur } else { best });

    if max_dist > epsilon {
        let mut left = douglas_peucker(&points[..=index], epsilon);
        let right = douglas_peucker(&points[index..], epsilon);
        left.pop();
        left.extend(right);
        left
    } else {
        vec![first, last]
    }
}

fn distance(a: Point, b: Point) -> f64 {
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    (dx * dx + dy * dy).sqrt()
}

fn point_to_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = ((b.x - a.x) as f64, (b.y - a.y) as f64);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return distance(p, a);
    }

    let t = (((p.x - a.x) as f64 * dx + (p.y - a.y) as f64 * dy) / len_sq).clamp(0.0, 1.0);
    let (px, py) = (a.x as f64 + t * dx, a.y as f64 + t * dy);
    ((p.x as f64 - px).powi(2) + (p.y as f64 - py).powi(2)).sqrt()
}
