use super::{Point2, TOLERANCE};

/// Computes the signed area of a polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise. A trailing point
/// that repeats the first one contributes nothing.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Returns `true` if the last point coincides with the first.
#[must_use]
pub fn is_closed(points: &[Point2]) -> bool {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() > 1 => (first - last).norm() < TOLERANCE,
        _ => false,
    }
}

/// Counts the points that differ from their predecessor, ignoring the
/// closing duplicate.
#[must_use]
pub fn distinct_vertex_count(points: &[Point2]) -> usize {
    let open = if is_closed(points) {
        &points[..points.len() - 1]
    } else {
        points
    };
    let Some(first) = open.first() else {
        return 0;
    };
    let mut count = 1;
    let mut prev = first;
    for pt in &open[1..] {
        if (pt - prev).norm() >= TOLERANCE {
            count += 1;
            prev = pt;
        }
    }
    count
}
