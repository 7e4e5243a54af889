//! Segment-versus-rectangle collision testing.
//!
//! The tester runs three stages in increasing cost: a bounding-box reject,
//! containment checks on a handful of interior sample points, and only then
//! an exact segment-versus-edge intersection test. The sample stage catches
//! the common case of a long segment crossing a node without paying for four
//! cross-product tests per obstacle.

use crate::geom::{Point, Rect, POINT_EPSILON};

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

/// Fractions along the segment probed for containment before the exact test.
/// Skewed away from the endpoints, which sit on node borders by construction.
const SAMPLE_FRACTIONS: [f64; 6] = [0.10, 0.25, 0.40, 0.60, 0.75, 0.90];

/// True when the segment `a -> b` passes within `clearance` of `rect`.
///
/// Empty rectangles never collide. A zero-length segment collides exactly
/// when its point lies inside the expanded rectangle.
pub fn segment_intersects_rect(a: Point, b: Point, rect: &Rect, clearance: f64) -> bool {
    if rect.is_empty() {
        return false;
    }
    let expanded = rect.expand(clearance);

    // Cheap reject: the segment's own bbox misses the expanded rect.
    let segment_box = Rect::from_corners(a, b);
    if !segment_box.intersects(&expanded) {
        return false;
    }

    if a.distance(b) < POINT_EPSILON {
        return expanded.contains(a);
    }

    // An endpoint inside the expanded rect is always a hit; the sample
    // fractions deliberately skip the endpoints.
    if expanded.contains(a) || expanded.contains(b) {
        return true;
    }

    for fraction in SAMPLE_FRACTIONS {
        if expanded.contains(a.lerp(b, fraction)) {
            return true;
        }
    }

    // Exact: test against all four edges. Catches thin clips between two
    // sample points, e.g. a segment shaving a corner.
    let corners = expanded.corners();
    for i in 0..4 {
        if segments_intersect(a, b, corners[i], corners[(i + 1) % 4]) {
            return true;
        }
    }
    false
}

/// True when any segment of the polyline collides with `rect`.
pub fn path_intersects_rect(points: &[Point], rect: &Rect, clearance: f64) -> bool {
    points
        .windows(2)
        .any(|pair| segment_intersects_rect(pair[0], pair[1], rect, clearance))
}

/// Proper intersection of segments `a1 -> a2` and `b1 -> b2` via orientation
/// signs. Collinear overlap does not count; the sampled containment stage
/// already covers segments running along an edge.
pub(crate) fn segments_intersect(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    let d1 = cross(b1, b2, a1);
    let d2 = cross(b1, b2, a2);
    let d3 = cross(a1, a2, b1);
    let d4 = cross(a1, a2, b2);
    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

/// Cross product of `(b - a)` and `(p - a)`.
fn cross(a: Point, b: Point, p: Point) -> f64 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}
