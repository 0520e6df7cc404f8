//! Geometric primitives shared by hit-testing, selection and culling.
//!
//! Everything here is a pure function over kurbo values.

use kurbo::{Point, Rect};

/// Shortest distance from `point` to the segment `a`-`b`.
///
/// A degenerate segment (`a == b`) measures the distance to `a`.
pub fn point_segment_distance(point: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let ap = point - a;
    let len_sq = ab.hypot2();

    if len_sq < f64::EPSILON {
        return ap.hypot();
    }

    let t = (ap.dot(ab) / len_sq).clamp(0.0, 1.0);
    let projection = a + ab * t;
    point.distance(projection)
}

/// Bounding box of `points` inflated by `padding` on every side.
///
/// An empty slice yields `Rect::ZERO`.
pub fn rect_from_extremes(points: &[Point], padding: f64) -> Rect {
    let Some((first, rest)) = points.split_first() else {
        return Rect::ZERO;
    };
    rest.iter()
        .fold(Rect::from_points(*first, *first), |rect, p| rect.union_pt(*p))
        .inflate(padding, padding)
}

/// Whether the projections of `a` and `b` overlap on both axes.
///
/// Rectangles that only share an edge do not overlap.
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
}

/// Union of every rectangle, or `None` for an empty iterator.
pub fn union_all(rects: impl IntoIterator<Item = Rect>) -> Option<Rect> {
    rects.into_iter().reduce(|acc, r| acc.union(r))
}

/// Scale `point` about `pivot` independently on each axis.
pub fn scale_about(point: Point, pivot: Point, sx: f64, sy: f64) -> Point {
    Point::new(
        pivot.x + (point.x - pivot.x) * sx,
        pivot.y + (point.y - pivot.y) * sy,
    )
}

/// Ray-casting parity test.
///
/// The polygon is closed before testing if its last point differs from the
/// first. Polygons with fewer than three distinct points contain nothing.
pub fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    if !has_three_distinct(polygon) {
        return false;
    }

    let mut closed = polygon.to_vec();
    if closed.first() != closed.last() {
        closed.push(closed[0]);
    }

    // The closing point duplicates the first, so it is skipped as an edge start.
    let n = closed.len() - 1;
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = closed[i];
        let pj = closed[j];
        if (pi.y > point.y) != (pj.y > point.y)
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn has_three_distinct(points: &[Point]) -> bool {
    let Some(&first) = points.first() else {
        return false;
    };
    let Some(&second) = points.iter().find(|p| **p != first) else {
        return false;
    };
    points.iter().any(|p| *p != first && *p != second)
}

/// Sign-consistency test against the triangle `v1`, `v2`, `v3`.
///
/// Works for either winding. Points exactly on an edge are not guaranteed a
/// consistent answer.
pub fn point_in_triangle(point: Point, v1: Point, v2: Point, v3: Point) -> bool {
    fn sign(p1: Point, p2: Point, p3: Point) -> f64 {
        (p1.x - p3.x) * (p2.y - p3.y) - (p2.x - p3.x) * (p1.y - p3.y)
    }

    let d1 = sign(point, v1, v2);
    let d2 = sign(point, v2, v3);
    let d3 = sign(point, v3, v1);

    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;

    !(has_neg && has_pos)
}
