//! Draft polyline construction, one builder per strategy.
//!
//! Builders only shape the path; they never consult obstacles beyond the two
//! endpoint nodes. Everything else is the avoidance post-processor's job.
//! Every builder keeps consecutive points axis-aligned; `Direct` is the one
//! intentional exception.

use super::strategy::PathStrategy;
use super::{PortRef, RouteQuery};
use crate::config::RouterConfig;
use crate::geom::Point;

pub(super) fn build_path(
    strategy: PathStrategy,
    query: &RouteQuery,
    config: &RouterConfig,
) -> Vec<Point> {
    match strategy {
        PathStrategy::Direct => direct(query),
        PathStrategy::HorizontalFirst => horizontal_first(query, config),
        PathStrategy::VerticalFirst => vertical_first(query, config),
        PathStrategy::ThreeSegment => three_segment(query, config),
        PathStrategy::OppositeDirection => opposite_direction(query, config),
        PathStrategy::FourSegment => four_segment(query, config),
        PathStrategy::FiveSegment => five_segment(query, config),
    }
}

/// Exit point in front of the source port: at least `node_safe_distance` out,
/// and always past the source node's facing side when the node is known.
pub(super) fn first_point(port: &PortRef, config: &RouterConfig) -> Point {
    first_point_with(port, config.node_safe_distance, config)
}

fn first_point_with(port: &PortRef, base_offset: f64, config: &RouterConfig) -> Point {
    let offset = base_offset.max(clearing_offset(port, config));
    port.point.add(port.direction.unit().scale(offset))
}

/// Distance needed along the facing direction to leave the node rect with a
/// safe margin. Zero when the node is unknown.
fn clearing_offset(port: &PortRef, config: &RouterConfig) -> f64 {
    use crate::geom::PortDirection::*;
    if port.node.is_empty() {
        return 0.0;
    }
    let to_side = match port.direction {
        Right => port.node.right() - port.point.x,
        Left => port.point.x - port.node.left(),
        Bottom => port.node.bottom() - port.point.y,
        Top => port.point.y - port.node.top(),
    };
    to_side.max(0.0) + config.node_safe_distance
}

fn direct(query: &RouteQuery) -> Vec<Point> {
    vec![query.source.point, query.target.point]
}

/// Out along the source direction, one vertical jump, close horizontally.
fn horizontal_first(query: &RouteQuery, config: &RouterConfig) -> Vec<Point> {
    let s = query.source.point;
    let t = query.target.point;
    let p1 = first_point(&query.source, config);
    vec![s, p1, Point::new(p1.x, t.y), t]
}

/// Out along the source direction, one horizontal jump, close vertically.
fn vertical_first(query: &RouteQuery, config: &RouterConfig) -> Vec<Point> {
    let s = query.source.point;
    let t = query.target.point;
    let p1 = first_point(&query.source, config);
    vec![s, p1, Point::new(t.x, p1.y), t]
}

/// Single-elbow path for perpendicular ports with room to spare. Falls back
/// to a safe channel when both elbow candidates land inside a node.
fn three_segment(query: &RouteQuery, config: &RouterConfig) -> Vec<Point> {
    let s = query.source.point;
    let t = query.target.point;
    let horizontal = query.source.direction.is_horizontal();

    let preferred = if horizontal {
        Point::new(t.x, s.y)
    } else {
        Point::new(s.x, t.y)
    };
    let alternate = if horizontal {
        Point::new(s.x, t.y)
    } else {
        Point::new(t.x, s.y)
    };

    for mid in [preferred, alternate] {
        if !inside_endpoint_node(query, mid) {
            return vec![s, mid, t];
        }
    }

    // Both elbows blocked: detour through a channel just past the source
    // node. Two elbows instead of one so the path stays axis-aligned.
    if horizontal {
        let safe_x = if query.source.node.is_empty() {
            s.x + config.node_safe_distance
        } else {
            query.source.node.right() + config.node_safe_distance
        };
        vec![s, Point::new(safe_x, s.y), Point::new(safe_x, t.y), t]
    } else {
        let safe_y = if query.source.node.is_empty() {
            s.y + config.node_safe_distance
        } else {
            query.source.node.bottom() + config.node_safe_distance
        };
        vec![s, Point::new(s.x, safe_y), Point::new(t.x, safe_y), t]
    }
}

fn inside_endpoint_node(query: &RouteQuery, point: Point) -> bool {
    (!query.source.node.is_empty() && query.source.node.contains(point))
        || (!query.target.node.is_empty() && query.target.node.contains(point))
}

/// Facing ports (left/right or top/bottom pair). The second interior point
/// aligns with the target axis so the closing segment stays orthogonal.
fn opposite_direction(query: &RouteQuery, config: &RouterConfig) -> Vec<Point> {
    let s = query.source.point;
    let t = query.target.point;
    let p1 = first_point(&query.source, config);
    let p2 = if query.source.direction.is_vertical() {
        Point::new(t.x, p1.y)
    } else {
        Point::new(p1.x, t.y)
    };
    vec![s, p1, p2, t]
}

/// Staircase through the midpoint of the cross axis. Used for same-direction
/// ports where a plain first-strategy path would double back.
fn four_segment(query: &RouteQuery, config: &RouterConfig) -> Vec<Point> {
    staircase(query, first_point(&query.source, config))
}

/// Same staircase with a deeper first extension, leaving room for avoidance
/// detours in crowded scenes.
fn five_segment(query: &RouteQuery, config: &RouterConfig) -> Vec<Point> {
    let extension = (2.0 * config.min_segment_length)
        .max(0.4 * query.dx().abs().max(query.dy().abs()));
    staircase(query, first_point_with(&query.source, extension, config))
}

fn staircase(query: &RouteQuery, p1: Point) -> Vec<Point> {
    let s = query.source.point;
    let t = query.target.point;
    if query.source.direction.is_horizontal() {
        let mid_y = (s.y + t.y) / 2.0;
        vec![s, p1, Point::new(p1.x, mid_y), Point::new(t.x, mid_y), t]
    } else {
        let mid_x = (s.x + t.x) / 2.0;
        vec![s, p1, Point::new(mid_x, p1.y), Point::new(mid_x, t.y), t]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{PortDirection, Rect};

    fn assert_orthogonal(points: &[Point]) {
        for pair in points.windows(2) {
            let dx = (pair[1].x - pair[0].x).abs();
            let dy = (pair[1].y - pair[0].y).abs();
            assert!(
                dx < 1e-6 || dy < 1e-6,
                "diagonal segment {:?} -> {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    fn query(
        s: (f64, f64),
        sd: PortDirection,
        t: (f64, f64),
        td: PortDirection,
    ) -> RouteQuery {
        RouteQuery::new(
            PortRef::detached(Point::new(s.0, s.1), sd),
            PortRef::detached(Point::new(t.0, t.1), td),
        )
    }

    #[test]
    fn every_builder_is_orthogonal_and_endpoint_faithful() {
        use PathStrategy::*;
        let config = RouterConfig::default();
        let q = query(
            (0.0, 0.0),
            PortDirection::Right,
            (240.0, 180.0),
            PortDirection::Left,
        );
        for strategy in [
            HorizontalFirst,
            VerticalFirst,
            ThreeSegment,
            OppositeDirection,
            FourSegment,
            FiveSegment,
        ] {
            let path = build_path(strategy, &q, &config);
            assert!(path.first().unwrap().approx_eq(q.source.point), "{strategy:?}");
            assert!(path.last().unwrap().approx_eq(q.target.point), "{strategy:?}");
            assert_orthogonal(&path);
        }
    }

    #[test]
    fn first_point_clears_the_source_node() {
        let config = RouterConfig::default();
        let node = Rect::from_xywh(0.0, 0.0, 180.0, 80.0);
        // Port on the right edge: base offset already clears the node.
        let edge_port = PortRef::new(Point::new(180.0, 40.0), PortDirection::Right, node);
        let p = first_point(&edge_port, &config);
        assert!(p.approx_eq(Point::new(195.0, 40.0)));

        // Port recessed inside the node: offset stretches past the side.
        let inner_port = PortRef::new(Point::new(150.0, 40.0), PortDirection::Right, node);
        let p = first_point(&inner_port, &config);
        assert!(p.x > node.right() + config.node_safe_distance - 1e-9);
        assert_eq!(p.y, 40.0);
    }

    #[test]
    fn opposite_direction_has_no_diagonal() {
        let config = RouterConfig::default();
        let q = query(
            (0.0, 0.0),
            PortDirection::Bottom,
            (300.0, 200.0),
            PortDirection::Top,
        );
        let path = build_path(PathStrategy::OppositeDirection, &q, &config);
        assert_eq!(path.len(), 4);
        assert_orthogonal(&path);
    }

    #[test]
    fn three_segment_prefers_the_target_aligned_elbow() {
        let config = RouterConfig::default();
        let q = query(
            (0.0, 0.0),
            PortDirection::Right,
            (200.0, 150.0),
            PortDirection::Top,
        );
        let path = build_path(PathStrategy::ThreeSegment, &q, &config);
        assert_eq!(path.len(), 3);
        assert!(path[1].approx_eq(Point::new(200.0, 0.0)));
    }

    #[test]
    fn three_segment_detours_when_both_elbows_are_covered() {
        let config = RouterConfig::default();
        // Target node covers both elbow candidates.
        let target_node = Rect::from_xywh(-50.0, -50.0, 400.0, 300.0);
        let q = RouteQuery::new(
            PortRef::detached(Point::new(0.0, 0.0), PortDirection::Right),
            PortRef::new(Point::new(200.0, 150.0), PortDirection::Top, target_node),
        );
        let path = build_path(PathStrategy::ThreeSegment, &q, &config);
        assert_eq!(path.len(), 4);
        assert_orthogonal(&path);
    }

    #[test]
    fn five_segment_extends_further_than_four() {
        let config = RouterConfig::default();
        let q = query(
            (0.0, 0.0),
            PortDirection::Right,
            (400.0, 60.0),
            PortDirection::Right,
        );
        let four = build_path(PathStrategy::FourSegment, &q, &config);
        let five = build_path(PathStrategy::FiveSegment, &q, &config);
        assert!(five[1].x > four[1].x);
        // 0.4 * 400 = 160 beats 2 * min_segment_length.
        assert!((five[1].x - 160.0).abs() < 1e-9);
    }
}
