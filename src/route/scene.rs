//! Scene classification: how hard is this connector to route?
//!
//! The classifier is a cheap pre-pass. It counts the obstacles that could
//! plausibly matter and collision-tests a first-draft L path; the resulting
//! complexity bucket picks between the straight, two-bend, and multi-bend
//! strategy families before any real path is built.

use serde::{Deserialize, Serialize};

use super::collide::path_intersects_rect;
use super::{Obstacle, ObstacleRole, RouteQuery};
use crate::config::RouterConfig;
use crate::geom::{DirectionRelation, Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SceneComplexity {
    /// Ports effectively coincide on one axis; a straight segment works.
    Direct,
    /// Open field, or one obstacle well off the draft path.
    Simple,
    /// A couple of obstacles near the corridor, none on the draft path.
    Medium,
    /// Draft path is blocked or the corridor is crowded.
    Complex,
}

/// Classifier output consumed by the strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneReport {
    pub complexity: SceneComplexity,
    pub relation: DirectionRelation,
    pub relevant_obstacles: usize,
}

/// Bucket the scene. Rules run in order, first match wins; the relevant set
/// excludes both endpoint nodes, which the builders and avoider handle with
/// their own margins.
pub(super) fn classify(
    query: &RouteQuery,
    obstacles: &[Obstacle],
    config: &RouterConfig,
) -> SceneReport {
    let relation = query
        .source
        .direction
        .relation_to(query.target.direction);
    let relevant: Vec<Rect> = obstacles
        .iter()
        .filter(|o| o.role == ObstacleRole::Other)
        .map(|o| o.rect)
        .collect();

    let complexity = bucket(query, &relevant, config);
    SceneReport {
        complexity,
        relation,
        relevant_obstacles: relevant.len(),
    }
}

fn bucket(query: &RouteQuery, relevant: &[Rect], config: &RouterConfig) -> SceneComplexity {
    let dx = query.dx();
    let dy = query.dy();

    if dx.abs() < config.near_zero_threshold && dy.abs() < config.near_zero_threshold {
        return SceneComplexity::Direct;
    }

    // Aligned along the source port's travel axis with nothing in the way.
    let cross_axis = if query.source.direction.is_horizontal() {
        dy.abs()
    } else {
        dx.abs()
    };
    if cross_axis < config.alignment_threshold && relevant.is_empty() {
        return SceneComplexity::Direct;
    }

    let draft = test_path(query);
    let crossed = relevant
        .iter()
        .filter(|rect| path_intersects_rect(&draft, rect, config.clearance))
        .count();

    if relevant.is_empty() || (relevant.len() == 1 && crossed == 0) {
        return SceneComplexity::Simple;
    }
    if relevant.len() <= 2 && crossed == 0 {
        return SceneComplexity::Medium;
    }
    SceneComplexity::Complex
}

/// Orientation-chosen first-draft L used only for classification pretests.
pub(super) fn test_path(query: &RouteQuery) -> [Point; 3] {
    let s = query.source.point;
    let t = query.target.point;
    let elbow = if query.source.direction.is_horizontal() {
        Point::new(t.x, s.y)
    } else {
        Point::new(s.x, t.y)
    };
    [s, elbow, t]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::{collect_obstacles, PortRef};
    use crate::geom::PortDirection;

    fn query(sx: f64, sy: f64, tx: f64, ty: f64) -> RouteQuery {
        RouteQuery::new(
            PortRef::detached(Point::new(sx, sy), PortDirection::Right),
            PortRef::detached(Point::new(tx, ty), PortDirection::Left),
        )
    }

    fn classify_rects(query: &RouteQuery, rects: &[Rect]) -> SceneReport {
        let config = RouterConfig::default();
        let obstacles = collect_obstacles(query, rects, &config);
        classify(query, &obstacles, &config)
    }

    #[test]
    fn coincident_ports_are_direct() {
        let report = classify_rects(&query(100.0, 100.0, 101.0, 101.0), &[]);
        assert_eq!(report.complexity, SceneComplexity::Direct);
    }

    #[test]
    fn aligned_clear_field_is_direct() {
        // 10px of vertical drift, under the 20px alignment threshold.
        let report = classify_rects(&query(0.0, 100.0, 300.0, 110.0), &[]);
        assert_eq!(report.complexity, SceneComplexity::Direct);
        assert_eq!(report.relation, DirectionRelation::Opposite);
    }

    #[test]
    fn open_field_is_simple() {
        let report = classify_rects(&query(0.0, 0.0, 300.0, 200.0), &[]);
        assert_eq!(report.complexity, SceneComplexity::Simple);
        assert_eq!(report.relevant_obstacles, 0);
    }

    #[test]
    fn one_clear_obstacle_is_simple() {
        let off_path = Rect::from_xywh(100.0, 400.0, 60.0, 40.0);
        let report = classify_rects(&query(0.0, 0.0, 300.0, 200.0), &[off_path]);
        assert_eq!(report.complexity, SceneComplexity::Simple);
        assert_eq!(report.relevant_obstacles, 1);
    }

    #[test]
    fn two_clear_obstacles_are_medium() {
        let rects = [
            Rect::from_xywh(100.0, 400.0, 60.0, 40.0),
            Rect::from_xywh(400.0, 400.0, 60.0, 40.0),
        ];
        let report = classify_rects(&query(0.0, 0.0, 300.0, 200.0), &rects);
        assert_eq!(report.complexity, SceneComplexity::Medium);
    }

    #[test]
    fn blocked_draft_is_complex() {
        // Sits on the horizontal leg of the draft L.
        let blocking = Rect::from_xywh(120.0, -20.0, 60.0, 40.0);
        let report = classify_rects(&query(0.0, 0.0, 300.0, 200.0), &[blocking]);
        assert_eq!(report.complexity, SceneComplexity::Complex);
    }

    #[test]
    fn endpoint_nodes_are_not_relevant() {
        let source_node = Rect::from_xywh(-60.0, -30.0, 60.0, 60.0);
        let q = RouteQuery::new(
            PortRef::new(Point::new(0.0, 0.0), PortDirection::Right, source_node),
            PortRef::detached(Point::new(300.0, 10.0), PortDirection::Left),
        );
        let report = classify_rects(&q, &[source_node]);
        assert_eq!(report.relevant_obstacles, 0);
        assert_eq!(report.complexity, SceneComplexity::Direct);
    }
}
