//! Strategy selection: a decision table over scene complexity and the
//! direction relation, with draft-and-test pretests where the table alone
//! cannot decide.

use serde::{Deserialize, Serialize};

use super::builders::build_path;
use super::collide::path_intersects_rect;
use super::scene::{SceneComplexity, SceneReport};
use super::{Obstacle, ObstacleRole, RouteQuery};
use crate::config::RouterConfig;
use crate::geom::{DirectionRelation, Point, PortDirection};

/// Shape family of a draft path. The number names count segments, not points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathStrategy {
    Direct,
    HorizontalFirst,
    VerticalFirst,
    ThreeSegment,
    OppositeDirection,
    FourSegment,
    FiveSegment,
}

pub(super) fn select_strategy(
    query: &RouteQuery,
    report: &SceneReport,
    obstacles: &[Obstacle],
    config: &RouterConfig,
) -> PathStrategy {
    if report.complexity == SceneComplexity::Direct {
        return PathStrategy::Direct;
    }
    match report.relation {
        DirectionRelation::Opposite => PathStrategy::OppositeDirection,
        DirectionRelation::Perpendicular => select_perpendicular(query, report, obstacles, config),
        DirectionRelation::Same => select_same(query, report, obstacles, config),
    }
}

/// Perpendicular ports: when obstacles exist, draft both first-strategies and
/// keep the one that routes clean; the distance heuristic only breaks ties.
fn select_perpendicular(
    query: &RouteQuery,
    report: &SceneReport,
    obstacles: &[Obstacle],
    config: &RouterConfig,
) -> PathStrategy {
    if report.relevant_obstacles > 0 {
        let horizontal = build_path(PathStrategy::HorizontalFirst, query, config);
        let vertical = build_path(PathStrategy::VerticalFirst, query, config);
        let h_clear = draft_clear(&horizontal, obstacles, config);
        let v_clear = draft_clear(&vertical, obstacles, config);
        match (h_clear, v_clear) {
            (true, false) => return PathStrategy::HorizontalFirst,
            (false, true) => return PathStrategy::VerticalFirst,
            _ => {}
        }
    }
    if prefer_horizontal(query) {
        PathStrategy::HorizontalFirst
    } else {
        PathStrategy::VerticalFirst
    }
}

/// Same-facing ports climb a ladder: orientation pick while the scene is
/// easy, then three segments, then the staircases.
fn select_same(
    query: &RouteQuery,
    report: &SceneReport,
    obstacles: &[Obstacle],
    config: &RouterConfig,
) -> PathStrategy {
    match report.complexity {
        SceneComplexity::Direct | SceneComplexity::Simple => orientation_pick(query),
        SceneComplexity::Medium => {
            let draft = build_path(PathStrategy::ThreeSegment, query, config);
            if draft_clear(&draft, obstacles, config) {
                PathStrategy::ThreeSegment
            } else {
                PathStrategy::FourSegment
            }
        }
        SceneComplexity::Complex => {
            let draft = build_path(PathStrategy::FourSegment, query, config);
            if crossed_count(&draft, obstacles, config) <= 1 {
                PathStrategy::FourSegment
            } else {
                PathStrategy::FiveSegment
            }
        }
    }
}

fn orientation_pick(query: &RouteQuery) -> PathStrategy {
    if query.source.direction.is_horizontal() {
        PathStrategy::HorizontalFirst
    } else {
        PathStrategy::VerticalFirst
    }
}

fn draft_clear(path: &[Point], obstacles: &[Obstacle], config: &RouterConfig) -> bool {
    crossed_count(path, obstacles, config) == 0
}

fn crossed_count(path: &[Point], obstacles: &[Obstacle], config: &RouterConfig) -> usize {
    obstacles
        .iter()
        .filter(|o| o.role == ObstacleRole::Other)
        .filter(|o| path_intersects_rect(path, &o.rect, config.clearance))
        .count()
}

/// Distance-and-facing heuristic for perpendicular port pairs.
///
/// A source port facing the target wins outright for its own axis; failing
/// that, a target port whose facing matches the approach wins when its axis
/// is at least as short; otherwise the longer span goes first.
fn prefer_horizontal(query: &RouteQuery) -> bool {
    use PortDirection::*;
    let dx = query.dx();
    let dy = query.dy();
    let h_span = dx.abs();
    let v_span = dy.abs();
    let source = query.source.direction;
    let target = query.target.direction;

    if source.is_horizontal() && target.is_vertical() {
        let source_faces_target = (source == Right && dx > 0.0) || (source == Left && dx < 0.0);
        if source_faces_target {
            return true;
        }
        let vertical_natural = (target == Top && dy < 0.0) || (target == Bottom && dy > 0.0);
        if vertical_natural && h_span <= v_span {
            return false;
        }
        return h_span >= v_span;
    }

    if source.is_vertical() && target.is_horizontal() {
        let source_faces_target = (source == Bottom && dy > 0.0) || (source == Top && dy < 0.0);
        if source_faces_target {
            return false;
        }
        let horizontal_natural = (target == Left && dx < 0.0) || (target == Right && dx > 0.0);
        if horizontal_natural && v_span <= h_span {
            return true;
        }
        return h_span > v_span;
    }

    h_span >= v_span
}
